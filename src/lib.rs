#![allow(clippy::module_inception)]

use std::{fs, path::Path};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod backend;
pub mod cfg;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod sema;

extern crate regex;

/// A line/column pair into the source file. Lines and columns are 1-based;
/// a zero line means "no position" (synthesized nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    pub fn null() -> Self {
        Position { line: 0, column: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

pub fn get_line(content: &str, line_number: u32) -> Option<String> {
    content
        .lines()
        .nth((line_number.max(1) - 1) as usize)
        .map(|line| line.to_string())
}

pub fn display_error(error: &Error, file: &Path) {
    /*
        Error: TypeMismatch (expected `int`, received `real`)
        -> final.gr
           |
        20 | x = 2.5;
           | ----^
    */

    let position = error.get_position();

    if let ErrorTip::None = error.get_tip() {
        println!("Error: {}", error.get_error_name());
    } else {
        println!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    println!("-> {}", file.as_os_str().to_string_lossy());

    if position.line == 0 {
        return;
    }

    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(_) => return,
    };

    let line_text = match get_line(&content, position.line) {
        Some(line) => line,
        None => return,
    };

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    println!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    println!("{} | {}", line_string, line_text_removed.trim_end());

    let column = position.column.max(1) as usize;
    let arrows = column.saturating_sub(removed_whitespace).max(1);

    println!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line() {
        let content = "Hello, world!\nsecond line\n\nTesting { }\n";

        assert_eq!(super::get_line(content, 1).unwrap(), "Hello, world!");
        assert_eq!(super::get_line(content, 4).unwrap(), "Testing { }");
        assert!(super::get_line(content, 9).is_none());
    }

    #[test]
    fn test_remove_starting_whitespace() {
        let (trimmed, removed) = super::remove_starting_whitespace("    x = 1;");
        assert_eq!(trimmed, "x = 1;");
        assert_eq!(removed, 4);
    }
}
