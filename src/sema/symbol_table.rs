use std::collections::HashMap;

use crate::ast::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Var(VarSymbol),
    Func(FuncSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Var(var) => &var.name,
            Symbol::Func(func) => &func.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarSymbol {
    pub name: String,
    pub type_: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncSymbol {
    pub name: String,
    pub param_types: Vec<Type>,
    pub return_type: Type,
}

/// A stack of name→symbol scopes. Index 0 is the global scope and lives for
/// the whole compilation; each function body pushes exactly one scope on
/// entry and pops it on exit.
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope. The global scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Inserts into the innermost scope. Returns false if the name already
    /// exists in that exact scope; the symbol is then not inserted.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        let scope = self.scopes.last_mut().unwrap();
        if scope.contains_key(symbol.name()) {
            return false;
        }
        scope.insert(symbol.name().to_string(), symbol);
        true
    }

    /// Searches innermost to outermost, returning the first match.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        for scope in self.scopes.iter().rev() {
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
