use crate::ast::{
    expressions::{BinaryOp, UnaryOp},
    types::Type,
};

/// Handle of a basic block within one function's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

/// Handle of an instruction result within one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

/// Handle of a function-local storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// A storage location: a function-local slot or a named global.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Slot(SlotId),
    Global(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub type_: Type,
}

/// One instruction. `dest` is Some for value-producing operations and None
/// for pure effects (stores, prints, void calls).
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    pub dest: Option<ValueId>,
    pub op: Op,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    ConstInt(i64),
    ConstReal(f64),
    ConstBool(bool),
    ConstStr(String),

    Load(Place),
    Store { place: Place, value: ValueId },

    /// Both operands already share `type_`; mixed int/real operands are
    /// balanced with an explicit conversion before this instruction.
    Binary {
        op: BinaryOp,
        type_: Type,
        left: ValueId,
        right: ValueId,
    },
    Unary {
        op: UnaryOp,
        type_: Type,
        operand: ValueId,
    },

    /// The single implicit widening, made explicit.
    IntToReal(ValueId),

    StrLen(ValueId),
    /// Allocates a byte buffer of the given length (in bytes, including
    /// the terminator).
    StrAlloc(ValueId),
    StrCopy { dest: ValueId, src: ValueId },
    StrAppend { dest: ValueId, src: ValueId },

    PrintInt(ValueId),
    PrintReal(ValueId),
    PrintBool(ValueId),
    PrintStr(ValueId),

    ReadInt(Place),
    ReadReal(Place),
    /// Reads into a freshly allocated fixed 256-byte buffer and stores the
    /// buffer pointer into the place. The language has no dynamic string
    /// growth; the capacity is a documented limitation.
    ReadStr(Place),

    Call { name: String, args: Vec<ValueId> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Br(BlockId),
    CondBr {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Ret(Option<ValueId>),
    Unreachable,
}

/// A basic block: a straight-line instruction sequence and exactly one
/// terminator. The terminator is None only while the block is still being
/// built; a finished function has no unterminated blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub instrs: Vec<Instr>,
    pub terminator: Option<Terminator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CfgFunction {
    pub name: String,
    /// Parameter slots are the first `params.len()` entries of `slots`; the
    /// backend stores incoming arguments into them on entry.
    pub params: Vec<Slot>,
    pub return_type: Type,
    pub slots: Vec<Slot>,
    pub blocks: Vec<Block>,
    /// Result type per ValueId.
    pub values: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlobalInit {
    Zero,
    Int(i64),
    Real(f64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub type_: Type,
    pub init: GlobalInit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CfgProgram {
    pub globals: Vec<GlobalVar>,
    pub functions: Vec<CfgFunction>,
}
