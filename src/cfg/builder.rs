//! Arena-based function builder.
//!
//! Blocks are created in the arena in append order and addressed by
//! handle. A block's terminator may be left unset while its successors are
//! still being lowered and patched in later; emission always targets the
//! current block.

use crate::ast::types::Type;

use super::ir::{Block, BlockId, CfgFunction, Instr, Op, Slot, SlotId, Terminator, ValueId};

pub struct FunctionBuilder {
    name: String,
    params: Vec<Slot>,
    return_type: Type,
    slots: Vec<Slot>,
    blocks: Vec<Block>,
    values: Vec<Type>,
    current: BlockId,
}

impl FunctionBuilder {
    /// Creates the builder with an entry block and one slot per parameter.
    pub fn new(name: &str, params: Vec<Slot>, return_type: Type) -> Self {
        let mut builder = FunctionBuilder {
            name: name.to_string(),
            slots: params.clone(),
            params,
            return_type,
            blocks: vec![],
            values: vec![],
            current: BlockId(0),
        };
        builder.new_block("entry");
        builder
    }

    /// Appends an empty block to the arena and returns its handle. Does not
    /// change the current block.
    pub fn new_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            name: name.to_string(),
            instrs: vec![],
            terminator: None,
        });
        id
    }

    pub fn add_slot(&mut self, name: &str, type_: Type) -> SlotId {
        let id = SlotId(self.slots.len());
        self.slots.push(Slot {
            name: name.to_string(),
            type_,
        });
        id
    }

    pub fn current(&self) -> BlockId {
        self.current
    }

    pub fn set_current(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn is_terminated(&self) -> bool {
        self.blocks[self.current.0].terminator.is_some()
    }

    /// Emits a value-producing instruction into the current block.
    pub fn emit_value(&mut self, op: Op, type_: Type) -> ValueId {
        let value = ValueId(self.values.len());
        self.values.push(type_);
        self.blocks[self.current.0].instrs.push(Instr {
            dest: Some(value),
            op,
        });
        value
    }

    /// Emits a pure-effect instruction into the current block.
    pub fn emit(&mut self, op: Op) {
        self.blocks[self.current.0].instrs.push(Instr { dest: None, op });
    }

    /// Terminates the current block if it is not already terminated.
    pub fn terminate(&mut self, terminator: Terminator) {
        self.terminate_block(self.current, terminator);
    }

    /// Terminates the given block if it is not already terminated. Used to
    /// patch deferred branch edges once their target exists.
    pub fn terminate_block(&mut self, block: BlockId, terminator: Terminator) {
        let block = &mut self.blocks[block.0];
        if block.terminator.is_none() {
            block.terminator = Some(terminator);
        }
    }

    pub fn finish(self) -> CfgFunction {
        CfgFunction {
            name: self.name,
            params: self.params,
            return_type: self.return_type,
            slots: self.slots,
            blocks: self.blocks,
            values: self.values,
        }
    }
}
