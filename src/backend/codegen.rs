//! LLVM IR emission from the control-flow graph.
//!
//! Type mapping: int is i32, real is double, bool is i1, string is i8*.
//! Every variable lives in an entry-block alloca; incoming arguments are
//! stored into the leading parameter slots on entry. I/O and string
//! handling go through the C runtime (printf, scanf, malloc, strlen,
//! strcpy, strcat, strcmp), declared with external linkage.

use std::{collections::HashMap, path::Path};

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    passes::PassManager,
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType},
    values::{BasicMetadataValueEnum, BasicValueEnum, PointerValue},
    AddressSpace, FloatPredicate, IntPredicate,
};

use crate::{
    ast::{
        expressions::{BinaryOp, UnaryOp},
        types::Type,
    },
    cfg::ir::{CfgFunction, CfgProgram, GlobalInit, Instr, Op, Place, Terminator, ValueId},
};

/// Holds the LLVM context handles for one compiled module.
pub struct Codegen<'a> {
    pub context: &'a Context,
    pub module: Module<'a>,
    pub builder: Builder<'a>,

    /// Interned printf/scanf format strings, one global per distinct text.
    format_strings: HashMap<String, PointerValue<'a>>,
}

/// Emits the whole program into a fresh module and verifies it.
pub fn codegen<'a>(program: &CfgProgram, context: &'a Context, module_name: &str) -> Codegen<'a> {
    let mut gen = Codegen {
        context,
        module: context.create_module(module_name),
        builder: context.create_builder(),
        format_strings: HashMap::new(),
    };

    gen.create_runtime_functions();
    gen.create_globals(program);

    // Declare every function first so calls resolve regardless of
    // definition order.
    for func in &program.functions {
        gen.module
            .add_function(&func.name, gen.function_type(func), None);
    }

    for func in &program.functions {
        FunctionEmitter::new(&mut gen, func).emit();
    }

    gen.run_passes();
    gen
}

impl<'a> Codegen<'a> {
    pub fn save_module_to_file(&self, output_file: &Path) {
        self.module.print_to_file(output_file).unwrap();
    }

    fn run_passes(&self) {
        let fpm = PassManager::create(());
        fpm.add_verifier_pass();
        fpm.run_on(&self.module);
    }

    fn basic_type(&self, type_: Type) -> BasicTypeEnum<'a> {
        match type_ {
            Type::Int => self.context.i32_type().into(),
            Type::Real => self.context.f64_type().into(),
            Type::Bool => self.context.bool_type().into(),
            Type::Str => self
                .context
                .i8_type()
                .ptr_type(AddressSpace::default())
                .into(),
            Type::Void => {
                panic!("Attempted to convert `void` to a value type");
            }
        }
    }

    fn function_type(&self, func: &CfgFunction) -> FunctionType<'a> {
        let params: Vec<BasicMetadataTypeEnum> = func
            .params
            .iter()
            .map(|param| self.basic_type(param.type_).into())
            .collect();

        match func.return_type {
            Type::Void => self.context.void_type().fn_type(&params, false),
            other => self.basic_type(other).fn_type(&params, false),
        }
    }

    /// Declares the C runtime functions the emitted code leans on.
    fn create_runtime_functions(&self) {
        let i8_ptr_type = self.context.i8_type().ptr_type(AddressSpace::default());
        let i32_type = self.context.i32_type();
        let i64_type = self.context.i64_type();

        let printf_type = i32_type.fn_type(&[i8_ptr_type.into()], true);
        self.module
            .add_function("printf", printf_type, Some(Linkage::External));

        let scanf_type = i32_type.fn_type(&[i8_ptr_type.into()], true);
        self.module
            .add_function("scanf", scanf_type, Some(Linkage::External));

        // i8* malloc(i64 size)
        let malloc_type = i8_ptr_type.fn_type(&[i64_type.into()], false);
        self.module
            .add_function("malloc", malloc_type, Some(Linkage::External));

        // i64 strlen(i8* s)
        let strlen_type = i64_type.fn_type(&[i8_ptr_type.into()], false);
        self.module
            .add_function("strlen", strlen_type, Some(Linkage::External));

        // i8* strcpy(i8* dest, i8* src)
        let strcpy_type = i8_ptr_type.fn_type(&[i8_ptr_type.into(), i8_ptr_type.into()], false);
        self.module
            .add_function("strcpy", strcpy_type, Some(Linkage::External));

        // i8* strcat(i8* dest, i8* src)
        let strcat_type = i8_ptr_type.fn_type(&[i8_ptr_type.into(), i8_ptr_type.into()], false);
        self.module
            .add_function("strcat", strcat_type, Some(Linkage::External));

        // i32 strcmp(i8* a, i8* b)
        let strcmp_type = i32_type.fn_type(&[i8_ptr_type.into(), i8_ptr_type.into()], false);
        self.module
            .add_function("strcmp", strcmp_type, Some(Linkage::External));
    }

    fn create_globals(&self, program: &CfgProgram) {
        for global in &program.globals {
            let llvm_global =
                self.module
                    .add_global(self.basic_type(global.type_), None, &global.name);

            let init: BasicValueEnum = match (&global.init, global.type_) {
                // A declared-but-uninitialized string starts as "" rather
                // than a null pointer, so printing it is safe.
                (GlobalInit::Zero, Type::Str) => self.const_string_ptr(&global.name, "").into(),
                (GlobalInit::Zero, Type::Real) => self.context.f64_type().const_zero().into(),
                (GlobalInit::Zero, Type::Bool) => self.context.bool_type().const_zero().into(),
                (GlobalInit::Zero, _) => self.context.i32_type().const_zero().into(),
                (GlobalInit::Int(value), _) => self
                    .context
                    .i32_type()
                    .const_int(*value as u64, true)
                    .into(),
                (GlobalInit::Real(value), _) => self.context.f64_type().const_float(*value).into(),
                (GlobalInit::Bool(value), _) => self
                    .context
                    .bool_type()
                    .const_int(*value as u64, false)
                    .into(),
                (GlobalInit::Str(value), _) => self.const_string_ptr(&global.name, value).into(),
            };

            llvm_global.set_initializer(&init);
        }
    }

    /// Creates a private constant byte array and returns it as an i8*.
    fn const_string_ptr(&self, name: &str, text: &str) -> PointerValue<'a> {
        let bytes = self.context.const_string(text.as_bytes(), true);

        let storage = self
            .module
            .add_global(bytes.get_type(), None, &format!("{}.str", name));
        storage.set_initializer(&bytes);
        storage.set_constant(true);
        storage.set_linkage(Linkage::Private);

        storage
            .as_pointer_value()
            .const_cast(self.context.i8_type().ptr_type(AddressSpace::default()))
    }

    fn format_string(&mut self, text: &str) -> PointerValue<'a> {
        if let Some(pointer) = self.format_strings.get(text) {
            return *pointer;
        }

        let pointer = self
            .builder
            .build_global_string_ptr(text, "fmt")
            .unwrap()
            .as_pointer_value();
        self.format_strings.insert(text.to_string(), pointer);
        pointer
    }
}

/// Per-function emission state: the block arena realized as LLVM basic
/// blocks, one alloca per slot, and the SSA value of every instruction
/// result seen so far.
struct FunctionEmitter<'a, 'ctx> {
    gen: &'a mut Codegen<'ctx>,
    func: &'a CfgFunction,
    blocks: Vec<BasicBlock<'ctx>>,
    slots: Vec<PointerValue<'ctx>>,
    values: HashMap<ValueId, BasicValueEnum<'ctx>>,
}

impl<'a, 'ctx> FunctionEmitter<'a, 'ctx> {
    fn new(gen: &'a mut Codegen<'ctx>, func: &'a CfgFunction) -> Self {
        FunctionEmitter {
            gen,
            func,
            blocks: vec![],
            slots: vec![],
            values: HashMap::new(),
        }
    }

    fn emit(mut self) {
        let function = self.gen.module.get_function(&self.func.name).unwrap();

        for block in &self.func.blocks {
            self.blocks
                .push(self.gen.context.append_basic_block(function, &block.name));
        }

        // All allocas go into the entry block, ahead of its instructions.
        self.gen.builder.position_at_end(self.blocks[0]);
        for slot in &self.func.slots {
            let alloca = self
                .gen
                .builder
                .build_alloca(self.gen.basic_type(slot.type_), &slot.name)
                .unwrap();
            self.slots.push(alloca);
        }

        for (index, param) in function.get_param_iter().enumerate() {
            self.gen.builder.build_store(self.slots[index], param).unwrap();
        }

        for (index, block) in self.func.blocks.iter().enumerate() {
            self.gen.builder.position_at_end(self.blocks[index]);

            for instr in &block.instrs {
                self.emit_instr(instr);
            }

            let terminator = block
                .terminator
                .as_ref()
                .unwrap_or_else(|| panic!("block `{}` has no terminator", block.name));
            self.emit_terminator(terminator);
        }
    }

    fn emit_instr(&mut self, instr: &Instr) {
        let result: Option<BasicValueEnum<'ctx>> = match &instr.op {
            Op::ConstInt(value) => Some(
                self.gen
                    .context
                    .i32_type()
                    .const_int(*value as u64, true)
                    .into(),
            ),
            Op::ConstReal(value) => Some(self.gen.context.f64_type().const_float(*value).into()),
            Op::ConstBool(value) => Some(
                self.gen
                    .context
                    .bool_type()
                    .const_int(*value as u64, false)
                    .into(),
            ),
            Op::ConstStr(value) => Some(
                self.gen
                    .builder
                    .build_global_string_ptr(value, "")
                    .unwrap()
                    .as_pointer_value()
                    .into(),
            ),

            Op::Load(place) => {
                let pointer = self.place_pointer(place);
                Some(self.gen.builder.build_load(pointer, "").unwrap())
            }
            Op::Store { place, value } => {
                let pointer = self.place_pointer(place);
                self.gen
                    .builder
                    .build_store(pointer, self.value(*value))
                    .unwrap();
                None
            }

            Op::Binary {
                op,
                type_,
                left,
                right,
            } => Some(self.emit_binary(*op, *type_, self.value(*left), self.value(*right))),
            Op::Unary { op, type_, operand } => {
                Some(self.emit_unary(*op, *type_, self.value(*operand)))
            }

            Op::IntToReal(value) => Some(
                self.gen
                    .builder
                    .build_signed_int_to_float(
                        self.value(*value).into_int_value(),
                        self.gen.context.f64_type(),
                        "",
                    )
                    .unwrap()
                    .into(),
            ),

            Op::StrLen(value) => {
                let length = self
                    .call_runtime("strlen", &[self.value(*value).into()])
                    .unwrap()
                    .into_int_value();
                // strlen returns i64; the language's int is i32.
                Some(
                    self.gen
                        .builder
                        .build_int_truncate(length, self.gen.context.i32_type(), "")
                        .unwrap()
                        .into(),
                )
            }
            Op::StrAlloc(length) => {
                let size = self
                    .gen
                    .builder
                    .build_int_s_extend(
                        self.value(*length).into_int_value(),
                        self.gen.context.i64_type(),
                        "",
                    )
                    .unwrap();
                Some(self.call_runtime("malloc", &[size.into()]).unwrap())
            }
            Op::StrCopy { dest, src } => {
                self.call_runtime("strcpy", &[self.value(*dest).into(), self.value(*src).into()]);
                None
            }
            Op::StrAppend { dest, src } => {
                self.call_runtime("strcat", &[self.value(*dest).into(), self.value(*src).into()]);
                None
            }

            Op::PrintInt(value) => {
                self.emit_printf("%d", self.value(*value).into());
                None
            }
            Op::PrintReal(value) => {
                self.emit_printf("%.6f", self.value(*value).into());
                None
            }
            Op::PrintBool(value) => {
                // Printed as 0/1.
                let wide = self
                    .gen
                    .builder
                    .build_int_z_extend(
                        self.value(*value).into_int_value(),
                        self.gen.context.i32_type(),
                        "",
                    )
                    .unwrap();
                self.emit_printf("%d", wide.into());
                None
            }
            Op::PrintStr(value) => {
                self.emit_printf("%s", self.value(*value).into());
                None
            }

            Op::ReadInt(place) => {
                let pointer = self.place_pointer(place);
                self.emit_scanf("%d", pointer.into());
                None
            }
            Op::ReadReal(place) => {
                let pointer = self.place_pointer(place);
                self.emit_scanf("%lf", pointer.into());
                None
            }
            Op::ReadStr(place) => {
                // A fresh fixed-capacity buffer per read.
                let size = self.gen.context.i64_type().const_int(256, false);
                let buffer = self.call_runtime("malloc", &[size.into()]).unwrap();
                self.emit_scanf("%255s", buffer.into());

                let pointer = self.place_pointer(place);
                self.gen.builder.build_store(pointer, buffer).unwrap();
                None
            }

            Op::Call { name, args } => {
                let function = self.gen.module.get_function(name).unwrap();
                let args: Vec<BasicMetadataValueEnum> =
                    args.iter().map(|arg| self.value(*arg).into()).collect();
                self.gen
                    .builder
                    .build_call(function, &args, "")
                    .unwrap()
                    .try_as_basic_value()
                    .left()
            }
        };

        if let (Some(dest), Some(value)) = (instr.dest, result) {
            self.values.insert(dest, value);
        }
    }

    fn emit_terminator(&self, terminator: &Terminator) {
        match terminator {
            Terminator::Br(target) => {
                self.gen
                    .builder
                    .build_unconditional_branch(self.blocks[target.0])
                    .unwrap();
            }
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => {
                self.gen
                    .builder
                    .build_conditional_branch(
                        self.value(*cond).into_int_value(),
                        self.blocks[then_block.0],
                        self.blocks[else_block.0],
                    )
                    .unwrap();
            }
            Terminator::Ret(Some(value)) => {
                let value = self.value(*value);
                self.gen.builder.build_return(Some(&value)).unwrap();
            }
            Terminator::Ret(None) => {
                self.gen.builder.build_return(None).unwrap();
            }
            Terminator::Unreachable => {
                self.gen.builder.build_unreachable().unwrap();
            }
        }
    }

    /// Both operands share `type_`; the lowering balanced them already.
    fn emit_binary(
        &self,
        op: BinaryOp,
        type_: Type,
        left: BasicValueEnum<'ctx>,
        right: BasicValueEnum<'ctx>,
    ) -> BasicValueEnum<'ctx> {
        match type_ {
            Type::Int => {
                let left = left.into_int_value();
                let right = right.into_int_value();
                let builder = &self.gen.builder;

                match op {
                    BinaryOp::Add => builder.build_int_add(left, right, "").unwrap().into(),
                    BinaryOp::Sub => builder.build_int_sub(left, right, "").unwrap().into(),
                    BinaryOp::Mul => builder.build_int_mul(left, right, "").unwrap().into(),
                    BinaryOp::Div => builder
                        .build_int_signed_div(left, right, "")
                        .unwrap()
                        .into(),
                    _ => builder
                        .build_int_compare(int_predicate(op), left, right, "")
                        .unwrap()
                        .into(),
                }
            }
            Type::Real => {
                let left = left.into_float_value();
                let right = right.into_float_value();
                let builder = &self.gen.builder;

                match op {
                    BinaryOp::Add => builder.build_float_add(left, right, "").unwrap().into(),
                    BinaryOp::Sub => builder.build_float_sub(left, right, "").unwrap().into(),
                    BinaryOp::Mul => builder.build_float_mul(left, right, "").unwrap().into(),
                    BinaryOp::Div => builder.build_float_div(left, right, "").unwrap().into(),
                    _ => builder
                        .build_float_compare(float_predicate(op), left, right, "")
                        .unwrap()
                        .into(),
                }
            }
            Type::Bool => {
                let left = left.into_int_value();
                let right = right.into_int_value();
                let builder = &self.gen.builder;

                match op {
                    BinaryOp::And => builder.build_and(left, right, "").unwrap().into(),
                    BinaryOp::Or => builder.build_or(left, right, "").unwrap().into(),
                    BinaryOp::Eq => builder
                        .build_int_compare(IntPredicate::EQ, left, right, "")
                        .unwrap()
                        .into(),
                    BinaryOp::Ne => builder
                        .build_int_compare(IntPredicate::NE, left, right, "")
                        .unwrap()
                        .into(),
                    other => panic!("operator `{}` cannot be applied to bool", other),
                }
            }
            Type::Str => {
                // String equality compares contents, not pointers.
                let result = self
                    .call_runtime("strcmp", &[left.into(), right.into()])
                    .unwrap()
                    .into_int_value();
                let zero = self.gen.context.i32_type().const_zero();

                let predicate = match op {
                    BinaryOp::Eq => IntPredicate::EQ,
                    BinaryOp::Ne => IntPredicate::NE,
                    other => panic!("operator `{}` cannot be applied to string", other),
                };

                self.gen
                    .builder
                    .build_int_compare(predicate, result, zero, "")
                    .unwrap()
                    .into()
            }
            Type::Void => panic!("binary operation on void operands"),
        }
    }

    fn emit_unary(
        &self,
        op: UnaryOp,
        type_: Type,
        operand: BasicValueEnum<'ctx>,
    ) -> BasicValueEnum<'ctx> {
        match op {
            UnaryOp::Neg => match type_ {
                Type::Int => self
                    .gen
                    .builder
                    .build_int_neg(operand.into_int_value(), "")
                    .unwrap()
                    .into(),
                Type::Real => self
                    .gen
                    .builder
                    .build_float_neg(operand.into_float_value(), "")
                    .unwrap()
                    .into(),
                other => panic!("`-` cannot be applied to {}", other),
            },
            UnaryOp::Not => self
                .gen
                .builder
                .build_not(operand.into_int_value(), "")
                .unwrap()
                .into(),
        }
    }

    fn emit_printf(&mut self, format: &str, value: BasicMetadataValueEnum<'ctx>) {
        let format_pointer = self.gen.format_string(format);
        let printf = self.gen.module.get_function("printf").unwrap();
        self.gen
            .builder
            .build_call(printf, &[format_pointer.into(), value], "")
            .unwrap();
    }

    fn emit_scanf(&mut self, format: &str, target: BasicMetadataValueEnum<'ctx>) {
        let format_pointer = self.gen.format_string(format);
        let scanf = self.gen.module.get_function("scanf").unwrap();
        self.gen
            .builder
            .build_call(scanf, &[format_pointer.into(), target], "")
            .unwrap();
    }

    fn call_runtime(
        &self,
        name: &str,
        args: &[BasicMetadataValueEnum<'ctx>],
    ) -> Option<BasicValueEnum<'ctx>> {
        let function = self.gen.module.get_function(name).unwrap();
        self.gen
            .builder
            .build_call(function, args, "")
            .unwrap()
            .try_as_basic_value()
            .left()
    }

    fn value(&self, id: ValueId) -> BasicValueEnum<'ctx> {
        self.values[&id]
    }

    fn place_pointer(&self, place: &Place) -> PointerValue<'ctx> {
        match place {
            Place::Slot(slot) => self.slots[slot.0],
            Place::Global(name) => self
                .gen
                .module
                .get_global(name)
                .unwrap()
                .as_pointer_value(),
        }
    }
}

fn int_predicate(op: BinaryOp) -> IntPredicate {
    match op {
        BinaryOp::Eq => IntPredicate::EQ,
        BinaryOp::Ne => IntPredicate::NE,
        BinaryOp::Lt => IntPredicate::SLT,
        BinaryOp::Le => IntPredicate::SLE,
        BinaryOp::Gt => IntPredicate::SGT,
        BinaryOp::Ge => IntPredicate::SGE,
        other => panic!("`{}` is not a comparison operator", other),
    }
}

fn float_predicate(op: BinaryOp) -> FloatPredicate {
    match op {
        BinaryOp::Eq => FloatPredicate::OEQ,
        BinaryOp::Ne => FloatPredicate::ONE,
        BinaryOp::Lt => FloatPredicate::OLT,
        BinaryOp::Le => FloatPredicate::OLE,
        BinaryOp::Gt => FloatPredicate::OGT,
        BinaryOp::Ge => FloatPredicate::OGE,
        other => panic!("`{}` is not a comparison operator", other),
    }
}
