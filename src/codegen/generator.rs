//! The IR generator core.
//!
//! Holds the LLVM context/module/builder, the named-function table, and
//! the stack of lexical frames (variable slots plus the innermost
//! break/continue targets). The frame stack is an index-addressable
//! vector; break and continue resolve to the nearest enclosing target.
//!
//! Precondition for the whole module: the semantic analyzer reported
//! zero errors for the tree being lowered. Symbols missing at this
//! stage are compiler bugs, not user errors, and fail fast.

use std::collections::HashMap;

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, PointerType},
    values::{BasicValueEnum, FunctionValue, IntValue, PointerValue},
    AddressSpace, IntPredicate,
};

use crate::{
    ast::{BlockExpression, Crate, Function, Item, LetStatement, Pattern, Statement, TypeNode},
    ICE,
};

use super::expr::gen_expression;

pub struct Frame<'ctx> {
    pub vars: HashMap<String, PointerValue<'ctx>>,
    pub break_target: Option<BasicBlock<'ctx>>,
    pub continue_target: Option<BasicBlock<'ctx>>,
}

impl<'ctx> Frame<'ctx> {
    fn new() -> Self {
        Frame {
            vars: HashMap::new(),
            break_target: None,
            continue_target: None,
        }
    }
}

pub struct Generator<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub functions: HashMap<String, FunctionValue<'ctx>>,
    frames: Vec<Frame<'ctx>>,
}

/// Lowers an analyzed crate into an LLVM module.
pub fn generate<'ctx>(context: &'ctx Context, krate: &Crate, name: &str) -> Module<'ctx> {
    let mut generator = Generator::new(context, name);
    generator.create_intrinsics();

    for item in &krate.items {
        if let Item::Function(function) = item {
            generator.gen_function(function);
        }
    }

    generator.module
}

impl<'ctx> Generator<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        Generator {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            functions: HashMap::new(),
            frames: vec![],
        }
    }

    /// Declares `printf` and defines the runtime's writer intrinsics: a
    /// global format string plus a printf call each.
    fn create_intrinsics(&mut self) {
        let i8_ptr_type = self.context.i8_type().ptr_type(AddressSpace::default());
        let printf_type = self.context.i32_type().fn_type(&[i8_ptr_type.into()], true);
        let printf = self
            .module
            .add_function("printf", printf_type, Some(Linkage::External));

        self.define_writer("oxide::writeln_i64", self.context.i64_type().into(), "%ld\n", printf);
        self.define_writer("oxide::writeln_char", self.context.i8_type().into(), "%c\n", printf);
    }

    fn define_writer(
        &mut self,
        name: &str,
        param_type: BasicTypeEnum<'ctx>,
        format: &str,
        printf: FunctionValue<'ctx>,
    ) {
        let writer_type = self
            .context
            .void_type()
            .fn_type(&[param_type.into()], false);
        let writer = self.module.add_function(name, writer_type, None);

        let entry = self.context.append_basic_block(writer, "entry");
        self.builder.position_at_end(entry);
        let format_string = self.builder.build_global_string_ptr(format, "fmt").unwrap();
        self.builder
            .build_call(
                printf,
                &[
                    format_string.as_pointer_value().into(),
                    writer.get_first_param().unwrap().into(),
                ],
                "",
            )
            .unwrap();
        self.builder.build_return(None).unwrap();

        self.functions.insert(name.to_string(), writer);
        self.builder.clear_insertion_position();
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    pub fn push_loop_frame(
        &mut self,
        break_target: BasicBlock<'ctx>,
        continue_target: BasicBlock<'ctx>,
    ) {
        let mut frame = Frame::new();
        frame.break_target = Some(break_target);
        frame.continue_target = Some(continue_target);
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub fn insert_var(&mut self, name: &str, slot: PointerValue<'ctx>) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.vars.insert(name.to_string(), slot);
            }
            None => ICE!("variable slot {} created outside any frame", name),
        }
    }

    pub fn lookup_var(&self, name: &str) -> Option<PointerValue<'ctx>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.vars.get(name).copied())
    }

    /// The nearest enclosing loop-exit block.
    pub fn break_target(&self) -> Option<BasicBlock<'ctx>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.break_target)
    }

    /// The nearest enclosing loop-reentry block.
    pub fn continue_target(&self) -> Option<BasicBlock<'ctx>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.continue_target)
    }

    pub fn current_block_terminated(&self) -> bool {
        match self.builder.get_insert_block() {
            Some(block) => block.get_terminator().is_some(),
            None => true,
        }
    }

    pub fn current_function(&self) -> FunctionValue<'ctx> {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
            .unwrap_or_else(|| ICE!("builder is not positioned inside a function"))
    }

    /// Conditions are integer-family values; width-1 values pass
    /// through, anything wider compares against zero.
    pub fn as_condition(&self, value: BasicValueEnum<'ctx>) -> IntValue<'ctx> {
        let BasicValueEnum::IntValue(int) = value else {
            ICE!("non-integer condition value {:?}", value)
        };
        if int.get_type().get_bit_width() == 1 {
            int
        } else {
            self.builder
                .build_int_compare(IntPredicate::NE, int, int.get_type().const_zero(), "")
                .unwrap()
        }
    }

    /// Maps a syntactic type form onto an LLVM type. Forms outside the
    /// lowered subset fall back to an i64 slot.
    pub fn lower_type(&self, node: &TypeNode) -> BasicTypeEnum<'ctx> {
        match node {
            TypeNode::Path(segments) => match segments.join("::").as_str() {
                "i8" | "u8" | "char" | "bool" => self.context.i8_type().into(),
                "i16" | "u16" => self.context.i16_type().into(),
                "i32" | "u32" => self.context.i32_type().into(),
                "i64" | "u64" | "isize" | "usize" => self.context.i64_type().into(),
                "str" => self
                    .context
                    .i8_type()
                    .ptr_type(AddressSpace::default())
                    .into(),
                _ => self.context.i64_type().into(),
            },
            TypeNode::Pointer { inner, .. } | TypeNode::Reference { inner, .. } => {
                self.pointer_to(self.lower_type(inner)).into()
            }
            TypeNode::Array { elem, len } => {
                let elem_type = self.lower_type(elem);
                self.array_of(elem_type, *len as u32).into()
            }
            TypeNode::Tuple(elements) => {
                let field_types: Vec<BasicTypeEnum<'ctx>> = elements
                    .iter()
                    .map(|element| self.lower_type(element))
                    .collect();
                self.context.struct_type(&field_types, false).into()
            }
            TypeNode::Slice(inner) => self.pointer_to(self.lower_type(inner)).into(),
            TypeNode::Never | TypeNode::Inferred | TypeNode::Function { .. } => {
                self.context.i64_type().into()
            }
        }
    }

    fn pointer_to(&self, ty: BasicTypeEnum<'ctx>) -> PointerType<'ctx> {
        match ty {
            BasicTypeEnum::IntType(ty) => ty.ptr_type(AddressSpace::default()),
            BasicTypeEnum::FloatType(ty) => ty.ptr_type(AddressSpace::default()),
            BasicTypeEnum::PointerType(ty) => ty.ptr_type(AddressSpace::default()),
            BasicTypeEnum::ArrayType(ty) => ty.ptr_type(AddressSpace::default()),
            BasicTypeEnum::StructType(ty) => ty.ptr_type(AddressSpace::default()),
            _ => ICE!("no pointer form for {:?}", ty),
        }
    }

    fn array_of(&self, ty: BasicTypeEnum<'ctx>, len: u32) -> inkwell::types::ArrayType<'ctx> {
        match ty {
            BasicTypeEnum::IntType(ty) => ty.array_type(len),
            BasicTypeEnum::FloatType(ty) => ty.array_type(len),
            BasicTypeEnum::PointerType(ty) => ty.array_type(len),
            BasicTypeEnum::ArrayType(ty) => ty.array_type(len),
            BasicTypeEnum::StructType(ty) => ty.array_type(len),
            _ => ICE!("no array form for {:?}", ty),
        }
    }

    fn zero_value(&self, ty: BasicTypeEnum<'ctx>) -> BasicValueEnum<'ctx> {
        match ty {
            BasicTypeEnum::IntType(ty) => ty.const_zero().into(),
            BasicTypeEnum::FloatType(ty) => ty.const_zero().into(),
            BasicTypeEnum::PointerType(ty) => ty.const_null().into(),
            BasicTypeEnum::ArrayType(ty) => ty.const_zero().into(),
            BasicTypeEnum::StructType(ty) => ty.const_zero().into(),
            _ => ICE!("no zero value for {:?}", ty),
        }
    }

    /// Emits one function: signature, entry block, parameter spill,
    /// body. Every parameter is stored into an addressable slot up
    /// front so later reads are plain loads, the same as locals.
    pub fn gen_function(&mut self, function: &Function) {
        let previous_position = self.builder.get_insert_block();

        let param_types: Vec<BasicMetadataTypeEnum<'ctx>> = function
            .params
            .iter()
            .map(|param| self.lower_type(&param.var_type).into())
            .collect();

        let fn_type = match &function.return_type {
            None => self.context.void_type().fn_type(&param_types, false),
            Some(node) => self.lower_type(node).fn_type(&param_types, false),
        };

        let fn_value = self
            .module
            .add_function(&function.id, fn_type, Some(Linkage::External));
        self.functions.insert(function.id.clone(), fn_value);

        let entry = self.context.append_basic_block(fn_value, "entry");
        self.builder.position_at_end(entry);

        self.push_frame();
        for (param, value) in function.params.iter().zip(fn_value.get_params()) {
            let slot = self
                .builder
                .build_alloca(value.get_type(), &param.id)
                .unwrap();
            self.builder.build_store(slot, value).unwrap();
            self.insert_var(&param.id, slot);
        }

        self.gen_block(&function.body);

        if !self.current_block_terminated() {
            match &function.return_type {
                None => {
                    self.builder.build_return(None).unwrap();
                }
                Some(node) => {
                    // fall-through in a value-returning function; a zero
                    // of the return type keeps the block well formed
                    let zero = self.zero_value(self.lower_type(node));
                    self.builder.build_return(Some(&zero)).unwrap();
                }
            }
        }

        self.pop_frame();

        if let Some(block) = previous_position {
            self.builder.position_at_end(block);
        } else {
            self.builder.clear_insertion_position();
        }
    }

    /// Lowers a block's statements in order; a trailing expression in an
    /// unterminated block returns its value from the function.
    pub fn gen_block(&mut self, block: &BlockExpression) {
        self.push_frame();

        for statement in &block.statements {
            if self.current_block_terminated() {
                break;
            }
            self.gen_statement(statement);
        }

        if let Some(trailing) = &block.expr {
            if !self.current_block_terminated() {
                if let Some(value) = gen_expression(self, trailing) {
                    self.builder.build_return(Some(&value)).unwrap();
                }
            }
        }

        self.pop_frame();
    }

    fn gen_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Let(decl) => self.gen_let(decl),
            Statement::Expression(expression) => {
                gen_expression(self, expression);
            }
            Statement::Item(Item::Function(function)) => self.gen_function(function),
            Statement::Item(Item::Use(_)) => {}
        }
    }

    fn gen_let(&mut self, decl: &LetStatement) {
        let Pattern::Identifier { id: name, .. } = &decl.assignee else {
            return;
        };

        let value = decl
            .expr
            .as_ref()
            .and_then(|expression| gen_expression(self, expression));

        let slot_type = match (&value, &decl.var_type) {
            (Some(value), _) => value.get_type(),
            (None, Some(node)) => self.lower_type(node),
            (None, None) => return,
        };

        let slot = self.builder.build_alloca(slot_type, name).unwrap();
        if let Some(value) = value {
            self.builder.build_store(slot, value).unwrap();
        }
        self.insert_var(name, slot);
    }
}
