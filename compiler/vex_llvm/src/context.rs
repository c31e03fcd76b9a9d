//! Minimal LLVM codegen context.
//!
//! A thin wrapper around the LLVM context, module, and builder plus the
//! commonly used scalar types and the lazily-declared `printf` handle. One
//! context exists per batch compilation; it is created, used to lower the
//! root, and then consumed into a `Module` for emission.

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::{BasicMetadataTypeEnum, FloatType, IntType, PointerType};
use inkwell::values::FunctionValue;
use inkwell::AddressSpace;
use std::cell::{Cell, RefCell};

pub struct Cx<'ctx> {
    pub llcx: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub ptr_type: PointerType<'ctx>,
    printf: RefCell<Option<FunctionValue<'ctx>>>,
    string_counter: Cell<u64>,
}

impl<'ctx> Cx<'ctx> {
    #[must_use]
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        let ptr_type = context.ptr_type(AddressSpace::default());
        Cx {
            llcx: context,
            module,
            builder,
            ptr_type,
            printf: RefCell::new(None),
            string_counter: Cell::new(0),
        }
    }

    #[must_use]
    pub fn type_i1(&self) -> IntType<'ctx> {
        self.llcx.bool_type()
    }
    #[must_use]
    pub fn type_i8(&self) -> IntType<'ctx> {
        self.llcx.i8_type()
    }
    #[must_use]
    pub fn type_i32(&self) -> IntType<'ctx> {
        self.llcx.i32_type()
    }
    #[must_use]
    pub fn type_i64(&self) -> IntType<'ctx> {
        self.llcx.i64_type()
    }
    #[must_use]
    pub fn type_f64(&self) -> FloatType<'ctx> {
        self.llcx.f64_type()
    }
    #[must_use]
    pub fn type_ptr(&self) -> PointerType<'ctx> {
        self.ptr_type
    }

    /// The variadic `printf` declaration, created on first use.
    pub fn printf(&self) -> FunctionValue<'ctx> {
        if let Some(f) = *self.printf.borrow() {
            return f;
        }
        let fn_ty = self
            .type_i32()
            .fn_type(&[BasicMetadataTypeEnum::PointerType(self.ptr_type)], true);
        let f = self
            .module
            .add_function("printf", fn_ty, Some(Linkage::External));
        *self.printf.borrow_mut() = Some(f);
        f
    }

    /// A fresh, unique name for the next interned string global.
    pub fn next_string_name(&self) -> String {
        let n = self.string_counter.get();
        self.string_counter.set(n + 1);
        format!("str.{n}")
    }
}
