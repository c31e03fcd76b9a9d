//! The variable table: name to storage-slot mapping used during lowering.
//!
//! Scoped per function body and reset at function boundaries, matching the
//! lowering model's "name-to-slot table for locals" — there is no nested
//! block scoping here, just one flat table per function, since Vex has no
//! shadowing construct that lowering needs to distinguish from reassignment.

use inkwell::types::BasicTypeEnum;
use inkwell::values::PointerValue;
use rustc_hash::FxHashMap;

pub struct Locals<'ctx> {
    slots: FxHashMap<String, (PointerValue<'ctx>, BasicTypeEnum<'ctx>)>,
}

impl<'ctx> Locals<'ctx> {
    #[must_use]
    pub fn new() -> Self {
        Locals {
            slots: FxHashMap::default(),
        }
    }

    pub fn bind(&mut self, name: &str, slot: PointerValue<'ctx>, ty: BasicTypeEnum<'ctx>) {
        self.slots.insert(name.to_string(), (slot, ty));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<(PointerValue<'ctx>, BasicTypeEnum<'ctx>)> {
        self.slots.get(name).copied()
    }
}

impl<'ctx> Default for Locals<'ctx> {
    fn default() -> Self {
        Self::new()
    }
}
