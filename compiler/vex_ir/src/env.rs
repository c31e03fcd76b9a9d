//! The type environment: an immutable, singly-linked chain of frames.
//!
//! Extension is non-destructive — `EnvFrame::extend` prepends a new head and
//! the original chain remains valid for any caller still holding it. There
//! are two controlled mutation points, both modeled with a `Cell` and both
//! sound only because the checker that touches them is single-threaded and
//! the chain is never otherwise mutated: `update_in_place`, which rewrites a
//! parameter frame's type once, and only while it still holds `Type::Error`
//! (back-inference); and `replace_resolved`, which swaps a function's own
//! frame from its pre-bound signature (whose parameter slots may still be
//! `Type::Error`) to the fully resolved signature once the body has finished
//! back-inferring every parameter.

use crate::arena::Arena;
use crate::types::Type;
use std::cell::Cell;

pub struct EnvFrame<'a> {
    name: &'a str,
    ty: Cell<&'a Type<'a>>,
    parent: Env<'a>,
}

/// A possibly-empty environment: `None` is the empty chain (root scope).
pub type Env<'a> = Option<&'a EnvFrame<'a>>;

impl<'a> EnvFrame<'a> {
    /// Prepend a new binding to `parent`, returning the new head of the
    /// chain. `parent` itself is untouched and remains usable.
    pub fn extend(arena: &'a Arena, parent: Env<'a>, name: &'a str, ty: &'a Type<'a>) -> &'a Self {
        arena.alloc(EnvFrame {
            name,
            ty: Cell::new(ty),
            parent,
        })
    }

    /// Look up `name`, walking from the most recently bound frame toward the
    /// root. The first match wins, giving ordinary lexical shadowing.
    #[must_use]
    pub fn lookup(env: Env<'a>, name: &str) -> Option<&'a Type<'a>> {
        let mut current = env;
        while let Some(frame) = current {
            if frame.name == name {
                return Some(frame.ty.get());
            }
            current = frame.parent;
        }
        None
    }

    /// Rewrite this frame's bound type, but only if it currently holds
    /// `Type::Error`. Used exactly once per parameter, by back-inference.
    /// Any other call is a no-op, matching the spec's "no other mutation is
    /// permitted."
    pub fn update_in_place(&self, new_ty: &'a Type<'a>) {
        if self.ty.get().is_error() {
            self.ty.set(new_ty);
        }
    }

    /// This frame's currently bound type.
    #[must_use]
    pub fn ty(&self) -> &'a Type<'a> {
        self.ty.get()
    }

    /// Unconditionally replace this frame's bound type. Used exactly once,
    /// by `check_function`, to swap a function's pre-bound signature (whose
    /// parameter slots may still hold `Type::Error`) for the fully resolved
    /// signature — unlike `update_in_place`, this does not require the
    /// current value to be `Error`, since the value being replaced here is
    /// already a concrete `Type::Function`, just one with unresolved
    /// parameter slots.
    pub fn replace_resolved(&self, new_ty: &'a Type<'a>) {
        self.ty.set(new_ty);
    }

    /// Find the frame bound to `name` (not just its type), so back-inference
    /// can call `update_in_place` on the exact frame that introduced it.
    #[must_use]
    pub fn find(env: Env<'a>, name: &str) -> Option<&'a EnvFrame<'a>> {
        let mut current = env;
        while let Some(frame) = current {
            if frame.name == name {
                return Some(frame);
            }
            current = frame.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{make_error, make_int};
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_finds_most_recent_binding_first() {
        let arena = Arena::default();
        let int_ty = make_int(&arena);
        let outer = EnvFrame::extend(&arena, None, "x", int_ty);
        let float_ty = arena.alloc(Type::Float);
        let inner = EnvFrame::extend(&arena, Some(outer), "x", float_ty);

        assert_eq!(EnvFrame::lookup(Some(inner), "x"), Some(float_ty));
        // The outer chain, held independently, is unaffected by the
        // extension above.
        assert_eq!(EnvFrame::lookup(Some(outer), "x"), Some(int_ty));
    }

    #[test]
    fn update_in_place_only_rewrites_error_placeholders() {
        let arena = Arena::default();
        let err = make_error(&arena);
        let int_ty = make_int(&arena);
        let frame = EnvFrame::extend(&arena, None, "n", err);

        frame.update_in_place(int_ty);
        assert_eq!(EnvFrame::lookup(Some(frame), "n"), Some(int_ty));

        // A second attempt to rewrite an already-resolved frame is a no-op.
        let float_ty = arena.alloc(Type::Float);
        frame.update_in_place(float_ty);
        assert_eq!(EnvFrame::lookup(Some(frame), "n"), Some(int_ty));
    }

    #[test]
    fn lookup_missing_name_returns_none() {
        let arena = Arena::default();
        let frame = EnvFrame::extend(&arena, None, "x", make_int(&arena));
        assert_eq!(EnvFrame::lookup(Some(frame), "y"), None);
    }
}
