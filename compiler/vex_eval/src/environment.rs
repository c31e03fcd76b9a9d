//! Runtime variable environment.
//!
//! Unlike the type environment (`vex_ir::env`), this one holds owned
//! `Value`s rather than arena references — values are short-lived and never
//! shared across statements the way types are. A plain `Vec` with
//! clone-on-extend gives the same "extension is non-destructive" behavior
//! the type environment has, at a cost that's irrelevant for REPL-sized
//! programs.

use crate::value::Value;

#[derive(Clone, Default)]
pub struct Env<'a> {
    bindings: Vec<(&'a str, Value)>,
}

impl<'a> Env<'a> {
    #[must_use]
    pub fn new() -> Self {
        Env::default()
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn extended(&self, name: &'a str, value: Value) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.push((name, value));
        Env { bindings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_recent_binding_shadows_earlier_one() {
        let env = Env::new().extended("x", Value::Int(1)).extended("x", Value::Int(2));
        assert_eq!(env.lookup("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn extension_does_not_mutate_the_original() {
        let base = Env::new().extended("x", Value::Int(1));
        let extended = base.extended("y", Value::Int(2));
        assert_eq!(base.lookup("y"), None);
        assert_eq!(extended.lookup("x"), Some(&Value::Int(1)));
    }
}
