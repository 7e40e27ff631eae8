//! Runtime scope chain.
//!
//! Each environment maps names to values and optionally points at the scope
//! that encloses it.  Environments are shared through `Rc<RefCell<_>>`: a
//! block's scope disappears when the block exits unless a closure created
//! inside it still holds a reference.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared, mutable handle to an [`Environment`].
pub type EnvRef<'a> = Rc<RefCell<Environment<'a>>>;

#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<&'a str, Value<'a>>,
    enclosing: Option<EnvRef<'a>>,
}

impl<'a> Environment<'a> {
    /// A root (global) environment.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef<'a>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> EnvRef<'a> {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in *this* scope, silently replacing an earlier binding.
    pub fn define(&mut self, name: &'a str, value: Value<'a>) {
        self.values.insert(name, value);
    }

    /// Dynamic lookup walking outward through every enclosing scope.
    pub fn get(&self, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined_variable(name))
        }
    }

    /// Overwrite an existing binding, searching outward.
    pub fn assign(&mut self, name: &Token<'a>, value: Value<'a>) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined_variable(name))
        }
    }

    /// Read `name` from the scope exactly `distance` links outward.
    pub fn get_at(env: &EnvRef<'a>, distance: usize, name: &Token<'a>) -> Result<Value<'a>> {
        Self::get_name_at(env, distance, name.lexeme).ok_or_else(|| undefined_variable(name))
    }

    /// Like [`Environment::get_at`] for names that have no token, such as the
    /// implicit `this` and `super` bindings.
    pub fn get_name_at(env: &EnvRef<'a>, distance: usize, name: &str) -> Option<Value<'a>> {
        let scope: EnvRef<'a> = Self::ancestor(env, distance)?;
        let value = scope.borrow().values.get(name).cloned();

        debug!(
            "get_at(distance={}, name={}) found={}",
            distance,
            name,
            value.is_some()
        );

        value
    }

    /// Write `name` into the scope exactly `distance` links outward.
    pub fn assign_at(
        env: &EnvRef<'a>,
        distance: usize,
        name: &Token<'a>,
        value: Value<'a>,
    ) -> Result<()> {
        let scope: EnvRef<'a> =
            Self::ancestor(env, distance).ok_or_else(|| undefined_variable(name))?;

        scope.borrow_mut().values.insert(name.lexeme, value);

        Ok(())
    }

    fn ancestor(env: &EnvRef<'a>, distance: usize) -> Option<EnvRef<'a>> {
        let mut current: EnvRef<'a> = Rc::clone(env);

        for _ in 0..distance {
            let next: Option<EnvRef<'a>> = current.borrow().enclosing.clone();
            current = next?;
        }

        Some(current)
    }
}

fn undefined_variable(name: &Token<'_>) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token<'_> {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn lookup_walks_outward() {
        let globals = Environment::new().into_ref();
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner = Environment::with_enclosing(Rc::clone(&globals));

        assert!(matches!(inner.get(&ident("a")), Ok(Value::Number(n)) if n == 1.0));
        assert!(inner.get(&ident("b")).is_err());
    }

    #[test]
    fn assign_updates_the_defining_scope() {
        let globals = Environment::new().into_ref();
        globals.borrow_mut().define("a", Value::Number(1.0));

        let mut inner = Environment::with_enclosing(Rc::clone(&globals));
        inner.assign(&ident("a"), Value::Number(2.0)).unwrap();

        assert!(matches!(globals.borrow().get(&ident("a")), Ok(Value::Number(n)) if n == 2.0));
        assert!(inner.assign(&ident("missing"), Value::Nil).is_err());
    }

    #[test]
    fn distance_addressing_skips_shadowing_scopes() {
        let outer = Environment::new().into_ref();
        outer.borrow_mut().define("x", Value::String("outer".into()));

        let inner = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        inner.borrow_mut().define("x", Value::String("inner".into()));

        let x = ident("x");
        assert_eq!(Environment::get_at(&inner, 0, &x).unwrap().to_string(), "inner");
        assert_eq!(Environment::get_at(&inner, 1, &x).unwrap().to_string(), "outer");

        Environment::assign_at(&inner, 1, &x, Value::Bool(true)).unwrap();
        assert_eq!(outer.borrow().get(&x).unwrap().to_string(), "true");
        assert!(Environment::get_at(&inner, 2, &x).is_err());
    }
}
