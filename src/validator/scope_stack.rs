use crate::validator::{Scope, ValidatorError};

/// Chain of scopes in effect while traversing an expression.
///
/// The base scope is fixed at construction and can never be popped, so
/// [`ScopeStack::peek`] always has an answer.
pub struct ScopeStack<'a> {
    base: &'a dyn Scope,
    nested: Vec<&'a dyn Scope>,
}

impl<'a> ScopeStack<'a> {
    pub fn new(base: &'a dyn Scope) -> Self {
        Self { base, nested: Vec::new() }
    }

    pub fn push(&mut self, scope: &'a dyn Scope) {
        self.nested.push(scope);
    }

    /// Pop the top scope, which must be `expected`.
    pub fn pop(&mut self, expected: &'a dyn Scope) -> Result<(), ValidatorError> {
        match self.nested.last() {
            Some(top) if std::ptr::addr_eq(*top, expected) => {
                self.nested.pop();
                Ok(())
            }
            _ => Err(ValidatorError::ScopeMismatch { depth: self.depth() }),
        }
    }

    pub fn peek(&self) -> &'a dyn Scope {
        self.nested.last().copied().unwrap_or(self.base)
    }

    pub fn depth(&self) -> usize {
        self.nested.len() + 1
    }
}
