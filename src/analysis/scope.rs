//! Scoped symbol table for name resolution
//!
//! Nested lexical scopes mapping identifiers to payloads, with controlled
//! shadowing. Closing a scope restores the previous bindings of every
//! identifier the scope introduced.

use std::collections::HashMap;
use thiserror::Error;

/// Errors from symbol registration and lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("no active scope to register symbol")]
    NoActiveScope,
    #[error("identifier '{0}' already declared in this scope")]
    AlreadyDeclared(String),
    #[error("ambiguous reference to '{0}'")]
    AmbiguousReference(String),
    #[error("identifier '{0}' does not name a variable")]
    NotAVariable(String),
    #[error("identifier '{0}' does not name a type")]
    NotAType(String),
    #[error("identifier '{0}' does not name a function")]
    NotAFunction(String),
    #[error("no matching function for call to '{0}'")]
    NoMatchingFunction(String),
    #[error("ambiguous call to function '{0}'")]
    AmbiguousCall(String),
}

/// A binding together with the scope level it was registered at
#[derive(Debug, Clone)]
struct ScopedSymbol<T> {
    symbol: T,
    scope_level: usize,
}

/// A stack of lexical scopes mapping identifiers to payloads of type `T`
#[derive(Debug)]
pub struct SymbolTable<T> {
    /// Binding stacks per identifier; the last entry is the deepest
    symbols: HashMap<String, Vec<ScopedSymbol<T>>>,
    /// Identifiers introduced per scope, in registration order
    scopes: Vec<Vec<String>>,
}

impl<T> SymbolTable<T> {
    /// Create a symbol table with the global scope open
    pub fn new() -> Self {
        let mut table = Self {
            symbols: HashMap::new(),
            scopes: Vec::new(),
        };
        table.open_scope();
        table
    }

    /// Open a new scope
    pub fn open_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Close the active scope, removing all bindings it introduced.
    /// No-op if no scope is open.
    pub fn close_scope(&mut self) {
        if let Some(idents) = self.scopes.pop() {
            for ident in idents {
                if let Some(stack) = self.symbols.get_mut(&ident) {
                    stack.pop();
                    if stack.is_empty() {
                        self.symbols.remove(&ident);
                    }
                }
            }
        }
    }

    /// Current scope depth; 1 is the global scope
    pub fn scope_level(&self) -> usize {
        self.scopes.len()
    }

    /// Register a symbol in the current scope. A same-scope conflict is
    /// an error; a binding from an outer scope is shadowed.
    pub fn register(&mut self, ident: &str, symbol: T) -> Result<(), SymbolError> {
        self.register_impl(ident, symbol, None::<fn(&T) -> bool>)
    }

    /// Register a symbol with an override callback: on a same-scope
    /// conflict the callback decides whether the existing binding may be
    /// replaced by the new one.
    pub fn register_with<F>(&mut self, ident: &str, symbol: T, on_override: F) -> Result<(), SymbolError>
    where
        F: FnOnce(&T) -> bool,
    {
        self.register_impl(ident, symbol, Some(on_override))
    }

    fn register_impl<F>(
        &mut self,
        ident: &str,
        symbol: T,
        on_override: Option<F>,
    ) -> Result<(), SymbolError>
    where
        F: FnOnce(&T) -> bool,
    {
        if self.scopes.is_empty() {
            return Err(SymbolError::NoActiveScope);
        }
        if ident.is_empty() {
            return Ok(());
        }

        let scope_level = self.scope_level();

        if let Some(stack) = self.symbols.get_mut(ident) {
            if let Some(entry) = stack.last_mut() {
                if entry.scope_level == scope_level {
                    let allowed = on_override.is_some_and(|f| f(&entry.symbol));
                    if allowed {
                        entry.symbol = symbol;
                        return Ok(());
                    }
                    return Err(SymbolError::AlreadyDeclared(ident.to_string()));
                }
            }
        }

        self.symbols
            .entry(ident.to_string())
            .or_default()
            .push(ScopedSymbol {
                symbol,
                scope_level,
            });
        self.scopes
            .last_mut()
            .expect("scope stack should never be empty here")
            .push(ident.to_string());
        Ok(())
    }

    /// Fetch the deepest binding of the identifier, if any
    pub fn fetch(&self, ident: &str) -> Option<&T> {
        self.fetch_entry(ident).map(|(symbol, _)| symbol)
    }

    /// Fetch the deepest binding together with the scope level it was
    /// registered at
    pub fn fetch_entry(&self, ident: &str) -> Option<(&T, usize)> {
        self.symbols
            .get(ident)
            .and_then(|stack| stack.last())
            .map(|entry| (&entry.symbol, entry.scope_level))
    }
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_is_lifo() {
        let mut table = SymbolTable::new();
        table.open_scope();
        table.register("x", 'A').unwrap();

        table.open_scope();
        table.register("x", 'B').unwrap();
        assert_eq!(table.fetch("x"), Some(&'B'));

        table.close_scope();
        assert_eq!(table.fetch("x"), Some(&'A'));

        table.close_scope();
        assert_eq!(table.fetch("x"), None);
    }

    #[test]
    fn test_nested_scopes_restore_level() {
        let mut table: SymbolTable<i32> = SymbolTable::new();
        assert_eq!(table.scope_level(), 1);
        for _ in 0..5 {
            table.open_scope();
        }
        assert_eq!(table.scope_level(), 6);
        for _ in 0..5 {
            table.close_scope();
        }
        assert_eq!(table.scope_level(), 1);
    }

    #[test]
    fn test_same_scope_conflict() {
        let mut table = SymbolTable::new();
        table.register("x", 1).unwrap();
        assert_eq!(
            table.register("x", 2),
            Err(SymbolError::AlreadyDeclared("x".to_string()))
        );
        assert_eq!(table.fetch("x"), Some(&1));
    }

    #[test]
    fn test_override_callback() {
        let mut table = SymbolTable::new();
        table.register("x", 'A').unwrap();

        table.register_with("x", 'B', |_| true).unwrap();
        assert_eq!(table.fetch("x"), Some(&'B'));

        assert_eq!(
            table.register_with("x", 'C', |_| false),
            Err(SymbolError::AlreadyDeclared("x".to_string()))
        );
        assert_eq!(table.fetch("x"), Some(&'B'));
    }

    #[test]
    fn test_empty_ident_is_ignored() {
        let mut table = SymbolTable::new();
        table.register("", 1).unwrap();
        assert_eq!(table.fetch(""), None);
    }

    #[test]
    fn test_register_without_scope_fails() {
        let mut table = SymbolTable::new();
        table.close_scope();
        assert_eq!(table.register("x", 1), Err(SymbolError::NoActiveScope));
        // closing beyond the last scope is a no-op
        table.close_scope();
        assert_eq!(table.scope_level(), 0);
    }

    #[test]
    fn test_fetch_entry_reports_scope_level() {
        let mut table = SymbolTable::new();
        table.register("g", 0).unwrap();
        table.open_scope();
        table.register("l", 1).unwrap();
        assert_eq!(table.fetch_entry("g"), Some((&0, 1)));
        assert_eq!(table.fetch_entry("l"), Some((&1, 2)));
    }

    #[test]
    fn test_close_scope_removes_only_top_binding() {
        let mut table = SymbolTable::new();
        table.register("a", 1).unwrap();
        table.open_scope();
        table.register("a", 2).unwrap();
        table.register("b", 3).unwrap();
        table.close_scope();
        assert_eq!(table.fetch("a"), Some(&1));
        assert_eq!(table.fetch("b"), None);
    }
}
