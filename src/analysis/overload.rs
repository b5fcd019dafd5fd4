//! Per-identifier declaration buckets with overload resolution
//!
//! One `SymbolOverload` collects the declarations sharing an identifier
//! at a scope level: either a single variable-like or type-like symbol,
//! or a set of functions with pairwise distinct signatures.

use std::rc::Rc;

use super::scope::SymbolError;
use super::types::TypeDenoter;
use crate::errors::SourceArea;

/// A variable-like declaration: variable, cbuffer field, texture, sampler
#[derive(Debug)]
pub struct VarSymbol {
    pub ident: String,
    pub ty: TypeDenoter,
    pub is_const: bool,
    pub area: SourceArea,
}

/// A type-like declaration: struct or alias
#[derive(Debug)]
pub struct TypeSymbol {
    pub ident: String,
    pub denoter: TypeDenoter,
    pub area: SourceArea,
}

/// A function declaration
#[derive(Debug)]
pub struct FuncSymbol {
    pub ident: String,
    pub params: Vec<TypeDenoter>,
    pub ret: TypeDenoter,
    pub area: SourceArea,
}

/// A reference to one registered declaration
#[derive(Debug, Clone)]
pub enum SymbolRef {
    Var(Rc<VarSymbol>),
    Type(Rc<TypeSymbol>),
    Func(Rc<FuncSymbol>),
}

/// All declarations registered under one identifier
#[derive(Debug)]
pub struct SymbolOverload {
    ident: String,
    refs: Vec<SymbolRef>,
}

impl SymbolOverload {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            refs: Vec::new(),
        }
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Add a declaration reference; returns false on a conflict.
    /// Variable-like and type-like symbols admit no second declaration;
    /// functions coexist with functions of distinct signatures only.
    pub fn add_symbol_ref(&mut self, symbol: SymbolRef) -> bool {
        if self.refs.is_empty() {
            self.refs.push(symbol);
            return true;
        }

        let SymbolRef::Func(new_func) = &symbol else {
            return false;
        };

        for existing in &self.refs {
            let SymbolRef::Func(func) = existing else {
                return false;
            };
            if func.params.len() == new_func.params.len()
                && func
                    .params
                    .iter()
                    .zip(&new_func.params)
                    .all(|(a, b)| a.is_equal(b))
            {
                // signature already present
                return false;
            }
        }

        self.refs.push(symbol);
        true
    }

    /// The single registered reference; fails on an overload set
    pub fn fetch(&self) -> Result<&SymbolRef, SymbolError> {
        match self.refs.as_slice() {
            [single] => Ok(single),
            _ => Err(SymbolError::AmbiguousReference(self.ident.clone())),
        }
    }

    /// The single variable-like reference
    pub fn fetch_var(&self) -> Result<Rc<VarSymbol>, SymbolError> {
        match self.fetch()? {
            SymbolRef::Var(var) => Ok(Rc::clone(var)),
            _ => Err(SymbolError::NotAVariable(self.ident.clone())),
        }
    }

    /// The single type-like reference
    pub fn fetch_type(&self) -> Result<Rc<TypeSymbol>, SymbolError> {
        match self.fetch()? {
            SymbolRef::Type(ty) => Ok(Rc::clone(ty)),
            _ => Err(SymbolError::NotAType(self.ident.clone())),
        }
    }

    /// Resolve the overload set against the argument types of a call.
    /// Candidates are filtered by arity, then classified as exact (all
    /// argument denoters equal) or convertible (all castable under the
    /// implicit conversions). A unique candidate at the best tier wins.
    pub fn fetch_function_decl(
        &self,
        arg_types: &[TypeDenoter],
    ) -> Result<Rc<FuncSymbol>, SymbolError> {
        let functions: Vec<&Rc<FuncSymbol>> = self
            .refs
            .iter()
            .filter_map(|r| match r {
                SymbolRef::Func(f) => Some(f),
                _ => None,
            })
            .collect();

        if functions.is_empty() {
            return Err(SymbolError::NotAFunction(self.ident.clone()));
        }

        let mut exact = Vec::new();
        let mut convertible = Vec::new();

        for func in functions {
            if func.params.len() != arg_types.len() {
                continue;
            }
            let is_exact = func
                .params
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| arg.is_equal(param));
            if is_exact {
                exact.push(func);
                continue;
            }
            let is_convertible = func
                .params
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| arg.is_castable_to(param));
            if is_convertible {
                convertible.push(func);
            }
        }

        let best = if exact.is_empty() { &convertible } else { &exact };
        match best.as_slice() {
            [] => Err(SymbolError::NoMatchingFunction(self.ident.clone())),
            [single] => Ok(Rc::clone(single)),
            _ => Err(SymbolError::AmbiguousCall(self.ident.clone())),
        }
    }
}
