//! Semantic analysis for HLSL programs
//!
//! Name resolution over scoped symbol tables, function overload
//! resolution, and expression typing via structural type denoters.

mod analyzer;
mod overload;
mod scope;
mod types;

pub use analyzer::{analyze, AliasInfo, Module, StructInfo};
pub use overload::{FuncSymbol, SymbolOverload, SymbolRef, TypeSymbol, VarSymbol};
pub use scope::{SymbolError, SymbolTable};
pub use types::{common_data_type, common_scalar, scalar_rank, StructRef, TypeDenoter};
