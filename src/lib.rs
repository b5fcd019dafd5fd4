//! hlsl2glsl - HLSL to GLSL shader cross-compiler
//!
//! This crate ingests HLSL source text and emits equivalent GLSL:
//! a hand-written lexer and recursive-descent parser build the AST,
//! a semantic analyzer resolves names and types over scoped symbol
//! tables with function-overload support, and a GLSL generator emits
//! the translated source through an indentation-aware code writer.

pub mod analysis;
pub mod ast;
pub mod codegen;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod source;

// Re-export commonly used types
pub use analysis::{analyze, Module, SymbolTable, TypeDenoter};
pub use codegen::{CodeGenerator, CodeWriter, GlslGenerator};
pub use errors::{
    print_error, CompileError, CompileResult, Report, ReportHandler, Severity, SourceArea,
    SourcePosition,
};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use source::SourceCode;
