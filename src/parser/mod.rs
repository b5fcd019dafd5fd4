//! Syntax analysis for HLSL source code

mod parser;

pub use parser::Parser;
