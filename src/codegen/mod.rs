//! Code generation for the cross-compiler
//!
//! The `CodeGenerator` trait is the seam for output languages; GLSL is
//! the one target implemented here.

mod glsl;
mod writer;

pub use glsl::GlslGenerator;
pub use writer::{CodeWriter, WriterOptions};

use crate::analysis::Module;
use crate::ast::Program;
use crate::errors::CompileResult;

/// Trait for code generators
pub trait CodeGenerator {
    /// Generate code from the parsed program and its analyzed module
    fn generate(&mut self, program: &Program, module: &Module) -> CompileResult<String>;

    /// Get the file extension for the target language
    fn file_extension(&self) -> &'static str;

    /// Get the name of the target language
    fn language_name(&self) -> &'static str;
}
