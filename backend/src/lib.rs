//! Semantic analysis and ucode generation for Mini C.

pub mod codegen;
pub mod error;
pub mod options;
pub mod symtab;
pub mod ucode;

pub use codegen::CodeUnit;
pub use error::{CodegenError, Diagnostic, Severity};
pub use options::{CodegenOptions, ScopeRule};

use frontend::ast;

/// Runs both generation passes over `program`.
///
/// Semantic problems are collected in [`CodeUnit::diagnostics`]; only a
/// symbol-table overflow stops generation.
pub fn generate_code(program: &ast::Program, options: &CodegenOptions) -> Result<CodeUnit, CodegenError> {
  codegen::generate_program(program, options)
}
