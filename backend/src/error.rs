use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that stop code generation outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
  #[error("symbol table overflow: cannot insert `{name}`, capacity is {capacity} entries")]
  SymbolTableFull { name: String, capacity: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Warning,
  Error,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Warning => f.write_str("warning"),
      Severity::Error => f.write_str("error"),
    }
  }
}

/// A problem found while generating code. Generation carries on after
/// recording one; the offending construct emits nothing or a partial sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
  #[error("undefined variable: {name}")]
  UndefinedVariable { name: String },
  #[error("undefined function: {name}")]
  UndefinedFunction { name: String },
  #[error("{name} is a function, not a variable")]
  NotAVariable { name: String },
  #[error("{name} is not a function")]
  NotAFunction { name: String },
  #[error("{name} is not an array")]
  NotAnArray { name: String },
  #[error("{name} must have a constant value")]
  MissingInitializer { name: String },
  #[error("{name}: constant initializer must be an integer literal")]
  NonConstantInitializer { name: String },
  #[error("{name}: array size must be specified")]
  MissingArraySize { name: String },
  #[error("{name}: array size `{size}` is not a constant")]
  NonConstantArraySize { name: String, size: String },
  #[error("{name}: invalid array size {size}")]
  InvalidArraySize { name: String, size: i32 },
  #[error("{name} does not fit in its frame")]
  FrameOverflow { name: String },
  #[error("{name}: too few actual arguments (expected {expected}, found {found})")]
  TooFewArguments {
    name: String,
    expected: usize,
    found: usize,
  },
  #[error("{name}: too many actual arguments (expected {expected}, found {found})")]
  TooManyArguments {
    name: String,
    expected: usize,
    found: usize,
  },
  #[error("left-hand side of assignment must be a variable or an array element")]
  InvalidAssignmentTarget,
  #[error("cannot assign to constant {name}")]
  AssignmentToConstant { name: String },
  #[error("increment/decrement operators can only be applied to variables and array elements")]
  InvalidIncrementOperand,
  #[error("{name}: invalid function return type")]
  InvalidReturnType { name: String },
  #[error("not yet implemented: {what}")]
  Unsupported { what: String },
  #[error("initializer of {name} is ignored; only constants take an initial value")]
  IgnoredInitializer { name: String },
  #[error("entry function `{name}` is not defined")]
  MissingEntryFunction { name: String },
}

impl Diagnostic {
  pub fn severity(&self) -> Severity {
    match self {
      Diagnostic::IgnoredInitializer { .. } | Diagnostic::MissingEntryFunction { .. } => {
        Severity::Warning
      }
      _ => Severity::Error,
    }
  }

  pub(crate) fn unsupported(what: impl Into<String>) -> Self {
    Diagnostic::Unsupported { what: what.into() }
  }
}
