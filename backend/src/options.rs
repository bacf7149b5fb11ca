/// Symbol-table entries available unless configured otherwise.
pub const DEFAULT_SYMBOL_CAPACITY: usize = 100;

pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Which symbol-table entries a name lookup may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeRule {
  /// Only entries declared at the current declaration level. The level
  /// advances after every function body, so file-scope names stop resolving
  /// once the first function has been generated.
  #[default]
  ExactLevel,
  /// Like `ExactLevel`, then falls back to the file-scope entries registered
  /// before any function body was processed.
  Enclosing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
  /// Function called by the program start-up sequence.
  pub entry_point: String,
  pub scope_rule: ScopeRule,
  /// Inserting past this many symbols is a fatal error.
  pub symbol_capacity: usize,
}

impl Default for CodegenOptions {
  fn default() -> Self {
    CodegenOptions {
      entry_point: DEFAULT_ENTRY_POINT.to_string(),
      scope_rule: ScopeRule::default(),
      symbol_capacity: DEFAULT_SYMBOL_CAPACITY,
    }
  }
}
