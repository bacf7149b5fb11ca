//! Flat, insertion-ordered symbol table.
//!
//! Entries are appended while declarations and function headers are
//! processed and never change afterwards. Each entry remembers the
//! declaration level that was current when it was inserted; lookups only
//! see the current level (see [`ScopeRule`]).

use log::{debug, trace};
use serde::Serialize;

use crate::error::CodegenError;
use crate::options::ScopeRule;

/// Frame base of file-scope storage. Each function frame nests one above.
pub const GLOBAL_BASE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSpecifier {
  Int,
  Void,
}

impl TypeSpecifier {
  /// Storage words taken by one element of this type.
  pub fn size(self) -> i32 {
    match self {
      TypeSpecifier::Int => 1,
      TypeSpecifier::Void => 0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeQualifier {
  Var,
  Const,
  Func,
}

/// How a variable's slot is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
  Scalar,
  /// Storage for every element lives in the frame.
  Array,
  /// One slot holding the address of an array owned by the caller.
  ArrayParam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
  pub name: String,
  pub specifier: TypeSpecifier,
  pub qualifier: TypeQualifier,
  pub shape: Shape,
  pub base: i32,
  pub offset: i32,
  /// Element count for arrays, parameter count for functions.
  pub width: i32,
  pub initial_value: i32,
  pub level: u32,
}

impl Symbol {
  fn new(name: &str, specifier: TypeSpecifier, qualifier: TypeQualifier, shape: Shape) -> Self {
    Symbol {
      name: name.to_string(),
      specifier,
      qualifier,
      shape,
      base: 0,
      offset: 0,
      width: 0,
      initial_value: 0,
      level: 0,
    }
  }

  pub fn constant(name: &str, specifier: TypeSpecifier, value: i32) -> Self {
    Symbol {
      initial_value: value,
      ..Symbol::new(name, specifier, TypeQualifier::Const, Shape::Scalar)
    }
  }

  pub fn variable(name: &str, specifier: TypeSpecifier, base: i32, offset: i32, width: i32) -> Self {
    Symbol {
      base,
      offset,
      width,
      ..Symbol::new(name, specifier, TypeQualifier::Var, Shape::Scalar)
    }
  }

  pub fn array(name: &str, specifier: TypeSpecifier, base: i32, offset: i32, width: i32) -> Self {
    Symbol {
      base,
      offset,
      width,
      ..Symbol::new(name, specifier, TypeQualifier::Var, Shape::Array)
    }
  }

  pub fn array_param(name: &str, specifier: TypeSpecifier, base: i32, offset: i32) -> Self {
    Symbol {
      base,
      offset,
      width: 1,
      ..Symbol::new(name, specifier, TypeQualifier::Var, Shape::ArrayParam)
    }
  }

  pub fn function(name: &str, return_type: TypeSpecifier, param_count: i32) -> Self {
    Symbol {
      base: GLOBAL_BASE,
      width: param_count,
      ..Symbol::new(name, return_type, TypeQualifier::Func, Shape::Scalar)
    }
  }

  pub fn is_constant(&self) -> bool {
    self.qualifier == TypeQualifier::Const
  }

  pub fn is_function(&self) -> bool {
    self.qualifier == TypeQualifier::Func
  }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
  entries: Vec<Symbol>,
  level: u32,
  /// Entries before this index were registered at file scope.
  global_len: usize,
  capacity: usize,
  rule: ScopeRule,
}

impl SymbolTable {
  pub fn new(capacity: usize, rule: ScopeRule) -> Self {
    SymbolTable {
      entries: Vec::new(),
      level: 0,
      global_len: 0,
      capacity,
      rule,
    }
  }

  /// Appends `symbol` at the current level and returns its index.
  pub fn insert(&mut self, mut symbol: Symbol) -> Result<usize, CodegenError> {
    if self.entries.len() >= self.capacity {
      return Err(CodegenError::SymbolTableFull {
        name: symbol.name,
        capacity: self.capacity,
      });
    }
    symbol.level = self.level;
    debug!(
      "insert {} ({:?} {:?}) at ({}, {}, {}) level {}",
      symbol.name,
      symbol.qualifier,
      symbol.specifier,
      symbol.base,
      symbol.offset,
      symbol.width,
      symbol.level
    );
    self.entries.push(symbol);
    Ok(self.entries.len() - 1)
  }

  /// The last-inserted entry named `name` that the scope rule can see.
  pub fn lookup(&self, name: &str) -> Option<&Symbol> {
    let found = self
      .entries
      .iter()
      .rev()
      .find(|s| s.level == self.level && s.name == name)
      .or_else(|| match self.rule {
        ScopeRule::ExactLevel => None,
        ScopeRule::Enclosing => self.entries[..self.global_len]
          .iter()
          .rev()
          .find(|s| s.name == name),
      });
    trace!("lookup {} at level {}: {:?}", name, self.level, found.map(|s| s.level));
    found
  }

  pub fn get(&self, index: usize) -> Option<&Symbol> {
    self.entries.get(index)
  }

  /// Marks every entry inserted so far as file scope.
  pub fn seal_globals(&mut self) {
    self.global_len = self.entries.len();
  }

  pub fn level(&self) -> u32 {
    self.level
  }

  pub fn advance_level(&mut self) {
    self.level += 1;
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn entries(&self) -> &[Symbol] {
    &self.entries
  }

  /// Entries inserted at or after index `start`.
  pub fn since(&self, start: usize) -> &[Symbol] {
    &self.entries[start.min(self.entries.len())..]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table() -> SymbolTable {
    SymbolTable::new(8, ScopeRule::ExactLevel)
  }

  #[test]
  fn test_insert_returns_index() {
    let mut symbols = table();
    assert_eq!(symbols.insert(Symbol::constant("N", TypeSpecifier::Int, 5)), Ok(0));
    assert_eq!(
      symbols.insert(Symbol::variable("x", TypeSpecifier::Int, 1, 1, 1)),
      Ok(1)
    );
    assert_eq!(symbols.get(1).map(|s| s.name.as_str()), Some("x"));
    assert_eq!(symbols.len(), 2);
  }

  #[test]
  fn test_lookup_prefers_last_inserted() {
    let mut symbols = table();
    symbols
      .insert(Symbol::variable("x", TypeSpecifier::Int, 1, 1, 1))
      .unwrap();
    symbols
      .insert(Symbol::variable("x", TypeSpecifier::Int, 2, 1, 1))
      .unwrap();
    assert_eq!(symbols.lookup("x").map(|s| s.base), Some(2));
    assert!(symbols.lookup("y").is_none());
  }

  #[test]
  fn test_lookup_only_sees_current_level() {
    let mut symbols = table();
    symbols
      .insert(Symbol::variable("g", TypeSpecifier::Int, 1, 1, 1))
      .unwrap();
    symbols.seal_globals();
    symbols.advance_level();
    symbols
      .insert(Symbol::variable("x", TypeSpecifier::Int, 2, 1, 1))
      .unwrap();
    assert!(symbols.lookup("g").is_none());
    assert_eq!(symbols.lookup("x").map(|s| s.level), Some(1));
  }

  #[test]
  fn test_enclosing_rule_falls_back_to_globals() {
    let mut symbols = SymbolTable::new(8, ScopeRule::Enclosing);
    symbols
      .insert(Symbol::variable("g", TypeSpecifier::Int, 1, 1, 1))
      .unwrap();
    symbols.seal_globals();
    symbols
      .insert(Symbol::variable("local", TypeSpecifier::Int, 2, 1, 1))
      .unwrap();
    symbols.advance_level();
    symbols
      .insert(Symbol::variable("g", TypeSpecifier::Int, 2, 1, 1))
      .unwrap();
    assert_eq!(symbols.lookup("g").map(|s| s.base), Some(2));
    symbols.advance_level();
    assert_eq!(symbols.lookup("g").map(|s| s.base), Some(1));
    // locals of an earlier function are not file scope
    assert!(symbols.lookup("local").is_none());
  }

  #[test]
  fn test_capacity_is_fatal() {
    let mut symbols = SymbolTable::new(1, ScopeRule::ExactLevel);
    symbols
      .insert(Symbol::variable("a", TypeSpecifier::Int, 1, 1, 1))
      .unwrap();
    let err = symbols
      .insert(Symbol::variable("b", TypeSpecifier::Int, 1, 2, 1))
      .unwrap_err();
    assert_eq!(
      err,
      CodegenError::SymbolTableFull {
        name: "b".to_string(),
        capacity: 1
      }
    );
    assert_eq!(symbols.len(), 1);
  }

  #[test]
  fn test_since_returns_new_entries() {
    let mut symbols = table();
    symbols
      .insert(Symbol::function("f", TypeSpecifier::Void, 2))
      .unwrap();
    let start = symbols.len();
    symbols
      .insert(Symbol::variable("a", TypeSpecifier::Int, 2, 1, 1))
      .unwrap();
    symbols
      .insert(Symbol::array_param("b", TypeSpecifier::Int, 2, 2))
      .unwrap();
    let names: Vec<_> = symbols.since(start).iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(symbols.get(0).map(|s| s.width), Some(2));
  }
}
