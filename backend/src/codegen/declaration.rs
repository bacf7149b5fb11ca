use frontend::ast::{ArraySize, DeclSpecifier, Declaration, Declarator, Expression, UnaryOp};
use log::debug;

use super::Generator;
use crate::error::{CodegenError, Diagnostic};
use crate::symtab::{Symbol, TypeQualifier, TypeSpecifier};

/// Storage words given to a scalar.
const SCALAR_WIDTH: i32 = 1;

/// Value of a constant initializer: a literal, optionally negated once.
pub(super) fn fold_constant(expr: &Expression) -> Option<i32> {
  match expr {
    Expression::Int(value) => Some(*value),
    Expression::Unary(UnaryOp::Neg, operand) => match operand.as_ref() {
      Expression::Int(value) => Some(value.wrapping_neg()),
      _ => None,
    },
    _ => None,
  }
}

impl Generator<'_> {
  pub(super) fn process_declaration(&mut self, decl: &Declaration) -> Result<(), CodegenError> {
    let Some((specifier, qualifier)) = self.declaration_type(&decl.specifiers) else {
      return Ok(());
    };
    for item in &decl.items {
      let name = item.declarator.name();
      match &item.declarator {
        Declarator::Simple(_) => {
          self.process_simple_variable(name, item.initializer.as_ref(), specifier, qualifier)?
        }
        Declarator::Array(_, size) => {
          if item.initializer.is_some() {
            self.report(Diagnostic::IgnoredInitializer {
              name: name.to_string(),
            });
          }
          self.process_array_variable(name, size.as_ref(), specifier, qualifier)?
        }
      }
    }
    Ok(())
  }

  /// Type and qualifier named by a specifier list. `int` is the only
  /// supported type and the default when none is written.
  pub(super) fn declaration_type(
    &mut self,
    specifiers: &[DeclSpecifier],
  ) -> Option<(TypeSpecifier, TypeQualifier)> {
    let mut qualifier = TypeQualifier::Var;
    for specifier in specifiers {
      match specifier {
        DeclSpecifier::Int => {}
        DeclSpecifier::Const => qualifier = TypeQualifier::Const,
        DeclSpecifier::Void => {
          self.report(Diagnostic::unsupported("void variable declaration"));
          return None;
        }
      }
    }
    Some((TypeSpecifier::Int, qualifier))
  }

  fn process_simple_variable(
    &mut self,
    name: &str,
    initializer: Option<&Expression>,
    specifier: TypeSpecifier,
    qualifier: TypeQualifier,
  ) -> Result<(), CodegenError> {
    if qualifier == TypeQualifier::Const {
      let Some(initializer) = initializer else {
        self.report(Diagnostic::MissingInitializer {
          name: name.to_string(),
        });
        return Ok(());
      };
      let Some(value) = fold_constant(initializer) else {
        self.report(Diagnostic::NonConstantInitializer {
          name: name.to_string(),
        });
        return Ok(());
      };
      self.symbols.insert(Symbol::constant(name, specifier, value))?;
      return Ok(());
    }

    if initializer.is_some() {
      self.report(Diagnostic::IgnoredInitializer {
        name: name.to_string(),
      });
    }
    let Some(offset) = self.allocate(name, specifier.size()) else {
      return Ok(());
    };
    let symbol = Symbol::variable(name, specifier, self.frame.base, offset, SCALAR_WIDTH);
    self.symbols.insert(symbol)?;
    Ok(())
  }

  fn process_array_variable(
    &mut self,
    name: &str,
    size: Option<&ArraySize>,
    specifier: TypeSpecifier,
    qualifier: TypeQualifier,
  ) -> Result<(), CodegenError> {
    if qualifier == TypeQualifier::Const {
      self.report(Diagnostic::unsupported(format!("constant array {}", name)));
      return Ok(());
    }
    let Some(count) = self.array_size(name, size) else {
      return Ok(());
    };
    if count <= 0 {
      self.report(Diagnostic::InvalidArraySize {
        name: name.to_string(),
        size: count,
      });
      return Ok(());
    }

    let width = count.saturating_mul(specifier.size());
    let Some(offset) = self.allocate(name, width) else {
      return Ok(());
    };
    let symbol = Symbol::array(name, specifier, self.frame.base, offset, width);
    self.symbols.insert(symbol)?;
    debug!("array {} takes {} words, next slot {}", name, width, self.frame.offset);
    Ok(())
  }

  /// Reserves `slots` words of the current frame and returns the first one.
  /// Reports `FrameOverflow` and reserves nothing when the frame cannot grow
  /// that far.
  pub(super) fn allocate(&mut self, name: &str, slots: i32) -> Option<i32> {
    let Some(next) = self.frame.offset.checked_add(slots) else {
      self.report(Diagnostic::FrameOverflow {
        name: name.to_string(),
      });
      return None;
    };
    let offset = self.frame.offset;
    self.frame.offset = next;
    Some(offset)
  }

  /// Element count of an array declarator, which must already be known.
  fn array_size(&mut self, name: &str, size: Option<&ArraySize>) -> Option<i32> {
    match size {
      None => {
        self.report(Diagnostic::MissingArraySize {
          name: name.to_string(),
        });
        None
      }
      Some(ArraySize::Literal(count)) => Some(*count),
      Some(ArraySize::Named(constant)) => match self.lookup(constant) {
        Some(symbol) if symbol.is_constant() => Some(symbol.initial_value),
        Some(_) => {
          self.report(Diagnostic::NonConstantArraySize {
            name: name.to_string(),
            size: constant.clone(),
          });
          None
        }
        None => {
          self.report(Diagnostic::UndefinedVariable {
            name: constant.clone(),
          });
          None
        }
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::super::test_support::*;
  use super::*;
  use crate::symtab::Shape;

  #[test]
  fn test_fold_constant() {
    assert_eq!(fold_constant(&Expression::Int(7)), Some(7));
    assert_eq!(
      fold_constant(&Expression::Unary(UnaryOp::Neg, Box::new(Expression::Int(7)))),
      Some(-7)
    );
    let twice = Expression::Unary(
      UnaryOp::Neg,
      Box::new(Expression::Unary(UnaryOp::Neg, Box::new(Expression::Int(7)))),
    );
    assert_eq!(fold_constant(&twice), None);
    assert_eq!(fold_constant(&Expression::Var("N".to_string())), None);
  }

  #[test]
  fn test_constants_take_no_storage() {
    let unit = compile("const int N = -3;\nint x;\nint main() { return N + x; }\n");
    let n = unit.symbols.get(0).unwrap();
    assert_eq!(
      (n.qualifier, n.base, n.offset, n.width, n.initial_value),
      (TypeQualifier::Const, 0, 0, 0, -3)
    );
    let x = unit.symbols.get(1).unwrap();
    assert_eq!((x.base, x.offset, x.width), (1, 1, 1));
    assert_eq!(unit.global_size, 1);
    assert_eq!(body(&unit, "main"), vec!["ldc -3", "lod 1 1", "add", "retv"]);
  }

  #[test]
  fn test_array_offsets_follow_width() {
    let unit = compile("int a[10], b, c[3], d;\nint main() { return 0; }\n");
    let layout: Vec<_> = unit.symbols.entries()[..4]
      .iter()
      .map(|s| (s.name.as_str(), s.shape, s.offset, s.width))
      .collect();
    assert_eq!(
      layout,
      vec![
        ("a", Shape::Array, 1, 10),
        ("b", Shape::Scalar, 11, 1),
        ("c", Shape::Array, 12, 3),
        ("d", Shape::Scalar, 15, 1),
      ]
    );
    assert_eq!(unit.global_size, 15);
  }

  #[test]
  fn test_constant_without_initializer() {
    let unit = compile("const int N;\nint main() { return 0; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![Diagnostic::MissingInitializer {
        name: "N".to_string()
      }]
    );
    assert!(unit.symbols.entries().iter().all(|s| s.name != "N"));
  }

  #[test]
  fn test_constant_with_expression_initializer() {
    let unit = compile("const int N = 1 + 2;\nint main() { return 0; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![Diagnostic::NonConstantInitializer {
        name: "N".to_string()
      }]
    );
  }

  #[test]
  fn test_array_size_problems() {
    let unit = compile("int n;\nint a[], b[n], c[M], d[0];\nint main() { return 0; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![
        Diagnostic::MissingArraySize {
          name: "a".to_string()
        },
        Diagnostic::NonConstantArraySize {
          name: "b".to_string(),
          size: "n".to_string()
        },
        Diagnostic::UndefinedVariable {
          name: "M".to_string()
        },
        Diagnostic::InvalidArraySize {
          name: "d".to_string(),
          size: 0
        },
      ]
    );
    assert_eq!(unit.global_size, 1);
  }

  #[test]
  fn test_oversized_array_is_skipped() {
    let unit = compile("int a[2147483647], b;\nint main() { return 0; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![Diagnostic::FrameOverflow {
        name: "a".to_string()
      }]
    );
    let b = unit.symbols.entries().iter().find(|s| s.name == "b");
    assert_eq!(b.map(|s| s.offset), Some(1));
    assert!(unit.symbols.entries().iter().all(|s| s.name != "a"));
    assert_eq!(unit.global_size, 1);
  }

  #[test]
  fn test_full_frame_rejects_next_variable() {
    let unit = compile("int main() { int a[2147483646], b; return 0; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![Diagnostic::FrameOverflow {
        name: "b".to_string()
      }]
    );
    assert_eq!(
      lines(&unit)[..2],
      ["main       proc 2147483646 2 2", "sym 2 1 2147483646"]
    );
  }

  #[test]
  fn test_void_variable_is_unsupported() {
    let unit = compile("void v;\nint x;\nint main() { return 0; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![Diagnostic::Unsupported {
        what: "void variable declaration".to_string()
      }]
    );
    let x = unit.symbols.entries().iter().find(|s| s.name == "x");
    assert_eq!(x.map(|s| s.offset), Some(1));
  }

  #[test]
  fn test_variable_initializer_is_ignored() {
    let unit = compile("int x = 4;\nint main() { return x; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![Diagnostic::IgnoredInitializer {
        name: "x".to_string()
      }]
    );
    assert!(!unit.has_errors());
    assert_eq!(body(&unit, "main"), vec!["lod 1 1", "retv"]);
  }
}
