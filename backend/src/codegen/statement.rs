use frontend::ast::{Expression, Statement};

use super::Generator;
use crate::error::Diagnostic;
use crate::ucode::{Instruction, Opcode};

impl Generator<'_> {
  pub(super) fn generate_statements(&mut self, statements: &[Statement]) {
    for statement in statements {
      self.generate_statement(statement);
    }
  }

  fn generate_statement(&mut self, statement: &Statement) {
    match statement {
      Statement::Compound(block) => {
        if !block.declarations.is_empty() {
          self.report(Diagnostic::unsupported("declarations in a nested block"));
        }
        self.generate_statements(&block.statements);
      }
      Statement::Expression(Some(expr)) => self.generate_expression(expr),
      Statement::Expression(None) => {}
      Statement::Return(Some(expr)) => {
        self.generate_expression(expr);
        self.emit(Instruction::Simple(Opcode::Retv));
      }
      Statement::Return(None) => self.emit(Instruction::Simple(Opcode::Ret)),
      Statement::If(cond, then_stmt, None) => self.generate_if(cond, then_stmt),
      Statement::If(cond, then_stmt, Some(else_stmt)) => {
        self.generate_if_else(cond, then_stmt, else_stmt)
      }
      Statement::While(cond, body) => self.generate_while(cond, body),
    }
  }

  fn generate_if(&mut self, cond: &Expression, then_stmt: &Statement) {
    let end_label = self.new_label();
    self.generate_expression(cond);
    self.emit(Instruction::Jump(Opcode::Fjp, end_label.clone()));
    self.generate_statement(then_stmt);
    self.emit(Instruction::Label(end_label));
  }

  fn generate_if_else(&mut self, cond: &Expression, then_stmt: &Statement, else_stmt: &Statement) {
    let else_label = self.new_label();
    let end_label = self.new_label();
    self.generate_expression(cond);
    self.emit(Instruction::Jump(Opcode::Fjp, else_label.clone()));
    self.generate_statement(then_stmt);
    self.emit(Instruction::Jump(Opcode::Ujp, end_label.clone()));
    self.emit(Instruction::Label(else_label));
    self.generate_statement(else_stmt);
    self.emit(Instruction::Label(end_label));
  }

  fn generate_while(&mut self, cond: &Expression, body: &Statement) {
    let start_label = self.new_label();
    let end_label = self.new_label();
    self.emit(Instruction::Label(start_label.clone()));
    self.generate_expression(cond);
    self.emit(Instruction::Jump(Opcode::Fjp, end_label.clone()));
    self.generate_statement(body);
    self.emit(Instruction::Jump(Opcode::Ujp, start_label));
    self.emit(Instruction::Label(end_label));
  }
}

#[cfg(test)]
mod tests {
  use super::super::test_support::*;
  use super::*;

  #[test]
  fn test_while_loop() {
    let unit = compile("void main() { int i; i = 0; while (i < 10) ++i; }\n");
    assert!(unit.diagnostics.is_empty());
    assert_eq!(
      body(&unit, "main"),
      vec![
        "sym 2 1 1",
        "ldc 0",
        "str 2 1",
        "$$0        nop",
        "lod 2 1",
        "ldc 10",
        "lt",
        "fjp $$1",
        "lod 2 1",
        "inc",
        "str 2 1",
        "ujp $$0",
        "$$1        nop",
        "ret",
      ]
    );
  }

  #[test]
  fn test_if_without_else() {
    let unit = compile("int main() { int x; if (x == 1) x = 2; return x; }\n");
    assert_eq!(
      body(&unit, "main"),
      vec![
        "sym 2 1 1",
        "lod 2 1",
        "ldc 1",
        "eq",
        "fjp $$0",
        "ldc 2",
        "str 2 1",
        "$$0        nop",
        "lod 2 1",
        "retv",
      ]
    );
  }

  #[test]
  fn test_if_else_allocates_both_labels_first() {
    let unit = compile(
      "int main() { int x; if (x) { if (x > 1) x = 1; } else x = 2; return x; }\n",
    );
    assert_eq!(
      body(&unit, "main"),
      vec![
        "sym 2 1 1",
        "lod 2 1",
        "fjp $$0",
        "lod 2 1",
        "ldc 1",
        "gt",
        "fjp $$2",
        "ldc 1",
        "str 2 1",
        "$$2        nop",
        "ujp $$1",
        "$$0        nop",
        "ldc 2",
        "str 2 1",
        "$$1        nop",
        "lod 2 1",
        "retv",
      ]
    );
  }

  #[test]
  fn test_return_forms() {
    let unit = compile("void f() { return; }\nint main() { return 7; }\n");
    // a void function always gets a closing ret
    assert_eq!(body(&unit, "f"), vec!["ret", "ret"]);
    assert_eq!(body(&unit, "main"), vec!["ldc 7", "retv"]);
  }

  #[test]
  fn test_nested_block_declarations_are_unsupported() {
    let unit = compile("int main() { int x; { int y; x = 1; } ; return x; }\n");
    assert_eq!(
      unit.diagnostics,
      vec![Diagnostic::Unsupported {
        what: "declarations in a nested block".to_string()
      }]
    );
    assert_eq!(
      body(&unit, "main"),
      vec!["sym 2 1 1", "ldc 1", "str 2 1", "lod 2 1", "retv"]
    );
  }
}
