use frontend::ast::{BinaryOp, Expression, UnaryOp};
use log::trace;

use super::Generator;
use crate::error::Diagnostic;
use crate::symtab::{Shape, Symbol, TypeQualifier};
use crate::ucode::{Address, Instruction, Opcode};

/// Functions provided by the ucode runtime. They are never declared and
/// their arguments are not counted.
const BUILTIN_IO: [&str; 2] = ["read", "write"];
const BUILTIN_NEWLINE: &str = "lf";

/// What an index expression leaves on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Access {
  Value,
  Address,
}

fn binary_opcode(op: BinaryOp) -> Opcode {
  match op {
    BinaryOp::Add => Opcode::Add,
    BinaryOp::Sub => Opcode::Sub,
    BinaryOp::Mul => Opcode::Mult,
    BinaryOp::Div => Opcode::Div,
    BinaryOp::Mod => Opcode::Mod,
    BinaryOp::And => Opcode::And,
    BinaryOp::Or => Opcode::Or,
    BinaryOp::Equal => Opcode::Eq,
    BinaryOp::NotEqual => Opcode::Ne,
    BinaryOp::LessThan => Opcode::Lt,
    BinaryOp::LessOrEqual => Opcode::Le,
    BinaryOp::GreaterThan => Opcode::Gt,
    BinaryOp::GreaterOrEqual => Opcode::Ge,
  }
}

fn slot(symbol: &Symbol) -> Address {
  Address {
    base: symbol.base,
    offset: symbol.offset,
  }
}

impl Generator<'_> {
  /// Emits code leaving the value of `expr` on the stack.
  pub(super) fn generate_expression(&mut self, expr: &Expression) {
    match expr {
      Expression::Int(value) => self.emit(Instruction::Ldc(*value)),
      Expression::Var(name) => self.load_identifier(name),
      Expression::Index(name, index) => {
        self.generate_index(name, index, Access::Value);
      }
      Expression::Call(name, args) => self.generate_call(name, args),
      Expression::Unary(op, operand) => self.generate_unary(*op, operand),
      Expression::Binary(op, lhs, rhs) => {
        self.generate_expression(lhs);
        self.generate_expression(rhs);
        self.emit(Instruction::Simple(binary_opcode(*op)));
      }
      Expression::Assignment(target, value) => self.generate_assignment(target, value),
      Expression::CompoundAssignment(op, target, value) => {
        self.generate_compound_assignment(*op, target, value)
      }
    }
  }

  /// Looks up a variable operand, reporting it when undefined.
  fn resolve_variable(&mut self, name: &str) -> Option<Symbol> {
    let symbol = self.lookup(name);
    if symbol.is_none() {
      self.report(Diagnostic::UndefinedVariable {
        name: name.to_string(),
      });
    }
    symbol
  }

  fn load_identifier(&mut self, name: &str) {
    if let Some(symbol) = self.resolve_variable(name) {
      self.load_symbol(&symbol);
    }
  }

  fn load_symbol(&mut self, symbol: &Symbol) {
    match (symbol.qualifier, symbol.shape) {
      (TypeQualifier::Const, _) => self.emit(Instruction::Ldc(symbol.initial_value)),
      (TypeQualifier::Func, _) => self.report(Diagnostic::NotAVariable {
        name: symbol.name.clone(),
      }),
      (TypeQualifier::Var, Shape::Array) => self.emit(Instruction::Lda(slot(symbol))),
      (TypeQualifier::Var, _) => self.emit(Instruction::Lod(slot(symbol))),
    }
  }

  /// `name[index]`: element address is the index plus the array base.
  /// With `Access::Value` the element is then loaded. Returns false, having
  /// emitted nothing, when `name` does not resolve to an array.
  pub(super) fn generate_index(&mut self, name: &str, index: &Expression, access: Access) -> bool {
    let Some(symbol) = self.resolve_variable(name) else {
      return false;
    };
    let base = match (symbol.qualifier, symbol.shape) {
      (TypeQualifier::Var, Shape::Array) => Instruction::Lda(slot(&symbol)),
      (TypeQualifier::Var, Shape::ArrayParam) => Instruction::Lod(slot(&symbol)),
      _ => {
        self.report(Diagnostic::NotAnArray {
          name: name.to_string(),
        });
        return false;
      }
    };
    trace!("index {} as {:?}", name, access);
    self.generate_expression(index);
    self.emit(base);
    self.emit(Instruction::Simple(Opcode::Add));
    if access == Access::Value {
      self.emit(Instruction::Simple(Opcode::Ldi));
    }
    true
  }

  /// Stores the value on top of the stack into a scalar variable.
  fn store_symbol(&mut self, symbol: &Symbol) {
    match (symbol.qualifier, symbol.shape) {
      (TypeQualifier::Const, _) => self.report(Diagnostic::AssignmentToConstant {
        name: symbol.name.clone(),
      }),
      (TypeQualifier::Func, _) => self.report(Diagnostic::NotAVariable {
        name: symbol.name.clone(),
      }),
      (TypeQualifier::Var, Shape::Scalar) => self.emit(Instruction::Str(slot(symbol))),
      (TypeQualifier::Var, _) => self.report(Diagnostic::InvalidAssignmentTarget),
    }
  }

  fn generate_assignment(&mut self, target: &Expression, value: &Expression) {
    match target {
      Expression::Var(name) => {
        self.generate_expression(value);
        if let Some(symbol) = self.resolve_variable(name) {
          self.store_symbol(&symbol);
        }
      }
      Expression::Index(name, index) => {
        if self.generate_index(name, index, Access::Address) {
          self.generate_expression(value);
          self.emit(Instruction::Simple(Opcode::Sti));
        }
      }
      _ => self.report(Diagnostic::InvalidAssignmentTarget),
    }
  }

  /// `target op= value` as `target = target op value`, with an indexed
  /// target's address computed once before its value.
  fn generate_compound_assignment(&mut self, op: BinaryOp, target: &Expression, value: &Expression) {
    match target {
      Expression::Var(name) => {
        let Some(symbol) = self.resolve_variable(name) else {
          return;
        };
        self.load_symbol(&symbol);
        self.generate_expression(value);
        self.emit(Instruction::Simple(binary_opcode(op)));
        self.store_symbol(&symbol);
      }
      Expression::Index(name, index) => {
        if !self.generate_index(name, index, Access::Address) {
          return;
        }
        self.generate_index(name, index, Access::Value);
        self.generate_expression(value);
        self.emit(Instruction::Simple(binary_opcode(op)));
        self.emit(Instruction::Simple(Opcode::Sti));
      }
      _ => self.report(Diagnostic::InvalidAssignmentTarget),
    }
  }

  fn generate_unary(&mut self, op: UnaryOp, operand: &Expression) {
    match op {
      UnaryOp::Neg => {
        self.generate_expression(operand);
        self.emit(Instruction::Simple(Opcode::Neg));
      }
      UnaryOp::Not => {
        self.generate_expression(operand);
        self.emit(Instruction::Simple(Opcode::Notop));
      }
      UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
        self.generate_step(op, operand)
      }
    }
  }

  /// Prefix and postfix forms produce the same sequence: load, step, store.
  fn generate_step(&mut self, op: UnaryOp, operand: &Expression) {
    let step = if op.is_increment() {
      Opcode::Inc
    } else {
      Opcode::Dec
    };
    match operand {
      Expression::Var(name) => {
        let Some(symbol) = self.resolve_variable(name) else {
          return;
        };
        self.load_symbol(&symbol);
        self.emit(Instruction::Simple(step));
        self.store_symbol(&symbol);
      }
      Expression::Index(name, index) => {
        if !self.generate_index(name, index, Access::Value) {
          return;
        }
        self.emit(Instruction::Simple(step));
        self.generate_index(name, index, Access::Address);
        self.emit(Instruction::Simple(Opcode::Swp));
        self.emit(Instruction::Simple(Opcode::Sti));
      }
      _ => self.report(Diagnostic::InvalidIncrementOperand),
    }
  }

  fn generate_call(&mut self, name: &str, args: &[Expression]) {
    if name == BUILTIN_NEWLINE {
      self.emit(Instruction::Call(name.to_string()));
      return;
    }
    if BUILTIN_IO.contains(&name) {
      self.emit(Instruction::Simple(Opcode::Ldp));
      for arg in args {
        self.generate_expression(arg);
      }
      self.emit(Instruction::Call(name.to_string()));
      return;
    }

    let Some(symbol) = self.lookup(name) else {
      self.report(Diagnostic::UndefinedFunction {
        name: name.to_string(),
      });
      return;
    };
    if !symbol.is_function() {
      self.report(Diagnostic::NotAFunction {
        name: name.to_string(),
      });
      return;
    }

    let expected = usize::try_from(symbol.width).unwrap_or_default();
    let found = args.len();
    if found < expected {
      self.report(Diagnostic::TooFewArguments {
        name: name.to_string(),
        expected,
        found,
      });
    } else if found > expected {
      self.report(Diagnostic::TooManyArguments {
        name: name.to_string(),
        expected,
        found,
      });
    }

    self.emit(Instruction::Simple(Opcode::Ldp));
    for arg in args {
      self.generate_expression(arg);
    }
    self.emit(Instruction::Call(name.to_string()));
  }
}
