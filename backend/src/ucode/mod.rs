//! Ucode, the instruction set of the target stack machine.
//!
//! Operands are pushed on an implicit evaluation stack; instructions name an
//! operation and, where needed, direct operands (constants, frame addresses,
//! labels or function names).

pub mod text;

pub use text::{render, LABEL_WIDTH};

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Opcode {
  Notop,
  Neg,
  Inc,
  Dec,
  Dup,
  Add,
  Sub,
  Mult,
  Div,
  Mod,
  Swp,
  And,
  Or,
  Gt,
  Lt,
  Ge,
  Le,
  Eq,
  Ne,
  Lod,
  Str,
  Ldc,
  Lda,
  Ujp,
  Tjp,
  Fjp,
  Chkh,
  Chkl,
  Ldi,
  Sti,
  Call,
  Ret,
  Retv,
  Ldp,
  Proc,
  End,
  Nop,
  Bgn,
  Sym,
}

impl Opcode {
  pub fn mnemonic(self) -> &'static str {
    match self {
      Opcode::Notop => "notop",
      Opcode::Neg => "neg",
      Opcode::Inc => "inc",
      Opcode::Dec => "dec",
      Opcode::Dup => "dup",
      Opcode::Add => "add",
      Opcode::Sub => "sub",
      Opcode::Mult => "mult",
      Opcode::Div => "div",
      Opcode::Mod => "mod",
      Opcode::Swp => "swp",
      Opcode::And => "and",
      Opcode::Or => "or",
      Opcode::Gt => "gt",
      Opcode::Lt => "lt",
      Opcode::Ge => "ge",
      Opcode::Le => "le",
      Opcode::Eq => "eq",
      Opcode::Ne => "ne",
      Opcode::Lod => "lod",
      Opcode::Str => "str",
      Opcode::Ldc => "ldc",
      Opcode::Lda => "lda",
      Opcode::Ujp => "ujp",
      Opcode::Tjp => "tjp",
      Opcode::Fjp => "fjp",
      Opcode::Chkh => "chkh",
      Opcode::Chkl => "chkl",
      Opcode::Ldi => "ldi",
      Opcode::Sti => "sti",
      Opcode::Call => "call",
      Opcode::Ret => "ret",
      Opcode::Retv => "retv",
      Opcode::Ldp => "ldp",
      Opcode::Proc => "proc",
      Opcode::End => "end",
      Opcode::Nop => "nop",
      Opcode::Bgn => "bgn",
      Opcode::Sym => "sym",
    }
  }
}

/// A storage slot: frame base and slot offset within that frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Address {
  pub base: i32,
  pub offset: i32,
}

/// Branch target, unique across a whole program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
  pub fn numbered(n: usize) -> Self {
    Label(format!("$${}", n))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(&self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instruction {
  /// Any instruction without direct operands.
  Simple(Opcode),
  Ldc(i32),
  Lod(Address),
  Str(Address),
  Lda(Address),
  /// `ujp`, `tjp` or `fjp`.
  Jump(Opcode, Label),
  Call(String),
  /// Label definition, rendered as the label followed by `nop`.
  Label(Label),
  /// Frame descriptor opening a function body.
  Proc {
    name: String,
    size: i32,
    base: i32,
    mode: i32,
  },
  /// Layout record for one symbol of the enclosing frame.
  Sym { base: i32, offset: i32, width: i32 },
  /// Program start with the global storage size.
  Bgn(i32),
}

impl Instruction {
  pub fn opcode(&self) -> Opcode {
    match self {
      Instruction::Simple(opcode) | Instruction::Jump(opcode, _) => *opcode,
      Instruction::Ldc(_) => Opcode::Ldc,
      Instruction::Lod(_) => Opcode::Lod,
      Instruction::Str(_) => Opcode::Str,
      Instruction::Lda(_) => Opcode::Lda,
      Instruction::Call(_) => Opcode::Call,
      Instruction::Label(_) => Opcode::Nop,
      Instruction::Proc { .. } => Opcode::Proc,
      Instruction::Sym { .. } => Opcode::Sym,
      Instruction::Bgn(_) => Opcode::Bgn,
    }
  }
}
