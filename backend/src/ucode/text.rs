//! Line-oriented text encoding read by the ucode assembler/interpreter.
//!
//! Every line starts with a label field `LABEL_WIDTH` columns wide. Plain
//! instructions leave it blank; label definitions and frame descriptors
//! write their name into it.

use std::fmt;

use super::{Instruction, Opcode};

pub const LABEL_WIDTH: usize = 11;

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Instruction::Label(label) => write!(
        f,
        "{:<width$}{}",
        label.as_str(),
        Opcode::Nop.mnemonic(),
        width = LABEL_WIDTH
      ),
      Instruction::Proc {
        name,
        size,
        base,
        mode,
      } => write!(
        f,
        "{:<width$}{} {} {} {}",
        name,
        Opcode::Proc.mnemonic(),
        size,
        base,
        mode,
        width = LABEL_WIDTH
      ),
      _ => {
        write!(f, "{:width$}{}", "", self.opcode().mnemonic(), width = LABEL_WIDTH)?;
        match self {
          Instruction::Ldc(value) | Instruction::Bgn(value) => write!(f, " {}", value),
          Instruction::Lod(addr) | Instruction::Str(addr) | Instruction::Lda(addr) => {
            write!(f, " {} {}", addr.base, addr.offset)
          }
          Instruction::Jump(_, label) => write!(f, " {}", label),
          Instruction::Call(name) => write!(f, " {}", name),
          Instruction::Sym {
            base,
            offset,
            width,
          } => write!(f, " {} {} {}", base, offset, width),
          _ => Ok(()),
        }
      }
    }
  }
}

/// One line per instruction, each terminated by a newline.
pub fn render(code: &[Instruction]) -> String {
  let mut output = String::new();
  for instruction in code {
    output.push_str(&instruction.to_string());
    output.push('\n');
  }
  output
}
