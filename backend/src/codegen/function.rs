use frontend::ast::{DeclSpecifier, FunctionDefinition, FunctionHeader, ParamDeclaration};
use log::debug;

use super::{Frame, Generator, FIRST_SLOT};
use crate::error::{CodegenError, Diagnostic};
use crate::symtab::{Symbol, TypeSpecifier};
use crate::ucode::{Instruction, Opcode};

/// Third operand of every `proc` line.
const ADDRESSING_MODE: i32 = 2;

/// Width recorded for a scalar parameter. It still takes one slot.
const SCALAR_PARAM_WIDTH: i32 = 0;

/// Return type named by a function's specifiers; the last `int` or `void`
/// wins and `int` is assumed when neither is written.
fn return_type(specifiers: &[DeclSpecifier]) -> TypeSpecifier {
  specifiers
    .iter()
    .rev()
    .find_map(|specifier| match specifier {
      DeclSpecifier::Int => Some(TypeSpecifier::Int),
      DeclSpecifier::Void => Some(TypeSpecifier::Void),
      DeclSpecifier::Const => None,
    })
    .unwrap_or(TypeSpecifier::Int)
}

impl Generator<'_> {
  /// Makes `header` callable from every function body generated later.
  pub(super) fn register_function(&mut self, header: &FunctionHeader) -> Result<(), CodegenError> {
    if header.specifiers.contains(&DeclSpecifier::Const) {
      self.report(Diagnostic::InvalidReturnType {
        name: header.name.clone(),
      });
    }
    let param_count = i32::try_from(header.params.len()).unwrap_or(i32::MAX);
    let symbol = Symbol::function(&header.name, return_type(&header.specifiers), param_count);
    self.symbols.insert(symbol)?;
    Ok(())
  }

  pub(super) fn process_function(&mut self, function: &FunctionDefinition) -> Result<(), CodegenError> {
    let header = &function.header;
    let saved = self.frame;
    self.frame = Frame {
      base: saved.base + 1,
      offset: FIRST_SLOT,
    };
    let first_symbol = self.symbols.len();
    debug!("enter {} at base {}, level {}", header.name, self.frame.base, self.symbols.level());

    for param in &header.params {
      self.process_parameter(param)?;
    }
    for decl in &function.body.declarations {
      self.process_declaration(decl)?;
    }

    let size = self.frame.offset - FIRST_SLOT;
    self.emit(Instruction::Proc {
      name: header.name.clone(),
      size,
      base: self.frame.base,
      mode: ADDRESSING_MODE,
    });
    let layout: Vec<Instruction> = self
      .symbols
      .since(first_symbol)
      .iter()
      .map(|symbol| Instruction::Sym {
        base: symbol.base,
        offset: symbol.offset,
        width: symbol.width,
      })
      .collect();
    self.code.extend(layout);

    self.generate_statements(&function.body.statements);

    if return_type(&header.specifiers) == TypeSpecifier::Void {
      self.emit(Instruction::Simple(Opcode::Ret));
    }
    self.emit(Instruction::Simple(Opcode::End));
    debug!("leave {}: frame size {}", header.name, size);

    self.frame = saved;
    self.symbols.advance_level();
    Ok(())
  }

  /// Binds one formal parameter to the next slot of the current frame.
  fn process_parameter(&mut self, param: &ParamDeclaration) -> Result<(), CodegenError> {
    if param.specifiers.contains(&DeclSpecifier::Void) {
      self.report(Diagnostic::unsupported(format!("void parameter {}", param.name)));
      return Ok(());
    }
    let Some(offset) = self.allocate(&param.name, TypeSpecifier::Int.size()) else {
      return Ok(());
    };
    let symbol = if param.array {
      Symbol::array_param(&param.name, TypeSpecifier::Int, self.frame.base, offset)
    } else {
      Symbol::variable(
        &param.name,
        TypeSpecifier::Int,
        self.frame.base,
        offset,
        SCALAR_PARAM_WIDTH,
      )
    };
    self.symbols.insert(symbol)?;
    Ok(())
  }
}
