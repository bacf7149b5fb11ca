//! Lowering of a Mini C syntax tree to ucode.
//!
//! Generation runs in two passes over the top-level items. Pass one
//! registers global declarations and every function header so calls can
//! refer to functions defined later. Pass two generates each function body,
//! then the program start-up sequence is appended.

mod declaration;
mod expression;
mod function;
mod statement;

use frontend::ast::{ExternalDeclaration, Program};
use log::debug;
use serde::Serialize;

use crate::error::{CodegenError, Diagnostic, Severity};
use crate::options::CodegenOptions;
use crate::symtab::{Symbol, SymbolTable, GLOBAL_BASE};
use crate::ucode::{self, Instruction, Label, Opcode};

/// Offset of the first slot in every frame.
pub const FIRST_SLOT: i32 = 1;

/// The result of generating one program.
#[derive(Debug, Clone, Serialize)]
pub struct CodeUnit {
  pub global_size: i32,
  pub code: Vec<Instruction>,
  pub diagnostics: Vec<Diagnostic>,
  #[serde(skip)]
  pub symbols: SymbolTable,
}

impl CodeUnit {
  pub fn to_ucode(&self) -> String {
    ucode::render(&self.code)
  }

  pub fn has_errors(&self) -> bool {
    self
      .diagnostics
      .iter()
      .any(|d| d.severity() == Severity::Error)
  }
}

/// Storage region being allocated: frame base and the next free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
  base: i32,
  offset: i32,
}

pub(crate) struct Generator<'a> {
  options: &'a CodegenOptions,
  symbols: SymbolTable,
  code: Vec<Instruction>,
  diagnostics: Vec<Diagnostic>,
  frame: Frame,
  label_counter: usize,
}

impl<'a> Generator<'a> {
  pub fn new(options: &'a CodegenOptions) -> Self {
    Generator {
      options,
      symbols: SymbolTable::new(options.symbol_capacity, options.scope_rule),
      code: Vec::new(),
      diagnostics: Vec::new(),
      frame: Frame {
        base: GLOBAL_BASE,
        offset: FIRST_SLOT,
      },
      label_counter: 0,
    }
  }

  pub fn generate(mut self, program: &Program) -> Result<CodeUnit, CodegenError> {
    // pass 1: globals and function signatures
    for item in &program.items {
      match item {
        ExternalDeclaration::Declaration(decl) => self.process_declaration(decl)?,
        ExternalDeclaration::Function(function) => self.register_function(&function.header)?,
      }
    }
    let global_size = self.frame.offset - FIRST_SLOT;
    self.symbols.seal_globals();
    debug!("global storage: {} words", global_size);

    let entry_point = self.options.entry_point.clone();
    let has_entry = program.items.iter().any(|item| {
      matches!(item, ExternalDeclaration::Function(function) if function.header.name == entry_point)
    });
    if !has_entry {
      self.report(Diagnostic::MissingEntryFunction {
        name: entry_point.clone(),
      });
    }

    // pass 2: function bodies
    for item in &program.items {
      if let ExternalDeclaration::Function(function) = item {
        self.process_function(function)?;
      }
    }

    self.emit(Instruction::Bgn(global_size));
    self.emit(Instruction::Simple(Opcode::Ldp));
    self.emit(Instruction::Call(entry_point));
    self.emit(Instruction::Simple(Opcode::End));

    Ok(CodeUnit {
      global_size,
      code: self.code,
      diagnostics: self.diagnostics,
      symbols: self.symbols,
    })
  }

  fn emit(&mut self, instruction: Instruction) {
    self.code.push(instruction);
  }

  fn report(&mut self, diagnostic: Diagnostic) {
    debug!("{}: {}", diagnostic.severity(), diagnostic);
    self.diagnostics.push(diagnostic);
  }

  fn new_label(&mut self) -> Label {
    let label = Label::numbered(self.label_counter);
    self.label_counter += 1;
    label
  }

  fn lookup(&self, name: &str) -> Option<Symbol> {
    self.symbols.lookup(name).cloned()
  }
}

/// Generates ucode for a whole program.
pub fn generate_program(
  program: &Program,
  options: &CodegenOptions,
) -> Result<CodeUnit, CodegenError> {
  Generator::new(options).generate(program)
}
