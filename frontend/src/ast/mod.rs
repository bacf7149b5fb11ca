//! Syntax tree produced by the Mini C grammar.
//!
//! Every construct carries exactly the children it needs as named fields, so
//! the code generator never has to guess how many siblings a node has.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
  pub items: Vec<ExternalDeclaration>,
}

/// A top-level construct, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalDeclaration {
  Declaration(Declaration),
  Function(FunctionDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclSpecifier {
  Const,
  Int,
  Void,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
  pub specifiers: Vec<DeclSpecifier>,
  pub items: Vec<DeclItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclItem {
  pub declarator: Declarator,
  pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declarator {
  Simple(String),
  Array(String, Option<ArraySize>),
}

impl Declarator {
  pub fn name(&self) -> &str {
    match self {
      Declarator::Simple(name) | Declarator::Array(name, _) => name,
    }
  }
}

/// Element count written between the brackets of an array declarator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArraySize {
  Literal(i32),
  Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
  pub header: FunctionHeader,
  pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHeader {
  pub specifiers: Vec<DeclSpecifier>,
  pub name: String,
  pub params: Vec<ParamDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDeclaration {
  pub specifiers: Vec<DeclSpecifier>,
  pub name: String,
  /// `int a[]`: the slot holds the address of the caller's array.
  pub array: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
  pub declarations: Vec<Declaration>,
  pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
  Compound(Block),
  Expression(Option<Expression>),
  Return(Option<Expression>),
  If(Expression, Box<Statement>, Option<Box<Statement>>),
  While(Expression, Box<Statement>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
  Int(i32),
  Var(String),
  Index(String, Box<Expression>),
  Call(String, Vec<Expression>),
  Unary(UnaryOp, Box<Expression>),
  Binary(BinaryOp, Box<Expression>, Box<Expression>),
  Assignment(Box<Expression>, Box<Expression>),
  CompoundAssignment(BinaryOp, Box<Expression>, Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  Neg,
  Not,
  PreInc,
  PreDec,
  PostInc,
  PostDec,
}

impl UnaryOp {
  pub fn is_increment(self) -> bool {
    matches!(self, UnaryOp::PreInc | UnaryOp::PostInc)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  And,
  Or,
  Equal,
  NotEqual,
  LessThan,
  LessOrEqual,
  GreaterThan,
  GreaterOrEqual,
}
