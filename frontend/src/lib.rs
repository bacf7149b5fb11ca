use lalrpop_util::lalrpop_mod;
use lalrpop_util::lexer::Token;
use lalrpop_util::ParseError;
use thiserror::Error;

pub mod ast;
lalrpop_mod!(pub grammar);

/// Identifiers must be shorter than twelve characters.
pub const MAX_IDENTIFIER_LENGTH: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexicalError {
  #[error("an identifier length must be less than {}: `{name}`", MAX_IDENTIFIER_LENGTH + 1)]
  IdentifierTooLong { name: String, offset: usize },
  #[error("integer literal does not fit in 32 bits: `{literal}`")]
  IntegerOutOfRange { literal: String, offset: usize },
}

impl LexicalError {
  pub fn offset(&self) -> usize {
    match self {
      LexicalError::IdentifierTooLong { offset, .. }
      | LexicalError::IntegerOutOfRange { offset, .. } => *offset,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontendError {
  #[error("{line}:{column}: {message}")]
  Syntax {
    line: usize,
    column: usize,
    message: String,
  },
}

impl FrontendError {
  fn from_parse_error(input: &str, error: ParseError<usize, Token<'_>, LexicalError>) -> Self {
    let (offset, message) = match error {
      ParseError::InvalidToken { location } => (location, "invalid character".to_string()),
      ParseError::UnrecognizedEof { location, expected } => (
        location,
        format!("unexpected end of input, expected one of {}", expected.join(", ")),
      ),
      ParseError::UnrecognizedToken {
        token: (start, token, _),
        expected,
      } => (
        start,
        format!("unexpected `{}`, expected one of {}", token, expected.join(", ")),
      ),
      ParseError::ExtraToken {
        token: (start, token, _),
      } => (start, format!("extra token `{}`", token)),
      ParseError::User { error } => (error.offset(), error.to_string()),
    };
    let (line, column) = line_column(input, offset);
    FrontendError::Syntax {
      line,
      column,
      message,
    }
  }
}

fn line_column(input: &str, offset: usize) -> (usize, usize) {
  let prefix = input.get(..offset).unwrap_or(input);
  let line = prefix.matches('\n').count() + 1;
  let line_start = prefix.rfind('\n').map_or(0, |newline| newline + 1);
  (line, prefix.len() - line_start + 1)
}

pub(crate) fn check_identifier<T>(
  text: &str,
  offset: usize,
) -> Result<String, ParseError<usize, T, LexicalError>> {
  if text.len() > MAX_IDENTIFIER_LENGTH {
    return Err(ParseError::User {
      error: LexicalError::IdentifierTooLong {
        name: text.to_string(),
        offset,
      },
    });
  }
  Ok(text.to_string())
}

pub(crate) fn parse_number<T>(
  digits: &str,
  radix: u32,
  offset: usize,
) -> Result<i32, ParseError<usize, T, LexicalError>> {
  i32::from_str_radix(digits, radix).map_err(|_| ParseError::User {
    error: LexicalError::IntegerOutOfRange {
      literal: digits.to_string(),
      offset,
    },
  })
}

pub fn parse(input: &str) -> Result<ast::Program, FrontendError> {
  grammar::ProgramParser::new()
    .parse(input)
    .map_err(|e| FrontendError::from_parse_error(input, e))
}
