use std::fs;
use std::path::{Path, PathBuf};

use backend::{CodeUnit, CodegenError, CodegenOptions};
use clap::ValueEnum;
use frontend::ast::Program;
use frontend::FrontendError;
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
  #[error("{}: {}", path.display(), source)]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("syntax error at {0}")]
  Frontend(#[from] FrontendError),
  #[error(transparent)]
  Codegen(#[from] CodegenError),
  #[error("cannot encode output as JSON: {0}")]
  Json(#[from] serde_json::Error),
}

/// Encoding of the generated program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EmitFormat {
  /// Ucode text, one instruction per line.
  #[default]
  Text,
  /// Instructions, diagnostics and global size as JSON.
  Json,
}

impl EmitFormat {
  pub fn extension(self) -> &'static str {
    match self {
      EmitFormat::Text => "uco",
      EmitFormat::Json => "json",
    }
  }
}

pub fn read_source(path: &Path) -> Result<String, DriverError> {
  fs::read_to_string(path).map_err(|source| DriverError::Io {
    path: path.to_path_buf(),
    source,
  })
}

pub fn parse_source(source: &str) -> Result<Program, DriverError> {
  let program = frontend::parse(source)?;
  debug!("parsed {} top-level items", program.items.len());
  Ok(program)
}

pub fn compile_source(source: &str, options: &CodegenOptions) -> Result<CodeUnit, DriverError> {
  let program = parse_source(source)?;
  let unit = backend::generate_code(&program, options)?;
  info!(
    "generated {} instructions with {} diagnostics",
    unit.code.len(),
    unit.diagnostics.len()
  );
  Ok(unit)
}

pub fn compile_file(path: &Path, options: &CodegenOptions) -> Result<CodeUnit, DriverError> {
  info!("compiling {}", path.display());
  compile_source(&read_source(path)?, options)
}

pub fn render(unit: &CodeUnit, format: EmitFormat) -> Result<String, DriverError> {
  match format {
    EmitFormat::Text => Ok(unit.to_ucode()),
    EmitFormat::Json => Ok(serde_json::to_string_pretty(unit)? + "\n"),
  }
}

/// `input` with its extension replaced by the one of `format`.
pub fn default_output_path(input: &Path, format: EmitFormat) -> PathBuf {
  input.with_extension(format.extension())
}

pub fn write_output(path: &Path, contents: &str) -> Result<(), DriverError> {
  fs::write(path, contents).map_err(|source| DriverError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  info!("wrote {}", path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use backend::{Diagnostic, ScopeRule};
  use tempfile::tempdir;

  fn test_program(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
      .join("test_programs")
      .join(name)
  }

  fn compile_test_program(name: &str) -> CodeUnit {
    let _ = env_logger::builder().is_test(true).try_init();
    compile_file(&test_program(name), &CodegenOptions::default()).unwrap()
  }

  #[test]
  fn test_round_trip_program() {
    let unit = compile_test_program("array_store.mc");
    assert!(unit.diagnostics.is_empty());
    let expected = fs::read_to_string(test_program("array_store.uco")).unwrap();
    assert_eq!(unit.to_ucode(), expected);
  }

  #[test]
  fn test_control_flow_program() {
    let unit = compile_test_program("control_flow.mc");
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    let expected = fs::read_to_string(test_program("control_flow.uco")).unwrap();
    assert_eq!(unit.to_ucode(), expected);
  }

  #[test]
  fn test_program_with_errors_still_generates() {
    let unit = compile_test_program("bad_calls.mc");
    assert!(unit.has_errors());
    assert_eq!(
      unit.diagnostics,
      vec![
        Diagnostic::TooFewArguments {
          name: "sum".to_string(),
          expected: 2,
          found: 1
        },
        Diagnostic::UndefinedVariable {
          name: "total".to_string()
        },
      ]
    );
    assert!(unit.to_ucode().ends_with("           call main\n           end\n"));
  }

  #[test]
  fn test_globals_need_enclosing_rule() {
    let path = test_program("globals.mc");
    let faithful = compile_file(&path, &CodegenOptions::default()).unwrap();
    assert!(faithful.has_errors());
    let options = CodegenOptions {
      scope_rule: ScopeRule::Enclosing,
      ..CodegenOptions::default()
    };
    let resolved = compile_file(&path, &options).unwrap();
    assert!(resolved.diagnostics.is_empty(), "{:?}", resolved.diagnostics);
  }

  #[test]
  fn test_syntax_error() {
    let err = compile_source("int main() { return 0 }\n", &CodegenOptions::default()).unwrap_err();
    match err {
      DriverError::Frontend(FrontendError::Syntax { line, .. }) => assert_eq!(line, 1),
      other => panic!("unexpected error: {}", other),
    }
  }

  #[test]
  fn test_missing_input() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.mc");
    let err = compile_file(&path, &CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, DriverError::Io { .. }));
    assert!(err.to_string().contains("absent.mc"));
  }

  #[test]
  fn test_default_output_path() {
    let input = Path::new("programs/sort.mc");
    assert_eq!(
      default_output_path(input, EmitFormat::Text),
      PathBuf::from("programs/sort.uco")
    );
    assert_eq!(
      default_output_path(input, EmitFormat::Json),
      PathBuf::from("programs/sort.json")
    );
  }

  #[test]
  fn test_write_text_and_json() {
    let dir = tempdir().unwrap();
    let unit = compile_source("int main() { return 1; }\n", &CodegenOptions::default()).unwrap();

    let text_path = dir.path().join("out.uco");
    write_output(&text_path, &render(&unit, EmitFormat::Text).unwrap()).unwrap();
    let text = fs::read_to_string(&text_path).unwrap();
    assert!(text.starts_with("main       proc 0 2 2\n"));

    let json_path = dir.path().join("out.json");
    write_output(&json_path, &render(&unit, EmitFormat::Json).unwrap()).unwrap();
    let json: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["global_size"], 0);
    assert_eq!(json["code"][1]["ldc"], 1);
    assert_eq!(json["code"][2]["simple"], "retv");
    assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(0));
  }

  #[test]
  fn test_json_diagnostics_are_tagged() {
    let unit = compile_source("void f() { }\n", &CodegenOptions::default()).unwrap();
    let json: serde_json::Value =
      serde_json::from_str(&render(&unit, EmitFormat::Json).unwrap()).unwrap();
    assert_eq!(json["diagnostics"][0]["kind"], "missing_entry_function");
    assert_eq!(json["diagnostics"][0]["name"], "main");
  }
}
