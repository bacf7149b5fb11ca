use std::path::PathBuf;
use std::process::ExitCode;

use backend::{CodegenOptions, ScopeRule, Severity};
use clap::Parser;
use driver::{
  default_output_path, parse_source, read_source, render, write_output, DriverError, EmitFormat,
};
use log::LevelFilter;

/// Compiles a Mini C source file to ucode.
#[derive(Parser, Debug)]
#[command(name = "minicc", version)]
struct Cli {
  /// Mini C source file
  input: PathBuf,

  /// Output file; defaults to the input path with a .uco or .json extension
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,

  #[arg(long, value_enum, default_value_t = EmitFormat::Text)]
  emit: EmitFormat,

  /// Print the syntax tree to stdout before generating code
  #[arg(long)]
  dump_ast: bool,

  /// Function called by the program start-up sequence
  #[arg(long, value_name = "NAME", default_value = backend::options::DEFAULT_ENTRY_POINT)]
  entry: String,

  /// Let function bodies see file-scope names
  #[arg(long)]
  resolve_globals: bool,

  #[arg(long, value_name = "N", default_value_t = backend::options::DEFAULT_SYMBOL_CAPACITY)]
  symtab_capacity: usize,

  /// Log generator activity
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn codegen_options(&self) -> CodegenOptions {
    CodegenOptions {
      entry_point: self.entry.clone(),
      scope_rule: if self.resolve_globals {
        ScopeRule::Enclosing
      } else {
        ScopeRule::ExactLevel
      },
      symbol_capacity: self.symtab_capacity,
    }
  }
}

fn run(cli: &Cli) -> Result<bool, DriverError> {
  let source = read_source(&cli.input)?;
  let program = parse_source(&source)?;
  if cli.dump_ast {
    println!("{:#?}", program);
  }

  let unit = backend::generate_code(&program, &cli.codegen_options())?;
  for diagnostic in &unit.diagnostics {
    eprintln!("{}: {}", diagnostic.severity(), diagnostic);
  }
  let errors = unit
    .diagnostics
    .iter()
    .filter(|d| d.severity() == Severity::Error)
    .count();
  if errors > 0 {
    eprintln!("{} error(s) reported", errors);
  }

  let output = cli
    .output
    .clone()
    .unwrap_or_else(|| default_output_path(&cli.input, cli.emit));
  write_output(&output, &render(&unit, cli.emit)?)?;
  Ok(errors == 0)
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Warn
    })
    .parse_default_env()
    .init();

  match run(&cli) {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      eprintln!("minicc: {}", e);
      ExitCode::FAILURE
    }
  }
}
