use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use lumen::error::InterpretError;
use lumen::{repl, vm};

#[derive(Parser, Debug)]
#[command(name = "lumen", about = "Bytecode compiler and VM for the Lumen expression language")]
struct Cli {
    /// Source file to run (omit for the REPL)
    file: Option<PathBuf>,
}

// Exit codes follow the BSD sysexits convention: 64 usage, 65 data error,
// 70 internal software error, 74 I/O error.
fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            eprintln!("Usage: lumen [path]");
            return ExitCode::from(64);
        }
    };

    match cli.file {
        Some(path) => run_file(&path),
        None => {
            repl::run_repl();
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read \"{}\": {e}", path.display());
            return ExitCode::from(74);
        }
    };

    match vm::interpret(&source) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(InterpretError::Compile(errors)) => {
            for error in errors {
                eprintln!("{error}");
            }
            ExitCode::from(65)
        }
        Err(InterpretError::Runtime(error)) => {
            eprintln!("{error}");
            ExitCode::from(70)
        }
    }
}
