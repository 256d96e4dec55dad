use std::io::{self, BufRead, Write};

use crate::error::InterpretError;
use crate::vm;

/// Run the interactive REPL. Each line is compiled and interpreted
/// independently; nothing persists between lines.
pub fn run_repl() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().expect("flush stdout");

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // Ctrl-D / EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        }

        if line.trim().is_empty() {
            continue;
        }

        match vm::interpret(&line) {
            Ok(value) => println!("{value}"),
            Err(InterpretError::Compile(errors)) => {
                for error in errors {
                    eprintln!("{error}");
                }
            }
            Err(InterpretError::Runtime(error)) => eprintln!("{error}"),
        }
    }
}
