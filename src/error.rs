use thiserror::Error;

/// A compile-phase diagnostic. The three variants match the three report
/// shapes: at a concrete token, at end of input, or a bare scanner message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("[line {line}] Error: {message}")]
    Scan { line: usize, message: String },

    #[error("[line {line}] Error at '{lexeme}': {message}")]
    Parse {
        line: usize,
        lexeme: String,
        message: String,
    },

    #[error("[line {line}] Error at end: {message}")]
    ParseAtEnd { line: usize, message: String },
}

impl CompileError {
    pub fn scan(message: impl Into<String>, line: usize) -> Self {
        Self::Scan {
            line,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>, lexeme: impl Into<String>, line: usize) -> Self {
        Self::Parse {
            line,
            lexeme: lexeme.into(),
            message: message.into(),
        }
    }

    pub fn parse_at_end(message: impl Into<String>, line: usize) -> Self {
        Self::ParseAtEnd {
            line,
            message: message.into(),
        }
    }
}

/// A value-type mismatch during instruction dispatch. Fatal: the VM does not
/// continue executing the chunk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}\n[line {line}] in script")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

/// Outcome of the compile-then-run pipeline. A compile failure means the VM
/// was never invoked.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("compile error")]
    Compile(Vec<CompileError>),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
