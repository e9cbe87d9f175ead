use std::fmt;

use thiserror::Error;

use crate::parser::ParseError;
use crate::tokenizer::LexError;

/// Fatal evaluation failures. None of them can be caught by a script.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Variable '{0}' not defined")]
    UndefinedVariable(String),
    #[error("Function '{0}' not defined")]
    UndefinedFunction(String),
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Function '{name}' expects {expected} arguments, got {found}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Loop bounds must be integers, got {start} and {end}")]
    NonIntegerBounds {
        start: &'static str,
        end: &'static str,
    },
    #[error("Cannot slice '{name}': {reason}")]
    InvalidSlice { name: String, reason: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow: {0}")]
    IntegerOverflow(String),
    #[error("Function '{0}' returned no value")]
    AbsentValue(String),
    #[error("'return' outside of a function")]
    ReturnOutsideFunction,
    #[error("Stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        RuntimeError::Io(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Lexical,
    Syntax,
    TypeMismatch,
    InvalidOperation,
    RuntimePanic,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Lexical => "E001",
            ErrorCode::Syntax => "E002",
            ErrorCode::TypeMismatch => "E003",
            ErrorCode::InvalidOperation => "E004",
            ErrorCode::RuntimePanic => "E005",
        }
    }
}

/// Any error that aborts a script run, tagged with a stable code.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub code: ErrorCode,
    pub message: String,
}

impl ScriptError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ScriptError {}

impl From<LexError> for ScriptError {
    fn from(value: LexError) -> Self {
        ScriptError::new(ErrorCode::Lexical, value.to_string())
    }
}

impl From<ParseError> for ScriptError {
    fn from(value: ParseError) -> Self {
        ScriptError::new(ErrorCode::Syntax, value.to_string())
    }
}

impl From<RuntimeError> for ScriptError {
    fn from(value: RuntimeError) -> Self {
        ScriptError::new(runtime_error_code(&value), value.to_string())
    }
}

pub fn runtime_error_code(error: &RuntimeError) -> ErrorCode {
    match error {
        RuntimeError::TypeMismatch(_)
        | RuntimeError::NonIntegerBounds { .. }
        | RuntimeError::AbsentValue(_) => ErrorCode::TypeMismatch,
        RuntimeError::UndefinedVariable(_)
        | RuntimeError::UndefinedFunction(_)
        | RuntimeError::ArgumentCount { .. }
        | RuntimeError::InvalidSlice { .. }
        | RuntimeError::DivisionByZero
        | RuntimeError::IntegerOverflow(_) => ErrorCode::InvalidOperation,
        RuntimeError::ReturnOutsideFunction
        | RuntimeError::StackOverflow(_)
        | RuntimeError::Io(_) => ErrorCode::RuntimePanic,
    }
}
