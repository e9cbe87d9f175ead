pub mod ast;
pub mod config;
pub mod interpreter;
pub mod parser;
pub mod runtime;
pub mod tokenizer;

pub use interpreter::{Interpreter, RuntimeError, ScriptError, Value};
pub use runtime::{RuntimeOptions, run_source};
