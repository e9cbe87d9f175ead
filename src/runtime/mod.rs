//==============================================
// File: runtime.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: FluxScript execution pipeline
// Objective: Run source text through tokenizer, parser and interpreter in
//            strict sequence with shared runtime options
//==============================================

//==============================================
// Import & Modules
//==============================================

use std::io::{BufRead, Write};

use tracing::debug;

use crate::ast::Program;
use crate::config::FluxConfig;
use crate::interpreter::{DEFAULT_MAX_CALL_DEPTH, Interpreter, ScriptError};
use crate::parser::Parser;
use crate::tokenizer::{Token, Tokenizer};

//==============================================
// Section 1.0 - Runtime Options
//==============================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub max_call_depth: usize,
    pub trace: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace: false,
        }
    }
}

impl RuntimeOptions {
    pub fn with_trace(trace: bool) -> Self {
        Self {
            trace,
            ..Self::default()
        }
    }

    pub fn from_config(config: &FluxConfig) -> Self {
        Self {
            max_call_depth: config.max_call_depth,
            trace: config.trace,
        }
    }
}

//==============================================
// Section 2.0 - Pipeline
//==============================================

pub fn tokenize(source: &str) -> Result<Vec<Token>, ScriptError> {
    let tokens = Tokenizer::new(source).tokenize()?;
    debug!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}

pub fn parse_tokens(tokens: Vec<Token>) -> Result<Program, ScriptError> {
    Ok(Parser::new(tokens).parse()?)
}

pub fn parse_source(source: &str) -> Result<Program, ScriptError> {
    parse_tokens(tokenize(source)?)
}

/// Execute an already parsed program.
pub fn execute<'io>(
    program: &Program,
    options: &RuntimeOptions,
    input: impl BufRead + 'io,
    output: impl Write + 'io,
) -> Result<(), ScriptError> {
    let mut interpreter = Interpreter::with_io(input, output)
        .with_max_call_depth(options.max_call_depth)
        .with_trace(options.trace);
    interpreter.eval_program(program)?;
    Ok(())
}

/// Tokenize, parse, then evaluate `source`. Nothing runs unless the whole
/// program lexes and parses.
pub fn run_source<'io>(
    source: &str,
    options: &RuntimeOptions,
    input: impl BufRead + 'io,
    output: impl Write + 'io,
) -> Result<(), ScriptError> {
    let program = parse_source(source)?;
    execute(&program, options, input, output)
}

//==============================================
// Section 3.0 - Tests
//==============================================


//==============================================
// End of file
//==============================================
