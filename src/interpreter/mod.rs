//=============================================
// fluxscript/interpreter.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: FluxScript tree-walking evaluator
// Objective: Execute parsed programs against a stack of call scopes and a
//            global function table
// Formatting: Zobie.format (.solvraformat)
//=============================================

//=============================================
//            Section 1: Modules & Imports
//=============================================

pub mod coerce;
pub mod errors;
pub mod scope;
pub mod value;

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use tracing::{debug, info, trace};

use crate::ast::{AssignOp, CallExpr, Expr, FunctionDef, Number, Program, Stmt};

pub use coerce::coerce;
pub use errors::{ErrorCode, RuntimeError, ScriptError, runtime_error_code};
pub use scope::{Environment, ScopeStack};
pub use value::Value;

/// Default limit on nested user function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

//=============================================
//            Section 2: Control Flow
//=============================================

/// How a statement finished. `Return` unwinds to the nearest call and no further.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    /// `None` when the returned call itself produced no value.
    Return(Option<Value>),
}

//=============================================
//            Section 3: Interpreter State
//=============================================

pub struct Interpreter<'io> {
    scopes: ScopeStack,
    functions: HashMap<String, Rc<FunctionDef>>,
    input: Box<dyn BufRead + 'io>,
    output: Box<dyn Write + 'io>,
    max_call_depth: usize,
    trace: bool,
}

impl Interpreter<'static> {
    //Function: new
    //Purpose: Construct interpreter bound to the process stdin/stdout
    //Inputs: None
    //Returns: Self
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout())
    }
}

impl Default for Interpreter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'io> Interpreter<'io> {
    //Function: with_io
    //Purpose: Build interpreter reading `input` lines and writing `print` output to `output`
    //Inputs: input: impl BufRead, output: impl Write
    //Returns: Self
    pub fn with_io(input: impl BufRead + 'io, output: impl Write + 'io) -> Self {
        Self {
            scopes: ScopeStack::new(),
            functions: HashMap::new(),
            input: Box::new(input),
            output: Box::new(output),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace: false,
        }
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Log every executed statement at `info` level.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.get(name).ok()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name).map(Rc::as_ref)
    }

    //=============================================
    //            Section 4: Program Evaluation
    //=============================================

    //Function: eval_program
    //Purpose: Execute every top-level statement in order, failing on the first error
    //Inputs: &mut self, program: &Program
    //Returns: Result<(), RuntimeError>
    pub fn eval_program(&mut self, program: &Program) -> Result<(), RuntimeError> {
        debug!(statements = program.statements.len(), "evaluating program");
        for stmt in &program.statements {
            if let Flow::Return(_) = self.exec_stmt(stmt)? {
                return Err(RuntimeError::ReturnOutsideFunction);
            }
        }
        self.output.flush()?;
        Ok(())
    }

    fn exec_block(&mut self, body: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in body {
            if let flow @ Flow::Return(_) = self.exec_stmt(stmt)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        if self.trace {
            info!(stmt = stmt.kind_name(), depth = self.scopes.depth(), "exec");
        }

        match stmt {
            Stmt::FunctionDef(def) => {
                trace!(function = %def.name, params = def.params.len(), "define");
                self.functions.insert(def.name.clone(), Rc::clone(def));
                Ok(Flow::Normal)
            }

            Stmt::VarDecl {
                var_type,
                name,
                initializer,
            } => {
                let value = self.eval_value(initializer)?;
                let value = coerce(*var_type, value)?;
                self.scopes.declare(name.clone(), value);
                Ok(Flow::Normal)
            }

            Stmt::Assign { name, op, value } => {
                let value = self.eval_value(value)?;
                // `+=` concatenates when either side is a string, like `+`.
                let updated = match op {
                    AssignOp::Assign => value,
                    AssignOp::AddAssign => self.scopes.get(name)?.add(&value)?,
                    AssignOp::SubtractAssign => self.scopes.get(name)?.subtract(&value)?,
                    AssignOp::MultiplyAssign => self.scopes.get(name)?.multiply(&value)?,
                    AssignOp::DivideAssign => self.scopes.get(name)?.divide_real(&value)?,
                };
                self.scopes.assign(name, updated)?;
                Ok(Flow::Normal)
            }

            Stmt::Print { parts } => {
                let mut text = String::new();
                for part in parts {
                    if let Some(value) = self.eval_expr(part)? {
                        text.push_str(&value.to_string());
                    }
                }
                self.output.write_all(text.as_bytes())?;
                self.output.flush()?;
                Ok(Flow::Normal)
            }

            Stmt::If { condition, body } => {
                if self.eval_value(condition)?.is_truthy() {
                    self.exec_block(body)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.eval_value(condition)?.is_truthy() {
                    if let flow @ Flow::Return(_) = self.exec_block(body)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::For {
                variable,
                start,
                end,
                body,
            } => {
                let (start, end) = match (self.eval_value(start)?, self.eval_value(end)?) {
                    (Value::Integer(start), Value::Integer(end)) => (start, end),
                    (start, end) => {
                        return Err(RuntimeError::NonIntegerBounds {
                            start: start.type_name(),
                            end: end.type_name(),
                        });
                    }
                };
                for i in start..end {
                    // Bound in the current frame; still visible after the loop.
                    self.scopes.declare(variable.clone(), Value::Integer(i));
                    if let flow @ Flow::Return(_) = self.exec_block(body)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Return { value } => {
                let value = self.eval_expr(value)?;
                Ok(Flow::Return(value))
            }

            Stmt::Call(call) => {
                self.eval_call(call)?;
                Ok(Flow::Normal)
            }
        }
    }

    //=============================================
    //            Section 5: Expression Evaluation
    //=============================================

    /// Evaluate an expression that may be a call without a result.
    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Option<Value>, RuntimeError> {
        match expr {
            Expr::Call(call) => self.eval_call(call),
            other => self.eval_value(other).map(Some),
        }
    }

    /// Evaluate an expression that must produce a value.
    pub fn eval_value(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(Number::Integer(n)) => Ok(Value::Integer(*n)),
            Expr::Number(Number::Float(n)) => Ok(Value::Float(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Boolean(*b)),
            Expr::Variable(name) => self.scopes.get(name).cloned(),

            Expr::Binary { op, left, right } => {
                let left = self.eval_value(left)?;
                let right = self.eval_value(right)?;
                left.binary(*op, &right)
            }

            Expr::Comparison { op, left, right } => {
                let left = self.eval_value(left)?;
                let right = self.eval_value(right)?;
                left.compare(*op, &right)
            }

            Expr::UnaryMinus(operand) => self.eval_value(operand)?.negate(),

            Expr::Call(call) => self
                .eval_call(call)?
                .ok_or_else(|| RuntimeError::AbsentValue(call.name.clone())),

            Expr::Input(prompt) => self.eval_input(prompt),

            Expr::Slice { name, start, end } => {
                self.eval_slice(name, start.as_deref(), end.as_deref())
            }
        }
    }

    fn eval_input(&mut self, prompt: &Expr) -> Result<Value, RuntimeError> {
        if let Some(prompt) = self.eval_expr(prompt)? {
            write!(self.output, "{}", prompt)?;
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(RuntimeError::Io("unexpected end of input".to_string()));
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Value::String(line))
    }

    fn eval_slice(
        &mut self,
        name: &str,
        start: Option<&Expr>,
        end: Option<&Expr>,
    ) -> Result<Value, RuntimeError> {
        let text = match self.scopes.get(name)? {
            Value::String(text) => text.clone(),
            other => {
                return Err(RuntimeError::InvalidSlice {
                    name: name.to_string(),
                    reason: format!("expected string, found {}", other.type_name()),
                });
            }
        };

        let chars: Vec<char> = text.chars().collect();
        let len = chars.len() as i64;
        let start = match start {
            Some(expr) => self.slice_bound(name, expr)?,
            None => 0,
        };
        let end = match end {
            Some(expr) => self.slice_bound(name, expr)?,
            None => len,
        };

        let clamp = |index: i64| -> usize {
            let index = if index < 0 { index + len } else { index };
            index.clamp(0, len) as usize
        };
        let (start, end) = (clamp(start), clamp(end));
        if start >= end {
            return Ok(Value::String(String::new()));
        }
        Ok(Value::String(chars[start..end].iter().collect()))
    }

    fn slice_bound(&mut self, name: &str, expr: &Expr) -> Result<i64, RuntimeError> {
        match self.eval_value(expr)? {
            Value::Integer(n) => Ok(n),
            Value::Boolean(b) => Ok(i64::from(b)),
            other => Err(RuntimeError::InvalidSlice {
                name: name.to_string(),
                reason: format!("slice bounds must be integers, found {}", other.type_name()),
            }),
        }
    }

    //=============================================
    //            Section 6: Function Calls
    //=============================================

    fn eval_call(&mut self, call: &CallExpr) -> Result<Option<Value>, RuntimeError> {
        let args = call
            .args
            .iter()
            .map(|arg| self.eval_value(arg))
            .collect::<Result<Vec<_>, _>>()?;
        self.call_function(&call.name, args)
    }

    //Function: call_function
    //Purpose: Invoke a user function in a fresh frame holding only its parameters
    //Inputs: &mut self, name: &str, args: Vec<Value>
    //Returns: Result<Option<Value>, RuntimeError>
    pub fn call_function(
        &mut self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        let def = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_string()))?;

        if args.len() != def.params.len() {
            return Err(RuntimeError::ArgumentCount {
                name: name.to_string(),
                expected: def.params.len(),
                found: args.len(),
            });
        }

        if self.scopes.depth() > self.max_call_depth {
            return Err(RuntimeError::StackOverflow(self.max_call_depth));
        }

        let frame: Environment = def
            .params
            .iter()
            .map(|param| param.name.clone())
            .zip(args)
            .collect();

        self.scopes.push(frame);
        trace!(function = name, depth = self.scopes.depth(), "enter");
        let outcome = self.exec_block(&def.body);
        self.scopes.pop();
        trace!(function = name, depth = self.scopes.depth(), "exit");

        match outcome? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(None),
        }
    }
}

//=============================================
//            Section 7: Tests
//=============================================


//=============================================
// End of file
//=============================================
