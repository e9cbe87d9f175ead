//! Environment stack: one global frame plus one frame per active call.

use std::collections::HashMap;

use super::{RuntimeError, Value};

pub type Environment = HashMap<String, Value>;

/// Frame 0 is the global environment and is never popped. Blocks do not
/// introduce frames; only function calls do.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Environment>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Environment::new()],
        }
    }

    /// Number of frames, i.e. 1 + call nesting depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, frame: Environment) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Environment> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.frames[0]
    }

    /// Bind `name` in the innermost frame, shadowing any outer binding.
    pub fn declare(&mut self, name: impl Into<String>, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        }
    }

    /// Resolve `name` in the current frame, then the global frame. Frames of
    /// suspended callers are never visible to a callee.
    pub fn get(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.visible()
            .find_map(|index| self.frames[index].get(name))
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
    }

    /// Overwrite the visible binding of `name`, current frame first.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let owner = self
            .visible()
            .find(|&index| self.frames[index].contains_key(name))
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))?;
        self.frames[owner].insert(name.to_string(), value);
        Ok(())
    }

    fn visible(&self) -> impl Iterator<Item = usize> + use<> {
        let top = self.frames.len() - 1;
        std::iter::once(top).chain((top > 0).then_some(0))
    }
}
