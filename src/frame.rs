//! Frames, variable slots, and the frame registry.

use std::collections::HashMap;

use crate::error::Error;
use crate::value::Value;

/// One of the three frame kinds a variable lexeme (`GF@x`, `LF@x`, `TF@x`) can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Local,
    Temporary,
}

impl FrameKind {
    pub fn from_prefix(prefix: &str) -> Option<FrameKind> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }
}

/// A fully resolved variable reference: which frame, and which name within it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Var {
    pub frame: FrameKind,
    pub name: String,
}

/// A named mapping from variable identifier to value slot.
///
/// Insertion happens only through [`Frame::define`]; there is no way to overwrite
/// an existing slot's presence (only its value, via [`Frame::set`]).
#[derive(Clone, Debug, Default)]
pub struct Frame {
    slots: HashMap<String, Value>,
}

impl Frame {
    pub fn new() -> Frame {
        Frame {
            slots: HashMap::new(),
        }
    }

    /// Declares a new variable, initialized to `Undef`.
    ///
    /// # Errors
    /// Returns [`Error::Semantic`] if `name` is already defined in this frame.
    pub fn define(&mut self, name: &str) -> Result<(), Error> {
        if self.slots.contains_key(name) {
            return Err(Error::Semantic(format!("variable '{}' already defined", name)));
        }
        self.slots.insert(name.to_string(), Value::Undef);
        Ok(())
    }

    /// Reads a slot's current value (which may be `Undef`).
    ///
    /// # Errors
    /// Returns [`Error::Variable`] if `name` was never `DEFVAR`'d in this frame.
    pub fn get(&self, name: &str) -> Result<&Value, Error> {
        self.slots
            .get(name)
            .ok_or_else(|| Error::Variable(format!("variable '{}' not defined", name)))
    }

    /// Overwrites an existing slot's value.
    ///
    /// # Errors
    /// Returns [`Error::Variable`] if `name` was never `DEFVAR`'d in this frame.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), Error> {
        match self.slots.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::Variable(format!("variable '{}' not defined", name))),
        }
    }
}

/// Owns the global frame, the optional temporary frame, and the stack of local
/// frames, and implements `CREATEFRAME`/`PUSHFRAME`/`POPFRAME` frame lifetime rules.
///
/// `GF` lives at the bottom of `frames` and is never popped. This is also what
/// makes `LF` resolve to `GF` when no local frame has been pushed yet, matching
/// the source semantics: `frames[0]` is the sentinel global frame pushed at
/// construction, and `LF` always means `frames.last()`.
pub struct FrameRegistry {
    frames: Vec<Frame>,
    temporary: Option<Frame>,
}

impl FrameRegistry {
    pub fn new() -> FrameRegistry {
        FrameRegistry {
            frames: vec![Frame::new()],
            temporary: None,
        }
    }

    fn resolve(&self, kind: FrameKind) -> Result<&Frame, Error> {
        match kind {
            FrameKind::Global => Ok(&self.frames[0]),
            // `frames` always has at least the global sentinel, so this never
            // fails on an empty local stack -- it just resolves to `GF`.
            FrameKind::Local => Ok(self.frames.last().expect("global frame sentinel")),
            FrameKind::Temporary => self
                .temporary
                .as_ref()
                .ok_or_else(|| Error::Frame("temporary frame does not exist".to_string())),
        }
    }

    fn resolve_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, Error> {
        match kind {
            FrameKind::Global => Ok(&mut self.frames[0]),
            FrameKind::Local => Ok(self.frames.last_mut().expect("global frame sentinel")),
            FrameKind::Temporary => self
                .temporary
                .as_mut()
                .ok_or_else(|| Error::Frame("temporary frame does not exist".to_string())),
        }
    }

    pub fn define(&mut self, var: &Var) -> Result<(), Error> {
        self.resolve_mut(var.frame)?.define(&var.name)
    }

    pub fn get(&self, var: &Var) -> Result<&Value, Error> {
        self.resolve(var.frame)?.get(&var.name)
    }

    pub fn set(&mut self, var: &Var, value: Value) -> Result<(), Error> {
        self.resolve_mut(var.frame)?.set(&var.name, value)
    }

    /// `CREATEFRAME`: (re)creates `TF` as empty, discarding any previous `TF`.
    pub fn create_frame(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// `PUSHFRAME`: pushes `TF` onto the local-frame stack and clears `TF`.
    ///
    /// # Errors
    /// Returns [`Error::Frame`] if `TF` does not currently exist.
    pub fn push_frame(&mut self) -> Result<(), Error> {
        let tf = self
            .temporary
            .take()
            .ok_or_else(|| Error::Frame("temporary frame does not exist".to_string()))?;
        self.frames.push(tf);
        Ok(())
    }

    /// `POPFRAME`: moves the top local frame into `TF`.
    ///
    /// # Errors
    /// Returns [`Error::Frame`] if no local frame has been pushed above the
    /// global sentinel.
    pub fn pop_frame(&mut self) -> Result<(), Error> {
        if self.frames.len() <= 1 {
            return Err(Error::Frame("no local frame to pop".to_string()));
        }
        self.temporary = self.frames.pop();
        Ok(())
    }

    /// Number of local frames currently pushed (excludes the global sentinel).
    pub fn local_depth(&self) -> usize {
        self.frames.len() - 1
    }
}

impl Default for FrameRegistry {
    fn default() -> FrameRegistry {
        FrameRegistry::new()
    }
}
