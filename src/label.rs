//! The label table: a unique mapping from label name to instruction order.

use std::collections::HashMap;

use crate::error::Error;

#[derive(Default)]
pub struct LabelTable {
    labels: HashMap<String, u32>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        LabelTable {
            labels: HashMap::new(),
        }
    }

    /// # Errors
    /// Returns [`Error::Semantic`] if `name` is already registered.
    pub fn insert(&mut self, name: &str, order: u32) -> Result<(), Error> {
        if self.labels.contains_key(name) {
            return Err(Error::Semantic(format!("duplicate label '{}'", name)));
        }
        self.labels.insert(name.to_string(), order);
        Ok(())
    }

    /// # Errors
    /// Returns [`Error::Semantic`] if `name` has no registered label.
    pub fn resolve(&self, name: &str) -> Result<u32, Error> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| Error::Semantic(format!("undefined label '{}'", name)))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
