//! The read-only global namespace an injector may fall back to.

use crate::resolution::Value;

use dashmap::DashMap;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A lookup table of named values owned outside the injector.
///
/// Values found here are returned as-is: they are never invoked or
/// constructed, even when they happen to be callable.
pub trait GlobalLookup: Send + Sync {
  fn lookup(&self, name: &str) -> Option<Value>;
}

/// A concurrent, mutable table of named global values.
#[derive(Default)]
pub struct GlobalTable {
  entries: DashMap<String, Value>,
}

impl GlobalTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores `value` under `name`, replacing any previous value.
  pub fn set<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) -> Option<Value> {
    self.set_shared(name, Arc::new(value))
  }

  pub fn set_shared(&self, name: impl Into<String>, value: Value) -> Option<Value> {
    self.entries.insert(name.into(), value)
  }

  pub fn remove(&self, name: &str) -> Option<Value> {
    self.entries.remove(name).map(|(_, value)| value)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl GlobalLookup for GlobalTable {
  fn lookup(&self, name: &str) -> Option<Value> {
    self.entries.get(name).map(|entry| entry.value().clone())
  }
}

impl GlobalLookup for HashMap<String, Value> {
  fn lookup(&self, name: &str) -> Option<Value> {
    self.get(name).cloned()
  }
}

impl fmt::Debug for GlobalTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GlobalTable")
      .field("len", &self.entries.len())
      .finish()
  }
}
