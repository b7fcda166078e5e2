//! Scope-local handles over a registration's lifetime-managed factory.

use crate::error::Result;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased, shareable resolved value.
pub type Value = Arc<dyn Any + Send + Sync>;

/// A zero-argument factory producing a resolved value.
pub type InstanceFactory = Arc<dyn Fn() -> Result<Value> + Send + Sync>;

/// A cached handle producing the value for one key in one scope.
///
/// Whatever caching applies has already happened inside the factory it wraps.
#[derive(Clone)]
pub struct Resolution {
  factory: InstanceFactory,
}

impl Resolution {
  pub fn new(factory: InstanceFactory) -> Self {
    Self { factory }
  }

  /// A resolution that always yields `value`.
  pub fn constant(value: Value) -> Self {
    Self {
      factory: Arc::new(move || -> Result<Value> { Ok(value.clone()) }),
    }
  }

  pub fn get_instance(&self) -> Result<Value> {
    (self.factory)()
  }
}

impl fmt::Debug for Resolution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Resolution").finish_non_exhaustive()
  }
}
