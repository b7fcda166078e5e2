//! Lifetime managers decide whether a registration's factory result is cached.

use crate::error::Result;
use crate::resolution::{InstanceFactory, Value};

use std::fmt;
use std::sync::Arc;

/// Wraps a raw factory to control how often it runs.
pub trait LifetimeManager: Send + Sync + fmt::Debug {
  fn get_factory(&self, factory: InstanceFactory) -> Result<InstanceFactory>;
}

/// Builds the value once, at the moment the resolution is created, and hands
/// out that same value afterwards. This is the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Singleton;

impl LifetimeManager for Singleton {
  fn get_factory(&self, factory: InstanceFactory) -> Result<InstanceFactory> {
    let instance: Value = factory()?;
    Ok(Arc::new(move || -> Result<Value> { Ok(instance.clone()) }))
  }
}

/// Builds a fresh value on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerRequest;

impl LifetimeManager for PerRequest {
  fn get_factory(&self, factory: InstanceFactory) -> Result<InstanceFactory> {
    Ok(factory)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn counting_factory(calls: &Arc<AtomicUsize>) -> InstanceFactory {
    let calls = calls.clone();
    Arc::new(move || -> Result<Value> {
      let n = calls.fetch_add(1, Ordering::SeqCst);
      Ok(Arc::new(n) as Value)
    })
  }

  #[test]
  fn test_singleton_builds_eagerly_and_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = Singleton.get_factory(counting_factory(&calls)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let a = factory().unwrap();
    let b = factory().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_per_request_builds_on_every_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = PerRequest.get_factory(counting_factory(&calls)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let a = factory().unwrap();
    let b = factory().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_singleton_surfaces_factory_failure() {
    let failing: InstanceFactory =
      Arc::new(|| -> Result<Value> { Err(crate::Error::factory("broken")) });
    assert!(Singleton.get_factory(failing).is_err());
  }
}
