//! Core, non-public data structures for the injector.

use crate::error::{Error, Result};
use crate::injector::Injector;
use crate::key::Key;
use crate::registration::Registration;
use crate::resolution::Resolution;

use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) type RegistrationCallback = Box<dyn FnOnce(&Injector) -> Result<()> + Send>;

/// The mutable state of one scope.
///
/// Guarded by a re-entrant lock so the thread resolving in a scope can
/// re-enter it from factories and callbacks. `RefCell` borrows are never held
/// across user code.
pub(crate) type ScopeLock = ReentrantMutex<RefCell<ScopeState>>;

#[derive(Default)]
pub(crate) struct ScopeState {
  pub(crate) registrations: HashMap<String, Arc<Registration>>,
  pub(crate) resolutions: HashMap<String, Resolution>,
  // Keys currently under construction, paired with their identities.
  pub(crate) build_stack: Vec<(String, Key)>,
  pub(crate) init_definitions: Vec<Key>,
  pub(crate) registration_callbacks: Vec<RegistrationCallback>,
  pub(crate) initialized: bool,
}

/// An RAII guard tracking a key on its scope's build stack.
///
/// Entering fails if the key is already being built or the stack is full.
/// Dropping the guard pops the entry, whether resolution succeeded or not.
pub(crate) struct BuildGuard<'a> {
  state: &'a ScopeLock,
}

impl<'a> BuildGuard<'a> {
  pub(crate) fn enter(
    state: &'a ScopeLock,
    key: &Key,
    identity: &str,
    max_depth: usize,
  ) -> Result<Self> {
    let lock = state.lock();
    let mut scope = lock.borrow_mut();

    if scope.build_stack.iter().any(|(id, _)| id == identity) {
      let required_by = scope
        .build_stack
        .last()
        .map(|(_, previous)| previous.describe())
        .unwrap_or_default();
      return Err(Error::CyclicDependency {
        building: key.describe(),
        required_by,
      });
    }
    if scope.build_stack.len() >= max_depth {
      return Err(Error::DepthExceeded {
        key: key.describe(),
        limit: max_depth,
      });
    }

    scope.build_stack.push((identity.to_owned(), key.clone()));
    tracing::trace!(key = %key, depth = scope.build_stack.len(), "build stack push");
    Ok(Self { state })
  }
}

impl Drop for BuildGuard<'_> {
  fn drop(&mut self) {
    let lock = self.state.lock();
    let popped = lock.borrow_mut().build_stack.pop();
    if let Some((_, key)) = popped {
      tracing::trace!(key = %key, "build stack pop");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_lock() -> ScopeLock {
    ReentrantMutex::new(RefCell::new(ScopeState::default()))
  }

  #[test]
  fn test_guard_pops_on_drop() {
    let lock = new_lock();
    let key = Key::from("a");
    {
      let _guard = BuildGuard::enter(&lock, &key, "a", 8).unwrap();
      assert_eq!(lock.lock().borrow().build_stack.len(), 1);
    }
    assert!(lock.lock().borrow().build_stack.is_empty());
  }

  #[test]
  fn test_reentry_reports_cycle_with_predecessor() {
    let lock = new_lock();
    let a = Key::from("a");
    let b = Key::from("b");
    let _ga = BuildGuard::enter(&lock, &a, "a", 8).unwrap();
    let _gb = BuildGuard::enter(&lock, &b, "b", 8).unwrap();

    match BuildGuard::enter(&lock, &a, "a", 8) {
      Err(Error::CyclicDependency {
        building,
        required_by,
      }) => {
        assert_eq!(building, "a");
        assert_eq!(required_by, "b");
      }
      _ => panic!("expected a cycle"),
    }
    assert_eq!(lock.lock().borrow().build_stack.len(), 2);
  }

  #[test]
  fn test_depth_limit() {
    let lock = new_lock();
    let a = Key::from("a");
    let b = Key::from("b");
    let _ga = BuildGuard::enter(&lock, &a, "a", 1).unwrap();
    assert!(matches!(
      BuildGuard::enter(&lock, &b, "b", 1),
      Err(Error::DepthExceeded { limit: 1, .. })
    ));
  }
}
