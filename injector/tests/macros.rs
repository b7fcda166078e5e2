// injector/tests/macros.rs

//! Tests specifically for the resolution macros.
//! This file verifies the behavior of:
//! - `resolve!` / `maybe_resolve!` against the default injector
//! - `resolve_from!` / `maybe_resolve_from!` against a given injector

use fibre_injector::{
  injector, maybe_resolve, maybe_resolve_from, resolve, resolve_from, Dependencies, Factory,
  Injectable, Injector, Key, Result,
};
use std::sync::Arc;

// --- Test Fixtures ---

struct MacroTestService {
  value: i32,
}

impl Injectable for MacroTestService {
  fn construct(_: &Dependencies) -> Result<Self> {
    Ok(MacroTestService { value: 42 })
  }
}

struct UnregisteredService;

// --- Default Injector Macro Tests ---

#[test]
fn test_resolve_default_injector() {
  // Arrange
  injector()
    .register_instance("macro_named_service", MacroTestService { value: 43 })
    .unwrap();

  // Act & Assert
  assert_eq!(resolve!(MacroTestService).value, 42);
  assert_eq!(resolve!(MacroTestService, "macro_named_service").value, 43);
  assert!(Arc::ptr_eq(
    &resolve!(MacroTestService),
    &resolve!(MacroTestService)
  ));
}

#[test]
fn test_maybe_resolve_default_injector() {
  assert_eq!(maybe_resolve!(MacroTestService).unwrap().value, 42);
  assert!(maybe_resolve!(UnregisteredService, "macro_never_registered").is_none());
}

#[test]
#[should_panic(expected = "Failed to resolve required service")]
fn test_resolve_panics_on_missing_service() {
  resolve!(UnregisteredService, "macro_missing_service");
}

// --- Explicit Injector Macro Tests ---

#[test]
fn test_resolve_from_given_injector() {
  let scope = Injector::new();
  scope
    .register(
      "answer",
      None,
      Some(Factory::from_fn(|| MacroTestService { value: 7 })),
    )
    .unwrap();

  assert_eq!(resolve_from!(scope, MacroTestService, "answer").value, 7);
  assert_eq!(resolve_from!(scope, MacroTestService).value, 42);
  assert!(maybe_resolve_from!(scope, UnregisteredService, Key::type_of::<UnregisteredService>()).is_none());
}

#[test]
#[should_panic(expected = "require loop detected")]
fn test_maybe_resolve_from_panics_on_cycles() {
  let scope = Injector::new();
  scope
    .register("loop", Some(vec![Key::from("loop")]), Some(Factory::from_fn(|| 0_u8)))
    .unwrap();

  maybe_resolve_from!(scope, u8, "loop");
}
