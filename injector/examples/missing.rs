use fibre_injector::{injector, maybe_resolve, resolve};
use std::panic;

struct UnregisteredService;

fn main() {
  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a key that was never registered...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(UnregisteredService, "unregistered_service");
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Unresolved keys are not errors ---
  println!("\nNow, attempting to resolve it as an optional dependency...");

  match maybe_resolve!(UnregisteredService, "unregistered_service") {
    Some(_) => panic!("Should not have found the service!"),
    None => println!("Correctly received `None` for the missing service."),
  }

  let untyped = injector()
    .resolve_value("unregistered_service")
    .expect("resolution should not fail");
  assert!(untyped.is_none());
}
