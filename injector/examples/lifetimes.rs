use fibre_injector::{injector, resolve, Factory, PerRequest, RegisterOptions};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  // --- Singleton Registration (the default) ---
  // This factory will only be called ONCE per scope.
  injector()
    .register(
      "singleton_tracker",
      None,
      Some(Factory::from_fn(|| {
        println!("Creating SINGLETON RequestTracker...");
        RequestTracker {
          id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
        }
      })),
    )
    .expect("registration failed");

  // --- Per-request Registration ---
  // This factory will be called EVERY time the key is resolved.
  injector()
    .register_options(
      RegisterOptions::new()
        .key("per_request_tracker")
        .factory(Factory::from_fn(|| {
          println!("Creating PER-REQUEST RequestTracker...");
          RequestTracker {
            id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
          }
        }))
        .lifetime_manager(PerRequest),
    )
    .expect("registration failed");

  println!("--- Resolving Singletons ---");
  let s1 = resolve!(RequestTracker, "singleton_tracker");
  let s2 = resolve!(RequestTracker, "singleton_tracker");
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("--- Resolving Per-request ---");
  let t1 = resolve!(RequestTracker, "per_request_tracker");
  let t2 = resolve!(RequestTracker, "per_request_tracker");
  println!("Per-request 1 ID: {}, Per-request 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
  assert!(!Arc::ptr_eq(&t1, &t2), "Per-request instances should differ");
}
