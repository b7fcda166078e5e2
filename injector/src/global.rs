//! The process-wide default injector and global namespace.

use crate::injector::Injector;
use crate::namespace::GlobalTable;

use once_cell::sync::Lazy;
use std::sync::Arc;

// The process-wide global namespace. The default injector falls back to it.
static GLOBAL_NAMESPACE: Lazy<Arc<GlobalTable>> = Lazy::new(|| Arc::new(GlobalTable::new()));

// The one and only default injector, created on first access.
static DEFAULT_INJECTOR: Lazy<Arc<Injector>> = Lazy::new(|| {
  Injector::builder()
    .label("root")
    .globals(GLOBAL_NAMESPACE.clone())
    .build()
});

/// Provides the process-wide root injector.
///
/// Other scopes are usually created from it with `child_scope`.
///
/// # Examples
///
/// ```
/// use fibre_injector::{injector, Factory};
///
/// let scope = injector().child_scope();
/// scope
///   .register("greeting", Some(vec![]), Some(Factory::from_fn(|| String::from("hi"))))
///   .unwrap();
/// assert_eq!(*scope.require::<String>("greeting").unwrap(), "hi");
/// ```
pub fn injector() -> &'static Arc<Injector> {
  &DEFAULT_INJECTOR
}

/// Provides the global namespace read by the root injector and its scopes.
///
/// # Examples
///
/// ```
/// use fibre_injector::{globals, injector};
///
/// globals().set("doc_example_answer", 42_i32);
/// let answer = injector().child_scope().require::<i32>("doc_example_answer").unwrap();
/// assert_eq!(*answer, 42);
/// ```
pub fn globals() -> &'static Arc<GlobalTable> {
  &GLOBAL_NAMESPACE
}
