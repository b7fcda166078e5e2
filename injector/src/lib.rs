//! # Fibre Injector
//!
//! A hierarchical, scope-aware dependency injection container for Rust.
//!
//! Values are registered under keys: plain names, opaque [`ObjectKey`] tokens,
//! or Rust types. Resolving a key finds the nearest registration in the scope
//! chain, builds it with its dependencies, and caches the result in the
//! resolving scope.
//!
//! ## Core Concepts
//!
//! - **Injector**: one scope of registrations and cached resolutions. Child
//!   scopes see their parent's registrations but build their own instances.
//! - **Default Injector**: a process-wide root, accessible via [`injector()`],
//!   which falls back to the process-wide [`globals()`] namespace.
//! - **Lifetime managers**: [`Singleton`] (default) builds once per scope,
//!   [`PerRequest`] builds on every resolution.
//! - **Injectable types**: types implementing [`Injectable`] declare their
//!   dependencies and can be resolved without any registration.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_injector::{Dependencies, Factory, Injectable, Injector, Key, Result};
//! use std::sync::Arc;
//!
//! struct Greeting(String);
//!
//! struct Greeter {
//!   greeting: Arc<Greeting>,
//! }
//!
//! impl Injectable for Greeter {
//!   fn inject() -> Vec<Key> {
//!     vec![Key::from("greeting")]
//!   }
//!
//!   fn construct(deps: &Dependencies) -> Result<Self> {
//!     Ok(Greeter { greeting: deps.get(0)? })
//!   }
//! }
//!
//! let root = Injector::new();
//! root
//!   .register(
//!     "greeting",
//!     None,
//!     Some(Factory::from_fn(|| Greeting("Hello, World!".into()))),
//!   )
//!   .unwrap();
//!
//! let scope = root.child_scope();
//! let greeter = scope.resolve_type::<Greeter>().unwrap().unwrap();
//! assert_eq!(greeter.greeting.0, "Hello, World!");
//! ```

mod config;
mod core;
mod error;
mod global;
mod injector;
mod key;
mod lifetime;
mod macros;
mod namespace;
mod registration;
mod resolution;

pub use config::{InjectorBuilder, InjectorConfig, DEFAULT_MAX_DEPTH};
pub use error::{BoxError, ConfigurationError, Error, ErrorKind, Result, StateError};
pub use global::{globals, injector};
pub use injector::Injector;
pub use key::{unique_id, Key, ObjectKey, TypeKey, OBJECT_ID_PREFIX};
pub use lifetime::{LifetimeManager, PerRequest, Singleton};
pub use namespace::{GlobalLookup, GlobalTable};
pub use registration::{Dependencies, Factory, Injectable, RegisterOptions, Registration};
pub use resolution::{InstanceFactory, Resolution, Value};
