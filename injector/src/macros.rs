//! Public macros for ergonomic resolution.

/// Resolves a value from the default injector, panicking if it is missing.
///
/// `resolve!(Type)` resolves an [`Injectable`](crate::Injectable) type by its
/// own type key. `resolve!(Type, key)` resolves `key` as a `Type`.
///
/// # Panics
///
/// Panics if nothing provides the value or if resolution fails. For a
/// non-panicking version, use `injector().resolve(...)` directly.
///
/// # Examples
///
/// ```
/// use fibre_injector::{injector, resolve};
///
/// injector().register_instance("macro_doc_name", String::from("Fred")).unwrap();
/// let name = resolve!(String, "macro_doc_name");
/// assert_eq!(*name, "Fred");
/// ```
#[macro_export]
macro_rules! resolve {
  ($type:ty) => {
    $crate::resolve_from!($crate::injector(), $type)
  };
  ($type:ty, $key:expr) => {
    $crate::resolve_from!($crate::injector(), $type, $key)
  };
}

/// Resolves a value from the default injector, returning `None` if it is missing.
///
/// # Panics
///
/// Panics if resolution fails for any other reason, such as a dependency cycle.
#[macro_export]
macro_rules! maybe_resolve {
  ($type:ty) => {
    $crate::maybe_resolve_from!($crate::injector(), $type)
  };
  ($type:ty, $key:expr) => {
    $crate::maybe_resolve_from!($crate::injector(), $type, $key)
  };
}

/// Resolves a value from the given injector, panicking if it is missing.
#[macro_export]
macro_rules! resolve_from {
  ($injector:expr, $type:ty) => {
    $crate::resolve_from!($injector, $type, $crate::Key::of::<$type>())
  };
  ($injector:expr, $type:ty, $key:expr) => {{
    let key: $crate::Key = ::core::convert::Into::into($key);
    match $injector.require::<$type>(&key) {
      Ok(value) => value,
      Err(e) => panic!(
        "Failed to resolve required service {} as {}: {}",
        key,
        ::std::any::type_name::<$type>(),
        e
      ),
    }
  }};
}

/// Resolves a value from the given injector, returning `None` if it is missing.
#[macro_export]
macro_rules! maybe_resolve_from {
  ($injector:expr, $type:ty) => {
    $crate::maybe_resolve_from!($injector, $type, $crate::Key::of::<$type>())
  };
  ($injector:expr, $type:ty, $key:expr) => {{
    let key: $crate::Key = ::core::convert::Into::into($key);
    match $injector.resolve::<$type>(&key) {
      Ok(value) => value,
      Err(e) => panic!(
        "Failed to resolve service {} as {}: {}",
        key,
        ::std::any::type_name::<$type>(),
        e
      ),
    }
  }};
}
