//! Registration keys and their stable identities.
//!
//! A [`Key`] is one of three things: a plain name, an opaque object token, or
//! a Rust type. Names are their own identity. Objects and types are assigned a
//! synthetic identity (`__ObjectID<n>`) the first time one is asked for, and
//! keep it for the rest of the process.

use crate::registration::{Factory, Injectable};

use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Prefix of every synthetic identity.
pub const OBJECT_ID_PREFIX: &str = "__ObjectID";

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

// Side table of identities handed out to types. Entries are never removed, so
// an identity is never reused for another type.
static TYPE_IDENTITIES: Lazy<DashMap<TypeId, String>> = Lazy::new(DashMap::new);

// Constructors of every injectable type a `TypeKey::of` has been built for, so
// an equal key made with `TypeKey::plain` finds the same constructor.
static TYPE_CONSTRUCTORS: Lazy<DashMap<TypeId, fn() -> Factory>> = Lazy::new(DashMap::new);

/// Generates a process-wide unique id: `prefix` followed by a strictly
/// increasing integer.
pub fn unique_id(prefix: &str) -> String {
  let idx = NEXT_ID.fetch_add(1, Ordering::Relaxed);
  format!("{}{}", prefix, idx)
}

/// An opaque token usable as a registration key.
///
/// Clones share the same identity. Two tokens created separately never do.
#[derive(Clone)]
pub struct ObjectKey {
  inner: Arc<ObjectKeyInner>,
}

struct ObjectKeyInner {
  id: OnceCell<String>,
  label: Option<String>,
}

impl ObjectKey {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(ObjectKeyInner {
        id: OnceCell::new(),
        label: None,
      }),
    }
  }

  /// Creates a token carrying a label used only in diagnostics.
  pub fn with_label(label: impl Into<String>) -> Self {
    Self {
      inner: Arc::new(ObjectKeyInner {
        id: OnceCell::new(),
        label: Some(label.into()),
      }),
    }
  }

  /// The token's identity, assigned on first call.
  pub fn identity(&self) -> &str {
    self.inner.id.get_or_init(|| unique_id(OBJECT_ID_PREFIX))
  }

  pub fn label(&self) -> Option<&str> {
    self.inner.label.as_deref()
  }
}

impl Default for ObjectKey {
  fn default() -> Self {
    Self::new()
  }
}

impl PartialEq for ObjectKey {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl Eq for ObjectKey {}

impl Hash for ObjectKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    (Arc::as_ptr(&self.inner) as usize).hash(state);
  }
}

impl fmt::Debug for ObjectKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.label() {
      Some(label) => write!(f, "ObjectKey({})", label),
      None => write!(f, "ObjectKey({})", self.identity()),
    }
  }
}

/// A Rust type used as a registration key.
///
/// Types that implement [`Injectable`] carry their constructor, which lets the
/// injector build them without an explicit registration.
#[derive(Clone, Copy)]
pub struct TypeKey {
  type_id: TypeId,
  type_name: &'static str,
  constructor: Option<fn() -> Factory>,
}

impl TypeKey {
  /// A key for an injectable type, carrying its constructor.
  pub fn of<T: Injectable>() -> Self {
    let constructor = Factory::of::<T> as fn() -> Factory;
    TYPE_CONSTRUCTORS
      .entry(TypeId::of::<T>())
      .or_insert(constructor);
    Self {
      type_id: TypeId::of::<T>(),
      type_name: std::any::type_name::<T>(),
      constructor: Some(constructor),
    }
  }

  /// A key for any type, carrying no constructor of its own.
  ///
  /// If the type is [`Injectable`] and a key for it has been made with
  /// [`TypeKey::of`] anywhere in the process, this key uses that constructor
  /// too. Prefer `of` for injectable types.
  pub fn plain<T: ?Sized + Any>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: std::any::type_name::<T>(),
      constructor: None,
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// The type's own factory, if it is constructible.
  pub fn constructor(&self) -> Option<Factory> {
    self.make_fn().map(|make| make())
  }

  pub fn is_constructible(&self) -> bool {
    self.make_fn().is_some()
  }

  fn make_fn(&self) -> Option<fn() -> Factory> {
    self
      .constructor
      .or_else(|| TYPE_CONSTRUCTORS.get(&self.type_id).map(|make| *make.value()))
  }

  pub fn identity(&self) -> String {
    TYPE_IDENTITIES
      .entry(self.type_id)
      .or_insert_with(|| unique_id(OBJECT_ID_PREFIX))
      .value()
      .clone()
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.type_name)
  }
}

/// Anything that can be registered and resolved.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Key {
  Name(Arc<str>),
  Object(ObjectKey),
  Type(TypeKey),
}

impl Key {
  pub fn name(name: impl AsRef<str>) -> Self {
    Key::Name(Arc::from(name.as_ref()))
  }

  /// A key for an injectable type.
  pub fn of<T: Injectable>() -> Self {
    Key::Type(TypeKey::of::<T>())
  }

  /// A key for any type. See [`TypeKey::plain`].
  pub fn type_of<T: ?Sized + Any>() -> Self {
    Key::Type(TypeKey::plain::<T>())
  }

  /// A fresh anonymous object key.
  pub fn object() -> Self {
    Key::Object(ObjectKey::new())
  }

  /// The stable identity string of this key.
  pub fn identity(&self) -> String {
    match self {
      Key::Name(name) => name.to_string(),
      Key::Object(object) => object.identity().to_owned(),
      Key::Type(ty) => ty.identity(),
    }
  }

  /// A human readable name, used in diagnostics.
  pub fn describe(&self) -> String {
    match self {
      Key::Name(name) => name.to_string(),
      Key::Object(object) => match object.label() {
        Some(label) => label.to_owned(),
        None => object.identity().to_owned(),
      },
      Key::Type(ty) => format!("TYPE: {}", ty.type_name()),
    }
  }

  pub fn as_type(&self) -> Option<&TypeKey> {
    match self {
      Key::Type(ty) => Some(ty),
      _ => None,
    }
  }
}

impl fmt::Debug for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Name(name) => write!(f, "Key({:?})", name),
      Key::Object(object) => write!(f, "Key({:?})", object),
      Key::Type(ty) => write!(f, "Key({:?})", ty),
    }
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.describe())
  }
}

impl From<&str> for Key {
  fn from(name: &str) -> Self {
    Key::name(name)
  }
}

impl From<String> for Key {
  fn from(name: String) -> Self {
    Key::Name(Arc::from(name))
  }
}

impl From<&String> for Key {
  fn from(name: &String) -> Self {
    Key::name(name)
  }
}

impl From<ObjectKey> for Key {
  fn from(object: ObjectKey) -> Self {
    Key::Object(object)
  }
}

impl From<&ObjectKey> for Key {
  fn from(object: &ObjectKey) -> Self {
    Key::Object(object.clone())
  }
}

impl From<TypeKey> for Key {
  fn from(ty: TypeKey) -> Self {
    Key::Type(ty)
  }
}

impl From<&Key> for Key {
  fn from(key: &Key) -> Self {
    key.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Marker;
  struct OtherMarker;

  struct Buildable;
  impl Injectable for Buildable {
    fn construct(_: &crate::registration::Dependencies) -> crate::error::Result<Self> {
      Ok(Buildable)
    }
  }

  #[test]
  fn test_name_identity_is_literal() {
    assert_eq!(Key::from("simple").identity(), "simple");
    assert_eq!(Key::from(String::from("$")).identity(), "$");
  }

  #[test]
  fn test_object_identity_is_stable_and_shared_by_clones() {
    let object = ObjectKey::new();
    let first = Key::from(&object).identity();
    let second = Key::from(object.clone()).identity();

    assert!(first.starts_with(OBJECT_ID_PREFIX));
    assert_eq!(first, second);
  }

  #[test]
  fn test_distinct_objects_never_collide() {
    let x = Key::object();
    let y = Key::object();
    assert_ne!(x.identity(), y.identity());
    assert_ne!(x, y);
  }

  #[test]
  fn test_type_identity_is_stable() {
    let a = Key::type_of::<Marker>().identity();
    let b = Key::type_of::<Marker>().identity();
    let other = Key::type_of::<OtherMarker>().identity();

    assert_eq!(a, b);
    assert_ne!(a, other);
    assert!(a.starts_with(OBJECT_ID_PREFIX));
  }

  #[test]
  fn test_plain_type_key_shares_known_constructor() {
    assert!(!TypeKey::plain::<Marker>().is_constructible());

    let typed = TypeKey::of::<Buildable>();
    let plain = TypeKey::plain::<Buildable>();

    assert_eq!(typed, plain);
    assert!(plain.is_constructible());
    assert!(plain.constructor().is_some());
  }

  #[test]
  fn test_unique_ids_strictly_increase() {
    let parse = |id: String| -> usize { id[OBJECT_ID_PREFIX.len()..].parse().unwrap() };
    let first = parse(unique_id(OBJECT_ID_PREFIX));
    let second = parse(unique_id(OBJECT_ID_PREFIX));
    assert!(second > first);
  }

  #[test]
  fn test_describe() {
    assert_eq!(Key::from("plain").describe(), "plain");
    assert_eq!(
      Key::from(ObjectKey::with_label("token")).describe(),
      "token"
    );
    assert!(Key::type_of::<Marker>()
      .describe()
      .starts_with("TYPE: "));
  }
}
