//! Registration records and the pieces used to describe them.

use crate::error::{Error, Result};
use crate::key::Key;
use crate::lifetime::LifetimeManager;
use crate::resolution::Value;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type the injector can construct on its own.
///
/// `inject` declares the keys of the constructor's arguments, in order. The
/// resolved values are handed to `construct` positionally.
///
/// ```
/// use fibre_injector::{Dependencies, Injectable, Injector, Key, Result};
/// use std::sync::Arc;
///
/// struct Config;
/// impl Injectable for Config {
///   fn construct(_: &Dependencies) -> Result<Self> {
///     Ok(Config)
///   }
/// }
///
/// struct Service {
///   config: Arc<Config>,
/// }
/// impl Injectable for Service {
///   fn inject() -> Vec<Key> {
///     vec![Key::of::<Config>()]
///   }
///   fn construct(deps: &Dependencies) -> Result<Self> {
///     Ok(Service { config: deps.get(0)? })
///   }
/// }
///
/// let injector = Injector::new();
/// let service = injector.resolve_type::<Service>().unwrap().unwrap();
/// let _config: &Config = &service.config;
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
  fn inject() -> Vec<Key> {
    Vec::new()
  }

  fn construct(deps: &Dependencies) -> Result<Self>;
}

type BuildFn = dyn Fn(&Dependencies) -> Result<Value> + Send + Sync;

/// Produces a value from its resolved dependencies.
#[derive(Clone)]
pub struct Factory {
  build: Arc<BuildFn>,
  declared: Option<fn() -> Vec<Key>>,
}

impl Factory {
  /// A factory from a closure receiving the resolved dependencies.
  pub fn new<T, F>(factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Dependencies) -> Result<T> + Send + Sync + 'static,
  {
    Self {
      build: Arc::new(move |deps: &Dependencies| {
        factory(deps).map(|value| Arc::new(value) as Value)
      }),
      declared: None,
    }
  }

  /// A factory from an infallible closure that ignores dependencies.
  pub fn from_fn<T, F>(factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self::new(move |_| Ok(factory()))
  }

  /// A factory returning an existing `Arc`, so the resolved value keeps its
  /// reference identity.
  pub fn shared<T, F>(factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Dependencies) -> Result<Arc<T>> + Send + Sync + 'static,
  {
    Self {
      build: Arc::new(move |deps: &Dependencies| factory(deps).map(|value| value as Value)),
      declared: None,
    }
  }

  /// The constructor adapter of an [`Injectable`] type.
  pub fn of<T: Injectable>() -> Self {
    Self {
      build: Arc::new(|deps: &Dependencies| {
        T::construct(deps).map(|value| Arc::new(value) as Value)
      }),
      declared: Some(T::inject as fn() -> Vec<Key>),
    }
  }

  /// The dependencies this factory declares for itself, if any.
  pub fn declared_dependencies(&self) -> Option<Vec<Key>> {
    self.declared.map(|inject| inject())
  }

  pub fn build(&self, deps: &Dependencies) -> Result<Value> {
    (self.build)(deps)
  }
}

impl fmt::Debug for Factory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Factory")
      .field("declares_dependencies", &self.declared.is_some())
      .finish_non_exhaustive()
  }
}

/// The resolved dependency values handed to a factory, in declaration order.
///
/// A dependency that could not be resolved is present as an empty slot.
#[derive(Clone, Default)]
pub struct Dependencies {
  keys: Vec<Key>,
  values: Vec<Option<Value>>,
}

impl Dependencies {
  pub(crate) fn new(keys: Vec<Key>, values: Vec<Option<Value>>) -> Self {
    debug_assert_eq!(keys.len(), values.len());
    Self { keys, values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn key(&self, index: usize) -> Option<&Key> {
    self.keys.get(index)
  }

  /// The untyped value at `index`, if it was resolved.
  pub fn value(&self, index: usize) -> Option<&Value> {
    self.values.get(index).and_then(Option::as_ref)
  }

  /// The value at `index` as a `T`. Fails if it is missing or of another type.
  pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
    self.optional(index)?.ok_or_else(|| Error::Unresolved {
      key: self.keys[index].describe(),
    })
  }

  /// The value at `index` as a `T`, or `None` if it was not resolved.
  pub fn optional<T: Any + Send + Sync>(&self, index: usize) -> Result<Option<Arc<T>>> {
    let slot = self.values.get(index).ok_or_else(|| Error::DependencyIndex {
      index,
      len: self.values.len(),
    })?;
    match slot {
      Some(value) => downcast_value(&self.keys[index], value.clone()).map(Some),
      None => Ok(None),
    }
  }
}

impl fmt::Debug for Dependencies {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(
        self
          .keys
          .iter()
          .zip(&self.values)
          .map(|(key, value)| (key.describe(), value.is_some())),
      )
      .finish()
  }
}

pub(crate) fn downcast_value<T: Any + Send + Sync>(key: &Key, value: Value) -> Result<Arc<T>> {
  value.downcast::<T>().map_err(|_| Error::TypeMismatch {
    key: key.describe(),
    expected: std::any::type_name::<T>(),
  })
}

/// Describes a registration before it is recorded.
#[derive(Clone, Default)]
pub struct RegisterOptions {
  pub(crate) key: Option<Key>,
  pub(crate) factory: Option<Factory>,
  pub(crate) instance: Option<Value>,
  pub(crate) dependencies: Option<Vec<Key>>,
  pub(crate) lifetime_manager: Option<Arc<dyn LifetimeManager>>,
}

impl RegisterOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn key(mut self, key: impl Into<Key>) -> Self {
    self.key = Some(key.into());
    self
  }

  pub fn factory(mut self, factory: Factory) -> Self {
    self.factory = Some(factory);
    self
  }

  /// Registers a precomputed value instead of a factory.
  pub fn instance<T: Any + Send + Sync>(self, instance: T) -> Self {
    self.shared_instance(Arc::new(instance))
  }

  pub fn shared_instance(mut self, instance: Value) -> Self {
    self.instance = Some(instance);
    self
  }

  /// Sets the dependency keys explicitly. An empty list still counts as set.
  pub fn dependencies<I, K>(mut self, dependencies: I) -> Self
  where
    I: IntoIterator<Item = K>,
    K: Into<Key>,
  {
    self.dependencies = Some(dependencies.into_iter().map(Into::into).collect());
    self
  }

  pub fn lifetime_manager<L: LifetimeManager + 'static>(mut self, manager: L) -> Self {
    self.lifetime_manager = Some(Arc::new(manager));
    self
  }
}

impl fmt::Debug for RegisterOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RegisterOptions")
      .field("key", &self.key)
      .field("factory", &self.factory)
      .field("has_instance", &self.instance.is_some())
      .field("dependencies", &self.dependencies)
      .field("lifetime_manager", &self.lifetime_manager)
      .finish()
  }
}

/// An immutable recipe for producing the value of one key.
pub struct Registration {
  key: String,
  factory: Option<Factory>,
  instance: Option<Value>,
  dependencies: Option<Vec<Key>>,
  lifetime_manager: Option<Arc<dyn LifetimeManager>>,
}

impl Registration {
  pub(crate) fn new(identity: String, options: RegisterOptions) -> Self {
    Self {
      key: identity,
      factory: options.factory,
      instance: options.instance,
      dependencies: options.dependencies,
      lifetime_manager: options.lifetime_manager,
    }
  }

  /// The identity this registration is stored under.
  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn factory(&self) -> Option<&Factory> {
    self.factory.as_ref()
  }

  pub fn instance(&self) -> Option<&Value> {
    self.instance.as_ref()
  }

  /// The explicitly given dependency keys.
  pub fn dependencies(&self) -> Option<&[Key]> {
    self.dependencies.as_deref()
  }

  pub fn lifetime_manager(&self) -> Option<&Arc<dyn LifetimeManager>> {
    self.lifetime_manager.as_ref()
  }

  /// The keys to resolve before invoking the factory: the explicit list,
  /// else the factory's own declaration, else nothing.
  pub fn dependency_keys(&self) -> Vec<Key> {
    match (&self.dependencies, &self.factory) {
      (Some(dependencies), _) => dependencies.clone(),
      (None, Some(factory)) => factory.declared_dependencies().unwrap_or_default(),
      (None, None) => Vec::new(),
    }
  }
}

impl fmt::Debug for Registration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registration")
      .field("key", &self.key)
      .field("factory", &self.factory)
      .field("has_instance", &self.instance.is_some())
      .field("dependencies", &self.dependencies)
      .field("lifetime_manager", &self.lifetime_manager)
      .finish()
  }
}
