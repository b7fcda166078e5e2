//! The `Injector` scope and its associated methods.

use crate::config::{InjectorBuilder, InjectorConfig};
use crate::core::{BuildGuard, ScopeLock, ScopeState};
use crate::error::{ConfigurationError, Error, Result, StateError};
use crate::key::Key;
use crate::lifetime::{LifetimeManager, Singleton};
use crate::namespace::GlobalLookup;
use crate::registration::{downcast_value, Dependencies, Factory, Injectable, RegisterOptions, Registration};
use crate::resolution::{InstanceFactory, Resolution, Value};

use parking_lot::ReentrantMutex;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A dependency injection scope.
///
/// An injector holds registrations and the resolutions built from them.
/// Lookups that miss locally fall through to the parent scope; resolutions are
/// always cached in the scope that performed them, so two child scopes of one
/// parent build their own instances of a parent-level registration.
///
/// Injectors are handed out behind an `Arc` so scopes can refer to their
/// parent. All of a scope's mutation is serialized behind one re-entrant lock,
/// which makes an injector safe to share between threads.
///
/// # Lock order
///
/// A resolve holds its scope's lock for its whole duration, factories and
/// callbacks included, and briefly takes each ancestor's lock while looking up
/// registrations. Locks are therefore always taken child before parent. A
/// factory running in a parent scope must not resolve from one of that parent's
/// descendants: with another thread resolving in the descendant, the two
/// threads wait on each other forever.
pub struct Injector {
  parent: Option<Arc<Injector>>,
  globals: Option<Arc<dyn GlobalLookup>>,
  config: Arc<InjectorConfig>,
  label: String,
  child_count: AtomicUsize,
  state: ScopeLock,
}

impl Injector {
  /// Creates a new, empty root injector with no global namespace.
  pub fn new() -> Arc<Self> {
    InjectorBuilder::new().build()
  }

  pub fn builder() -> InjectorBuilder {
    InjectorBuilder::new()
  }

  pub(crate) fn from_parts(
    parent: Option<Arc<Injector>>,
    globals: Option<Arc<dyn GlobalLookup>>,
    config: Arc<InjectorConfig>,
    label: String,
  ) -> Self {
    Self {
      parent,
      globals,
      config,
      label,
      child_count: AtomicUsize::new(0),
      state: ReentrantMutex::new(RefCell::new(ScopeState::default())),
    }
  }

  pub fn parent(&self) -> Option<&Arc<Injector>> {
    self.parent.as_ref()
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  pub fn config(&self) -> &InjectorConfig {
    &self.config
  }

  /// Whether this scope has run its callbacks and init definitions.
  pub fn is_initialized(&self) -> bool {
    self.state.lock().borrow().initialized
  }

  /// Creates a scope whose lookups fall back to this one.
  ///
  /// The child shares this scope's configuration and global namespace.
  pub fn child_scope(self: &Arc<Self>) -> Arc<Injector> {
    let n = self.child_count.fetch_add(1, Ordering::Relaxed);
    let child = Injector::from_parts(
      Some(Arc::clone(self)),
      self.globals.clone(),
      Arc::clone(&self.config),
      format!("{}/{}", self.label, n),
    );
    trace!(scope = %child.label, "child scope created");
    Arc::new(child)
  }

  // --- Registration ---

  /// Records a registration in this scope.
  ///
  /// A type key without a factory uses the type's own constructor. Fails if the
  /// key is missing, if nothing could ever produce a value, or if this scope
  /// already holds a registration for the key. Registrations in parent scopes
  /// never conflict; they are shadowed.
  pub fn register_options(&self, mut options: RegisterOptions) -> Result<Arc<Registration>> {
    let key = options.key.take().ok_or(ConfigurationError::MissingKey)?;
    if options.factory.is_none() {
      if let Key::Type(ty) = &key {
        options.factory = ty.constructor();
      }
    }
    if options.factory.is_none() && options.instance.is_none() {
      return Err(ConfigurationError::MissingFactory(key.describe()).into());
    }

    let identity = key.identity();
    let lock = self.state.lock();
    let mut state = lock.borrow_mut();
    if state.registrations.contains_key(&identity) {
      return Err(ConfigurationError::DuplicateKey(key.describe()).into());
    }

    let registration = Arc::new(Registration::new(identity.clone(), options));
    state.registrations.insert(identity, Arc::clone(&registration));
    debug!(scope = %self.label, key = %key, "registered");
    Ok(registration)
  }

  /// Registers `key` with optional explicit dependencies and factory.
  pub fn register(
    &self,
    key: impl Into<Key>,
    dependencies: Option<Vec<Key>>,
    factory: Option<Factory>,
  ) -> Result<Arc<Registration>> {
    let mut options = RegisterOptions::new().key(key);
    options.dependencies = dependencies;
    options.factory = factory;
    self.register_options(options)
  }

  /// Registers an injectable type under its own type key.
  pub fn register_type<T: Injectable>(&self) -> Result<Arc<Registration>> {
    self.register_options(RegisterOptions::new().key(Key::of::<T>()))
  }

  pub fn register_instance<T: Any + Send + Sync>(&self, key: impl Into<Key>, value: T) -> Result<()> {
    self.register_shared(key, Arc::new(value))
  }

  /// Registers an existing shared value; resolving returns this same `Arc`.
  pub fn register_shared(&self, key: impl Into<Key>, value: Value) -> Result<()> {
    self
      .register_options(RegisterOptions::new().key(key).shared_instance(value))
      .map(|_| ())
  }

  /// Registers a value to be resolved once, the first time this scope is used.
  ///
  /// Without a key, an anonymous object key is used.
  pub fn register_init(&self, mut options: RegisterOptions) -> Result<()> {
    let key = options.key.get_or_insert_with(Key::object).clone();
    self.register_options(options)?;

    let lock = self.state.lock();
    let mut state = lock.borrow_mut();
    if state.initialized {
      debug!(scope = %self.label, key = %key, "init definition added after initialization");
    }
    state.init_definitions.push(key);
    Ok(())
  }

  /// Defers registration work until the first resolution in this scope.
  ///
  /// Fails once the scope has initialized, since the callback would never run.
  pub fn register_callback<F>(&self, callback: F) -> Result<()>
  where
    F: FnOnce(&Injector) -> Result<()> + Send + 'static,
  {
    let lock = self.state.lock();
    let mut state = lock.borrow_mut();
    if state.initialized {
      return Err(StateError::AlreadyInitialized.into());
    }
    state.registration_callbacks.push(Box::new(callback));
    Ok(())
  }

  /// Registers every `(key, value)` pair as an instance.
  pub fn initialize<I, K>(&self, entries: I) -> Result<()>
  where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<Key>,
  {
    entries
      .into_iter()
      .try_for_each(|(key, value)| self.register_shared(key, value))
  }

  /// Finds the registration for `key` here or in the nearest ancestor.
  pub fn get_registration(&self, key: impl Into<Key>) -> Option<Arc<Registration>> {
    self.find_registration(&key.into().identity())
  }

  fn find_registration(&self, identity: &str) -> Option<Arc<Registration>> {
    let local = self.state.lock().borrow().registrations.get(identity).cloned();
    match (local, &self.parent) {
      (Some(registration), _) => Some(registration),
      (None, Some(parent)) => parent.find_registration(identity),
      (None, None) => None,
    }
  }

  // --- Resolution ---

  /// Resolves `key` to a value of type `T`.
  ///
  /// Returns `Ok(None)` when nothing provides the key.
  pub fn resolve<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> Result<Option<Arc<T>>> {
    let key = key.into();
    self
      .resolve_value(&key)?
      .map(|value| downcast_value(&key, value))
      .transpose()
  }

  /// Resolves an injectable type by its own type key.
  pub fn resolve_type<T: Injectable>(&self) -> Result<Option<Arc<T>>> {
    self.resolve::<T>(Key::of::<T>())
  }

  /// Like [`resolve`](Self::resolve), but a missing value is an error.
  pub fn require<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> Result<Arc<T>> {
    let key = key.into();
    self
      .resolve::<T>(&key)?
      .ok_or_else(|| Error::Unresolved { key: key.describe() })
  }

  /// Resolves `key` to an untyped value.
  ///
  /// Tries, in order: a resolution already cached in this scope, a
  /// registration from this scope or an ancestor, the global namespace, and
  /// finally an implicit registration when the key is a constructible type.
  pub fn resolve_value(&self, key: impl Into<Key>) -> Result<Option<Value>> {
    let key = key.into();
    let _lock = self.state.lock();
    self.ensure_initialized()?;

    let identity = key.identity();
    let _frame = BuildGuard::enter(&self.state, &key, &identity, self.config.max_depth)
      .map_err(|e| {
        warn!(scope = %self.label, error = %e, "resolution rejected");
        e
      })?;

    if let Some(value) = self.from_existing_resolution(&identity)? {
      trace!(scope = %self.label, key = %key, "resolved from cache");
      return Ok(Some(value));
    }
    if let Some(value) = self.from_explicit_registration(&key, &identity)? {
      return Ok(Some(value));
    }
    if let Some(value) = self.from_globals(&key, &identity) {
      return Ok(Some(value));
    }
    let value = self.from_implicit_type(&key, &identity)?;
    if value.is_none() {
      trace!(scope = %self.label, key = %key, "unresolved");
    }
    Ok(value)
  }

  fn ensure_initialized(&self) -> Result<()> {
    let callbacks = {
      let lock = self.state.lock();
      let mut state = lock.borrow_mut();
      if state.initialized {
        return Ok(());
      }
      state.initialized = true;
      std::mem::take(&mut state.registration_callbacks)
    };

    debug!(scope = %self.label, callbacks = callbacks.len(), "initializing");
    let total = callbacks.len();
    for (ran, callback) in callbacks.into_iter().enumerate() {
      if let Err(e) = callback(self) {
        let definitions = self.state.lock().borrow().init_definitions.len();
        warn!(
          scope = %self.label,
          error = %e,
          skipped_callbacks = total - ran - 1,
          skipped_init_definitions = definitions,
          "initialization aborted by a registration callback"
        );
        return Err(e);
      }
    }

    let definitions = self.state.lock().borrow().init_definitions.clone();
    let total = definitions.len();
    for (ran, key) in definitions.into_iter().enumerate() {
      if let Err(e) = self.resolve_value(&key) {
        warn!(
          scope = %self.label,
          key = %key,
          error = %e,
          skipped_init_definitions = total - ran - 1,
          "initialization aborted by an init definition"
        );
        return Err(e);
      }
    }
    Ok(())
  }

  fn from_existing_resolution(&self, identity: &str) -> Result<Option<Value>> {
    let resolution = self.state.lock().borrow().resolutions.get(identity).cloned();
    resolution.map(|r| r.get_instance()).transpose()
  }

  fn from_explicit_registration(&self, key: &Key, identity: &str) -> Result<Option<Value>> {
    let Some(registration) = self.find_registration(identity) else {
      return Ok(None);
    };

    let resolution = self.create_from_registration(&registration)?;
    self
      .state
      .lock()
      .borrow_mut()
      .resolutions
      .insert(identity.to_owned(), resolution.clone());
    debug!(scope = %self.label, key = %key, "resolved from registration");
    resolution.get_instance().map(Some)
  }

  fn from_globals(&self, key: &Key, identity: &str) -> Option<Value> {
    let value = self.globals.as_ref()?.lookup(identity)?;
    self
      .state
      .lock()
      .borrow_mut()
      .resolutions
      .insert(identity.to_owned(), Resolution::constant(value.clone()));
    debug!(scope = %self.label, key = %key, "resolved from globals");
    Some(value)
  }

  fn from_implicit_type(&self, key: &Key, identity: &str) -> Result<Option<Value>> {
    let Some(factory) = key.as_type().and_then(|ty| ty.constructor()) else {
      return Ok(None);
    };

    let dependencies = factory.declared_dependencies().unwrap_or_default();
    self.register_options(
      RegisterOptions::new()
        .key(key)
        .factory(factory)
        .dependencies(dependencies),
    )?;
    debug!(scope = %self.label, key = %key, "implicitly registered type");
    self.from_explicit_registration(key, identity)
  }

  fn create_from_registration(&self, registration: &Registration) -> Result<Resolution> {
    if let Some(instance) = registration.instance() {
      return Ok(Resolution::constant(Arc::clone(instance)));
    }
    let factory = registration
      .factory()
      .cloned()
      .ok_or_else(|| ConfigurationError::MissingFactory(registration.key().to_owned()))?;

    let keys = registration.dependency_keys();
    let values = keys
      .iter()
      .map(|key| self.resolve_value(key))
      .collect::<Result<Vec<_>>>()?;
    let dependencies = Dependencies::new(keys, values);

    let raw: InstanceFactory = Arc::new(move || factory.build(&dependencies));
    let manager = registration
      .lifetime_manager()
      .cloned()
      .unwrap_or_else(|| Arc::new(Singleton) as Arc<dyn LifetimeManager>);
    Ok(Resolution::new(manager.get_factory(raw)?))
  }
}

impl fmt::Debug for Injector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Injector")
      .field("label", &self.label)
      .field("parent", &self.parent.as_ref().map(|p| p.label.as_str()))
      .field("has_globals", &self.globals.is_some())
      .finish_non_exhaustive()
  }
}
