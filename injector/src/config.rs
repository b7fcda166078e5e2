//! Injector configuration and the builder for root scopes.

use crate::injector::Injector;
use crate::namespace::GlobalLookup;

use core::fmt;
use std::sync::Arc;

/// Default bound on nested resolutions within one scope.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Settings shared by a root injector and every scope below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectorConfig {
  pub(crate) max_depth: usize,
}

impl InjectorConfig {
  /// How many keys may be under construction at once before resolution fails.
  pub fn max_depth(&self) -> usize {
    self.max_depth
  }
}

impl Default for InjectorConfig {
  fn default() -> Self {
    Self {
      max_depth: DEFAULT_MAX_DEPTH,
    }
  }
}

/// A builder for root `Injector` instances.
#[derive(Default)]
pub struct InjectorBuilder {
  label: Option<String>,
  config: InjectorConfig,
  globals: Option<Arc<dyn GlobalLookup>>,
}

impl fmt::Debug for InjectorBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InjectorBuilder")
      .field("label", &self.label)
      .field("config", &self.config)
      .field("has_globals", &self.globals.is_some())
      .finish()
  }
}

impl InjectorBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the name used for this injector in log output.
  pub fn label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  /// Bounds how deep a chain of nested resolutions may go. At least 1.
  pub fn max_depth(mut self, max_depth: usize) -> Self {
    self.config.max_depth = max_depth.max(1);
    self
  }

  /// Sets the global namespace consulted when no registration matches.
  pub fn globals(mut self, globals: Arc<dyn GlobalLookup>) -> Self {
    self.globals = Some(globals);
    self
  }

  pub fn build(self) -> Arc<Injector> {
    Arc::new(Injector::from_parts(
      None,
      self.globals,
      Arc::new(self.config),
      self.label.unwrap_or_else(|| "root".to_owned()),
    ))
  }
}
