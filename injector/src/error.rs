use thiserror::Error;

/// A boxed, thread-safe error produced by user factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for `fibre_injector` operations.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error(transparent)]
  State(#[from] StateError),

  /// A key's construction transitively required itself within one resolution.
  #[error("require loop detected building {building} for {required_by}")]
  CyclicDependency {
    building: String,
    required_by: String,
  },

  #[error("resolution depth limit of {limit} exceeded while building {key}")]
  DepthExceeded { key: String, limit: usize },

  #[error("value resolved for {key} is not a {expected}")]
  TypeMismatch { key: String, expected: &'static str },

  #[error("no value could be resolved for {key}")]
  Unresolved { key: String },

  #[error("dependency index {index} is out of range for {len} resolved dependencies")]
  DependencyIndex { index: usize, len: usize },

  /// A user factory or constructor failed. The original error is the source.
  #[error("factory failed: {source}")]
  Factory {
    #[source]
    source: BoxError,
  },
}

/// Errors raised while recording a registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
  #[error("registration must have a key")]
  MissingKey,

  #[error("key already defined in this scope: {0}")]
  DuplicateKey(String),

  #[error("registration for {0} has neither a factory nor an instance")]
  MissingFactory(String),
}

/// Errors raised when an operation is not valid in the scope's current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
  #[error("registration callback added when injector is already initialized")]
  AlreadyInitialized,
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Configuration,
  CyclicDependency,
  State,
  Resolution,
  Factory,
}

impl Error {
  /// Wraps an arbitrary failure raised inside a factory.
  pub fn factory<E>(error: E) -> Self
  where
    E: Into<BoxError>,
  {
    Error::Factory {
      source: error.into(),
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Configuration(_) => ErrorKind::Configuration,
      Error::State(_) => ErrorKind::State,
      Error::CyclicDependency { .. } => ErrorKind::CyclicDependency,
      Error::DepthExceeded { .. }
      | Error::TypeMismatch { .. }
      | Error::Unresolved { .. }
      | Error::DependencyIndex { .. } => ErrorKind::Resolution,
      Error::Factory { .. } => ErrorKind::Factory,
    }
  }

  /// Returns the original factory error if this is a [`Error::Factory`] holding an `E`.
  pub fn factory_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
    match self {
      Error::Factory { source } => source.downcast_ref::<E>(),
      _ => None,
    }
  }
}

/// A specialized `Result` type for `fibre_injector` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
