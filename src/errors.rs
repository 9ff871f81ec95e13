use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Errors>;

#[derive(Debug, Error)]
pub enum Errors {
  #[error("spkv: bad value")]
  BadValue,

  #[error("spkv: key not found")]
  KeyNotFound,

  #[error("spkv: key is empty")]
  KeyIsEmpty,

  #[error("spkv: {0}")]
  Codec(#[from] CodecError),

  #[error("spkv: {0}")]
  Engine(#[from] EngineError),
}

impl Errors {
  /// Not-found is an expected outcome of `get`/`delete`, not a fault.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Errors::KeyNotFound)
  }
}

/// Failures converting a value to or from its stored bytes.
#[derive(Debug, Error)]
pub enum CodecError {
  #[error("failed to encode value: {0}")]
  Encode(#[source] bincode::Error),

  #[error("failed to decode value: {0}")]
  Decode(#[source] bincode::Error),

  #[error("stored value is empty")]
  Empty,

  #[error("unsupported value format version {0}")]
  UnsupportedVersion(u8),
}

/// Failures at or below the storage engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("timed out after {timeout:?} waiting for exclusive access to {}", .path.display())]
  LockTimeout { path: PathBuf, timeout: Duration },

  #[error("{} is not a valid store file: {reason}", .path.display())]
  InvalidFile { path: PathBuf, reason: String },

  #[error("io error: {0}")]
  Io(#[from] io::Error),

  #[error("storage engine error: {0}")]
  Db(#[from] jammdb::Error),
}

impl From<jammdb::Error> for Errors {
  fn from(e: jammdb::Error) -> Self {
    Errors::Engine(EngineError::Db(e))
  }
}

impl From<io::Error> for Errors {
  fn from(e: io::Error) -> Self {
    Errors::Engine(EngineError::Io(e))
  }
}
