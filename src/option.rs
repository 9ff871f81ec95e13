use std::{fmt, path::PathBuf, sync::Arc, time::Duration};

use crate::diag::{DiagnosticSink, Diagnostics};

/// How long `open` waits for exclusive access to the store file.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

pub const DEFAULT_PATH: &str = "spkv.db";

/// Owner read/write, group read.
pub const DEFAULT_FILE_MODE: u32 = 0o640;

/// Open-time configuration. Zero values (`Duration::ZERO`, an empty path,
/// mode `0`) are replaced by the documented defaults when the store opens.
#[derive(Clone)]
pub struct Options {
  pub timeout: Duration,

  pub path: PathBuf,

  /// Permission bits applied when the data file is created.
  pub file_mode: u32,

  /// Emit a diagnostic line for every operation and its outcome.
  pub debug: bool,

  /// Receives diagnostic lines when `debug` is set. Falls back to the `log` facade.
  pub sink: Option<Arc<dyn DiagnosticSink>>,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      timeout: DEFAULT_TIMEOUT,
      path: PathBuf::from(DEFAULT_PATH),
      file_mode: DEFAULT_FILE_MODE,
      debug: false,
      sink: None,
    }
  }
}

impl Options {
  pub fn with_sink<S>(mut self, sink: S) -> Self
  where
    S: DiagnosticSink + 'static,
  {
    let sink: Arc<dyn DiagnosticSink> = Arc::new(sink);
    self.sink = Some(sink);
    self
  }

  /// Replaces every zero-valued field with its default.
  pub fn resolve(mut self, diag: &Diagnostics) -> Self {
    if self.timeout.is_zero() {
      self.timeout = DEFAULT_TIMEOUT;
      diag.emit(format_args!("using default timeout of {:?}", DEFAULT_TIMEOUT));
    }

    if self.path.as_os_str().is_empty() {
      self.path = PathBuf::from(DEFAULT_PATH);
      diag.emit(format_args!("using default path of {}", DEFAULT_PATH));
    }

    if self.file_mode == 0 {
      self.file_mode = DEFAULT_FILE_MODE;
      diag.emit(format_args!("using default file mode of {:o}", DEFAULT_FILE_MODE));
    }

    self
  }
}

impl fmt::Debug for Options {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Options")
      .field("timeout", &self.timeout)
      .field("path", &self.path)
      .field("file_mode", &format_args!("{:o}", self.file_mode))
      .field("debug", &self.debug)
      .field("sink", &self.sink.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;

  use super::*;

  fn zero_options() -> Options {
    Options {
      timeout: Duration::ZERO,
      path: PathBuf::new(),
      file_mode: 0,
      debug: false,
      sink: None,
    }
  }

  #[test]
  fn test_resolve_zero_values() {
    let opts = zero_options().resolve(&Diagnostics::disabled());
    assert_eq!(opts.timeout, DEFAULT_TIMEOUT);
    assert_eq!(opts.path, PathBuf::from(DEFAULT_PATH));
    assert_eq!(opts.file_mode, 0o640);
    assert!(!opts.debug);
  }

  #[test]
  fn test_resolve_keeps_explicit_values() {
    let opts = Options {
      timeout: Duration::from_secs(1),
      path: PathBuf::from("/tmp/spkv-explicit.db"),
      file_mode: 0o600,
      debug: true,
      sink: None,
    }
    .resolve(&Diagnostics::disabled());

    assert_eq!(opts.timeout, Duration::from_secs(1));
    assert_eq!(opts.path, PathBuf::from("/tmp/spkv-explicit.db"));
    assert_eq!(opts.file_mode, 0o600);
    assert!(opts.debug);
  }

  #[test]
  fn test_default_matches_resolved_zero() {
    let def = Options::default();
    let resolved = zero_options().resolve(&Diagnostics::disabled());
    assert_eq!(def.timeout, resolved.timeout);
    assert_eq!(def.path, resolved.path);
    assert_eq!(def.file_mode, resolved.file_mode);
  }

  #[test]
  fn test_resolve_reports_substitutions() {
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let captured = lines.clone();
    let opts = zero_options().with_sink(move |line: &str| captured.lock().push(line.to_string()));
    let diag = Diagnostics::new(true, opts.sink.clone());

    opts.resolve(&diag);

    let lines = lines.lock();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("spkv using default timeout"));
    assert_eq!(lines[1], "spkv using default path of spkv.db");
    assert_eq!(lines[2], "spkv using default file mode of 640");
  }
}
