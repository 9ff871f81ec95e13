//! Per-store diagnostic output.
//!
//! A store never touches process-wide logger state. Diagnostic lines go to
//! the sink injected through [`Options`](crate::option::Options), or to the
//! `log` facade when debug output is requested without an explicit sink.

use std::{fmt, sync::Arc};

use log::info;

/// Prefix carried by every diagnostic line.
pub const LOG_PREFIX: &str = "spkv ";

/// Destination for diagnostic lines.
pub trait DiagnosticSink: Send + Sync {
  fn emit(&self, line: &str);
}

impl<F> DiagnosticSink for F
where
  F: Fn(&str) + Send + Sync,
{
  fn emit(&self, line: &str) {
    self(line)
  }
}

/// Forwards diagnostic lines to the `log` facade under the `spkv` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
  fn emit(&self, line: &str) {
    info!(target: "spkv", "{}", line);
  }
}

/// Handle used by a store to emit diagnostics. Disabled handles format nothing.
#[derive(Clone, Default)]
pub struct Diagnostics {
  sink: Option<Arc<dyn DiagnosticSink>>,
}

impl Diagnostics {
  pub fn new(debug: bool, sink: Option<Arc<dyn DiagnosticSink>>) -> Self {
    if !debug {
      return Self::disabled();
    }
    let sink: Arc<dyn DiagnosticSink> = match sink {
      Some(sink) => sink,
      None => Arc::new(LogSink),
    };
    Self { sink: Some(sink) }
  }

  pub fn disabled() -> Self {
    Self { sink: None }
  }

  pub fn is_enabled(&self) -> bool {
    self.sink.is_some()
  }

  pub fn emit(&self, args: fmt::Arguments<'_>) {
    if let Some(sink) = &self.sink {
      sink.emit(&format!("{LOG_PREFIX}{args}"));
    }
  }
}

impl fmt::Debug for Diagnostics {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Diagnostics")
      .field("enabled", &self.is_enabled())
      .finish()
  }
}
