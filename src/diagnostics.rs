//! Collector for non-fatal conditions raised while transforming a graph.
//!
//! Every stage receives the collector by mutable reference, so warnings keep the order in
//! which they were raised and survive a failed run. Each entry is also emitted as a
//! `tracing` event when it is recorded.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  /// Informational notice, nothing is wrong.
  Info,
  /// Something was skipped or degraded.
  Warn,
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  /// Severity of the entry.
  pub severity: Severity,
  /// Human readable message.
  pub message: String,
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.severity {
      Severity::Info => write!(f, "info: {}", self.message),
      Severity::Warn => write!(f, "warning: {}", self.message),
    }
  }
}

/// Ordered list of diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
  entries: Vec<Diagnostic>,
}

impl Diagnostics {
  /// Create an empty collector.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a warning.
  pub fn warn(&mut self, message: impl Into<String>) {
    let message = message.into();
    tracing::warn!("{message}");
    self.entries.push(Diagnostic {
      severity: Severity::Warn,
      message,
    });
  }

  /// Record an informational notice.
  pub fn info(&mut self, message: impl Into<String>) {
    let message = message.into();
    tracing::info!("{message}");
    self.entries.push(Diagnostic {
      severity: Severity::Info,
      message,
    });
  }

  /// Every entry in the order it was recorded.
  pub fn entries(&self) -> &[Diagnostic] {
    &self.entries
  }

  /// Messages of the given severity.
  pub fn messages(&self, severity: Severity) -> impl Iterator<Item = &str> {
    self
      .entries
      .iter()
      .filter(move |entry| entry.severity == severity)
      .map(|entry| entry.message.as_str())
  }

  /// Warning messages.
  pub fn warnings(&self) -> impl Iterator<Item = &str> {
    self.messages(Severity::Warn)
  }

  /// Informational messages.
  pub fn infos(&self) -> impl Iterator<Item = &str> {
    self.messages(Severity::Info)
  }

  /// True when nothing was recorded.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
