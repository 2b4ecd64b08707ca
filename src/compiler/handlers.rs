//! Runtime caching strategy names, including the deprecated lower-camel-case spellings.

use std::fmt;

use crate::error::CompileError;

/// Runtime caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
  /// Serve from cache, fall back to the network.
  CacheFirst,
  /// Serve from cache only.
  CacheOnly,
  /// Try the network, fall back to the cache.
  NetworkFirst,
  /// Always use the network.
  NetworkOnly,
  /// Serve from cache and refresh in the background.
  StaleWhileRevalidate,
}

const HANDLERS: [Handler; 5] = [
  Handler::CacheFirst,
  Handler::CacheOnly,
  Handler::NetworkFirst,
  Handler::NetworkOnly,
  Handler::StaleWhileRevalidate,
];

impl Handler {
  /// Current spelling of the strategy.
  pub fn name(self) -> &'static str {
    match self {
      Self::CacheFirst => "CacheFirst",
      Self::CacheOnly => "CacheOnly",
      Self::NetworkFirst => "NetworkFirst",
      Self::NetworkOnly => "NetworkOnly",
      Self::StaleWhileRevalidate => "StaleWhileRevalidate",
    }
  }

  fn deprecated_name(self) -> &'static str {
    match self {
      Self::CacheFirst => "cacheFirst",
      Self::CacheOnly => "cacheOnly",
      Self::NetworkFirst => "networkFirst",
      Self::NetworkOnly => "networkOnly",
      Self::StaleWhileRevalidate => "staleWhileRevalidate",
    }
  }
}

impl fmt::Display for Handler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Resolve a configured handler name.
///
/// Deprecated spellings still resolve, together with a warning naming the old and the new
/// spelling.
pub fn resolve_handler(name: &str) -> Result<(Handler, Option<String>), CompileError> {
  if let Some(handler) = HANDLERS.into_iter().find(|handler| handler.name() == name) {
    return Ok((handler, None));
  }

  if let Some(handler) = HANDLERS
    .into_iter()
    .find(|handler| handler.deprecated_name() == name)
  {
    let warning = format!(
      "Specifying '{name}' in a 'runtimeCaching[].handler' option is deprecated. \
       Please update your config to use '{}' instead.",
      handler.name()
    );
    return Ok((handler, Some(warning)));
  }

  Err(CompileError::UnknownHandler(name.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn current_names_resolve_silently() {
    assert_eq!(
      resolve_handler("StaleWhileRevalidate").unwrap(),
      (Handler::StaleWhileRevalidate, None)
    );
  }

  #[test]
  fn deprecated_names_resolve_with_warning() {
    let (handler, warning) = resolve_handler("cacheFirst").unwrap();
    assert_eq!(handler, Handler::CacheFirst);
    assert_eq!(
      warning.as_deref(),
      Some(
        "Specifying 'cacheFirst' in a 'runtimeCaching[].handler' option is deprecated. \
         Please update your config to use 'CacheFirst' instead."
      )
    );
  }

  #[test]
  fn unknown_names_are_rejected() {
    assert!(matches!(
      resolve_handler("fastest"),
      Err(CompileError::UnknownHandler(name)) if name == "fastest"
    ));
  }
}
