//! Error types returned by the precache transformation and its collaborators.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::graph::AssetId;

/// Failures raised by an [`crate::graph::AssetGraph`] implementation.
#[derive(Debug, Error)]
pub enum GraphError {
  /// The referenced asset does not exist.
  #[error("unknown asset {0}")]
  UnknownAsset(AssetId),
  /// Another asset already lives at the URL.
  #[error("an asset already exists at {0}")]
  UrlTaken(Url),
  /// A reference could not be resolved to an absolute URL.
  #[error("cannot resolve {href}: {source}")]
  InvalidUrl {
    /// Reference that failed to resolve.
    href: String,
    /// Underlying parse error.
    source: url::ParseError,
  },
}

/// Failures while loading a precache configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse a JSON configuration file.
  #[error("failed to parse {}: {source}", path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// Failed to parse a YAML configuration file.
  #[error("failed to parse {}: {source}", path.display())]
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_yaml::Error,
  },
  /// An exclusion glob is malformed.
  #[error("invalid excludeFromPrecache pattern {pattern:?}: {source}")]
  Glob {
    /// Offending pattern.
    pattern: String,
    /// Source glob error.
    source: globset::Error,
  },
}

/// Failures reported by a [`crate::compiler::PrecacheCompiler`].
#[derive(Debug, Error)]
pub enum CompileError {
  /// The compiler was handed an option it refuses to honour.
  #[error("The {0} config option is not supported at present, sorry!")]
  UnsupportedOption(&'static str),
  /// A runtime caching rule names a handler the compiler does not know.
  #[error("unknown runtime caching handler {0:?}")]
  UnknownHandler(String),
  /// A runtime caching rule carries an unusable URL pattern.
  #[error("invalid runtime caching urlPattern {pattern:?}: {source}")]
  InvalidUrlPattern {
    /// Offending pattern.
    pattern: String,
    /// Source regex error.
    source: regex::Error,
  },
  /// Generation failed for another reason.
  #[error("failed to generate service worker: {0}")]
  Generation(String),
}

/// Fatal failures of the whole transformation.
#[derive(Debug, Error)]
pub enum TransformError {
  /// Inline or file options contain an option that is refused up front.
  #[error("The {0} config option is not supported at present, sorry!")]
  UnsupportedOption(&'static str),
  /// The computed worker URL already names an asset in the graph.
  #[error("There is already a service worker at {url} -- giving up")]
  TargetClobbered {
    /// URL that would have been overwritten.
    url: Url,
  },
  /// Two worker groups resolved to the same URL within a run.
  #[error("service worker URL {url} was allocated twice in the same run")]
  DuplicateWorkerUrl {
    /// URL allocated twice.
    url: Url,
  },
  /// The member pages have no hierarchical URL to derive a worker directory from.
  #[error("cannot derive a service worker directory for [{0}]")]
  NoWorkerDirectory(String),
  /// The precache compiler failed for a worker.
  #[error("{file_name}: {source}")]
  Compile {
    /// File name of the worker being generated.
    file_name: String,
    /// Source compiler error.
    source: CompileError,
  },
  /// A configuration file could not be used.
  #[error(transparent)]
  Config(#[from] ConfigError),
  /// The graph rejected a mutation.
  #[error(transparent)]
  Graph(#[from] GraphError),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clobber_message_names_the_url() {
    let url = Url::parse("file:///site/index-precache-service-worker.js").unwrap();
    let err = TransformError::TargetClobbered { url };
    assert_eq!(
      err.to_string(),
      "There is already a service worker at file:///site/index-precache-service-worker.js -- giving up"
    );
  }

  #[test]
  fn unsupported_option_message_is_fixed() {
    assert_eq!(
      TransformError::UnsupportedOption("globPatterns").to_string(),
      "The globPatterns config option is not supported at present, sorry!"
    );
  }
}
