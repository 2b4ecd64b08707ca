//! Precache configuration files and the pass-through options they carry.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File names probed, in order, in a worker's directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = [
  "precache-config.json",
  "precache-config.yaml",
  "precache-config.yml",
];

/// Options handed through to the precache compiler.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrecacheConfig {
  /// Not supported: the manifest always comes from the asset graph.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub glob_patterns: Option<serde_json::Value>,
  /// Rules applied to requests that are not precached.
  pub runtime_caching: Vec<RuntimeCachingRule>,
  /// Globs, matched against graph-relative paths, that keep resources out of the manifest.
  pub exclude_from_precache: Vec<String>,
  /// URL served for navigation requests that miss the cache.
  pub navigate_fallback: Option<String>,
  /// Index file appended to requests ending in a slash.
  pub directory_index: Option<String>,
  /// Regular expressions for query parameters ignored when matching the precache.
  pub ignore_url_parameters_matching: Vec<String>,
  /// Prefix for the cache names used by the worker.
  pub cache_id: Option<String>,
  /// Activate new workers without waiting for old clients to close.
  pub skip_waiting: bool,
  /// Take control of uncontrolled clients on activation.
  pub clients_claim: bool,
  /// Resources larger than this are left out of the manifest.
  pub maximum_file_size_to_cache_in_bytes: Option<u64>,
}

/// A runtime caching rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeCachingRule {
  /// Regular expression matched against request URLs.
  pub url_pattern: String,
  /// Strategy name, for example `CacheFirst` or `StaleWhileRevalidate`.
  pub handler: String,
  /// Strategy options.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub options: Option<RuntimeCachingOptions>,
}

/// Options for a runtime caching strategy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeCachingOptions {
  /// Dedicated cache name for the rule.
  pub cache_name: Option<String>,
  /// Seconds before a network-first request falls back to the cache.
  pub network_timeout_seconds: Option<u32>,
}

impl PrecacheConfig {
  /// Read configuration from a JSON or YAML file, returning `None` when it does not exist.
  pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
      Err(err) => {
        return Err(ConfigError::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let config = if is_yaml {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      })?
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      })?
    };
    Ok(Some(config))
  }

  /// Attempt to load configuration from the conventional file names inside `dir`.
  ///
  /// Unreadable or malformed files are skipped silently so that an unrelated file cannot break
  /// the build; callers wanting loud failures should pass an explicit path to [`Self::load`].
  pub fn discover(dir: &Path) -> Option<Self> {
    DEFAULT_CONFIG_FILES.iter().find_map(|name| {
      let candidate = dir.join(name);
      match Self::load(&candidate) {
        Ok(config) => config,
        Err(err) => {
          tracing::debug!("ignoring conventional precache config: {err}");
          None
        }
      }
    })
  }

  /// Name of the first option present that is refused outright.
  pub fn unsupported_option(&self) -> Option<&'static str> {
    self.glob_patterns.is_some().then_some("globPatterns")
  }

  /// Layer `self` on top of `base`: scalar options set in `self` win, lists are concatenated.
  pub fn merged_over(self, base: &PrecacheConfig) -> PrecacheConfig {
    let mut runtime_caching = base.runtime_caching.clone();
    runtime_caching.extend(self.runtime_caching);
    let mut exclude_from_precache = base.exclude_from_precache.clone();
    exclude_from_precache.extend(self.exclude_from_precache);
    let mut ignore_url_parameters_matching = base.ignore_url_parameters_matching.clone();
    ignore_url_parameters_matching.extend(self.ignore_url_parameters_matching);

    PrecacheConfig {
      glob_patterns: self.glob_patterns.or_else(|| base.glob_patterns.clone()),
      runtime_caching,
      exclude_from_precache,
      navigate_fallback: self
        .navigate_fallback
        .or_else(|| base.navigate_fallback.clone()),
      directory_index: self.directory_index.or_else(|| base.directory_index.clone()),
      ignore_url_parameters_matching,
      cache_id: self.cache_id.or_else(|| base.cache_id.clone()),
      skip_waiting: self.skip_waiting || base.skip_waiting,
      clients_claim: self.clients_claim || base.clients_claim,
      maximum_file_size_to_cache_in_bytes: self
        .maximum_file_size_to_cache_in_bytes
        .or(base.maximum_file_size_to_cache_in_bytes),
    }
  }

  /// Compile `excludeFromPrecache` into a matcher, `None` when no pattern is configured.
  pub fn exclusion_set(&self) -> Result<Option<GlobSet>, ConfigError> {
    if self.exclude_from_precache.is_empty() {
      return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in &self.exclude_from_precache {
      let glob = Glob::new(pattern).map_err(|source| ConfigError::Glob {
        pattern: pattern.clone(),
        source,
      })?;
      builder.add(glob);
    }
    builder
      .build()
      .map(Some)
      .map_err(|source| ConfigError::Glob {
        pattern: self.exclude_from_precache.join(", "),
        source,
      })
  }
}
