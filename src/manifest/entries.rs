//! Turn collected resources into manifest entries addressed from the worker.

use serde::Serialize;
use url::Url;

use super::collect::collect_resources;
use crate::config::PrecacheConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ConfigError;
use crate::graph::{Asset, AssetGraph, AssetId};
use crate::selection::{ResourceSelection, SelectionContext};
use crate::worker_paths::{relative_href, root_relative_href};

/// One resource the worker precaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
  /// URL as written in the worker.
  pub url: String,
  /// Identity of the cached resource.
  pub asset: AssetId,
  /// Content hash used to invalidate stale cache entries.
  pub revision: String,
}

/// How manifest URLs are written.
#[derive(Debug, Clone, Copy)]
pub enum ManifestUrlStyle<'a> {
  /// Relative to the worker's own URL.
  RelativeToWorker,
  /// Root-relative below a canonical public root.
  CanonicalRoot {
    /// Public prefix, for example `/my-app`.
    canonical_root: &'a str,
    /// Root of the graph the prefix stands for.
    graph_root: &'a Url,
  },
}

impl ManifestUrlStyle<'_> {
  fn href(&self, worker_url: &Url, target: &Url) -> String {
    match self {
      Self::RelativeToWorker => relative_href(worker_url, target),
      Self::CanonicalRoot {
        canonical_root,
        graph_root,
      } => root_relative_href(canonical_root, graph_root, target),
    }
  }
}

/// Hex md5 digest of an asset body.
pub fn content_revision(asset: &Asset) -> String {
  format!("{:x}", md5::compute(asset.body.as_bytes()))
}

/// Build the manifest for a worker whose URL is already fixed.
///
/// Resources matching `excludeFromPrecache` (tested against their path below the graph root)
/// are dropped silently; resources above `maximumFileSizeToCacheInBytes` are dropped with a
/// warning.
pub fn build_manifest<G, S>(
  graph: &G,
  selection: &S,
  context: &SelectionContext<'_>,
  worker_url: &Url,
  url_style: ManifestUrlStyle<'_>,
  options: &PrecacheConfig,
  diagnostics: &mut Diagnostics,
) -> Result<Vec<ManifestEntry>, ConfigError>
where
  G: AssetGraph + ?Sized,
  S: ResourceSelection + ?Sized,
{
  let exclusions = options.exclusion_set()?;
  let mut entries = Vec::new();

  for id in collect_resources(graph, selection, context, diagnostics) {
    let Some(asset) = graph.asset(id) else {
      continue;
    };
    let Some(url) = &asset.url else {
      continue;
    };

    if let Some(exclusions) = &exclusions {
      let graph_path = root_relative_href("", graph.root(), url);
      if exclusions.is_match(graph_path.trim_start_matches('/')) {
        tracing::debug!(resource = %url, "excluded from precache");
        continue;
      }
    }

    let size = asset.body.as_bytes().len();
    if let Some(limit) = options.maximum_file_size_to_cache_in_bytes
      && size as u64 > limit
    {
      diagnostics.warn(format!(
        "{url}: {size} bytes exceeds maximumFileSizeToCacheInBytes ({limit}), not precaching"
      ));
      continue;
    }

    entries.push(ManifestEntry {
      url: url_style.href(worker_url, url),
      asset: id,
      revision: content_revision(asset),
    });
  }

  Ok(entries)
}
