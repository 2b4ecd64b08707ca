//! Data structures produced while planning and generating service workers.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::config::PrecacheConfig;
use crate::graph::AssetId;
use crate::grouping::Origin;
use crate::manifest::ManifestEntry;
use crate::worker_paths::ResolvedWorkerPath;

/// A page selected to receive a service worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
  /// Identity of the page asset.
  pub id: AssetId,
  /// Absolute URL of the page.
  pub url: Url,
}

/// Pipeline stage of a worker group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  /// Partitioning pages into groups.
  Grouping,
  /// Computing the worker location.
  Resolving,
  /// Collecting the precache manifest.
  BuildingManifest,
  /// Generating and inserting the worker.
  Synthesizing,
  /// Registering the worker in its pages.
  Injecting,
  /// Everything succeeded.
  Done,
  /// A fatal error stopped the run.
  Failed,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Grouping => "grouping",
      Self::Resolving => "resolving",
      Self::BuildingManifest => "building-manifest",
      Self::Synthesizing => "synthesizing",
      Self::Injecting => "injecting",
      Self::Done => "done",
      Self::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Everything decided about a worker before the graph is touched.
#[derive(Debug, Clone)]
pub struct WorkerPlan {
  /// Origin shared by the member pages.
  pub origin: Origin,
  /// Pages that register the worker, in supplied order.
  pub pages: Vec<PageRef>,
  /// Location of the worker.
  pub path: ResolvedWorkerPath,
  /// Effective pass-through options.
  pub options: PrecacheConfig,
  /// Resources to precache.
  pub manifest: Vec<ManifestEntry>,
}

/// Outcome of a generated worker, returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
  /// URL of the inserted worker.
  pub url: Url,
  /// Identity of the inserted worker asset.
  pub worker: AssetId,
  /// Pages registering the worker.
  pub pages: Vec<AssetId>,
  /// Inline registration scripts added to the pages.
  pub registrations: Vec<AssetId>,
  /// Manifest URLs as written into the worker.
  pub manifest: Vec<String>,
}
