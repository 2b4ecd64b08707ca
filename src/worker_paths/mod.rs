//! Location and file name of generated service workers.
//!
//! The responsibilities are split into focused submodules so that the directory computation,
//! the naming policy and the URL rewriting can be tested independently.

mod directory;
mod naming;
mod relative;

use std::collections::BTreeSet;

pub use directory::common_directory;
pub use naming::{group_base_name, page_base_name};
pub use relative::{relative_href, root_relative_href};

use url::Url;

use crate::error::{GraphError, TransformError};
use crate::graph::AssetGraph;

/// Suffix appended to every generated worker file name.
pub const WORKER_FILE_SUFFIX: &str = "-precache-service-worker.js";

/// Final location of a service worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkerPath {
    /// Directory holding the worker, always ending in a slash.
    pub directory: Url,
    /// Base name derived from the member pages.
    pub base_name: String,
    /// File name of the worker.
    pub file_name: String,
    /// Absolute URL of the worker.
    pub url: Url,
}

/// Worker URLs handed out during a single run.
#[derive(Debug, Default)]
pub struct WorkerUrlRegistry {
    allocated: BTreeSet<Url>,
}

impl WorkerUrlRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&mut self, url: &Url) -> Result<(), TransformError> {
        if !self.allocated.insert(url.clone()) {
            return Err(TransformError::DuplicateWorkerUrl { url: url.clone() });
        }
        Ok(())
    }
}

/// Compute the worker location for a group of same-origin pages without reserving it.
pub fn locate_worker(page_urls: &[Url]) -> Result<ResolvedWorkerPath, TransformError> {
    let directory = common_directory(page_urls).ok_or_else(|| {
        TransformError::NoWorkerDirectory(
            page_urls
                .iter()
                .map(Url::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    })?;
    let base_name = group_base_name(page_urls);
    let file_name = format!("{base_name}{WORKER_FILE_SUFFIX}");
    let url = directory
        .join(&file_name)
        .map_err(|source| GraphError::InvalidUrl {
            href: file_name.clone(),
            source,
        })?;

    Ok(ResolvedWorkerPath {
        directory,
        base_name,
        file_name,
        url,
    })
}

/// Reserve a located worker URL for this run.
///
/// Fails when an asset already lives at the URL, or when the URL was handed to another group
/// earlier in the same run.
pub fn reserve_worker_path<G: AssetGraph + ?Sized>(
    graph: &G,
    path: &ResolvedWorkerPath,
    registry: &mut WorkerUrlRegistry,
) -> Result<(), TransformError> {
    if graph.asset_by_url(&path.url).is_some() {
        return Err(TransformError::TargetClobbered {
            url: path.url.clone(),
        });
    }
    registry.claim(&path.url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AssetType, InMemoryAssetGraph, NewAsset};

    fn graph() -> InMemoryAssetGraph {
        InMemoryAssetGraph::new(Url::parse("file:///site/").unwrap())
    }

    fn urls(values: &[&str]) -> Vec<Url> {
        values.iter().map(|value| Url::parse(value).unwrap()).collect()
    }

    #[test]
    fn names_worker_after_single_page() {
        let path = locate_worker(&urls(&["file:///site/index.html"])).unwrap();

        assert_eq!(path.file_name, "index-precache-service-worker.js");
        assert_eq!(path.url.as_str(), "file:///site/index-precache-service-worker.js");
        assert_eq!(path.directory.as_str(), "file:///site/");
    }

    #[test]
    fn places_shared_worker_at_common_prefix() {
        let path = locate_worker(&urls(&[
            "file:///site/path/to/index.html",
            "file:///site/path/to/other/otherpage.html",
        ]))
        .unwrap();

        assert_eq!(
            path.url.as_str(),
            "file:///site/path/to/index-otherpage-precache-service-worker.js"
        );
    }

    #[test]
    fn refuses_to_clobber_existing_assets() {
        let mut graph = graph();
        let taken = graph.resolve("index-precache-service-worker.js").unwrap();
        graph
            .add_asset(NewAsset::text(AssetType::JavaScript, taken.clone(), "alert(1);"))
            .unwrap();
        let path = locate_worker(&urls(&["file:///site/index.html"])).unwrap();

        let mut registry = WorkerUrlRegistry::new();
        let err = reserve_worker_path(&graph, &path, &mut registry).unwrap_err();
        assert!(matches!(err, TransformError::TargetClobbered { url } if url == taken));

        reserve_worker_path(&self::graph(), &path, &mut registry)
            .expect("a refused reservation must not claim the URL");
    }

    #[test]
    fn detects_urls_allocated_twice() {
        let graph = graph();
        let mut registry = WorkerUrlRegistry::new();
        let path = locate_worker(&urls(&["file:///site/index.html"])).unwrap();
        reserve_worker_path(&graph, &path, &mut registry).unwrap();

        let err = reserve_worker_path(&graph, &path, &mut registry).unwrap_err();
        assert!(matches!(err, TransformError::DuplicateWorkerUrl { .. }));
    }
}
