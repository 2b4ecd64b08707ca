//! Precache orchestrator: plans one service worker per page group and wires it into the graph.

use std::path::PathBuf;

use crate::compiler::{PrecacheCompiler, TemplatePrecacheCompiler};
use crate::config::PrecacheConfig;
use crate::diagnostics::Diagnostics;
use crate::error::TransformError;
use crate::graph::{AssetGraph, AssetQuery, AssetType};
use crate::grouping::{OriginGroup, group_by_origin, singleton_groups};
use crate::manifest::{ManifestUrlStyle, build_manifest};
use crate::models::{PageRef, Stage, WorkerPlan, WorkerSummary};
use crate::registration::inject_registration;
use crate::selection::{ResourceSelection, SelectionContext, StaticResources};
use crate::synthesize::synthesize_worker;
use crate::worker_paths::{WorkerUrlRegistry, locate_worker, reserve_worker_path};

/// Caller-facing switches of a precache run.
#[derive(Debug, Clone)]
pub struct TransformOptions {
  /// Pages that receive a worker.
  pub query: AssetQuery,
  /// Share one worker between all same-origin pages instead of one per page.
  pub single: bool,
  /// Flag inserted scripts for minification.
  pub minify: bool,
  /// Explicit configuration file; when absent the worker directory is probed.
  pub config_path: Option<PathBuf>,
  /// Public prefix for root-relative URLs, for example `/my-app`.
  pub canonical_root: Option<String>,
  /// Inline pass-through options, overridden by file configuration.
  pub precache: PrecacheConfig,
}

impl Default for TransformOptions {
  fn default() -> Self {
    Self {
      query: AssetQuery::initial_pages(),
      single: false,
      minify: false,
      config_path: None,
      canonical_root: None,
      precache: PrecacheConfig::default(),
    }
  }
}

/// High-level helper adding precaching service workers to an asset graph.
pub struct PrecacheBuilder<'a, C, S = StaticResources> {
  options: &'a TransformOptions,
  compiler: C,
  selection: S,
}

impl<'a, C: PrecacheCompiler> PrecacheBuilder<'a, C> {
  /// Create a builder using the default resource selection.
  pub fn new(options: &'a TransformOptions, compiler: C) -> Self {
    Self {
      options,
      compiler,
      selection: StaticResources,
    }
  }
}

impl<'a, C: PrecacheCompiler, S: ResourceSelection> PrecacheBuilder<'a, C, S> {
  /// Replace the predicate deciding which resources are precached.
  pub fn with_selection<T: ResourceSelection>(self, selection: T) -> PrecacheBuilder<'a, C, T> {
    PrecacheBuilder {
      options: self.options,
      compiler: self.compiler,
      selection,
    }
  }

  /// Run the transformation.
  ///
  /// Every group is planned before the graph is touched, so configuration problems and
  /// clobbered targets abort the run without mutating anything. A compiler failure in a later
  /// group leaves the workers of earlier groups in place.
  pub fn build<G: AssetGraph + ?Sized>(
    &self,
    graph: &mut G,
    diagnostics: &mut Diagnostics,
  ) -> Result<Vec<WorkerSummary>, TransformError> {
    let plans = self.plan(graph, diagnostics).inspect_err(|err| {
      tracing::error!(stage = %Stage::Failed, "{err}");
    })?;

    let mut summaries = Vec::with_capacity(plans.len());
    for plan in plans {
      let summary = self.execute(graph, &plan, diagnostics).inspect_err(|err| {
        tracing::error!(stage = %Stage::Failed, worker = %plan.path.url, "{err}");
      })?;
      summaries.push(summary);
    }

    tracing::info!(stage = %Stage::Done, workers = summaries.len());
    Ok(summaries)
  }

  fn plan<G: AssetGraph + ?Sized>(
    &self,
    graph: &G,
    diagnostics: &mut Diagnostics,
  ) -> Result<Vec<WorkerPlan>, TransformError> {
    if let Some(option) = self.options.precache.unsupported_option() {
      return Err(TransformError::UnsupportedOption(option));
    }
    let explicit_config = self.load_explicit_config(diagnostics);
    if let Some(option) = explicit_config
      .as_ref()
      .and_then(PrecacheConfig::unsupported_option)
    {
      return Err(TransformError::UnsupportedOption(option));
    }

    tracing::info!(stage = %Stage::Grouping, single = self.options.single);
    let pages = self.select_pages(graph);
    let groups = if self.options.single {
      group_by_origin(pages, diagnostics)
    } else {
      singleton_groups(pages)
    };

    let url_style = match &self.options.canonical_root {
      Some(canonical_root) => ManifestUrlStyle::CanonicalRoot {
        canonical_root,
        graph_root: graph.root(),
      },
      None => ManifestUrlStyle::RelativeToWorker,
    };

    let mut registry = WorkerUrlRegistry::new();
    let mut plans = Vec::with_capacity(groups.len());
    for OriginGroup { origin, pages } in groups {
      let page_urls: Vec<_> = pages.iter().map(|page| page.url.clone()).collect();
      tracing::info!(stage = %Stage::Resolving, origin = %origin, pages = pages.len());
      let path = locate_worker(&page_urls)?;

      let file_options = match &explicit_config {
        Some(config) => Some(config.clone()),
        None => path
          .directory
          .to_file_path()
          .ok()
          .and_then(|dir| PrecacheConfig::discover(&dir)),
      };
      let options = match file_options {
        Some(file_options) => file_options.merged_over(&self.options.precache),
        None => self.options.precache.clone(),
      };
      if let Some(option) = options.unsupported_option() {
        return Err(TransformError::UnsupportedOption(option));
      }
      reserve_worker_path(graph, &path, &mut registry)?;

      tracing::info!(stage = %Stage::BuildingManifest, worker = %path.url);
      let page_ids: Vec<_> = pages.iter().map(|page| page.id).collect();
      let context = SelectionContext {
        origin: &origin,
        pages: &page_ids,
      };
      let manifest = build_manifest(
        graph,
        &self.selection,
        &context,
        &path.url,
        url_style,
        &options,
        diagnostics,
      )?;

      plans.push(WorkerPlan {
        origin,
        pages,
        path,
        options,
        manifest,
      });
    }

    Ok(plans)
  }

  fn execute<G: AssetGraph + ?Sized>(
    &self,
    graph: &mut G,
    plan: &WorkerPlan,
    diagnostics: &mut Diagnostics,
  ) -> Result<WorkerSummary, TransformError> {
    tracing::info!(stage = %Stage::Synthesizing, worker = %plan.path.url);
    let worker = synthesize_worker(
      graph,
      &self.compiler,
      plan,
      self.options.minify,
      diagnostics,
    )?;

    tracing::info!(stage = %Stage::Injecting, worker = %plan.path.url);
    let mut registrations = Vec::with_capacity(plan.pages.len());
    for page in &plan.pages {
      registrations.push(inject_registration(
        graph,
        page,
        worker,
        &plan.path.url,
        self.options.canonical_root.as_deref(),
        self.options.minify,
      )?);
    }

    Ok(WorkerSummary {
      url: plan.path.url.clone(),
      worker,
      pages: plan.pages.iter().map(|page| page.id).collect(),
      registrations,
      manifest: plan.manifest.iter().map(|entry| entry.url.clone()).collect(),
    })
  }

  /// Non-inline HTML assets matched by the query; anything else cannot register a worker.
  fn select_pages<G: AssetGraph + ?Sized>(&self, graph: &G) -> Vec<PageRef> {
    graph
      .find_assets(&self.options.query)
      .into_iter()
      .filter_map(|id| {
        let asset = graph.asset(id)?;
        if asset.asset_type != AssetType::Html {
          return None;
        }
        let url = asset.url.clone()?;
        Some(PageRef { id, url })
      })
      .collect()
  }

  fn load_explicit_config(&self, diagnostics: &mut Diagnostics) -> Option<PrecacheConfig> {
    let path = self.options.config_path.as_ref()?;
    match PrecacheConfig::load(path) {
      Ok(Some(config)) => Some(config),
      Ok(None) => {
        diagnostics.warn(format!(
          "{}: precache config not found, continuing without it",
          path.display()
        ));
        None
      }
      Err(err) => {
        diagnostics.warn(format!("{err}, continuing without it"));
        None
      }
    }
  }
}

/// Add precaching service workers to `graph` using the default compiler and selection.
pub fn add_precache_service_workers<G: AssetGraph + ?Sized>(
  graph: &mut G,
  options: &TransformOptions,
  diagnostics: &mut Diagnostics,
) -> Result<Vec<WorkerSummary>, TransformError> {
  PrecacheBuilder::new(options, TemplatePrecacheCompiler).build(graph, diagnostics)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::{AssetType, InMemoryAssetGraph, NewAsset, RelationKind};
  use url::Url;

  fn site() -> InMemoryAssetGraph {
    let root = Url::parse("file:///nonexistent-site/").unwrap();
    let mut graph = InMemoryAssetGraph::new(root.clone());
    let page = graph
      .add_asset(
        NewAsset::text(AssetType::Html, root.join("index.html").unwrap(), "<body></body>")
          .initial(),
      )
      .unwrap();
    let style = graph
      .add_asset(NewAsset::text(AssetType::Css, root.join("style.css").unwrap(), "body{}"))
      .unwrap();
    graph
      .add_relation(RelationKind::HtmlStyle, page, style, None)
      .unwrap();
    graph
  }

  #[test]
  fn rejects_glob_patterns_before_mutating() {
    let mut graph = site();
    let before = graph.assets().len();
    let options = TransformOptions {
      precache: PrecacheConfig {
        glob_patterns: Some(serde_json::json!(["**/*.js"])),
        ..PrecacheConfig::default()
      },
      ..TransformOptions::default()
    };

    let err =
      add_precache_service_workers(&mut graph, &options, &mut Diagnostics::new()).unwrap_err();

    assert_eq!(
      err.to_string(),
      "The globPatterns config option is not supported at present, sorry!"
    );
    assert_eq!(graph.assets().len(), before);
  }

  #[test]
  fn custom_selection_narrows_the_manifest() {
    let mut graph = site();
    let options = TransformOptions::default();
    let nothing = |_: &crate::graph::Relation, _: &crate::graph::Asset, _: &SelectionContext<'_>| false;

    let summaries = PrecacheBuilder::new(&options, TemplatePrecacheCompiler)
      .with_selection(nothing)
      .build(&mut graph, &mut Diagnostics::new())
      .unwrap();

    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].manifest.is_empty());
  }

  #[test]
  fn missing_explicit_config_warns_and_continues() {
    let mut graph = site();
    let options = TransformOptions {
      config_path: Some(PathBuf::from("/nonexistent-site/missing-config.json")),
      ..TransformOptions::default()
    };
    let mut diagnostics = Diagnostics::new();

    let summaries = add_precache_service_workers(&mut graph, &options, &mut diagnostics).unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].manifest, vec!["style.css"]);
    let warnings: Vec<_> = diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("missing-config.json"));
  }

  #[test]
  fn queries_matching_scripts_only_reach_html_pages() {
    let mut graph = site();
    let script_url = graph.resolve("app.js").unwrap();
    let script = graph
      .add_asset(NewAsset::text(AssetType::JavaScript, script_url, "1").initial())
      .unwrap();
    let options = TransformOptions {
      query: AssetQuery {
        is_initial: Some(true),
        ..AssetQuery::default()
      },
      ..TransformOptions::default()
    };

    let summaries =
      add_precache_service_workers(&mut graph, &options, &mut Diagnostics::new()).unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(
      summaries[0].url.as_str(),
      "file:///nonexistent-site/index-precache-service-worker.js"
    );
    assert_eq!(graph.asset(script).unwrap().text(), Some("1"));
    let unwanted = graph.resolve("app-precache-service-worker.js").unwrap();
    assert_eq!(graph.asset_by_url(&unwanted), None);
  }

  #[test]
  fn inline_html_is_not_treated_as_a_page() {
    let mut graph = site();
    let page = graph.assets()[0].id;
    let srcdoc = graph
      .add_asset(NewAsset::inline(AssetType::Html, "<p>framed</p>"))
      .unwrap();
    graph
      .add_relation(RelationKind::HtmlIFrame, page, srcdoc, None)
      .unwrap();
    let options = TransformOptions {
      query: AssetQuery {
        asset_type: Some(AssetType::Html),
        ..AssetQuery::default()
      },
      ..TransformOptions::default()
    };

    let summaries =
      add_precache_service_workers(&mut graph, &options, &mut Diagnostics::new()).unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].pages, vec![page]);
    assert_eq!(graph.asset(srcdoc).unwrap().text(), Some("<p>framed</p>"));
  }
}
