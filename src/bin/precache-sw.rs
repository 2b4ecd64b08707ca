use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use precache_worker::graph::{AssetId, GraphSnapshot};
use precache_worker::{
  AssetGraph, AssetQuery, Diagnostics, InMemoryAssetGraph, PrecacheConfig, TransformOptions,
  WorkerSummary, add_precache_service_workers,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
  name = "precache-sw",
  about = "Add precaching service workers to a JSON asset graph snapshot"
)]
struct Cli {
  /// Graph snapshot to transform
  #[arg(long)]
  graph: PathBuf,

  /// Where to write the transformed snapshot (defaults to overwriting --graph)
  #[arg(long)]
  output: Option<PathBuf>,

  /// Also write generated workers and patched pages below this directory
  #[arg(long)]
  write_dir: Option<PathBuf>,

  /// Share one worker between all pages of the same origin
  #[arg(long)]
  single: bool,

  /// Mark generated scripts for minification
  #[arg(long)]
  minify: bool,

  /// Explicit precache config file (JSON or YAML)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Public prefix for root-relative URLs, for example /my-app
  #[arg(long)]
  canonical_root: Option<String>,

  /// JSON asset query selecting the pages, for example '{"type":"Html","fileName":"index.html"}'
  #[arg(long)]
  query: Option<String>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("precache_worker=info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let raw = fs::read_to_string(&cli.graph)
    .with_context(|| format!("failed to read {}", cli.graph.display()))?;
  let snapshot: GraphSnapshot = serde_json::from_str(&raw)
    .with_context(|| format!("failed to parse {}", cli.graph.display()))?;
  let mut graph = InMemoryAssetGraph::from_snapshot(snapshot)
    .with_context(|| format!("invalid graph snapshot {}", cli.graph.display()))?;

  let query = match &cli.query {
    Some(query) => serde_json::from_str::<AssetQuery>(query).context("invalid --query")?,
    None => AssetQuery::initial_pages(),
  };
  let options = TransformOptions {
    query,
    single: cli.single,
    minify: cli.minify,
    config_path: cli.config.clone(),
    canonical_root: cli.canonical_root.clone(),
    precache: PrecacheConfig::default(),
  };

  let mut diagnostics = Diagnostics::new();
  // Each diagnostic already reaches stderr as a tracing event.
  let workers = add_precache_service_workers(&mut graph, &options, &mut diagnostics)?;

  let output = cli.output.as_ref().unwrap_or(&cli.graph);
  let json = serde_json::to_string_pretty(&graph.to_snapshot())?;
  fs::write(output, json).with_context(|| format!("failed to write {}", output.display()))?;

  if let Some(dir) = &cli.write_dir {
    write_outputs(&graph, &workers, dir)?;
  }

  println!("{}", serde_json::to_string_pretty(&workers)?);
  Ok(())
}

fn write_outputs(graph: &InMemoryAssetGraph, workers: &[WorkerSummary], dir: &Path) -> Result<()> {
  for summary in workers {
    write_asset(graph, summary.worker, dir)?;
    for page in &summary.pages {
      write_asset(graph, *page, dir)?;
    }
  }
  Ok(())
}

fn write_asset(graph: &InMemoryAssetGraph, id: AssetId, dir: &Path) -> Result<()> {
  let asset = graph
    .asset(id)
    .with_context(|| format!("{id} vanished from the graph"))?;
  let (Some(url), Some(text)) = (&asset.url, asset.text()) else {
    return Ok(());
  };

  let relative = url
    .as_str()
    .strip_prefix(graph.root().as_str())
    .unwrap_or_else(|| url.path().trim_start_matches('/'));
  let destination = dir.join(relative);
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  fs::write(&destination, text)
    .with_context(|| format!("failed to write {}", destination.display()))?;
  tracing::debug!(path = %destination.display(), "wrote asset");
  Ok(())
}
