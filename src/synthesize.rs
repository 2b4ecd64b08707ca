//! Generate a planned worker and insert it into the graph.

use crate::compiler::{CompileRequest, PrecacheCompiler};
use crate::diagnostics::Diagnostics;
use crate::error::{GraphError, TransformError};
use crate::graph::{AssetGraph, AssetId, AssetType, NewAsset, RelationKind};
use crate::models::WorkerPlan;

/// Compile the worker described by `plan`, insert it and link it to every precached resource.
///
/// Compiler warnings are relayed with the worker file name prepended. Nothing is inserted when
/// compilation fails.
pub fn synthesize_worker<G, C>(
  graph: &mut G,
  compiler: &C,
  plan: &WorkerPlan,
  minify: bool,
  diagnostics: &mut Diagnostics,
) -> Result<AssetId, TransformError>
where
  G: AssetGraph + ?Sized,
  C: PrecacheCompiler + ?Sized,
{
  let file_name = &plan.path.file_name;
  let compiled = compiler
    .compile(&CompileRequest {
      entries: &plan.manifest,
      target_url: &plan.path.url,
      options: &plan.options,
    })
    .map_err(|source| TransformError::Compile {
      file_name: file_name.clone(),
      source,
    })?;

  for message in compiled.diagnostics {
    diagnostics.warn(format!("{file_name}: {message}"));
  }

  let worker = graph
    .add_asset(NewAsset::text(
      AssetType::JavaScript,
      plan.path.url.clone(),
      compiled.source,
    ))
    .map_err(|err| match err {
      GraphError::UrlTaken(url) => TransformError::TargetClobbered { url },
      other => other.into(),
    })?;

  for entry in &plan.manifest {
    graph.add_relation(
      RelationKind::JavaScriptStaticUrl,
      worker,
      entry.asset,
      Some(entry.url.clone()),
    )?;
  }

  if minify {
    graph.mark_to_be_minified(worker)?;
  }

  tracing::debug!(
    worker = %plan.path.url,
    entries = plan.manifest.len(),
    "inserted service worker"
  );
  Ok(worker)
}
