//! Walk the relations of a worker's pages to find the resources it should precache.

use std::collections::{BTreeSet, VecDeque};

use crate::diagnostics::Diagnostics;
use crate::graph::{AssetGraph, AssetId};
use crate::selection::{ResourceSelection, SelectionContext};

/// Collect the distinct resources reachable from the context's pages, in discovery order.
///
/// Each page is expanded one hop. Inline assets (inline scripts, styles, nested documents) have
/// no URL of their own, so they are walked through transparently and their relations count as
/// the page's. Selected resources that failed to load are skipped, relaying the recorded load
/// failure once per resource.
pub fn collect_resources<G, S>(
  graph: &G,
  selection: &S,
  context: &SelectionContext<'_>,
  diagnostics: &mut Diagnostics,
) -> Vec<AssetId>
where
  G: AssetGraph + ?Sized,
  S: ResourceSelection + ?Sized,
{
  let mut collected = Vec::new();
  let mut seen = BTreeSet::new();
  let mut reported = BTreeSet::new();

  for page in context.pages {
    let mut visited_inline = BTreeSet::new();
    let mut queue = VecDeque::from([*page]);

    while let Some(source) = queue.pop_front() {
      for relation in graph.outgoing_relations(source) {
        let Some(target) = graph.asset(relation.to) else {
          continue;
        };

        if target.is_inline() {
          if relation.kind.is_precacheable() && visited_inline.insert(target.id) {
            queue.push_back(target.id);
          }
          continue;
        }

        if !selection.is_selected(&relation, target, context) {
          continue;
        }

        if !target.is_loaded {
          if reported.insert(target.id) {
            let detail = target
              .load_error
              .clone()
              .unwrap_or_else(|| format!("{}: failed to load", target.describe()));
            diagnostics.warn(detail);
          }
          continue;
        }

        if seen.insert(target.id) {
          collected.push(target.id);
        }
      }
    }
  }

  collected
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::{AssetType, InMemoryAssetGraph, NewAsset, RelationKind};
  use crate::grouping::Origin;
  use crate::selection::StaticResources;
  use url::Url;

  struct Fixture {
    graph: InMemoryAssetGraph,
    index: AssetId,
    other: AssetId,
    image: AssetId,
    script: AssetId,
    missing: AssetId,
  }

  fn url(path: &str) -> Url {
    Url::parse("file:///site/").unwrap().join(path).unwrap()
  }

  fn fixture() -> Fixture {
    let mut graph = InMemoryAssetGraph::new(url(""));
    let index = graph
      .add_asset(NewAsset::text(AssetType::Html, url("index.html"), "").initial())
      .unwrap();
    let other = graph
      .add_asset(NewAsset::text(AssetType::Html, url("otherpage.html"), "").initial())
      .unwrap();
    let image = graph
      .add_asset(NewAsset::binary(AssetType::Png, url("foo.png"), vec![1, 2, 3]))
      .unwrap();
    let inline = graph
      .add_asset(NewAsset::inline(AssetType::JavaScript, "import('./lazy.js')"))
      .unwrap();
    let script = graph
      .add_asset(NewAsset::text(AssetType::JavaScript, url("lazy.js"), "1"))
      .unwrap();
    let missing = graph
      .add_asset(NewAsset::failed(
        AssetType::JavaScript,
        url("notFound.js"),
        "ENOENT: no such file or directory, open '/site/notFound.js'",
      ))
      .unwrap();

    for (kind, from, to) in [
      (RelationKind::HtmlImage, index, image),
      (RelationKind::HtmlIFrame, index, other),
      (RelationKind::HtmlScript, index, inline),
      (RelationKind::JavaScriptStaticUrl, inline, script),
      (RelationKind::HtmlScript, index, missing),
      (RelationKind::HtmlImage, other, image),
      (RelationKind::HtmlScript, other, missing),
    ] {
      graph.add_relation(kind, from, to, None).unwrap();
    }

    Fixture {
      graph,
      index,
      other,
      image,
      script,
      missing,
    }
  }

  fn origin() -> Origin {
    Origin::of(&url(""))
  }

  #[test]
  fn walks_inline_assets_and_skips_failed_loads() {
    let fixture = fixture();
    let origin = origin();
    let pages = [fixture.index];
    let context = SelectionContext {
      origin: &origin,
      pages: &pages,
    };
    let mut diagnostics = Diagnostics::new();

    let resources = collect_resources(&fixture.graph, &StaticResources, &context, &mut diagnostics);

    assert_eq!(resources, vec![fixture.image, fixture.other, fixture.script]);
    assert!(!resources.contains(&fixture.missing));
    let warnings: Vec<&str> = diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("ENOENT"));
    assert!(warnings[0].contains("notFound.js"));
  }

  #[test]
  fn shared_resources_appear_once_across_pages() {
    let fixture = fixture();
    let origin = origin();
    let pages = [fixture.index, fixture.other];
    let context = SelectionContext {
      origin: &origin,
      pages: &pages,
    };
    let mut diagnostics = Diagnostics::new();

    let resources = collect_resources(&fixture.graph, &StaticResources, &context, &mut diagnostics);

    assert_eq!(resources, vec![fixture.image, fixture.script]);
    assert_eq!(diagnostics.warnings().count(), 1);
  }
}
