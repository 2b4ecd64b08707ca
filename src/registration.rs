//! Inject the service worker bootstrap into HTML pages.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::error::TransformError;
use crate::graph::{AssetGraph, AssetId, AssetType, NewAsset, RelationKind};
use crate::models::PageRef;
use crate::worker_paths::{relative_href, root_relative_href};

/// Bootstrap script registering the worker at `href` once the page has loaded.
pub fn registration_script(href: &str) -> String {
  let href = href.replace('\\', "\\\\").replace('\'', "\\'");
  format!(
    "if ('serviceWorker' in navigator) {{\n  window.addEventListener('load', function () {{\n    navigator.serviceWorker.register('{href}');\n  }});\n}}"
  )
}

/// Worker URL as written in a page's registration call.
pub fn registration_href(
  graph_root: &Url,
  canonical_root: Option<&str>,
  page_url: &Url,
  worker_url: &Url,
) -> String {
  match canonical_root {
    Some(canonical_root) => root_relative_href(canonical_root, graph_root, worker_url),
    None => relative_href(page_url, worker_url),
  }
}

/// Insert `element` before the last closing body tag of `html`, or append it.
pub fn insert_before_body_end(html: &str, element: &str) -> String {
  static BODY_END: OnceLock<Regex> = OnceLock::new();
  let pattern =
    BODY_END.get_or_init(|| Regex::new(r"(?i)</body\s*>").expect("invalid body regex"));

  match pattern.find_iter(html).last() {
    Some(found) => {
      let mut patched = String::with_capacity(html.len() + element.len());
      patched.push_str(&html[..found.start()]);
      patched.push_str(element);
      patched.push_str(&html[found.start()..]);
      patched
    }
    None => format!("{html}{element}"),
  }
}

/// Register `worker` in `page`.
///
/// The page text gains an inline `<script>` element, the graph gains an inline JavaScript
/// asset for it (linked by an `HtmlScript` relation) and a registration relation from the page
/// to the worker. Returns the inline script asset.
pub fn inject_registration<G: AssetGraph + ?Sized>(
  graph: &mut G,
  page: &PageRef,
  worker: AssetId,
  worker_url: &Url,
  canonical_root: Option<&str>,
  minify: bool,
) -> Result<AssetId, TransformError> {
  let href = registration_href(graph.root(), canonical_root, &page.url, worker_url);
  let script = registration_script(&href);

  let html = graph
    .asset(page.id)
    .and_then(|asset| asset.text())
    .unwrap_or_default();
  let patched = insert_before_body_end(html, &format!("<script>{script}</script>"));
  graph.set_text(page.id, patched)?;

  let inline = graph.add_asset(NewAsset::inline(AssetType::JavaScript, script))?;
  graph.add_relation(RelationKind::HtmlScript, page.id, inline, None)?;
  graph.add_relation(
    RelationKind::JavaScriptServiceWorkerRegistration,
    page.id,
    worker,
    Some(href),
  )?;

  if minify {
    graph.mark_to_be_minified(inline)?;
  }

  tracing::debug!(page = %page.url, worker = %worker_url, "registered service worker");
  Ok(inline)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::InMemoryAssetGraph;
  use pretty_assertions::assert_eq;

  #[test]
  fn inserts_before_the_last_body_end() {
    assert_eq!(
      insert_before_body_end("<body><p></p></BODY >", "<script></script>"),
      "<body><p></p><script></script></BODY >"
    );
    assert_eq!(
      insert_before_body_end("<p>fragment</p>", "<script></script>"),
      "<p>fragment</p><script></script>"
    );
  }

  #[test]
  fn script_escapes_quotes() {
    let script = registration_script("it's.js");
    assert!(script.contains("navigator.serviceWorker.register('it\\'s.js');"));
  }

  #[test]
  fn href_uses_canonical_root_when_set() {
    let root = Url::parse("file:///site/").unwrap();
    let page = root.join("sub/index.html").unwrap();
    let worker = root.join("index-precache-service-worker.js").unwrap();

    assert_eq!(
      registration_href(&root, None, &page, &worker),
      "../index-precache-service-worker.js"
    );
    assert_eq!(
      registration_href(&root, Some("/my-app"), &page, &worker),
      "/my-app/index-precache-service-worker.js"
    );
  }

  #[test]
  fn injects_script_and_relations() {
    let root = Url::parse("file:///site/").unwrap();
    let mut graph = InMemoryAssetGraph::new(root.clone());
    let page_url = root.join("index.html").unwrap();
    let page = graph
      .add_asset(
        NewAsset::text(AssetType::Html, page_url.clone(), "<html><body></body></html>").initial(),
      )
      .unwrap();
    let worker_url = root.join("index-precache-service-worker.js").unwrap();
    let worker = graph
      .add_asset(NewAsset::text(AssetType::JavaScript, worker_url.clone(), ""))
      .unwrap();

    let inline = inject_registration(
      &mut graph,
      &PageRef {
        id: page,
        url: page_url,
      },
      worker,
      &worker_url,
      None,
      true,
    )
    .unwrap();

    let html = graph.asset(page).unwrap().text().unwrap();
    assert!(html.contains("register('index-precache-service-worker.js')"));
    assert!(html.ends_with("</script></body></html>"));

    let script = graph.asset(inline).unwrap();
    assert!(script.is_inline());
    assert!(script.to_be_minified);

    let registrations = graph.relations_of_kind(RelationKind::JavaScriptServiceWorkerRegistration);
    assert_eq!(registrations.len(), 1);
    assert_eq!((registrations[0].from, registrations[0].to), (page, worker));
    assert_eq!(graph.relations_of_kind(RelationKind::HtmlScript).len(), 1);
  }
}
