//! In-memory graph implementation with JSON snapshot support.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::AssetGraph;
use super::model::{Asset, AssetId, NewAsset, Relation, RelationId, RelationKind};
use super::query::AssetQuery;
use crate::error::GraphError;

/// Serialisable form of an [`InMemoryAssetGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
  /// Root URL of the graph.
  pub root: Url,
  /// Every asset, indexed by its identity.
  #[serde(default)]
  pub assets: Vec<Asset>,
  /// Every relation, indexed by its identity.
  #[serde(default)]
  pub relations: Vec<Relation>,
}

/// Vector-backed asset graph.
#[derive(Debug, Clone)]
pub struct InMemoryAssetGraph {
  root: Url,
  assets: Vec<Asset>,
  relations: Vec<Relation>,
  by_url: HashMap<Url, AssetId>,
}

impl InMemoryAssetGraph {
  /// Create an empty graph rooted at `root`.
  pub fn new(root: Url) -> Self {
    Self {
      root,
      assets: Vec::new(),
      relations: Vec::new(),
      by_url: HashMap::new(),
    }
  }

  /// Rebuild a graph from a snapshot, validating identities and URL uniqueness.
  pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
    let mut graph = Self::new(snapshot.root);

    for (index, asset) in snapshot.assets.into_iter().enumerate() {
      if asset.id != AssetId(index) {
        return Err(GraphError::UnknownAsset(asset.id));
      }
      if let Some(url) = &asset.url {
        if graph.by_url.contains_key(url) {
          return Err(GraphError::UrlTaken(url.clone()));
        }
        graph.by_url.insert(url.clone(), asset.id);
      }
      graph.assets.push(asset);
    }

    for relation in snapshot.relations {
      graph.add_relation(relation.kind, relation.from, relation.to, relation.href)?;
    }

    Ok(graph)
  }

  /// Owned snapshot of the graph suitable for serialisation.
  pub fn to_snapshot(&self) -> GraphSnapshot {
    GraphSnapshot {
      root: self.root.clone(),
      assets: self.assets.clone(),
      relations: self.relations.clone(),
    }
  }

  /// Every asset in insertion order.
  pub fn assets(&self) -> &[Asset] {
    &self.assets
  }

  /// Every relation in insertion order.
  pub fn relations(&self) -> &[Relation] {
    &self.relations
  }

  /// Relations of the given kind.
  pub fn relations_of_kind(&self, kind: RelationKind) -> Vec<&Relation> {
    self
      .relations
      .iter()
      .filter(|relation| relation.kind == kind)
      .collect()
  }

  /// Resolve `href` against the graph root.
  pub fn resolve(&self, href: &str) -> Result<Url, GraphError> {
    self
      .root
      .join(href)
      .map_err(|source| GraphError::InvalidUrl {
        href: href.to_string(),
        source,
      })
  }

  fn asset_mut(&mut self, id: AssetId) -> Result<&mut Asset, GraphError> {
    self.assets.get_mut(id.0).ok_or(GraphError::UnknownAsset(id))
  }
}

impl AssetGraph for InMemoryAssetGraph {
  fn root(&self) -> &Url {
    &self.root
  }

  fn asset(&self, id: AssetId) -> Option<&Asset> {
    self.assets.get(id.0)
  }

  fn find_assets(&self, query: &AssetQuery) -> Vec<AssetId> {
    self
      .assets
      .iter()
      .filter(|asset| query.matches(asset))
      .map(|asset| asset.id)
      .collect()
  }

  fn asset_by_url(&self, url: &Url) -> Option<AssetId> {
    self.by_url.get(url).copied()
  }

  fn outgoing_relations(&self, id: AssetId) -> Vec<Relation> {
    self
      .relations
      .iter()
      .filter(|relation| relation.from == id)
      .cloned()
      .collect()
  }

  fn add_asset(&mut self, asset: NewAsset) -> Result<AssetId, GraphError> {
    let id = AssetId(self.assets.len());
    if let Some(url) = &asset.url {
      if self.by_url.contains_key(url) {
        return Err(GraphError::UrlTaken(url.clone()));
      }
      self.by_url.insert(url.clone(), id);
    }

    self.assets.push(Asset {
      id,
      asset_type: asset.asset_type,
      url: asset.url,
      body: asset.body,
      is_initial: asset.is_initial,
      is_loaded: asset.is_loaded,
      load_error: asset.load_error,
      to_be_minified: false,
    });
    Ok(id)
  }

  fn add_relation(
    &mut self,
    kind: RelationKind,
    from: AssetId,
    to: AssetId,
    href: Option<String>,
  ) -> Result<RelationId, GraphError> {
    for endpoint in [from, to] {
      if self.asset(endpoint).is_none() {
        return Err(GraphError::UnknownAsset(endpoint));
      }
    }

    let id = RelationId(self.relations.len());
    self.relations.push(Relation {
      id,
      kind,
      from,
      to,
      href,
    });
    Ok(id)
  }

  fn set_text(&mut self, id: AssetId, text: String) -> Result<(), GraphError> {
    self.asset_mut(id)?.body = super::AssetBody::Text(text);
    Ok(())
  }

  fn mark_to_be_minified(&mut self, id: AssetId) -> Result<(), GraphError> {
    self.asset_mut(id)?.to_be_minified = true;
    Ok(())
  }
}
