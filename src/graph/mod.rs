//! Asset graph capability consumed by the precache transformation.
//!
//! The transformation never assumes a concrete representation: it only talks to the
//! [`AssetGraph`] trait. [`InMemoryAssetGraph`] is the implementation shipped with the crate,
//! used by the CLI (through JSON snapshots) and throughout the tests.

mod memory;
mod model;
mod query;

pub use memory::{GraphSnapshot, InMemoryAssetGraph};
pub use model::{Asset, AssetBody, AssetId, AssetType, NewAsset, Relation, RelationId, RelationKind};
pub use query::AssetQuery;

use url::Url;

use crate::error::GraphError;

/// Mutable store of assets and the relations between them.
pub trait AssetGraph {
  /// Root URL the graph was loaded from.
  fn root(&self) -> &Url;

  /// Look up an asset by identity.
  fn asset(&self, id: AssetId) -> Option<&Asset>;

  /// Identities of every asset matching the query, in insertion order.
  fn find_assets(&self, query: &AssetQuery) -> Vec<AssetId>;

  /// Identity of the asset addressed by `url`, if any.
  fn asset_by_url(&self, url: &Url) -> Option<AssetId>;

  /// Outgoing relations of an asset, in insertion order.
  fn outgoing_relations(&self, id: AssetId) -> Vec<Relation>;

  /// Insert a new asset. Fails when another asset already owns the URL.
  fn add_asset(&mut self, asset: NewAsset) -> Result<AssetId, GraphError>;

  /// Insert a relation between two existing assets.
  fn add_relation(
    &mut self,
    kind: RelationKind,
    from: AssetId,
    to: AssetId,
    href: Option<String>,
  ) -> Result<RelationId, GraphError>;

  /// Replace the text body of an asset.
  fn set_text(&mut self, id: AssetId, text: String) -> Result<(), GraphError>;

  /// Flag an asset for the downstream minification pass.
  fn mark_to_be_minified(&mut self, id: AssetId) -> Result<(), GraphError>;
}
