use serde::Deserialize;

use super::model::{Asset, AssetType};

/// Attribute filter used to select assets from a graph.
///
/// Every field left as `None` matches any value, so the default query matches every asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetQuery {
  /// Required asset type.
  #[serde(rename = "type")]
  pub asset_type: Option<AssetType>,
  /// Required entry point flag.
  pub is_initial: Option<bool>,
  /// Required inline flag.
  pub is_inline: Option<bool>,
  /// Required load status.
  pub is_loaded: Option<bool>,
  /// Required file name.
  pub file_name: Option<String>,
}

impl AssetQuery {
  /// Non-inline HTML pages flagged as entry points.
  pub fn initial_pages() -> Self {
    Self {
      asset_type: Some(AssetType::Html),
      is_initial: Some(true),
      is_inline: Some(false),
      ..Self::default()
    }
  }

  /// Whether the asset satisfies every constraint of the query.
  pub fn matches(&self, asset: &Asset) -> bool {
    self.asset_type.is_none_or(|expected| asset.asset_type == expected)
      && self.is_initial.is_none_or(|expected| asset.is_initial == expected)
      && self.is_inline.is_none_or(|expected| asset.is_inline() == expected)
      && self.is_loaded.is_none_or(|expected| asset.is_loaded == expected)
      && self
        .file_name
        .as_deref()
        .is_none_or(|expected| asset.file_name() == Some(expected))
  }
}
