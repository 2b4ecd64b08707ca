//! Assets, relations and the identities used to address them.

use std::fmt;

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use url::Url;

/// Stable identity of an asset within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub usize);

impl fmt::Display for AssetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "asset#{}", self.0)
  }
}

/// Stable identity of a relation within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(pub usize);

/// Content type of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
  /// HTML document.
  Html,
  /// JavaScript source.
  JavaScript,
  /// Stylesheet.
  Css,
  /// PNG image.
  Png,
  /// JPEG image.
  Jpeg,
  /// GIF image.
  Gif,
  /// SVG image.
  Svg,
  /// Icon.
  Ico,
  /// JSON document (web app manifests and the like).
  Json,
  /// Plain text.
  Text,
  /// Anything not covered above.
  Other,
}

impl AssetType {
  /// Guess the asset type from a file name extension.
  pub fn from_file_name(file_name: &str) -> Self {
    let extension = file_name
      .rsplit_once('.')
      .map(|(_, ext)| ext.to_ascii_lowercase())
      .unwrap_or_default();
    match extension.as_str() {
      "html" | "htm" => Self::Html,
      "js" | "mjs" => Self::JavaScript,
      "css" => Self::Css,
      "png" => Self::Png,
      "jpg" | "jpeg" => Self::Jpeg,
      "gif" => Self::Gif,
      "svg" => Self::Svg,
      "ico" => Self::Ico,
      "json" | "webmanifest" => Self::Json,
      "txt" => Self::Text,
      _ => Self::Other,
    }
  }
}

/// Kind of a directed edge between two assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
  /// `<script>` element, inline or external.
  HtmlScript,
  /// `<link rel="stylesheet">` or `<style>`.
  HtmlStyle,
  /// `<img>` element.
  HtmlImage,
  /// `<iframe>` element.
  HtmlIFrame,
  /// `<link rel="icon">`, `<link rel="manifest">` and similar.
  HtmlLink,
  /// `<a href>`: navigation, never precached.
  HtmlAnchor,
  /// `url(...)` inside a stylesheet.
  CssImage,
  /// `@import` inside a stylesheet.
  CssImport,
  /// Literal URL string inside JavaScript.
  JavaScriptStaticUrl,
  /// `navigator.serviceWorker.register(...)` call.
  JavaScriptServiceWorkerRegistration,
}

impl RelationKind {
  /// Whether the target of this relation is a static resource the page needs to render.
  pub fn is_precacheable(self) -> bool {
    !matches!(
      self,
      Self::HtmlAnchor | Self::JavaScriptServiceWorkerRegistration
    )
  }
}

/// Body of an asset, either text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AssetBodyRepr", into = "AssetBodyRepr")]
pub enum AssetBody {
  /// Textual content.
  Text(String),
  /// Binary content.
  Binary(Vec<u8>),
}

impl AssetBody {
  /// Textual view of the body, if it is text.
  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(text) => Some(text),
      Self::Binary(_) => None,
    }
  }

  /// Raw bytes of the body.
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::Text(text) => text.as_bytes(),
      Self::Binary(bytes) => bytes,
    }
  }
}

impl Default for AssetBody {
  fn default() -> Self {
    Self::Text(String::new())
  }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum AssetBodyRepr {
  Text(String),
  Base64(String),
}

impl TryFrom<AssetBodyRepr> for AssetBody {
  type Error = base64::DecodeError;

  fn try_from(repr: AssetBodyRepr) -> Result<Self, Self::Error> {
    Ok(match repr {
      AssetBodyRepr::Text(text) => Self::Text(text),
      AssetBodyRepr::Base64(encoded) => Self::Binary(general_purpose::STANDARD.decode(encoded)?),
    })
  }
}

impl From<AssetBody> for AssetBodyRepr {
  fn from(body: AssetBody) -> Self {
    match body {
      AssetBody::Text(text) => Self::Text(text),
      AssetBody::Binary(bytes) => Self::Base64(general_purpose::STANDARD.encode(bytes)),
    }
  }
}

/// A node of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
  /// Identity of the asset.
  pub id: AssetId,
  /// Content type.
  #[serde(rename = "type")]
  pub asset_type: AssetType,
  /// Absolute URL; `None` for inline assets.
  #[serde(default)]
  pub url: Option<Url>,
  /// Current body.
  #[serde(default)]
  pub body: AssetBody,
  /// Whether the asset was one of the graph's entry points.
  #[serde(default)]
  pub is_initial: bool,
  /// Whether loading the asset succeeded.
  #[serde(default = "default_loaded")]
  pub is_loaded: bool,
  /// Failure detail recorded when loading did not succeed.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub load_error: Option<String>,
  /// Minification marker understood by the rest of the pipeline.
  #[serde(default)]
  pub to_be_minified: bool,
}

fn default_loaded() -> bool {
  true
}

impl Asset {
  /// Inline assets live inside another asset and have no URL of their own.
  pub fn is_inline(&self) -> bool {
    self.url.is_none()
  }

  /// Last path segment of the asset URL.
  pub fn file_name(&self) -> Option<&str> {
    self
      .url
      .as_ref()
      .and_then(|url| url.path_segments())
      .and_then(|mut segments| segments.next_back())
  }

  /// Text body, if the asset is textual.
  pub fn text(&self) -> Option<&str> {
    self.body.as_text()
  }

  /// Human readable location used in log lines.
  pub fn describe(&self) -> String {
    match &self.url {
      Some(url) => url.to_string(),
      None => format!("inline {:?} ({})", self.asset_type, self.id),
    }
  }
}

/// Description of an asset about to be inserted into a graph.
#[derive(Debug, Clone)]
pub struct NewAsset {
  /// Content type.
  pub asset_type: AssetType,
  /// Absolute URL; `None` for inline assets.
  pub url: Option<Url>,
  /// Initial body.
  pub body: AssetBody,
  /// Entry point marker.
  pub is_initial: bool,
  /// Load status.
  pub is_loaded: bool,
  /// Load failure detail.
  pub load_error: Option<String>,
}

impl NewAsset {
  /// A successfully loaded text asset at `url`.
  pub fn text(asset_type: AssetType, url: Url, text: impl Into<String>) -> Self {
    Self {
      asset_type,
      url: Some(url),
      body: AssetBody::Text(text.into()),
      is_initial: false,
      is_loaded: true,
      load_error: None,
    }
  }

  /// A successfully loaded binary asset at `url`.
  pub fn binary(asset_type: AssetType, url: Url, bytes: Vec<u8>) -> Self {
    Self {
      body: AssetBody::Binary(bytes),
      ..Self::text(asset_type, url, "")
    }
  }

  /// An inline text asset.
  pub fn inline(asset_type: AssetType, text: impl Into<String>) -> Self {
    Self {
      asset_type,
      url: None,
      body: AssetBody::Text(text.into()),
      is_initial: false,
      is_loaded: true,
      load_error: None,
    }
  }

  /// A referenced asset whose loading failed.
  pub fn failed(asset_type: AssetType, url: Url, error: impl Into<String>) -> Self {
    Self {
      is_loaded: false,
      load_error: Some(error.into()),
      ..Self::text(asset_type, url, "")
    }
  }

  /// Mark the asset as an entry point.
  pub fn initial(mut self) -> Self {
    self.is_initial = true;
    self
  }
}

/// A directed edge between two assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
  /// Identity of the relation.
  pub id: RelationId,
  /// Kind of reference.
  pub kind: RelationKind,
  /// Source asset.
  pub from: AssetId,
  /// Target asset.
  pub to: AssetId,
  /// Literal reference as written in the source asset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub href: Option<String>,
}
