//! Partition pages into groups that may share one service worker.

use std::fmt;

use url::Url;

use crate::diagnostics::Diagnostics;
use crate::models::PageRef;

/// Notice emitted when shared mode has to fall back to one worker per origin.
pub const ORIGIN_SPLIT_NOTICE: &str =
  "addPrecacheServiceWorker: HTML assets reside on different domains or schemes, creating a service worker per origin";

/// Security boundary a service worker is confined to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
  scheme: String,
  host: String,
  port: Option<u16>,
}

impl Origin {
  /// Origin of `url`. URLs without a network host (such as `file:`) share one origin per scheme.
  pub fn of(url: &Url) -> Self {
    Self {
      scheme: url.scheme().to_string(),
      host: url.host_str().unwrap_or_default().to_string(),
      port: url.port_or_known_default(),
    }
  }
}

impl fmt::Display for Origin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}://{}", self.scheme, self.host)?;
    if let Some(port) = self.port {
      write!(f, ":{port}")?;
    }
    Ok(())
  }
}

/// Pages on the same origin, in the order they were supplied.
#[derive(Debug, Clone)]
pub struct OriginGroup {
  /// Origin shared by every page.
  pub origin: Origin,
  /// Member pages.
  pub pages: Vec<PageRef>,
}

/// Group pages by origin, ordered by first appearance. Emits a notice when more than one group
/// results.
pub fn group_by_origin(pages: Vec<PageRef>, diagnostics: &mut Diagnostics) -> Vec<OriginGroup> {
  let mut groups: Vec<OriginGroup> = Vec::new();

  for page in pages {
    let origin = Origin::of(&page.url);
    match groups.iter_mut().find(|group| group.origin == origin) {
      Some(group) => group.pages.push(page),
      None => groups.push(OriginGroup {
        origin,
        pages: vec![page],
      }),
    }
  }

  if groups.len() > 1 {
    diagnostics.info(ORIGIN_SPLIT_NOTICE);
  }
  groups
}

/// One group per page, used when every page gets its own worker.
pub fn singleton_groups(pages: Vec<PageRef>) -> Vec<OriginGroup> {
  pages
    .into_iter()
    .map(|page| OriginGroup {
      origin: Origin::of(&page.url),
      pages: vec![page],
    })
    .collect()
}
