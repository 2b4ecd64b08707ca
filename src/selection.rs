//! Predicates deciding which resources end up in a precache manifest.

use crate::graph::{Asset, AssetId, Relation};
use crate::grouping::Origin;

/// What a selection predicate knows about the worker being planned.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
  /// Origin of the worker.
  pub origin: &'a Origin,
  /// Pages registering the worker.
  pub pages: &'a [AssetId],
}

/// Trait describing which relation targets are worth precaching.
///
/// The manifest builder only consults the predicate for URL-addressable targets. Targets that
/// are selected but failed to load are skipped by the builder, with a warning, regardless of
/// what the predicate says.
pub trait ResourceSelection {
  /// Returns `true` when `target`, reached through `relation`, belongs in the manifest.
  fn is_selected(&self, relation: &Relation, target: &Asset, context: &SelectionContext<'_>)
  -> bool;
}

/// Default selection: static resources on the worker's origin, excluding the pages themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticResources;

impl ResourceSelection for StaticResources {
  fn is_selected(
    &self,
    relation: &Relation,
    target: &Asset,
    context: &SelectionContext<'_>,
  ) -> bool {
    let Some(url) = &target.url else {
      return false;
    };

    relation.kind.is_precacheable()
      && !context.pages.contains(&target.id)
      && Origin::of(url) == *context.origin
  }
}

impl<F> ResourceSelection for F
where
  F: Fn(&Relation, &Asset, &SelectionContext<'_>) -> bool,
{
  fn is_selected(
    &self,
    relation: &Relation,
    target: &Asset,
    context: &SelectionContext<'_>,
  ) -> bool {
    self(relation, target, context)
  }
}
