//! Precache manifest construction broken into focused submodules for easier testing.

mod collect;
mod entries;

pub use collect::collect_resources;
pub use entries::{ManifestEntry, ManifestUrlStyle, build_manifest, content_revision};
