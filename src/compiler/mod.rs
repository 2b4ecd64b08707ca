//! Precache compiler capability and the default template-based implementation.

mod handlers;
mod template;

pub use handlers::{Handler, resolve_handler};
pub use template::TemplatePrecacheCompiler;

use url::Url;

use crate::config::PrecacheConfig;
use crate::error::CompileError;
use crate::manifest::ManifestEntry;

/// Inputs handed to a precache compiler.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
  /// Resources to precache, addressed from the worker.
  pub entries: &'a [ManifestEntry],
  /// Final URL of the worker.
  pub target_url: &'a Url,
  /// Pass-through options.
  pub options: &'a PrecacheConfig,
}

/// Generated worker source and the warnings raised while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledWorker {
  /// JavaScript source of the worker.
  pub source: String,
  /// Warning-level messages, without any file name prefix.
  pub diagnostics: Vec<String>,
}

/// Turns a manifest and options into service worker source code.
pub trait PrecacheCompiler {
  /// Generate the worker for `request`.
  fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledWorker, CompileError>;
}

impl<C: PrecacheCompiler + ?Sized> PrecacheCompiler for &C {
  fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledWorker, CompileError> {
    (**self).compile(request)
  }
}

impl<C: PrecacheCompiler + ?Sized> PrecacheCompiler for Box<C> {
  fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledWorker, CompileError> {
    (**self).compile(request)
  }
}
