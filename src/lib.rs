#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod grouping;
pub mod manifest;
pub mod models;
pub mod registration;
pub mod selection;
pub mod synthesize;
pub mod worker_paths;

pub use builder::{PrecacheBuilder, TransformOptions, add_precache_service_workers};
pub use compiler::{CompileRequest, CompiledWorker, PrecacheCompiler, TemplatePrecacheCompiler};
pub use config::PrecacheConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CompileError, ConfigError, GraphError, TransformError};
pub use graph::{AssetGraph, AssetQuery, GraphSnapshot, InMemoryAssetGraph};
pub use models::WorkerSummary;
pub use selection::{ResourceSelection, StaticResources};
