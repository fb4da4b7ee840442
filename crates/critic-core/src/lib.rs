#![forbid(unsafe_code)]
//! critic-core library: critical path analysis of Maven reactor builds.
//!
//! # Conventions
//!
//! - **Errors**: Parsing and graph functions return `Result<T, CriticError>`;
//!   file-reading entry points return `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod analysis;
pub mod config;
pub mod duration;
pub mod error;
pub mod graph;
pub mod module;
pub mod reactor;

pub use analysis::{AnalysisInputs, CriticalPathAnalysis, CriticalPathReport, PathStep};
pub use config::{CriticConfig, load_config};
pub use error::{CriticError, ErrorCode};
pub use module::{Module, ModuleRegistry};
