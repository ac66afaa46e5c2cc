//! Generation pipeline module.
//!
//! - `model`: script, storyboard frames, loading and session state
//! - `orchestrator`: sequential image pipeline with per-frame retry

pub mod model;
pub mod orchestrator;

pub use model::*;
pub use orchestrator::{Orchestrator, PipelineConfig, RunSummary};
