//! Generation client boundary.
//!
//! The pipeline talks to the generative service only through
//! [`GenerationClient`]; [`GeminiClient`] is the HTTP implementation.

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::brief::CreativeBrief;
use crate::credential::Credential;
use crate::error::GenerationResult;
use crate::pipeline::model::{DataUri, FramePlan, ScriptResult, StoryboardFrame};

pub use gemini::GeminiClient;

/// Script, storyboard plan and music prompt for one brief.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptPackage {
    pub script: ScriptResult,
    pub storyboard: Vec<FramePlan>,
    pub music_prompt: String,
}

/// Remote generation operations.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produces the script, storyboard plan and music prompt for a brief.
    async fn script_and_storyboard(
        &self,
        credential: &Credential,
        brief: &CreativeBrief,
    ) -> GenerationResult<ScriptPackage>;

    /// Produces the image for one storyboard frame.
    async fn frame_image(
        &self,
        credential: &Credential,
        frame: &StoryboardFrame,
        brief: &CreativeBrief,
    ) -> GenerationResult<DataUri>;
}
