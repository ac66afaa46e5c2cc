//! Briefboard - turns a marketing creative brief into a script, a music
//! prompt and a storyboard with one generated image per scene.
//!
//! The crate is organised around a single pipeline:
//!
//! - **Brief form**: raw input validated into an immutable `CreativeBrief`
//! - **Generation client**: the remote service behind the `GenerationClient` trait
//! - **Orchestrator**: script phase, then one image request per frame in order,
//!   with per-frame retry that never touches sibling frames
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use briefboard::{
//!     BriefForm, ClientConfig, CredentialStore, GeminiClient, ImageFile, Orchestrator,
//!     PipelineConfig,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let brief = BriefForm::new()
//!     .with_combined_image(ImageFile::from_path("model-with-product.jpg".as_ref())?)
//!     .with_product_link("https://shop.example/p/123")
//!     .validate()?;
//!
//! let credential = CredentialStore::default_location()?.load()?;
//! let client = Arc::new(GeminiClient::new(ClientConfig::default())?);
//! let orchestrator =
//!     Orchestrator::new(client, PipelineConfig::default()).with_credential(credential);
//!
//! let summary = orchestrator.run_full_generation(brief).await?;
//! if summary.failed > 0 {
//!     orchestrator.regenerate_frame(0).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod brief;
pub mod client;
pub mod credential;
pub mod error;
pub mod pipeline;
pub mod view;

// Re-exports for convenience
pub use brief::{BriefForm, CreativeBrief, ImageFile};
pub use client::gemini::ClientConfig;
pub use client::{GeminiClient, GenerationClient, ScriptPackage};
pub use credential::{Credential, CredentialStore};
pub use error::{BriefError, CredentialError, GenerationError, GenerationResult, PipelineError};
pub use pipeline::{Orchestrator, PipelineConfig, RunSummary, SessionState, StoryboardFrame};
