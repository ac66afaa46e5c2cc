//! Drives a brief through the script phase and the per-frame image phase.
//!
//! All session state sits in a `watch` channel. Every mutation is a single
//! `send_modify`/`send_if_modified` call that touches either one frame index
//! or the whole set, so subscribers always see a consistent snapshot and
//! `regenerate_frame` can run alongside an active `run_full_generation`.
//! The channel lock is never held across an await.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::watch;

use crate::brief::CreativeBrief;
use crate::client::GenerationClient;
use crate::credential::Credential;
use crate::error::{GenerationError, PipelineError};
use crate::pipeline::model::*;

pub const SCRIPT_PHASE_MESSAGE: &str = "Menganalisis brief dan membuat naskah...";
pub const IMAGE_PHASE_MESSAGE: &str = "Membuat visual untuk setiap adegan...";

/// Pacing for the image phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Wait before every frame request except the first.
    pub frame_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(1000),
        }
    }
}

impl PipelineConfig {
    /// Builder: set frame delay.
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }
}

/// Outcome counts of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub ready: usize,
    pub failed: usize,
}

enum Claim {
    Absent,
    Busy,
    Claimed {
        brief: Arc<CreativeBrief>,
        frame: StoryboardFrame,
        run: u64,
    },
}

/// Owns the session and sequences generation requests.
pub struct Orchestrator {
    client: Arc<dyn GenerationClient>,
    config: PipelineConfig,
    credential: RwLock<Option<Credential>>,
    state: watch::Sender<SessionState>,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn GenerationClient>, config: PipelineConfig) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            client,
            config,
            credential: RwLock::new(None),
            state,
        }
    }

    /// Builder: start with a credential loaded from storage.
    pub fn with_credential(self, credential: Option<Credential>) -> Self {
        self.set_credential(credential);
        self
    }

    /// Replaces the in-memory credential after an explicit save.
    pub fn set_credential(&self, credential: Option<Credential>) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_ok()
    }

    fn credential(&self) -> Result<Credential, PipelineError> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PipelineError::MissingCredential)
    }

    /// Receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Clears brief, script, storyboard, music prompt and loading state.
    /// Results still in flight from an earlier run are discarded.
    pub fn reset_all(&self) {
        self.state.send_modify(|s| {
            *s = SessionState {
                run: s.run + 1,
                ..Default::default()
            };
        });
        tracing::debug!("Session reset");
    }

    /// Applies `f` only if the session still belongs to `run`.
    fn update_run<F>(&self, run: u64, f: F) -> Result<(), PipelineError>
    where
        F: FnOnce(&mut SessionState),
    {
        let applied = self.state.send_if_modified(|s| {
            if s.run != run {
                return false;
            }
            f(s);
            true
        });
        if applied {
            Ok(())
        } else {
            tracing::warn!(run, "Discarding result of superseded run");
            Err(PipelineError::Superseded)
        }
    }

    /// Generates script, music prompt and storyboard for `brief`, then one
    /// image per frame, strictly in order.
    ///
    /// A failed frame is left without an image and does not stop the run.
    /// A failed script phase ends the run with the error in the loading
    /// message.
    pub async fn run_full_generation(
        &self,
        brief: CreativeBrief,
    ) -> Result<RunSummary, PipelineError> {
        let credential = self.credential()?;
        let brief = Arc::new(brief);

        let mut run = 0;
        self.state.send_modify(|s| {
            *s = SessionState {
                brief: Some(Arc::clone(&brief)),
                loading: LoadingState::busy(SCRIPT_PHASE_MESSAGE, 0),
                run: s.run + 1,
                ..Default::default()
            };
            run = s.run;
        });
        tracing::info!(run, frames = brief.frame_count.get(), "Starting generation run");

        // Script phase
        let package = match self.client.script_and_storyboard(&credential, &brief).await {
            Ok(package) => package,
            Err(e) => {
                tracing::error!(run, error = %e, "Script phase failed");
                let message = format!("Error: {}", e);
                self.update_run(run, |s| s.loading = LoadingState::idle(message, None))?;
                return Err(e.into());
            }
        };

        let frames: Vec<StoryboardFrame> = package
            .storyboard
            .into_iter()
            .map(|plan| {
                let mut frame = StoryboardFrame::planned(plan);
                frame.begin_attempt();
                frame
            })
            .collect();
        let total = frames.len();

        self.update_run(run, |s| {
            s.script = Some(package.script);
            s.music_prompt = package.music_prompt;
            s.storyboard = frames.clone();
            s.loading = LoadingState::busy(IMAGE_PHASE_MESSAGE, 0);
        })?;

        // Image phase
        for (index, frame) in frames.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.frame_delay).await;
            }

            let outcome = self.client.frame_image(&credential, frame, &brief).await;
            if let Err(e) = &outcome {
                tracing::warn!(run, frame = index + 1, error = %e, "Failed to generate image for frame");
            }

            self.update_run(run, |s| {
                if let Some(slot) = s.storyboard.get_mut(index) {
                    apply_outcome(slot, outcome);
                }
                s.loading.progress = Some(progress_percent(index + 1, total));
            })?;
        }

        let mut summary = RunSummary {
            total,
            ready: 0,
            failed: 0,
        };
        self.update_run(run, |s| {
            s.loading = LoadingState::idle("", Some(100));
            summary.ready = s.ready_count();
            summary.failed = s
                .storyboard
                .iter()
                .filter(|f| f.status() == FrameStatus::Failed)
                .count();
        })?;
        tracing::info!(run, ready = summary.ready, failed = summary.failed, "Generation run finished");
        Ok(summary)
    }

    /// Requests a new image for one frame, leaving every other frame and the
    /// loading state untouched.
    ///
    /// Returns `Ok(None)` when there is no brief or no frame at `index`.
    /// A frame that already has a request outstanding is rejected with
    /// [`PipelineError::FrameBusy`].
    pub async fn regenerate_frame(
        &self,
        index: usize,
    ) -> Result<Option<FrameStatus>, PipelineError> {
        let credential = self.credential()?;

        let mut claim = Claim::Absent;
        self.state.send_if_modified(|s| {
            let Some(brief) = s.brief.clone() else {
                return false;
            };
            let run = s.run;
            match s.storyboard.get_mut(index) {
                None => false,
                Some(frame) if frame.generating => {
                    claim = Claim::Busy;
                    false
                }
                Some(frame) => {
                    frame.begin_attempt();
                    claim = Claim::Claimed {
                        brief,
                        frame: frame.clone(),
                        run,
                    };
                    true
                }
            }
        });

        let (brief, frame, run) = match claim {
            Claim::Absent => return Ok(None),
            Claim::Busy => return Err(PipelineError::FrameBusy(index)),
            Claim::Claimed { brief, frame, run } => (brief, frame, run),
        };
        tracing::info!(run, frame = index + 1, "Regenerating frame");

        let outcome = self.client.frame_image(&credential, &frame, &brief).await;
        if let Err(e) = &outcome {
            tracing::warn!(run, frame = index + 1, error = %e, "Failed to regenerate image for frame");
        }

        let mut status = None;
        self.update_run(run, |s| {
            if let Some(slot) = s.storyboard.get_mut(index) {
                apply_outcome(slot, outcome);
                status = Some(slot.status());
            }
        })?;
        Ok(status)
    }
}

fn apply_outcome(frame: &mut StoryboardFrame, outcome: Result<DataUri, GenerationError>) {
    match outcome {
        Ok(image) => frame.succeed(image),
        Err(e) => frame.fail(e.to_string()),
    }
}
