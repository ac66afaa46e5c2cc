//! Data models for a generation session: script, storyboard frames and
//! loading state.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::brief::CreativeBrief;

// =============================================================================
// SCRIPT
// =============================================================================

/// Hook / body / call-to-action script sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptResult {
    pub hook: String,
    pub body: String,
    pub cta: String,
}

// =============================================================================
// IMAGES
// =============================================================================

/// A generated image as a `data:<mime>;base64,<payload>` URI.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUri {
    mime_type: String,
    payload: String,
}

impl DataUri {
    pub fn new(mime_type: impl Into<String>, base64_payload: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: base64_payload.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File extension from the mime subtype, `png` when there is none.
    pub fn extension(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map(|(_, sub)| sub)
            .filter(|sub| !sub.is_empty())
            .unwrap_or("png")
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.payload)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.payload)
    }
}

impl fmt::Debug for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataUri({}, {} chars)", self.mime_type, self.payload.len())
    }
}

// =============================================================================
// STORYBOARD FRAMES
// =============================================================================

/// One planned scene as returned by the script phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramePlan {
    pub visual_description: String,
    pub camera_angle: String,
    pub script_text: String,
}

/// Display status of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Planned,
    InProgress,
    Ready,
    Failed,
}

/// A storyboard scene and its generated image, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryboardFrame {
    pub visual_description: String,
    pub camera_angle: String,
    pub script_text: String,
    pub image: Option<DataUri>,
    /// An image request for this frame is outstanding.
    pub generating: bool,
    /// Message from the last failed attempt.
    pub failure: Option<String>,
}

impl StoryboardFrame {
    /// A frame with no image and no request yet.
    pub fn planned(plan: FramePlan) -> Self {
        Self {
            visual_description: plan.visual_description,
            camera_angle: plan.camera_angle,
            script_text: plan.script_text,
            image: None,
            generating: false,
            failure: None,
        }
    }

    pub fn status(&self) -> FrameStatus {
        if self.generating {
            FrameStatus::InProgress
        } else if self.image.is_some() {
            FrameStatus::Ready
        } else if self.failure.is_some() {
            FrameStatus::Failed
        } else {
            FrameStatus::Planned
        }
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.generating = true;
        self.image = None;
        self.failure = None;
    }

    pub(crate) fn succeed(&mut self, image: DataUri) {
        self.generating = false;
        self.image = Some(image);
        self.failure = None;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.generating = false;
        self.failure = Some(message.into());
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Process-wide busy indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub busy: bool,
    pub message: String,
    /// 0..=100
    pub progress: Option<u8>,
}

impl LoadingState {
    pub fn busy(message: impl Into<String>, progress: u8) -> Self {
        Self {
            busy: true,
            message: message.into(),
            progress: Some(progress),
        }
    }

    pub fn idle(message: impl Into<String>, progress: Option<u8>) -> Self {
        Self {
            busy: false,
            message: message.into(),
            progress,
        }
    }
}

/// Everything a generation session has produced so far.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub brief: Option<Arc<CreativeBrief>>,
    pub script: Option<ScriptResult>,
    pub music_prompt: String,
    pub storyboard: Vec<StoryboardFrame>,
    pub loading: LoadingState,
    /// Changes whenever the storyboard set is replaced or cleared.
    pub run: u64,
}

impl SessionState {
    /// Frames with a finished image.
    pub fn ready_count(&self) -> usize {
        self.storyboard
            .iter()
            .filter(|f| f.status() == FrameStatus::Ready)
            .count()
    }
}

/// Percentage of `done` out of `total`, rounded to the nearest integer.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(angle: &str) -> FramePlan {
        FramePlan {
            visual_description: "Model memegang produk".to_string(),
            camera_angle: angle.to_string(),
            script_text: "Cobain deh!".to_string(),
        }
    }

    #[test]
    fn test_data_uri_display_and_bytes() {
        let uri = DataUri::new("image/png", "iVBORw0KGgo=");
        assert_eq!(uri.mime_type(), "image/png");
        assert_eq!(uri.extension(), "png");
        assert_eq!(uri.to_string(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(uri.bytes().unwrap()[..4], [0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_data_uri_extension_fallback() {
        assert_eq!(DataUri::new("image/jpeg", "").extension(), "jpeg");
        assert_eq!(DataUri::new("image/", "").extension(), "png");
        assert_eq!(DataUri::new("", "").extension(), "png");
    }

    #[test]
    fn test_frame_lifecycle() {
        let mut frame = StoryboardFrame::planned(plan("POV"));
        assert_eq!(frame.status(), FrameStatus::Planned);

        frame.begin_attempt();
        assert_eq!(frame.status(), FrameStatus::InProgress);

        frame.fail("diblokir");
        assert_eq!(frame.status(), FrameStatus::Failed);
        assert!(frame.image.is_none());

        frame.begin_attempt();
        assert!(frame.failure.is_none());
        frame.succeed(DataUri::new("image/png", "AAAA"));
        assert_eq!(frame.status(), FrameStatus::Ready);
        assert!(!frame.generating);
    }

    #[test]
    fn test_frame_plan_tolerates_missing_fields() {
        let plan: FramePlan = serde_json::from_str(r#"{"camera_angle": "POV"}"#).unwrap();
        assert_eq!(plan.camera_angle, "POV");
        assert!(plan.script_text.is_empty());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 100);
    }
}
