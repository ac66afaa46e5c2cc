//! Text rendering of session results and per-frame image download.
//!
//! Views only read snapshots; regeneration goes back through the
//! [`Orchestrator`](crate::pipeline::Orchestrator).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::pipeline::model::*;

pub const EMPTY_STORYBOARD: &str = "Storyboard Anda Akan Muncul di Sini";

/// Plain-text script in the copyable `[HOOK]/[BODY]/[CTA]` layout.
pub fn script_block(script: &ScriptResult) -> String {
    format!(
        "[HOOK]\n{}\n\n[BODY]\n{}\n\n[CTA]\n{}",
        script.hook, script.body, script.cta
    )
}

/// Writes the copyable script block to `path`.
pub fn write_script_block(script: &ScriptResult, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, script_block(script))
}

pub fn render_script(script: &ScriptResult) -> String {
    format!(
        "Naskah Konten Lengkap\n\
         🎬 HOOK (Pembuka)\n  {}\n\
         📝 BODY (Isi Konten)\n  {}\n\
         🛒 CTA (Call to Action)\n  {}\n",
        script.hook,
        script.body.replace('\n', "\n  "),
        script.cta
    )
}

pub fn render_music_prompt(prompt: &str) -> String {
    format!("Prompt Musik (Suno AI)\n  {}\n", prompt)
}

fn status_label(frame: &StoryboardFrame) -> String {
    match frame.status() {
        FrameStatus::Planned => "menunggu".to_string(),
        FrameStatus::InProgress => "sedang dibuat...".to_string(),
        FrameStatus::Ready => "siap".to_string(),
        FrameStatus::Failed => match &frame.failure {
            Some(reason) => format!("gagal: {}", reason),
            None => "gagal".to_string(),
        },
    }
}

/// One frame card: scene number, camera angle, script line and image status.
pub fn render_frame(index: usize, frame: &StoryboardFrame) -> String {
    format!(
        "Adegan {} [{}] ({})\n  {}\n",
        index + 1,
        frame.camera_angle,
        status_label(frame),
        frame.script_text
    )
}

pub fn render_loading(loading: &LoadingState) -> String {
    match loading.progress {
        Some(progress) if loading.busy => format!("{} {}%", loading.message, progress),
        _ => loading.message.clone(),
    }
}

/// Whole storyboard, or the empty-state hint.
pub fn render_storyboard(state: &SessionState) -> String {
    if state.storyboard.is_empty() {
        return format!("{}\n", EMPTY_STORYBOARD);
    }
    let mut out = String::new();
    for (index, frame) in state.storyboard.iter().enumerate() {
        let _ = writeln!(out, "{}", render_frame(index, frame));
    }
    out
}

/// File name a frame image downloads as.
pub fn frame_file_name(index: usize, image: &DataUri) -> String {
    format!("storyboard-frame-{}.{}", index + 1, image.extension())
}

/// Writes the frame's image into `dir`. Frames without an image write nothing.
pub fn download_frame(
    index: usize,
    frame: &StoryboardFrame,
    dir: &Path,
) -> std::io::Result<Option<PathBuf>> {
    let Some(image) = &frame.image else {
        return Ok(None);
    };
    let bytes = image
        .bytes()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let path = dir.join(frame_file_name(index, image));
    std::fs::write(&path, bytes)?;
    Ok(Some(path))
}
