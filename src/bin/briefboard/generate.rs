//! `generate` command: brief form, pipeline run, result views.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;

use briefboard::brief::{BriefForm, ImageFile};
use briefboard::{view, CreativeBrief, CredentialStore, Orchestrator, PipelineError, SessionState};

use crate::GenerateArgs;

/// Reads one trimmed line from stdin after printing `prompt`.
pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn load_image(path: &Path) -> Result<ImageFile> {
    ImageFile::from_path(path).map_err(anyhow::Error::msg)
}

/// Fills the form from arguments and validates it.
fn build_brief(args: &GenerateArgs) -> Result<CreativeBrief> {
    let mut form = BriefForm::new()
        .with_product_link(&args.link)
        .with_frame_count(args.frames.unwrap_or_default())
        .with_category(args.category.unwrap_or_default(), &args.custom_category);
    form.target_age = args.age.unwrap_or_default();
    form.target_gender = args.gender.unwrap_or_default();
    form.aspect_ratio = args.aspect_ratio.unwrap_or_default();
    form.setting = args.setting.unwrap_or_default();
    form.music_style = args.music.unwrap_or_default();

    form = match (&args.combined_image, &args.model_image, &args.product_image) {
        (Some(combined), _, _) => form.with_combined_image(load_image(combined)?),
        (None, Some(model), Some(product)) => {
            form.with_separate_images(load_image(model)?, load_image(product)?)
        }
        _ => form,
    };

    form.validate().map_err(anyhow::Error::msg)
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.magenta} [{bar:40.magenta/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Mirrors loading state onto the progress bar until aborted.
async fn track_progress(mut rx: watch::Receiver<SessionState>, pb: ProgressBar) {
    loop {
        {
            let state = rx.borrow_and_update();
            pb.set_message(state.loading.message.clone());
            pb.set_position(u64::from(state.loading.progress.unwrap_or(0)));
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
}

/// Prompts for a key, saves it and hands it to the orchestrator.
fn request_credential(orchestrator: &Orchestrator, store: &CredentialStore) -> Result<()> {
    let token = prompt_line("masukan apikey kamu disini: ")?;
    let credential = store.save(&token).context("Gagal menyimpan API key")?;
    orchestrator.set_credential(Some(credential));
    Ok(())
}

fn print_results(state: &SessionState, out: &Path, script_out: Option<&Path>) -> Result<()> {
    if let Some(script) = &state.script {
        println!("\n{}", view::render_script(script));
        if let Some(path) = script_out {
            view::write_script_block(script, path)
                .with_context(|| format!("Gagal menyimpan naskah ke {}", path.display()))?;
            println!("Naskah disalin ke {}", path.display());
        }
    }
    if !state.music_prompt.is_empty() {
        println!("{}", view::render_music_prompt(&state.music_prompt));
    }
    print!("{}", view::render_storyboard(state));

    for (index, frame) in state.storyboard.iter().enumerate() {
        if let Some(path) = view::download_frame(index, frame, out)
            .with_context(|| format!("Gagal menyimpan gambar adegan {}", index + 1))?
        {
            println!("  -> {}", path.display());
        }
    }
    Ok(())
}

/// Zero-based frame index from a 1-based scene number typed by the user.
fn scene_index(input: &str) -> Option<usize> {
    input.parse::<usize>().ok()?.checked_sub(1)
}

/// Lets the user pick frames to regenerate, one at a time.
async fn regenerate_loop(orchestrator: &Orchestrator, store: &CredentialStore, out: &Path) -> Result<()> {
    loop {
        let input = prompt_line("\nNomor adegan untuk dibuat ulang (Enter untuk selesai): ")?;
        if input.is_empty() {
            return Ok(());
        }
        let Some(index) = scene_index(&input) else {
            println!("Nomor tidak valid: {}", input);
            continue;
        };
        let number = index + 1;

        let result = match orchestrator.regenerate_frame(index).await {
            Err(PipelineError::MissingCredential) => {
                request_credential(orchestrator, store)?;
                orchestrator.regenerate_frame(index).await
            }
            other => other,
        };

        match result {
            Ok(Some(_)) => {
                let state = orchestrator.snapshot();
                if let Some(frame) = state.storyboard.get(index) {
                    print!("{}", view::render_frame(index, frame));
                    if let Some(path) = view::download_frame(index, frame, out)? {
                        println!("  -> {}", path.display());
                    }
                }
            }
            Ok(None) => println!("Adegan {} tidak ada", number),
            Err(e) => println!("{}", e),
        }
    }
}

pub async fn run(orchestrator: &Orchestrator, store: &CredentialStore, args: &GenerateArgs) -> Result<()> {
    let brief = build_brief(args)?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Gagal membuat direktori {}", args.out.display()))?;

    if !orchestrator.has_credential() {
        request_credential(orchestrator, store)?;
    }

    let pb = progress_bar();
    let tracker = tokio::spawn(track_progress(orchestrator.subscribe(), pb.clone()));
    let result = orchestrator.run_full_generation(brief).await;
    tracker.abort();
    pb.finish_and_clear();

    let state = orchestrator.snapshot();
    match result {
        Ok(summary) => {
            print_results(&state, &args.out, args.script_out.as_deref())?;
            println!(
                "\n{} dari {} adegan berhasil dibuat",
                summary.ready, summary.total
            );
        }
        Err(e) => {
            tracing::debug!(error = %e, "Generation run failed");
            eprintln!("{}", view::render_loading(&state.loading));
            std::process::exit(1);
        }
    }

    if args.interactive {
        regenerate_loop(orchestrator, store, &args.out).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_index() {
        assert_eq!(scene_index("1"), Some(0));
        assert_eq!(scene_index("7"), Some(6));
        assert_eq!(scene_index("0"), None);
        assert_eq!(scene_index("-1"), None);
        assert_eq!(scene_index("dua"), None);
    }
}
