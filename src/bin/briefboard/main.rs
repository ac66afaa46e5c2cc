//! Terminal front-end for the creative brief pipeline.
//!
//! Usage:
//!   briefboard key [--value KEY]
//!   briefboard generate --combined-image model.jpg --link https://... --out ./frames [OPTIONS]

mod generate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use briefboard::brief::{
    AspectRatio, FrameCount, MusicStyle, ProductCategory, Setting, TargetAge, TargetGender,
};
use briefboard::client::gemini::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_SCRIPT_MODEL};
use briefboard::{
    ClientConfig, Credential, CredentialStore, GeminiClient, Orchestrator, PipelineConfig,
};

#[derive(Parser)]
#[command(
    name = "briefboard",
    about = "Buat storyboard visual dan naskah lengkap dari creative brief",
    version
)]
struct Args {
    /// Credential file (defaults to the user config directory)
    #[arg(long, env = "BRIEFBOARD_CREDENTIALS", global = true)]
    credentials_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save the API key
    Key {
        /// API key (prompted for when omitted)
        #[arg(long)]
        value: Option<String>,
    },
    /// Generate script, music prompt and storyboard images
    Generate(GenerateArgs),
}

#[derive(ClapArgs)]
pub struct GenerateArgs {
    /// API key for this run only (not saved)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Service base URL
    #[arg(long, env = "BRIEFBOARD_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Model for the script and storyboard
    #[arg(long, env = "BRIEFBOARD_SCRIPT_MODEL", default_value = DEFAULT_SCRIPT_MODEL)]
    script_model: String,

    /// Model for frame images
    #[arg(long, env = "BRIEFBOARD_IMAGE_MODEL", default_value = DEFAULT_IMAGE_MODEL)]
    image_model: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Pause between frame requests in milliseconds
    #[arg(long, default_value_t = 1000)]
    frame_delay_ms: u64,

    /// Reference image of the model
    #[arg(long, requires = "product_image", conflicts_with = "combined_image")]
    model_image: Option<PathBuf>,

    /// Reference image of the product
    #[arg(long, requires = "model_image")]
    product_image: Option<PathBuf>,

    /// Single reference image of the model holding the product
    #[arg(long)]
    combined_image: Option<PathBuf>,

    /// Product link (Tokopedia, Shopee, etc)
    #[arg(short = 'l', long)]
    link: String,

    /// Number of scenes (3-7)
    #[arg(short = 'n', long)]
    frames: Option<FrameCount>,

    /// Product category
    #[arg(long)]
    category: Option<ProductCategory>,

    /// Custom category, required with "Lainnya..."
    #[arg(long, default_value = "")]
    custom_category: String,

    #[arg(long)]
    age: Option<TargetAge>,

    #[arg(long)]
    gender: Option<TargetGender>,

    #[arg(long)]
    aspect_ratio: Option<AspectRatio>,

    #[arg(long)]
    setting: Option<Setting>,

    #[arg(long)]
    music: Option<MusicStyle>,

    /// Directory for frame images
    #[arg(short = 'o', long, default_value = ".")]
    out: PathBuf,

    /// Also write the copyable [HOOK]/[BODY]/[CTA] script block to this file
    #[arg(long)]
    script_out: Option<PathBuf>,

    /// Ask for frames to regenerate after the run
    #[arg(short = 'i', long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.verbose {
        "briefboard=debug"
    } else {
        "briefboard=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = match &args.credentials_file {
        Some(path) => CredentialStore::new(path),
        None => CredentialStore::default_location()?,
    };

    match args.command {
        Command::Key { value } => {
            let token = match value {
                Some(value) => value,
                None => generate::prompt_line("masukan apikey kamu disini: ")?,
            };
            store.save(&token).context("Gagal menyimpan API key")?;
            println!("API key disimpan di {}", store.path().display());
            Ok(())
        }
        Command::Generate(gen) => {
            let credential = match gen.api_key.as_deref().and_then(Credential::new) {
                Some(credential) => Some(credential),
                None => store.load().context("Gagal membaca API key")?,
            };

            let config = ClientConfig::default()
                .with_base_url(&gen.base_url)
                .with_script_model(&gen.script_model)
                .with_image_model(&gen.image_model)
                .with_timeout(Duration::from_secs(gen.timeout_secs));
            let client = Arc::new(GeminiClient::new(config)?);
            let pipeline =
                PipelineConfig::default().with_frame_delay(Duration::from_millis(gen.frame_delay_ms));
            let orchestrator = Orchestrator::new(client, pipeline).with_credential(credential);

            generate::run(&orchestrator, &store, &gen).await
        }
    }
}
