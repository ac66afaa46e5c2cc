//! Error types for brief validation, credential storage, generation and the pipeline.

use thiserror::Error;

/// Result type alias for generation client operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors returned by a [`GenerationClient`](crate::client::GenerationClient).
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The service rejected the access token.
    #[error("API Key tidak valid atau salah. Silakan periksa kembali.")]
    InvalidCredential,

    /// The script/storyboard response was not the expected JSON object.
    #[error("Invalid JSON structure from generation service: {0}")]
    InvalidResponseShape(String),

    /// The service refused the prompt on content-policy grounds.
    #[error("Pembuatan gambar diblokir. Alasan: {0}")]
    Blocked(String),

    /// The response held no image payload.
    #[error("{}", no_image_message(.0))]
    NoImageReturned(Option<String>),

    /// Non-success HTTP status from the service.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid header value (e.g. a token with control characters).
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

fn no_image_message(text: &Option<String>) -> String {
    match text {
        Some(text) => format!("AI tidak mengembalikan gambar. Respons: \"{}\"", text),
        None => "AI tidak mengembalikan gambar.".to_string(),
    }
}

impl GenerationError {
    /// Creates an InvalidResponseShape error.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidResponseShape(msg.into())
    }

    /// Creates a Blocked error.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked(reason.into())
    }

    /// Creates an Api error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

/// Brief validation errors. Display text is shown to the user as-is.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BriefError {
    #[error("Silakan unggah gambar model dan produk.")]
    MissingSeparateImages,

    #[error("Silakan unggah gambar model dengan produk.")]
    MissingCombinedImage,

    #[error("Silakan masukkan link produk.")]
    MissingProductLink,

    #[error("Silakan masukkan kategori produk kustom.")]
    MissingCustomCategory,

    #[error("Jumlah adegan tidak valid: {0}")]
    InvalidFrameCount(u8),

    #[error("Pilihan tidak dikenal untuk {field}: {value}")]
    UnknownOption { field: &'static str, value: String },

    /// The file could not be read or is not an image.
    #[error("Gagal memproses file gambar. ({0})")]
    ImageFile(String),
}

impl BriefError {
    /// Creates an UnknownOption error.
    pub fn unknown_option(field: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownOption {
            field,
            value: value.into(),
        }
    }
}

/// Credential storage errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blank tokens are never saved.
    #[error("API key kosong")]
    Empty,

    /// No platform config directory and no explicit path.
    #[error("No configuration directory available")]
    NoConfigDir,
}

/// Errors surfaced by the pipeline orchestrator.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No credential configured; the caller should prompt for one.
    #[error("API key belum diatur")]
    MissingCredential,

    /// A request for this frame is already outstanding.
    #[error("Frame {0} is already generating")]
    FrameBusy(usize),

    /// The session was reset while this request was in flight.
    #[error("run superseded by a session reset")]
    Superseded,

    /// Script phase failed; the image phase never started.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
