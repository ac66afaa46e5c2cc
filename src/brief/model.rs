//! Data models for the creative brief.
//!
//! Enumerated form choices carry the exact Indonesian labels shown to the
//! user; those labels are also what gets sent to the generation service.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::BriefError;

// =============================================================================
// FORM OPTIONS
// =============================================================================

/// Generates a closed set of form choices with labels, aliases and parsing.
/// The first variant listed is the form default.
macro_rules! form_options {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every choice, in form order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown in the form and sent to the service.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            fn names(self) -> &'static [&'static str] {
                match self {
                    $($name::$variant => &[$label $(, $alias)*]),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = BriefError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.names().iter().any(|n| n.eq_ignore_ascii_case(needle)))
                    .ok_or_else(|| BriefError::unknown_option($field, needle))
            }
        }
    };
}

form_options! {
    /// How the reference images were supplied.
    UploadMode, "upload_mode" {
        Separate => "Model & Produk Terpisah" | "model_and_product" | "separate",
        Combined => "Model & Produk Digabung" | "model_with_product" | "combined",
    }
}

form_options! {
    /// Product category. `Other` requires a custom category text.
    ProductCategory, "product_category" {
        Beauty => "Kecantikan & Perawatan Diri" | "beauty",
        WomensFashion => "Fashion Wanita" | "womens-fashion",
        MensFashion => "Fashion Pria" | "mens-fashion",
        FoodAndDrink => "Makanan & Minuman" | "food",
        Health => "Kesehatan" | "health",
        HomeAndLiving => "Rumah & Gaya Hidup" | "home",
        Electronics => "Elektronik" | "electronics",
        Hobbies => "Hobi & Koleksi" | "hobbies",
        Other => "Lainnya..." | "lainnya" | "other",
    }
}

form_options! {
    TargetAge, "target_age" {
        Age18To24 => "18-24",
        Age25To34 => "25-34",
        Age35To44 => "35-44",
        Age45Plus => "45+",
    }
}

form_options! {
    TargetGender, "target_gender" {
        All => "Semua" | "all",
        Female => "Wanita" | "female",
        Male => "Pria" | "male",
    }
}

form_options! {
    AspectRatio, "aspect_ratio" {
        Portrait => "9:16 (Potrait)" | "9:16" | "portrait",
        Landscape => "16:9 (Landscape)" | "16:9" | "landscape",
        Square => "1:1 (Square)" | "1:1" | "square",
    }
}

form_options! {
    /// Scene setting.
    Setting, "setting" {
        AiContext => "Sesuai Konteks AI" | "auto" | "ai",
        Indoor => "Indoor",
        Outdoor => "Outdoor",
    }
}

form_options! {
    MusicStyle, "music_style" {
        Upbeat => "Upbeat & Energetic" | "upbeat",
        Cinematic => "Cinematic & Epic" | "cinematic",
        Chill => "Chill & Relaxing" | "chill",
        Acoustic => "Acoustic & Folk" | "acoustic",
        Electronic => "Electronic & Edm" | "electronic" | "edm",
        HipHop => "Hip Hop & Rap" | "hiphop" | "hip-hop",
        Quirky => "Funny & Quirky" | "funny" | "quirky",
    }
}

// =============================================================================
// FRAME COUNT
// =============================================================================

/// Number of storyboard scenes; one of [`FrameCount::OPTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameCount(u8);

impl FrameCount {
    pub const OPTIONS: [u8; 5] = [3, 4, 5, 6, 7];

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for FrameCount {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for FrameCount {
    type Error = BriefError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if Self::OPTIONS.contains(&value) {
            Ok(Self(value))
        } else {
            Err(BriefError::InvalidFrameCount(value))
        }
    }
}

impl FromStr for FrameCount {
    type Err = BriefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| BriefError::unknown_option("frame_count", s.trim()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for FrameCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// IMAGES
// =============================================================================

/// An uploaded reference image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub name: String,
}

impl ImageFile {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Reads an image from disk, guessing the mime type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, BriefError> {
        let mime = mime_guess::from_path(path)
            .first()
            .filter(|m| m.type_() == mime_guess::mime::IMAGE)
            .ok_or_else(|| BriefError::ImageFile(format!("{} is not an image", path.display())))?;
        let bytes = std::fs::read(path)
            .map_err(|e| BriefError::ImageFile(format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(bytes, mime.essence_str(), name))
    }

    /// Base64 payload for inline transport.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Reference images, shaped by upload mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceImages {
    /// Model and product as separate images.
    Separate { model: ImageFile, product: ImageFile },
    /// Model holding the product, one image.
    Combined { combined: ImageFile },
}

impl ReferenceImages {
    pub fn mode(&self) -> UploadMode {
        match self {
            Self::Separate { .. } => UploadMode::Separate,
            Self::Combined { .. } => UploadMode::Combined,
        }
    }

    /// Images in the order they are sent to the service.
    pub fn ordered(&self) -> Vec<&ImageFile> {
        match self {
            Self::Separate { model, product } => vec![model, product],
            Self::Combined { combined } => vec![combined],
        }
    }
}

// =============================================================================
// CREATIVE BRIEF
// =============================================================================

/// Resolved product category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Listed(ProductCategory),
    Custom(String),
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Self::Listed(category) => category.label(),
            Self::Custom(text) => text,
        }
    }
}

/// Validated snapshot of the brief form at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreativeBrief {
    pub images: ReferenceImages,
    pub product_link: String,
    pub frame_count: FrameCount,
    pub category: Category,
    pub target_age: TargetAge,
    pub target_gender: TargetGender,
    pub aspect_ratio: AspectRatio,
    pub setting: Setting,
    pub music_style: MusicStyle,
}
