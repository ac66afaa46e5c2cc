//! Brief form input and submission-time validation.

use crate::brief::model::*;
use crate::error::BriefError;

/// Raw form state before submission. Every field may still be incomplete.
#[derive(Debug, Clone, Default)]
pub struct BriefForm {
    pub upload_mode: UploadMode,
    pub model_image: Option<ImageFile>,
    pub product_image: Option<ImageFile>,
    pub combined_image: Option<ImageFile>,
    pub product_link: String,
    pub frame_count: FrameCount,
    pub product_category: ProductCategory,
    pub custom_product_category: String,
    pub target_age: TargetAge,
    pub target_gender: TargetGender,
    pub aspect_ratio: AspectRatio,
    pub setting: Setting,
    pub music_style: MusicStyle,
}

impl BriefForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: model and product as separate images.
    pub fn with_separate_images(mut self, model: ImageFile, product: ImageFile) -> Self {
        self.upload_mode = UploadMode::Separate;
        self.model_image = Some(model);
        self.product_image = Some(product);
        self
    }

    /// Builder: one image of the model holding the product.
    pub fn with_combined_image(mut self, combined: ImageFile) -> Self {
        self.upload_mode = UploadMode::Combined;
        self.combined_image = Some(combined);
        self
    }

    /// Builder: set product link.
    pub fn with_product_link(mut self, link: impl Into<String>) -> Self {
        self.product_link = link.into();
        self
    }

    /// Builder: set frame count.
    pub fn with_frame_count(mut self, count: FrameCount) -> Self {
        self.frame_count = count;
        self
    }

    /// Builder: set category, with the free text used when it is `Other`.
    pub fn with_category(mut self, category: ProductCategory, custom: impl Into<String>) -> Self {
        self.product_category = category;
        self.custom_product_category = custom.into();
        self
    }

    /// Validates the form and snapshots it into a [`CreativeBrief`].
    ///
    /// Only the images matching the upload mode are carried over.
    pub fn validate(&self) -> Result<CreativeBrief, BriefError> {
        let images = match self.upload_mode {
            UploadMode::Separate => match (&self.model_image, &self.product_image) {
                (Some(model), Some(product)) => ReferenceImages::Separate {
                    model: model.clone(),
                    product: product.clone(),
                },
                _ => return Err(BriefError::MissingSeparateImages),
            },
            UploadMode::Combined => match &self.combined_image {
                Some(combined) => ReferenceImages::Combined {
                    combined: combined.clone(),
                },
                None => return Err(BriefError::MissingCombinedImage),
            },
        };

        if self.product_link.trim().is_empty() {
            return Err(BriefError::MissingProductLink);
        }

        let category = match self.product_category {
            ProductCategory::Other => {
                let custom = self.custom_product_category.trim();
                if custom.is_empty() {
                    return Err(BriefError::MissingCustomCategory);
                }
                Category::Custom(custom.to_string())
            }
            listed => Category::Listed(listed),
        };

        Ok(CreativeBrief {
            images,
            product_link: self.product_link.trim().to_string(),
            frame_count: self.frame_count,
            category,
            target_age: self.target_age,
            target_gender: self.target_gender,
            aspect_ratio: self.aspect_ratio,
            setting: self.setting,
            music_style: self.music_style,
        })
    }
}
