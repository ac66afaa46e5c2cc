//! Prompt text sent to the generation service.

use crate::brief::CreativeBrief;
use crate::pipeline::model::StoryboardFrame;

/// Camera angles the storyboard may use; each at most once.
pub const CAMERA_ANGLES: [&str; 11] = [
    "Full Body",
    "Macro Camera",
    "High Angle",
    "Eye Bird",
    "Low Angle",
    "Side Profile",
    "Over the Shoulder",
    "Eye-Level",
    "¾ Angle",
    "Close-up Product",
    "POV",
];

/// Instruction for the combined script + storyboard + music prompt request.
pub fn storyboard_prompt(brief: &CreativeBrief) -> String {
    let frames = brief.frame_count;
    let angles = CAMERA_ANGLES
        .iter()
        .map(|a| format!("'{}'", a))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"As a creative director for social media ads, create a complete creative package for a video ad based on this brief.
**Output MUST be a single, valid JSON object, with no other text or markdown.**
The JSON object must have these exact keys: "script", "storyboard", "music_prompt".
- "script" should contain "hook", "body", and "cta". All text must be in Indonesian.
- "storyboard" should be an array of objects, each with "visual_description", "camera_angle", and "script_text". All text must be in Indonesian.
- "music_prompt" should be a string.

Creative Brief:
- Product Category: {category}
- Product Link: {link} (Analyze for product details and user testimonials to make the script sound authentic and UGC-style)
- Target Audience: Age {age}, Gender {gender}
- Video Format: {ratio}
- Setting: {setting}
- Music Style: {music}
- Number of Scenes: Exactly {frames}

The storyboard must have {frames} scenes.
- Create a dynamic and engaging sequence. Mix shots featuring the model with the product, and some shots that are close-ups of only the product.
- For each scene's "camera_angle", choose a UNIQUE angle from this list: [{angles}]. Do not repeat angles.
- The poses and gestures must be varied in each scene.
"#,
        category = brief.category.label(),
        link = brief.product_link,
        age = brief.target_age,
        gender = brief.target_gender,
        ratio = brief.aspect_ratio,
        setting = brief.setting,
        music = brief.music_style,
        frames = frames,
        angles = angles,
    )
}

/// Instruction for one frame's image, sent after the reference images.
pub fn image_prompt(frame: &StoryboardFrame, brief: &CreativeBrief) -> String {
    format!(
        r#"ATURAN MUTLAK (TIDAK BISA DITAWAR):
1. **KONSISTENSI ADALAH #1:** Anda HARUS membuat gambar yang 100% konsisten secara visual dengan gambar referensi yang diberikan. Ini adalah prioritas tertinggi.
2. **PAKAIAN MODEL:** JANGAN MENGUBAH pakaian model. Tiru gaya, warna, dan item pakaian dari gambar referensi SECARA PERSIS.
3. **PRODUK:** Tiru produk dari gambar referensi SECARA PERSIS. Bentuk, warna, dan ukurannya tidak boleh berubah.
4. **TEKS/LOGO PADA PRODUK:** Ini SANGAT PENTING. Tiru teks atau logo pada produk dari gambar referensi seakurat mungkin. Jika replikasi sempurna tidak memungkinkan, buat area teks menjadi sedikit buram atau tidak fokus. JANGAN PERNAH membuat teks yang salah, rusak, atau glitch.

KONTEKS ADEGAN:
Ini adalah sebuah frame dari video UGC. Setiap frame harus terlihat seperti bagian dari video yang sama.

DETAIL ADEGAN UNTUK FRAME INI:
- **Visual Description:** {description}.
- **Camera Angle:** {angle}.
- **Setting:** {setting}.
- **Format:** {ratio}.

Buat gambar fotorealistik berkualitas tinggi yang mengikuti SEMUA ATURAN di atas dengan sempurna.
"#,
        description = frame.visual_description,
        angle = frame.camera_angle,
        setting = brief.setting,
        ratio = brief.aspect_ratio,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::*;
    use crate::pipeline::model::FramePlan;

    fn brief() -> CreativeBrief {
        BriefForm::new()
            .with_combined_image(ImageFile::new(vec![1], "image/png", "a.png"))
            .with_product_link("https://shop.example/serum")
            .with_frame_count(FrameCount::try_from(4).unwrap())
            .with_category(ProductCategory::Other, "Aksesoris Gaming")
            .validate()
            .unwrap()
    }

    #[test]
    fn test_storyboard_prompt_flattens_brief() {
        let prompt = storyboard_prompt(&brief());
        assert!(prompt.contains("- Product Category: Aksesoris Gaming"));
        assert!(prompt.contains("https://shop.example/serum"));
        assert!(prompt.contains("Age 18-24, Gender Semua"));
        assert!(prompt.contains("- Video Format: 9:16 (Potrait)\n"));
        assert!(prompt.contains("- Setting: Sesuai Konteks AI"));
        assert!(prompt.contains("Exactly 4"));
        assert!(prompt.contains("The storyboard must have 4 scenes."));
        assert!(prompt.contains("'Close-up Product', 'POV'"));
    }

    #[test]
    fn test_image_prompt_uses_frame_and_brief() {
        let frame = StoryboardFrame::planned(FramePlan {
            visual_description: "Model tersenyum memegang botol serum".to_string(),
            camera_angle: "Low Angle".to_string(),
            script_text: String::new(),
        });
        let prompt = image_prompt(&frame, &brief());
        assert!(prompt.contains("**Visual Description:** Model tersenyum memegang botol serum."));
        assert!(prompt.contains("**Camera Angle:** Low Angle."));
        assert!(prompt.contains("**Format:** 9:16 (Potrait)."));
    }
}
