//! HTTP client for the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};

use crate::brief::CreativeBrief;
use crate::client::{prompt, GenerationClient, ScriptPackage};
use crate::credential::Credential;
use crate::error::{GenerationError, GenerationResult};
use crate::pipeline::model::{DataUri, StoryboardFrame};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SCRIPT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Endpoint and model selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub script_model: String,
    pub image_model: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            script_model: DEFAULT_SCRIPT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Builder: set base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder: set script model.
    pub fn with_script_model(mut self, model: impl Into<String>) -> Self {
        self.script_model = model.into();
        self
    }

    /// Builder: set image model.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Builder: set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .iter()
            .take(1)
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.parts().filter_map(|p| p.text.as_deref()).collect()
    }
}

// =============================================================================
// RESPONSE INTERPRETATION
// =============================================================================

/// Parses the model's JSON text into a [`ScriptPackage`].
///
/// Tolerates surrounding whitespace and a markdown code fence.
pub fn parse_script_package(text: &str) -> GenerationResult<ScriptPackage> {
    let trimmed = strip_code_fence(text.trim());
    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| GenerationError::invalid_shape(format!("not JSON: {}", e)))?;

    for key in ["script", "storyboard", "music_prompt"] {
        if value.get(key).map_or(true, serde_json::Value::is_null) {
            return Err(GenerationError::invalid_shape(format!("missing key '{}'", key)));
        }
    }

    let package: ScriptPackage = serde_json::from_value(value)
        .map_err(|e| GenerationError::invalid_shape(e.to_string()))?;
    if package.music_prompt.trim().is_empty() {
        return Err(GenerationError::invalid_shape("empty 'music_prompt'"));
    }
    Ok(package)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Picks the first inline image out of an image-generation response.
fn extract_image(response: GenerateResponse) -> GenerationResult<DataUri> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(GenerationError::blocked(reason));
    }

    if let Some(inline) = response.parts().find_map(|p| p.inline_data.as_ref()) {
        return Ok(DataUri::new(&inline.mime_type, &inline.data));
    }

    let text = response.text();
    let text = text.trim();
    Err(GenerationError::NoImageReturned(
        (!text.is_empty()).then(|| text.to_string()),
    ))
}

/// Maps a non-success status to the error taxonomy.
fn classify_failure(status: u16, message: String) -> GenerationError {
    let rejected_key = status == 401
        || status == 403
        || (status == 400
            && (message.contains("API key not valid") || message.contains("permission")));
    if rejected_key {
        GenerationError::InvalidCredential
    } else {
        GenerationError::api(status, message)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Gemini implementation of [`GenerationClient`].
pub struct GeminiClient {
    client: Client,
    config: ClientConfig,
}

impl GeminiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> GenerationResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config: ClientConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POST /v1beta/models/{model}:generateContent
    async fn generate(
        &self,
        credential: &Credential,
        model: &str,
        request: &GenerateRequest<'_>,
    ) -> GenerationResult<GenerateResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );
        let key = header::HeaderValue::from_str(credential.expose())?;
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(request)
            .send()
            .await?;

        Self::check(resp).await?.json().await.map_err(Into::into)
    }

    async fn check(resp: Response) -> GenerationResult<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Err(classify_failure(status, message))
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn script_and_storyboard(
        &self,
        credential: &Credential,
        brief: &CreativeBrief,
    ) -> GenerationResult<ScriptPackage> {
        let text = prompt::storyboard_prompt(brief);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: &text }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                ..Default::default()
            },
        };

        tracing::debug!(model = %self.config.script_model, "Requesting script and storyboard");
        let response = self
            .generate(credential, &self.config.script_model, &request)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Script request failed"))?;

        let package = parse_script_package(&response.text())?;
        if package.storyboard.len() != brief.frame_count.get() {
            tracing::warn!(
                expected = brief.frame_count.get(),
                received = package.storyboard.len(),
                "Storyboard length differs from requested scene count",
            );
        }
        Ok(package)
    }

    async fn frame_image(
        &self,
        credential: &Credential,
        frame: &StoryboardFrame,
        brief: &CreativeBrief,
    ) -> GenerationResult<DataUri> {
        let text = prompt::image_prompt(frame, brief);
        let mut parts: Vec<Part<'_>> = brief
            .images
            .ordered()
            .into_iter()
            .map(|image| Part::Inline {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.to_base64(),
                },
            })
            .collect();
        parts.push(Part::Text { text: &text });

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["IMAGE"]),
                ..Default::default()
            },
        };

        tracing::debug!(
            model = %self.config.image_model,
            camera_angle = %frame.camera_angle,
            "Requesting frame image",
        );
        let response = self
            .generate(credential, &self.config.image_model, &request)
            .await?;
        extract_image(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE: &str = r#"{
        "script": {"hook": "Kulit kusam?", "body": "Serum ini...", "cta": "Checkout sekarang!"},
        "storyboard": [
            {"visual_description": "Model menatap kamera", "camera_angle": "Eye-Level", "script_text": "Kulit kusam?"},
            {"visual_description": "Close-up botol", "camera_angle": "Close-up Product", "script_text": "Serum ini..."}
        ],
        "music_prompt": "upbeat pop, 120 bpm"
    }"#;

    #[test]
    fn test_parse_script_package() {
        let package = parse_script_package(PACKAGE).unwrap();
        assert_eq!(package.script.hook, "Kulit kusam?");
        assert_eq!(package.storyboard.len(), 2);
        assert_eq!(package.storyboard[1].camera_angle, "Close-up Product");
        assert_eq!(package.music_prompt, "upbeat pop, 120 bpm");
    }

    #[test]
    fn test_parse_script_package_strips_fence() {
        let fenced = format!("```json\n{}\n```", PACKAGE);
        assert!(parse_script_package(&fenced).is_ok());
    }

    #[test]
    fn test_parse_script_package_missing_key() {
        let err = parse_script_package(r#"{"script": {}, "storyboard": []}"#).unwrap_err();
        assert!(
            matches!(err, GenerationError::InvalidResponseShape(ref m) if m.contains("music_prompt"))
        );

        let err = parse_script_package(r#"{"script": {}, "storyboard": [], "music_prompt": ""}"#)
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponseShape(_)));
    }

    #[test]
    fn test_parse_script_package_not_json() {
        let err = parse_script_package("Maaf, saya tidak bisa.").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponseShape(_)));
    }

    fn response(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_image() {
        let uri = extract_image(response(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "Here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
            ]}}]}"#,
        ))
        .unwrap();
        assert_eq!(uri.to_string(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_extract_image_blocked() {
        let err = extract_image(response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#))
            .unwrap_err();
        assert!(matches!(err, GenerationError::Blocked(ref r) if r == "SAFETY"));
        assert_eq!(err.to_string(), "Pembuatan gambar diblokir. Alasan: SAFETY");
    }

    #[test]
    fn test_extract_image_text_only() {
        let err = extract_image(response(
            r#"{"candidates": [{"content": {"parts": [{"text": " Tidak bisa. "}]}}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, GenerationError::NoImageReturned(Some(ref t)) if t == "Tidak bisa."));

        let err = extract_image(response(r#"{"candidates": []}"#)).unwrap_err();
        assert!(matches!(err, GenerationError::NoImageReturned(None)));
        assert_eq!(err.to_string(), "AI tidak mengembalikan gambar.");
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(400, "API key not valid. Please pass a valid API key.".into()),
            GenerationError::InvalidCredential
        ));
        assert!(matches!(classify_failure(403, String::new()), GenerationError::InvalidCredential));
        assert!(matches!(
            classify_failure(429, "quota".into()),
            GenerationError::Api { status: 429, .. }
        ));
        assert!(matches!(
            classify_failure(400, "bad request".into()),
            GenerationError::Api { status: 400, .. }
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/png".into(),
                            data: "AAAA".into(),
                        },
                    },
                    Part::Text { text: "prompt" },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["IMAGE"]),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}},
                    {"text": "prompt"}
                ]}],
                "generationConfig": {"responseModalities": ["IMAGE"]}
            })
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client =
            GeminiClient::new(ClientConfig::default().with_base_url("http://localhost:8080/"))
                .unwrap();
        assert_eq!(client.config().base_url, "http://localhost:8080");
    }
}
