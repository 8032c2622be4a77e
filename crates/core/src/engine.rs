use crate::config::Config;
use crate::error::{AppError, Result};
use crate::loader::ImagePayload;
use gemini_rust::{Gemini, Content, Part, Role, Blob, Message};
use serde::Deserialize;

/// One request across the caption engine boundary.
#[derive(Clone, Debug)]
pub struct EngineRequest {
    pub payload: ImagePayload,
    /// Free-text style hint; `None` means no style constraint.
    pub style_hint: Option<String>,
}

/// The external service that turns an image into candidate captions.
///
/// Implementations are opaque to the session: it only cares about the ordered
/// caption list (possibly empty, which the session treats as a failure) or a
/// transport error.
#[allow(async_fn_in_trait)]
pub trait CaptionEngine {
    async fn generate(&self, request: &EngineRequest) -> Result<Vec<String>>;
}

pub struct GeminiEngine {
    client: Gemini,
}

impl GeminiEngine {
    pub fn new(config: &Config) -> Result<Self> {
        // Initialize the client with the API key and model, explicitly setting the base URL to avoid BadScheme error
        let base_url = url::Url::parse("https://generativelanguage.googleapis.com/v1beta/")
            .map_err(|e| AppError::Config(format!("Invalid base URL: {}", e)))?;

        let model_name = if config.model_name.starts_with("models/") {
            config.model_name.clone()
        } else {
            format!("models/{}", config.model_name)
        };
        let model_url = format!("https://generativelanguage.googleapis.com/v1beta/{}", model_name);

        let client = Gemini::with_model_and_base_url(&config.gemini_api_key, model_url, base_url)
            .map_err(|e| AppError::Config(format!("Failed to create Gemini client: {}", e)))?;

        Ok(Self {
            client,
        })
    }

    fn build_prompt(style_hint: Option<&str>) -> String {
        let mut prompt = String::from(
            "You are a creative social media manager who is exceptional at generating captions for photos.\n\n\
             Generate 5 captions for the following photo.\n",
        );
        if let Some(style) = style_hint {
            prompt.push_str(&format!("The style of the captions should be {style}.\n"));
        }
        prompt.push_str(
            "\nAnalyze the photo and generate captions based on its content.\n\
             Respond with only a JSON array of caption strings, nothing else.",
        );
        prompt
    }
}

impl CaptionEngine for GeminiEngine {
    /// Sends the image and prompt to the Gemini API and parses the caption list.
    async fn generate(&self, request: &EngineRequest) -> Result<Vec<String>> {
        // Construct image data blob
        let blob = Blob {
            mime_type: request.payload.mime_type().to_string(),
            data: request.payload.base64_data().to_string(),
        };

        // Construct parts
        let image_part = Part::InlineData {
            inline_data: blob,
            media_resolution: None,
        };

        let text_part = Part::Text {
            text: Self::build_prompt(request.style_hint.as_deref()),
            thought: None,
            thought_signature: None,
        };

        // Create the content payload
        let content = Content {
            role: Some(Role::User),
            parts: Some(vec![text_part, image_part]),
        };

        // Create the message payload
        let message = Message {
            role: Role::User,
            content,
        };

        // Send request
        let response = self.client
            .generate_content()
            .with_messages(vec![message])
            .execute()
            .await
            .map_err(|e| AppError::CaptionEngine(format!("API request failed: {:?}", e)))?;

        // Parse Response
        if let Some(candidate) = response.candidates.first() {
            let content = &candidate.content;
            if let Some(parts) = &content.parts {
                if let Some(Part::Text { text, .. }) = parts.first() {
                    return Ok(parse_captions(text));
                }
            }
        }

        Err(AppError::CaptionEngine("No text response received from Gemini".to_string()))
    }
}

#[derive(Deserialize)]
struct CaptionListEnvelope {
    captions: Vec<String>,
}

/// Extracts the ordered caption list from the model's text response.
///
/// The model is asked for a bare JSON array but sometimes wraps it in a code
/// fence or an object envelope, and occasionally ignores the format entirely
/// and writes a bulleted list. All three shapes are accepted; anything else
/// yields an empty list, which the session surfaces as a failure.
pub fn parse_captions(text: &str) -> Vec<String> {
    let body = strip_code_fence(text);

    if let Ok(items) = serde_json::from_str::<Vec<String>>(body) {
        return tidy(items);
    }
    if let Ok(envelope) = serde_json::from_str::<CaptionListEnvelope>(body) {
        return tidy(envelope.captions);
    }

    // Fallback: one caption per line, tolerating list markers.
    tidy(
        body.lines()
            .map(|line| {
                line.trim()
                    .trim_start_matches(|c: char| c.is_ascii_digit())
                    .trim_start_matches(['.', ')', '-', '*'])
                    .trim()
                    .trim_matches('"')
                    .to_string()
            })
            .collect(),
    )
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn tidy(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_json_array() {
        let captions = parse_captions(r#"["Sunset vibes 🌅", "Golden hour"]"#);
        assert_eq!(captions, vec!["Sunset vibes 🌅", "Golden hour"]);
    }

    #[test]
    fn parses_a_fenced_json_array() {
        let captions = parse_captions("```json\n[\"One\", \"Two\", \"Three\"]\n```");
        assert_eq!(captions, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn parses_an_object_envelope() {
        let captions = parse_captions(r#"{"captions": ["A", "B"]}"#);
        assert_eq!(captions, vec!["A", "B"]);
    }

    #[test]
    fn falls_back_to_line_splitting() {
        let captions = parse_captions("1. First caption\n2. Second caption\n- Third caption");
        assert_eq!(captions, vec!["First caption", "Second caption", "Third caption"]);
    }

    #[test]
    fn blank_responses_produce_an_empty_list() {
        assert!(parse_captions("").is_empty());
        assert!(parse_captions("   \n  ").is_empty());
        assert!(parse_captions("[]").is_empty());
    }

    #[test]
    fn prompt_includes_the_style_hint_only_when_present() {
        let with = GeminiEngine::build_prompt(Some("witty"));
        assert!(with.contains("should be witty"));
        let without = GeminiEngine::build_prompt(None);
        assert!(!without.contains("should be"));
    }
}
