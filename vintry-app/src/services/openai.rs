//! OpenAI chat-completions client
//!
//! Covers the three advisory flows: label recognition from a photo,
//! sommelier advice over the current inventory, and tasting-note
//! generation from a rough impression. Stateless per call.

use super::LabelRecognition;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-4o";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI client errors
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// API returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Chat completion response (the subset we read)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Result<Self, OpenAiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OpenAiError::Network(e.to_string()))?;
        Ok(Self { client, api_key })
    }

    async fn chat(&self, body: Value) -> Result<String, OpenAiError> {
        let response = self
            .client
            .post(format!("{OPENAI_BASE_URL}/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OpenAiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OpenAiError::Api(status.as_u16(), detail));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OpenAiError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenAiError::Parse("Empty completion".to_string()))
    }

    /// Extract wine details from a base64-encoded label photo
    pub async fn recognize_label(
        &self,
        image_base64: &str,
    ) -> Result<LabelRecognition, OpenAiError> {
        let body = json!({
            "model": MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert at reading wine labels. Extract the wine's \
                                details from the image and reply as a JSON object with the keys \
                                name, producer, vintage, country, region, grape_varieties \
                                (array of strings) and confidence (0-1). Omit keys you cannot \
                                determine."
                },
                {
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": "Extract the wine name, producer, vintage, country, region \
                                     and grape varieties from this label. Include a 0-1 \
                                     confidence score."
                        },
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:image/jpeg;base64,{image_base64}")
                            }
                        }
                    ]
                }
            ],
            "response_format": { "type": "json_object" }
        });

        let content = self.chat(body).await?;
        serde_json::from_str(&content).map_err(|e| OpenAiError::Parse(e.to_string()))
    }

    /// Free-text advice grounded in a plain-text inventory summary
    pub async fn ask_sommelier(
        &self,
        question: &str,
        inventory_summary: &str,
    ) -> Result<String, OpenAiError> {
        let context = if inventory_summary.is_empty() {
            "no inventory information"
        } else {
            inventory_summary
        };
        let body = json!({
            "model": MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": format!(
                        "You are an experienced sommelier. The user's cellar inventory: {context}"
                    )
                },
                { "role": "user", "content": question }
            ]
        });

        self.chat(body).await
    }

    /// Expand a rough impression into a detailed tasting note
    pub async fn generate_tasting_note(&self, user_input: &str) -> Result<String, OpenAiError> {
        let body = json!({
            "model": MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a professional sommelier. Turn the user's brief \
                                impression into a detailed, professional tasting note."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Write a detailed tasting note based on this impression: {user_input}"
                    )
                }
            ]
        });

        self.chat(body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_recognition_parses_partial_json() {
        let content = r#"{"name":"Clos Test","vintage":2019,"confidence":0.8}"#;
        let parsed: LabelRecognition = serde_json::from_str(content).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Clos Test"));
        assert_eq!(parsed.vintage, Some(2019));
        assert!(parsed.producer.is_none());
        assert!(parsed.grape_varieties.is_empty());
        assert!((parsed.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn chat_response_takes_first_choice_content() {
        let body = r#"{"choices":[{"message":{"content":"Try the Rioja tonight."}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Try the Rioja tonight.")
        );
    }
}
