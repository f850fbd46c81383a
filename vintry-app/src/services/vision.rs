//! Google Cloud Vision label recognition
//!
//! Runs one annotate call with OCR plus label detection, then applies
//! keyword heuristics over the raw text to guess the wine's details.
//! Cheaper and dumber than the OpenAI path; used when only a Vision
//! key is configured.

use super::LabelRecognition;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const VISION_BASE_URL: &str = "https://vision.googleapis.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Vision client errors
#[derive(Debug, Error)]
pub enum VisionError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// API returned a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Per-image error reported inside a 200 response
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize, Default)]
struct AnnotateResult {
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
    #[serde(rename = "labelAnnotations", default)]
    label_annotations: Vec<LabelAnnotation>,
    error: Option<AnnotateError>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct LabelAnnotation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct AnnotateError {
    message: String,
}

const COUNTRIES: &[&str] = &[
    "France",
    "Italy",
    "Spain",
    "USA",
    "United States",
    "California",
    "Chile",
    "Argentina",
    "Australia",
    "Germany",
    "Japan",
    "New Zealand",
    "Portugal",
    "South Africa",
];

const REGIONS: &[&str] = &[
    "Bordeaux",
    "Burgundy",
    "Bourgogne",
    "Champagne",
    "Rhone",
    "Loire",
    "Alsace",
    "Provence",
    "Languedoc",
    "Tuscany",
    "Toscana",
    "Piedmont",
    "Piemonte",
    "Rioja",
    "Napa",
    "Sonoma",
];

const GRAPE_VARIETIES: &[&str] = &[
    "Cabernet Sauvignon",
    "Merlot",
    "Pinot Noir",
    "Chardonnay",
    "Sauvignon Blanc",
    "Syrah",
    "Shiraz",
    "Tempranillo",
    "Riesling",
    "Pinot Grigio",
    "Sangiovese",
    "Nebbiolo",
    "Malbec",
    "Zinfandel",
];

pub struct VisionClient {
    client: reqwest::Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| VisionError::Network(e.to_string()))?;
        Ok(Self { client, api_key })
    }

    /// Recognize a wine label from a base64-encoded photo
    pub async fn recognize_label(
        &self,
        image_base64: &str,
    ) -> Result<LabelRecognition, VisionError> {
        let body = json!({
            "requests": [
                {
                    "image": { "content": image_base64 },
                    "features": [
                        { "type": "TEXT_DETECTION", "maxResults": 1 },
                        { "type": "LABEL_DETECTION", "maxResults": 10 }
                    ]
                }
            ]
        });

        let response = self
            .client
            .post(format!("{VISION_BASE_URL}/images:annotate"))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(VisionError::Api(status.as_u16(), detail));
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Parse(e.to_string()))?;

        let result = parsed.responses.into_iter().next().unwrap_or_default();
        if let Some(err) = result.error {
            return Err(VisionError::Annotation(err.message));
        }

        // The first text annotation holds the full OCR block
        let detected_text = result
            .text_annotations
            .first()
            .map(|t| t.description.as_str())
            .unwrap_or("");

        let wine_related = result.label_annotations.iter().any(|label| {
            let desc = label.description.to_lowercase();
            desc.contains("wine") || desc.contains("bottle") || desc.contains("drink")
        });

        Ok(extract_wine_info(detected_text, wine_related))
    }
}

/// Keyword extraction over the raw OCR text, scored for confidence
fn extract_wine_info(text: &str, wine_related: bool) -> LabelRecognition {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let vintage = find_vintage(text);
    let country = COUNTRIES
        .iter()
        .find(|c| text.contains(*c))
        .map(|c| c.to_string());
    let region = REGIONS
        .iter()
        .find(|r| text.contains(*r))
        .map(|r| r.to_string());
    let grape_varieties: Vec<String> = GRAPE_VARIETIES
        .iter()
        .filter(|g| text.contains(*g))
        .map(|g| g.to_string())
        .collect();

    // Labels usually lead with the cuvee name, then the producer
    let name = lines.first().map(|l| l.to_string());
    let producer = lines.get(1).map(|l| l.to_string());

    let mut score: f64 = 0.0;
    if wine_related {
        score += 0.3;
    }
    if name.is_some() {
        score += 0.15;
    }
    if producer.is_some() {
        score += 0.15;
    }
    if vintage.is_some() {
        score += 0.15;
    }
    if country.is_some() {
        score += 0.1;
    }
    if region.is_some() {
        score += 0.1;
    }
    if !grape_varieties.is_empty() {
        score += 0.05;
    }

    LabelRecognition {
        name,
        producer,
        vintage,
        country,
        region,
        grape_varieties,
        confidence: score.min(1.0),
    }
}

/// First standalone 4-digit year in the 1900-2099 range
fn find_vintage(text: &str) -> Option<i32> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 4 {
                let year: i32 = text[start..i].parse().ok()?;
                if (1900..=2099).contains(&year) {
                    return Some(year);
                }
            }
        } else {
            i += 1;
        }
    }
    None
}
