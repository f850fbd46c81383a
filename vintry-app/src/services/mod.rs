//! External AI collaborators
//!
//! Both clients are advisory: the core never blocks on them and every
//! failure degrades to manual entry.

pub mod openai;
pub mod vision;

use serde::{Deserialize, Serialize};

/// Best-effort structured guess extracted from a label photo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelRecognition {
    pub name: Option<String>,
    pub producer: Option<String>,
    pub vintage: Option<i32>,
    pub country: Option<String>,
    pub region: Option<String>,
    #[serde(default)]
    pub grape_varieties: Vec<String>,
    /// 0-1; advisory, never authoritative
    #[serde(default)]
    pub confidence: f64,
}
