use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Who authored a chat turn. The transcript only ever holds these two;
// the system instruction is built inside the API client and never stored.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

// A single turn in the session transcript. Immutable once created,
// lives in memory only and dies with the process.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// Language tag attached to extracted code. Drives the preview wrapper
// (component languages get the CDN runtime) and the download filename.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Html,
    Jsx,
    Tsx,
    Js,
    Ts,
    Vue,
}

impl CodeLanguage {
    /// Parses a fenced-block info string. Accepts the `javascript` /
    /// `typescript` long forms the models like to emit.
    pub fn from_fence_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "html" => Some(Self::Html),
            "jsx" => Some(Self::Jsx),
            "tsx" => Some(Self::Tsx),
            "js" | "javascript" => Some(Self::Js),
            "ts" | "typescript" => Some(Self::Ts),
            "vue" => Some(Self::Vue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Jsx => "jsx",
            Self::Tsx => "tsx",
            Self::Js => "js",
            Self::Ts => "ts",
            Self::Vue => "vue",
        }
    }

    /// Conventional filename for the download action.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Html => "app.html",
            Self::Jsx => "App.jsx",
            Self::Tsx => "App.tsx",
            Self::Js => "App.js",
            Self::Ts => "App.ts",
            Self::Vue => "App.vue",
        }
    }

    /// True for code meant to run through the in-browser React/Babel
    /// pipeline rather than being written out as a plain document.
    pub fn is_component(&self) -> bool {
        matches!(self, Self::Jsx | Self::Tsx | Self::Js | Self::Ts)
    }
}

// What a generation turn hands the preview. `code` is never empty:
// every failure path substitutes the extractor's fallback payload.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GenerationResponse {
    pub code: String,
    pub language: CodeLanguage,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

// The persisted singleton. Always a syntactically valid absolute URL
// once it has been through `config::validate_endpoint`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EndpointConfig {
    pub url: String,
}
