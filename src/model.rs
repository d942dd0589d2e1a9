use crate::error::GenerateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Message used when the service rejects a request without saying why.
pub const REJECTED_FALLBACK: &str = "Failed to generate response";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

/// Tone steering the style of the generated reply.
///
/// The order is the order shown in the selector; the lowercase labels are what
/// the service expects on the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Casual,
    Empathetic,
    Assertive,
    Apologetic,
    Enthusiastic,
    Encouraging,
    Urgent,
    Neutral,
}

impl Tone {
    pub const ALL: [Tone; 10] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Casual,
        Tone::Empathetic,
        Tone::Assertive,
        Tone::Apologetic,
        Tone::Enthusiastic,
        Tone::Encouraging,
        Tone::Urgent,
        Tone::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Casual => "casual",
            Tone::Empathetic => "empathetic",
            Tone::Assertive => "assertive",
            Tone::Apologetic => "apologetic",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Encouraging => "encouraging",
            Tone::Urgent => "urgent",
            Tone::Neutral => "neutral",
        }
    }

    fn index(self) -> usize {
        Tone::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Next tone in selector order, wrapping around.
    pub fn next(self) -> Tone {
        Tone::ALL[(self.index() + 1) % Tone::ALL.len()]
    }

    /// Previous tone in selector order, wrapping around.
    pub fn prev(self) -> Tone {
        let n = Tone::ALL.len();
        Tone::ALL[(self.index() + n - 1) % n]
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of the outbound generate call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub email_content: String,
    pub tone: Tone,
}

/// Envelope returned by the service on any 2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub success: bool,
}

impl GenerateResponse {
    /// Interpret the envelope: `success=false` becomes a rejection, otherwise
    /// the data field is the reply (empty when absent).
    pub fn into_reply(self) -> Result<String, GenerateError> {
        if !self.success {
            let message = self
                .error_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
            return Err(GenerateError::Rejected(message));
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// Headless `--json` output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub timestamp_utc: String,
    pub endpoint: String,
    pub tone: Tone,
    pub status: crate::controller::Status,
    pub data: String,
    pub error_message: Option<String>,
    pub success: bool,
}
