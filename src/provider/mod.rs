// Client seam for the hosted agent interactions API
//
// Planning, deep research and analysis are all remote capabilities; this
// module owns the wire types and the trait the rest of the crate talks
// through, so tests can script the provider without a network.

mod http;
mod poll;

pub use http::HttpInteractionClient;
pub use poll::{poll_until_terminal, PollConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

/// Remote lifecycle state of an interaction.
///
/// Anything other than `InProgress` stops the polling loop; only `Failed`
/// is treated as an error by the orchestrator. Statuses this crate does
/// not know about deserialize to `Unknown` and stop the loop too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl InteractionStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, InteractionStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionStatus::Queued => "queued",
            InteractionStatus::InProgress => "in_progress",
            InteractionStatus::Completed => "completed",
            InteractionStatus::Failed => "failed",
            InteractionStatus::Unknown => "unknown",
        }
    }
}

impl Default for InteractionStatus {
    fn default() -> Self {
        // Synchronous calls come back without a status field
        InteractionStatus::Completed
    }
}

impl std::fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request body for creating an interaction: a model-or-agent id,
/// free-text input, an optional chaining handle, and the background and
/// store flags
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_interaction_id: Option<String>,
    pub background: bool,
    pub store: bool,
}

impl InteractionRequest {
    /// Synchronous model call (planning, analysis stages)
    pub fn for_model(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            agent: None,
            input: input.into(),
            previous_interaction_id: None,
            background: false,
            store: true,
        }
    }

    /// Named agent call (deep research)
    pub fn for_agent(agent: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: None,
            agent: Some(agent.into()),
            input: input.into(),
            previous_interaction_id: None,
            background: false,
            store: true,
        }
    }

    /// Chain this interaction to a previous one
    pub fn with_previous(mut self, id: impl Into<String>) -> Self {
        self.previous_interaction_id = Some(id.into());
        self
    }

    /// Run as a background job that must be polled
    pub fn in_background(mut self) -> Self {
        self.background = true;
        self
    }
}

/// An interaction as returned by the provider. The handle is opaque; the
/// orchestrator only stores the id and reads status and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(default)]
    pub status: InteractionStatus,
    #[serde(default)]
    pub outputs: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Interaction {
    /// Best-effort failure message for a failed interaction
    pub fn failure_message(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        let text = crate::parsers::extract_text(Some(&self.outputs));
        if text.is_empty() {
            "no error detail provided".to_string()
        } else {
            text
        }
    }
}

/// The remote capabilities this crate depends on
#[async_trait]
pub trait InteractionClient: Send + Sync {
    /// Create a new interaction (model or agent call)
    async fn create_interaction(
        &self,
        request: InteractionRequest,
    ) -> Result<Interaction, ProviderError>;

    /// Fetch an interaction by id to read its current status and outputs
    async fn get_interaction(&self, id: &str) -> Result<Interaction, ProviderError>;

    /// Generate an image from a text prompt (infographic tool)
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError>;
}
