// reqwest-backed client for the hosted interactions API

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;

use super::{Interaction, InteractionClient, InteractionRequest, ProviderError};

/// HTTP client for a hosted interactions endpoint.
///
/// All calls authenticate with a bearer API key. Non-2xx responses are
/// surfaced with their status and body text so the user sees the
/// provider's own message.
pub struct HttpInteractionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpInteractionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::Api { status, body })
    }
}

#[derive(Deserialize)]
struct ImageResponse {
    /// Base64-encoded image bytes
    data: String,
}

#[async_trait::async_trait]
impl InteractionClient for HttpInteractionClient {
    async fn create_interaction(
        &self,
        request: InteractionRequest,
    ) -> Result<Interaction, ProviderError> {
        let url = format!("{}/interactions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", "dealdesk")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let response = Self::check(response).await?;

        response
            .json::<Interaction>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn get_interaction(&self, id: &str) -> Result<Interaction, ProviderError> {
        let url = format!("{}/interactions/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", "dealdesk")
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let response = Self::check(response).await?;

        response
            .json::<Interaction>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/images:generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("User-Agent", "dealdesk")
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let response = Self::check(response).await?;

        let image = response
            .json::<ImageResponse>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        BASE64
            .decode(image.data.as_bytes())
            .map_err(|e| ProviderError::Decode(format!("invalid image payload: {}", e)))
    }
}
