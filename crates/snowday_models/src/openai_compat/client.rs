//! Generic client for OpenAI-compatible APIs.

use crate::config::OpenAIConfig;
use crate::http::{build_client, ensure_success, transport_error};
use crate::openai_compat::{ChatResponse, conversions};
use async_trait::async_trait;
use reqwest::Client;
use snowday_core::GenerateRequest;
use snowday_error::{GenerationError, GenerationErrorKind, SnowdayResult};
use snowday_interface::TextGenerator;
use tracing::{debug, error, instrument};

/// Generic client for any OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    client: Client,
    config: OpenAIConfig,
    model: String,
    provider_name: &'static str,
}

impl OpenAICompatibleClient {
    /// Creates a new OpenAI-compatible client.
    ///
    /// `model` is used for requests that do not name their own.
    #[instrument(skip(config), fields(provider = provider_name, model = %model))]
    pub fn new(config: OpenAIConfig, model: String, provider_name: &'static str) -> SnowdayResult<Self> {
        let client = build_client(*config.timeout())?;

        debug!(
            provider = provider_name,
            model = %model,
            url = %config.base_url(),
            "Created OpenAI-compatible client"
        );

        Ok(Self {
            client,
            config,
            model,
            provider_name,
        })
    }

    /// Returns the default model name.
    pub fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatibleClient {
    #[instrument(skip(self, req), fields(provider = self.provider_name, task = %req.task()))]
    async fn generate(&self, req: &GenerateRequest) -> SnowdayResult<String> {
        let chat_request = conversions::to_chat_request(req, &self.model)?;

        debug!(
            model = %chat_request.model(),
            message_count = chat_request.messages().len(),
            "Sending request"
        );

        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(self.config.api_key())
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| transport_error(self.provider_name, e))?;
        let response = ensure_success(self.provider_name, response).await?;

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = self.provider_name, error = ?e, "Failed to parse response");
            GenerationError::new(GenerationErrorKind::MalformedResponse(format!(
                "Failed to parse JSON: {}",
                e
            )))
        })?;

        debug!(
            choices = chat_response.choices.len(),
            total_tokens = ?chat_response.usage.as_ref().and_then(|u| u.total_tokens),
            "Received response"
        );

        conversions::from_chat_response(&chat_response, &req.task().to_string())
    }

    fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}
