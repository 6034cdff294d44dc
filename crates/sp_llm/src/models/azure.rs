use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sp_core::{Error, GenerationConfig, GenerationModel, Result};
use std::fmt;
use std::sync::Arc;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Azure OpenAI chat-completions client.
pub struct AzureOpenAiModel {
    client: Arc<Client>,
    config: GenerationConfig,
}

impl fmt::Debug for AzureOpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.config.endpoint)
            .field("deployment", &self.config.deployment)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AzureOpenAiModel {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(Error::Generation(
                "Azure OpenAI API key is required".to_string(),
            ));
        }
        if config.endpoint.is_empty() {
            return Err(Error::Generation(
                "Azure OpenAI endpoint is required".to_string(),
            ));
        }
        Ok(Self {
            client: Arc::new(Client::new()),
            config,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }
}

#[async_trait]
impl GenerationModel for AzureOpenAiModel {
    fn name(&self) -> &str {
        "AzureOpenAI"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: 0.7,
            max_tokens: 4000,
        };

        tracing::debug!("Requesting completion from {}", self.config.deployment);
        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", self.config.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "generation service returned {status}: {body}"
            )));
        }

        let completion = response.json::<ChatResponse>().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Generation("generation response had no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_requires_api_key() {
        let config = GenerationConfig {
            endpoint: "https://example.openai.azure.com".to_string(),
            api_key: None,
            ..GenerationConfig::default()
        };
        let result = AzureOpenAiModel::new(config);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Generation error: Azure OpenAI API key is required"
        );
    }

    #[test]
    fn test_model_requires_endpoint() {
        let config = GenerationConfig {
            api_key: Some("test-key".to_string()),
            ..GenerationConfig::default()
        };
        assert!(AzureOpenAiModel::new(config).is_err());
    }

    #[test]
    fn test_completions_url_shape() {
        let config = GenerationConfig {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: Some("test-key".to_string()),
            deployment: "gpt-4".to_string(),
            api_version: "2024-07-01-preview".to_string(),
        };
        let model = AzureOpenAiModel::new(config).unwrap();
        assert_eq!(
            model.completions_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4/chat/completions?api-version=2024-07-01-preview"
        );
    }
}
