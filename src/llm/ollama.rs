use anyhow::{Context, Result, anyhow};
use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;
use std::time::Duration;

use super::{GenerationSettings, Generator};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

#[derive(Debug, Encode, Decode)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Decode)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Encode)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Encode)]
struct ChatRequest {
    model: String,
    stream: bool,
    messages: Vec<OllamaMessage>,
    options: ChatOptions,
}

/// Synchronous Ollama client using /api/chat.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
    settings: GenerationSettings,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        settings: GenerationSettings,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            settings,
        })
    }

    fn encode_request(&self, system: &str, user: &str) -> Result<String> {
        let req_body = ChatRequest {
            model: self.model.clone(),
            stream: false,
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            options: ChatOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.max_tokens,
            },
        };

        json::to_string(&req_body).map_err(|e| anyhow!("Failed to encode Ollama JSON request: {e}"))
    }
}

impl Generator for OllamaClient {
    fn generate(&self, system: &str, user: &str) -> Result<String> {
        let body_str = self.encode_request(system, user)?;
        log::trace!("Ollama request body: {body_str}");

        let url = format!("{}/api/chat", self.base_url);
        log::info!("Calling Ollama model {:?}", self.model);

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .with_context(|| format!("Error calling Ollama at {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!("Ollama API error: HTTP {} - {}", status.as_u16(), text));
        }

        let resp_text = resp
            .text()
            .context("Failed to read Ollama response body")?;

        log::trace!("Ollama raw JSON response: {resp_text}");

        let parsed: OllamaChatResponse =
            json::from_str(&resp_text).map_err(|e| anyhow!("Failed to decode Ollama JSON: {e}"))?;

        Ok(parsed.message.content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_options_and_both_messages() {
        let client = OllamaClient::new(
            "http://localhost:11434/",
            "llama3.1",
            GenerationSettings {
                max_tokens: 256,
                temperature: 0.5,
            },
        )
        .unwrap();

        let body = client.encode_request("be brief", "describe this").unwrap();

        assert!(body.contains("\"llama3.1\""));
        assert!(body.contains("\"be brief\""));
        assert!(body.contains("\"describe this\""));
        assert!(body.contains("256"));
        assert_eq!(client.base_url, "http://localhost:11434");
    }
}
