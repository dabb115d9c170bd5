use std::time::Duration;

use super::{Suggester, parse_suggestions};
use crate::error::{Error, Result};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You suggest list entries. Return ONLY a JSON object of the form \
     {\"suggestions\": [\"...\", \"...\"]}, no explanation. Each suggestion is a single line.";

/// Suggestion service backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicSuggester {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicSuggester {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Suggestion(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    /// Build a suggester from the key stored in the system keyring.
    pub async fn from_keyring(model: impl Into<String>) -> Result<Self> {
        match super::keyring::load_api_key().await? {
            Some(key) => Self::new(key, model),
            None => Err(Error::Suggestion("no Anthropic API key configured".to_string())),
        }
    }

    /// Verify the API key with a minimal request.
    pub async fn test_api_key(&self) -> Result<()> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 4,
            "messages": [
                { "role": "user", "content": "Reply with OK" }
            ]
        });
        let resp = self.post(&body).await?;
        if resp.status().is_success() {
            Ok(())
        } else if resp.status().as_u16() == 401 {
            Err(Error::Suggestion("invalid API key".to_string()))
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(Error::Suggestion(format!("API error {}: {}", status, text)))
        }
    }

    async fn post(&self, body: &serde_json::Value) -> Result<reqwest::Response> {
        self.client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Suggestion(format!("API request failed: {}", e)))
    }
}

impl Suggester for AnthropicSuggester {
    async fn suggest(&self, prompt: &str) -> Result<Vec<String>> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "system": SYSTEM_PROMPT,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        let resp = self.post(&body).await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Suggestion(format!("API error {}: {}", status, text)));
        }

        let api_resp: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::Suggestion(format!("failed to parse API response: {}", e)))?;

        let text = response_text(&api_resp)?;
        parse_suggestions(text)
    }
}

/// Text of the first content block.
fn response_text(api_resp: &serde_json::Value) -> Result<&str> {
    api_resp["content"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|block| block["text"].as_str())
        .ok_or_else(|| Error::Suggestion("no text in API response".to_string()))
}
