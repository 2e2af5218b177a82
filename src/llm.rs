use crate::config::Config;
use crate::errors::AppError;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

/// External LLM providers the backend can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Grok,
    Doodle,
}

impl Provider {
    /// Parses a provider name from a request body (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "grok" => Some(Provider::Grok),
            "doodle" => Some(Provider::Doodle),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Grok => write!(f, "Grok"),
            Provider::Doodle => write!(f, "Doodle"),
        }
    }
}

/// Failure classification for a single upstream LLM call.
///
/// Each call is attempted once with a fixed timeout; there is no retry or
/// backoff. The taxonomy exists so the content-generation path can report a
/// distinct degraded status per failure type.
#[derive(Debug, Clone)]
pub enum LlmError {
    /// No API key configured for the provider.
    NotConfigured(Provider),
    /// The request timed out.
    Timeout,
    /// The provider could not be reached.
    Connection(String),
    /// The provider answered with a non-success HTTP status.
    Status(u16),
    /// The provider answered but the body was not usable.
    InvalidResponse(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::NotConfigured(p) => write!(f, "{} API not configured", p),
            LlmError::Timeout => write!(f, "LLM API request timed out"),
            LlmError::Connection(msg) => write!(f, "Cannot connect to LLM API: {}", msg),
            LlmError::Status(code) => write!(f, "API returned {}", code),
            LlmError::InvalidResponse(msg) => write!(f, "Invalid LLM response: {}", msg),
        }
    }
}

/// Client for the upstream chat-completion APIs (xAI Grok, Doodle).
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    xai_base_url: String,
    doodle_base_url: String,
    xai_api_key: Option<String>,
    google_api_key: Option<String>,
}

impl LlmClient {
    /// Creates a new `LlmClient` with the configured fixed timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create LLM client: {}", e))
            })?;

        Ok(Self {
            client,
            xai_base_url: config.xai_base_url.clone(),
            doodle_base_url: config.doodle_base_url.clone(),
            xai_api_key: config.xai_api_key.clone(),
            google_api_key: config.google_api_key.clone(),
        })
    }

    /// Sends a single prompt to the given provider and returns the answer text.
    pub async fn generate(&self, prompt: &str, provider: Provider) -> Result<String, LlmError> {
        match provider {
            Provider::Grok => self.call_grok(prompt).await,
            Provider::Doodle => self.call_doodle(prompt).await,
        }
    }

    /// Convenience wrapper that never fails: on error the error text itself
    /// becomes the answer. The agent path cannot tell a failed call apart
    /// from a low-confidence classification, and does not try to.
    pub async fn ask(&self, prompt: &str, provider: Provider) -> String {
        match self.generate(prompt, provider).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("LLM call failed, surfacing error text: {}", e);
                e.to_string()
            }
        }
    }

    async fn call_grok(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .xai_api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured(Provider::Grok))?;

        let url = format!("{}/v1/chat/completions", self.xai_base_url);
        tracing::debug!("Calling Grok chat completions: {}", url);

        let body = json!({
            "model": "grok-beta",
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.7
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status().as_u16()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        // choices[0].message.content, defaulting when the shape is off
        let content = data
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or("No response")
            .to_string();

        Ok(content)
    }

    async fn call_doodle(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self
            .google_api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured(Provider::Doodle))?;

        let url = format!("{}/v1/chat", self.doodle_base_url);
        tracing::debug!("Calling Doodle chat: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status().as_u16()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = match data.get("response").and_then(|v| v.as_str()) {
            Some(text) => text.to_string(),
            None => data.to_string(),
        };

        Ok(content)
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else if err.is_connect() {
        LlmError::Connection(err.to_string())
    } else {
        LlmError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            port: 5000,
            lead_model_path: "models/lead_model.json".to_string(),
            sales_model_path: "models/sales_model.json".to_string(),
            xai_api_key: None,
            google_api_key: None,
            xai_base_url: "https://api.x.ai".to_string(),
            doodle_base_url: "https://api.doodle.com".to_string(),
            llm_timeout_secs: 10,
        }
    }

    #[test]
    fn provider_parsing_is_case_insensitive() {
        assert_eq!(Provider::parse("Grok"), Some(Provider::Grok));
        assert_eq!(Provider::parse("grok"), Some(Provider::Grok));
        assert_eq!(Provider::parse(" DOODLE "), Some(Provider::Doodle));
        assert_eq!(Provider::parse("openai"), None);
    }

    #[tokio::test]
    async fn unconfigured_provider_degrades_to_error_text() {
        let client = LlmClient::new(&test_config()).unwrap();
        let answer = client.ask("hello", Provider::Grok).await;
        assert_eq!(answer, "Grok API not configured");
    }

    #[test]
    fn client_creation_succeeds_without_keys() {
        assert!(LlmClient::new(&test_config()).is_ok());
    }
}
