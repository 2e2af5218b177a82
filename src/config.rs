use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Path to the serialized lead-scoring pipeline artifact.
    pub lead_model_path: String,
    /// Path to the serialized sales-prediction model.
    pub sales_model_path: String,
    /// xAI (Grok) API key. Absence degrades content generation to mock responses.
    pub xai_api_key: Option<String>,
    /// Doodle API key. Absence degrades the Doodle provider to mock responses.
    pub google_api_key: Option<String>,
    pub xai_base_url: String,
    pub doodle_base_url: String,
    /// Timeout for each upstream LLM call, in seconds. Single attempt, no retry.
    pub llm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            lead_model_path: std::env::var("LEAD_MODEL_PATH")
                .unwrap_or_else(|_| "models/lead_model.json".to_string()),
            sales_model_path: std::env::var("SALES_MODEL_PATH")
                .unwrap_or_else(|_| "models/sales_model.json".to_string()),
            xai_api_key: std::env::var("XAI_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            google_api_key: std::env::var("GOOGLE_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            xai_base_url: std::env::var("XAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.x.ai".to_string())
                .trim_end_matches('/')
                .to_string(),
            doodle_base_url: std::env::var("DOODLE_BASE_URL")
                .unwrap_or_else(|_| "https://api.doodle.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("LLM_TIMEOUT_SECS must be a positive number"))?,
        };

        if !config.xai_base_url.starts_with("http://") && !config.xai_base_url.starts_with("https://")
        {
            anyhow::bail!("XAI_BASE_URL must start with http:// or https://");
        }
        if !config.doodle_base_url.starts_with("http://")
            && !config.doodle_base_url.starts_with("https://")
        {
            anyhow::bail!("DOODLE_BASE_URL must start with http:// or https://");
        }
        if config.llm_timeout_secs == 0 {
            anyhow::bail!("LLM_TIMEOUT_SECS must be a positive number");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Lead model path: {}", config.lead_model_path);
        tracing::debug!("Sales model path: {}", config.sales_model_path);
        tracing::debug!("xAI Base URL: {}", config.xai_base_url);
        if config.xai_api_key.is_none() {
            tracing::warn!("XAI_API_KEY not set - content generation will use mock fallbacks");
        }
        if config.google_api_key.is_none() {
            tracing::warn!("GOOGLE_API_KEY not set - Doodle provider will use mock fallbacks");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
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
    fn config_is_cloneable_for_state_sharing() {
        let config = base_config();
        let cloned = config.clone();
        assert_eq!(cloned.port, 5000);
        assert!(cloned.xai_api_key.is_none());
    }
}
