use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Lead Scoring Models ============

/// A flat lead record as submitted by callers.
///
/// Field names are not fixed at the type level: the scoring layer coerces the
/// twelve recognized numeric fields to `f64` and treats every other field as
/// categorical text. Each record is independent and stateless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadRecord {
    pub fields: serde_json::Map<String, Value>,
}

impl LeadRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Response for a single scored lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadScoreResponse {
    /// Model-estimated conversion likelihood, in [0, 1].
    pub conversion_probability: f64,
    /// Natural-language label at threshold 0.5.
    pub message: String,
}

/// Request body for bulk lead scoring.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkScoreRequest {
    #[serde(default)]
    pub leads: Vec<LeadRecord>,
}

/// Response for bulk lead scoring. `predictions` has one entry per input lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkScoreResponse {
    pub predictions: Vec<f64>,
    pub message: String,
}

// ============ Agent Models ============

/// Request body for the agent endpoint.
///
/// `model` and `temperature` are accepted from the chat UI but not consulted
/// by the dispatch logic.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentRequest {
    pub query: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
}

// ============ Forecast Models ============

fn default_periods() -> usize {
    12
}

fn default_forecast_model() -> String {
    "simple".to_string()
}

/// Request body for sales forecasting.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default = "default_periods")]
    pub periods: usize,
    #[serde(default = "default_forecast_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub forecast: Vec<f64>,
    pub periods: usize,
    pub model: String,
}

// ============ Content Generation Models ============

fn default_provider() -> String {
    "Grok".to_string()
}

/// Request body for marketing content generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_provider")]
    pub provider: String,
}

/// Response for content generation.
///
/// Always carries `content`, even on degraded paths: failures are reported
/// through `status`/`message` with mock content, never as an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenerateContentResponse {
    pub fn success(content: String, provider: String) -> Self {
        Self {
            content,
            provider: Some(provider),
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn degraded(status: &str, message: String, content: String) -> Self {
        Self {
            content,
            provider: None,
            status: status.to_string(),
            message: Some(message),
        }
    }
}

// ============ Retrieval Models ============

/// A single retrieval hit returned by the document search tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagHit {
    pub content: String,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_record_deserializes_flat_object() {
        let record: LeadRecord =
            serde_json::from_str(r#"{"age": 30, "job": "technician", "balance": "1500"}"#).unwrap();
        assert_eq!(record.get("age"), Some(&serde_json::json!(30)));
        assert_eq!(record.get("job"), Some(&serde_json::json!("technician")));
        assert!(record.get("month").is_none());
    }

    #[test]
    fn forecast_request_defaults() {
        let req: ForecastRequest = serde_json::from_str(r#"{"data": [1.0, 2.0]}"#).unwrap();
        assert_eq!(req.periods, 12);
        assert_eq!(req.model, "simple");
    }

    #[test]
    fn degraded_content_response_keeps_content_field() {
        let resp = GenerateContentResponse::degraded(
            "timeout",
            "Grok API request timed out".to_string(),
            "Quick response for: launch email...".to_string(),
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "timeout");
        assert!(json["content"].is_string());
        assert!(json.get("provider").is_none());
    }
}
