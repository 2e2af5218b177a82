use crate::agent::agent_decision;
use crate::cache::content_cache_key;
use crate::config::Config;
use crate::errors::AppError;
use crate::forecast::forecast;
use crate::llm::{LlmClient, LlmError, Provider};
use crate::models::*;
use crate::scoring::{score_label, LeadScorer};
use crate::tools::{RagIndex, SalesModel};
use axum::{extract::State, http::StatusCode, Json};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Model artifacts are loaded once at startup and treated as read-only for
/// the process lifetime; concurrent reads need no coordination.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead-scoring pipeline handle.
    pub scorer: LeadScorer,
    /// Naive sales-prediction model.
    pub sales_model: SalesModel,
    /// In-process retrieval index.
    pub rag_index: RagIndex,
    /// Client for upstream LLM providers.
    pub llm: LlmClient,
    /// Tool-classification cache (5 min TTL) keyed by query digest.
    pub classification_cache: Cache<String, String>,
    /// Generated-content cache (1 h TTL) keyed by provider + prompt digest.
    pub content_cache: Cache<String, String>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "marketmind-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /agent
///
/// Routes a free-text query through the tool dispatcher. Tool failures
/// surface inline in the response text; only a missing query is an error.
pub async fn run_agent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, AppError> {
    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'query' field".to_string()))?;

    tracing::info!("POST /agent - query length: {}", query.len());

    let response = agent_decision(&state, query).await;

    Ok(Json(AgentResponse { response }))
}

/// POST /predict-lead
///
/// Scores a single flat lead record. Inference failures degrade to a neutral
/// 0.5 inside the scorer, so this handler itself cannot fail.
pub async fn predict_single_lead(
    State(state): State<Arc<AppState>>,
    Json(record): Json<LeadRecord>,
) -> Json<LeadScoreResponse> {
    let probability = state.scorer.score(&record);

    tracing::info!(
        "POST /predict-lead - probability: {:.3} (model: {})",
        probability,
        state.scorer.has_model()
    );

    Json(LeadScoreResponse {
        conversion_probability: probability,
        message: score_label(probability).to_string(),
    })
}

/// POST /predict
///
/// Scores a batch of leads, one prediction per input record. An empty batch
/// is rejected explicitly.
pub async fn predict_leads_bulk(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkScoreRequest>,
) -> Result<Json<BulkScoreResponse>, AppError> {
    if request.leads.is_empty() {
        return Err(AppError::BadRequest("No leads provided".to_string()));
    }

    let predictions = state.scorer.score_bulk(&request.leads);

    tracing::info!("POST /predict - scored {} leads", predictions.len());

    let message = format!("Scored {} leads successfully", predictions.len());
    Ok(Json(BulkScoreResponse {
        predictions,
        message,
    }))
}

/// POST /forecast
///
/// Forecasts future values for a numeric series. Empty data is HTTP 400;
/// computation failures are HTTP 500.
pub async fn run_forecast(
    State(_state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, AppError> {
    tracing::info!(
        "POST /forecast - {} points, {} periods, model '{}'",
        request.data.len(),
        request.periods,
        request.model
    );

    let values = forecast(&request.data, request.periods, &request.model)?;

    Ok(Json(ForecastResponse {
        forecast: values,
        periods: request.periods,
        model: request.model,
    }))
}

/// POST /generate-content
///
/// Generates marketing copy via the configured provider. Never hard-fails:
/// every failure type maps to a distinct degraded status with mock content,
/// always under HTTP 200.
pub async fn generate_content(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateContentRequest>,
) -> Json<GenerateContentResponse> {
    let excerpt = prompt_excerpt(&request.prompt);

    let provider = match Provider::parse(&request.provider) {
        Some(provider) => provider,
        None => {
            return Json(GenerateContentResponse::degraded(
                "error",
                format!("Unknown provider: {}", request.provider),
                format!("Content ideas for: {}...", excerpt),
            ));
        }
    };

    // Key on the canonical provider name so "grok" and "Grok" share an entry
    let cache_key = content_cache_key(&provider.to_string(), &request.prompt);
    if let Some(cached) = state.content_cache.get(&cache_key).await {
        tracing::debug!("Content cache HIT for provider {}", provider);
        return Json(GenerateContentResponse::success(
            cached,
            provider.to_string(),
        ));
    }

    match state.llm.generate(&request.prompt, provider).await {
        Ok(content) => {
            state.content_cache.insert(cache_key, content.clone()).await;
            Json(GenerateContentResponse::success(
                content,
                provider.to_string(),
            ))
        }
        Err(LlmError::NotConfigured(p)) => {
            let env_var = match p {
                Provider::Grok => "XAI_API_KEY",
                Provider::Doodle => "GOOGLE_API_KEY",
            };
            Json(GenerateContentResponse::degraded(
                "api_not_configured",
                format!("{} API not configured. Set {} environment variable.", p, env_var),
                format!(
                    "Generated content for: {}... (mock response - API key not set)",
                    excerpt
                ),
            ))
        }
        Err(LlmError::Status(code)) => Json(GenerateContentResponse::degraded(
            "api_error",
            format!("{} API returned status {}", provider, code),
            format!("Content suggestions for: {}...", excerpt),
        )),
        Err(LlmError::Connection(_)) => Json(GenerateContentResponse::degraded(
            "connection_error",
            format!(
                "Cannot connect to {} API. Please check your internet connection.",
                provider
            ),
            format!("Suggested content for: {}... (using fallback)", excerpt),
        )),
        Err(LlmError::Timeout) => Json(GenerateContentResponse::degraded(
            "timeout",
            format!("{} API request timed out", provider),
            format!("Quick response for: {}...", excerpt),
        )),
        Err(e) => Json(GenerateContentResponse::degraded(
            "error",
            e.to_string(),
            format!("Content ideas for: {}...", excerpt),
        )),
    }
}

/// First 100 characters of the prompt, char-boundary safe, used in degraded
/// mock content.
fn prompt_excerpt(prompt: &str) -> String {
    prompt.chars().take(100).collect()
}
