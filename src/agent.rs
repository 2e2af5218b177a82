//! Tool dispatch for the sales-agent endpoint.
//!
//! The LLM is asked to answer with exactly one tool name; routing is by
//! substring containment on the lowercased answer, checked in a fixed order
//! with first match winning. A failed LLM call is indistinguishable from a
//! low-confidence classification: both fall through to general chat, where
//! the error text itself can surface as the final answer.

use crate::cache::classification_cache_key;
use crate::handlers::AppState;
use crate::llm::Provider;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are an AI Sales Agent.\n\
    Decide which tool to use:\n\n\
    Available tools:\n\
    - sales_prediction\n\
    - rag_search\n\
    - image_generation\n\
    - general_chat\n\n\
    Respond ONLY with tool name.";

/// Dummy feature vector used until the chat UI collects real inputs.
const DUMMY_SALES_FEATURES: [f64; 3] = [1000.0, 200.0, 1.0];

/// Classifies the query and routes to the matching tool.
///
/// Never fails: tool errors surface inline as the response text.
pub async fn agent_decision(state: &Arc<AppState>, query: &str) -> String {
    let classification = classify(state, query).await;
    tracing::info!("Agent classified query as: {}", classification);

    // Order is significant: earlier-listed tools win on ambiguous answers
    if classification.contains("sales_prediction") {
        match state.sales_model.predict(&DUMMY_SALES_FEATURES) {
            Ok(value) => format!("Predicted Sales: {}", value),
            Err(e) => e.to_string(),
        }
    } else if classification.contains("rag_search") {
        let hits = state.rag_index.search(query);
        serde_json::to_string(&hits)
            .unwrap_or_else(|e| format!("Search failed to serialize results: {}", e))
    } else if classification.contains("image_generation") {
        crate::tools::marketing_image_url(query)
    } else {
        // general_chat semantics: forward the original query
        state.llm.ask(query, Provider::Grok).await
    }
}

/// Asks the LLM which tool fits the query, consulting the classification
/// cache first. The cached value is the trimmed, lowercased raw answer.
///
/// Only successful calls are cached: a transient upstream failure still
/// routes on the error text for this request, but the next request with the
/// same query asks the upstream again.
async fn classify(state: &Arc<AppState>, query: &str) -> String {
    let cache_key = classification_cache_key(query);

    if let Some(cached) = state.classification_cache.get(&cache_key).await {
        tracing::debug!("Classification cache HIT");
        return cached;
    }

    let prompt = format!("{}\nUser: {}", SYSTEM_PROMPT, query);
    match state.llm.generate(&prompt, Provider::Grok).await {
        Ok(text) => {
            let answer = text.trim().to_lowercase();
            state
                .classification_cache
                .insert(cache_key, answer.clone())
                .await;
            answer
        }
        Err(e) => {
            tracing::warn!("Classification call failed, not caching: {}", e);
            e.to_string().trim().to_lowercase()
        }
    }
}
