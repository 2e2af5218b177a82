/// Lead-scoring and forecasting tests against the shipped model artifact
use axum::extract::State;
use axum::Json;
use marketmind_api::config::Config;
use marketmind_api::errors::AppError;
use marketmind_api::handlers::{
    predict_leads_bulk, predict_single_lead, run_forecast, AppState,
};
use marketmind_api::llm::LlmClient;
use marketmind_api::models::{BulkScoreRequest, ForecastRequest, LeadRecord};
use marketmind_api::scoring::{LeadScorer, PipelineArtifact};
use marketmind_api::tools::{RagIndex, SalesModel};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

fn create_test_config() -> Config {
    Config {
        port: 5000,
        lead_model_path: "models/lead_model.json".to_string(),
        sales_model_path: "models/sales_model.json".to_string(),
        xai_api_key: None,
        google_api_key: None,
        xai_base_url: "http://127.0.0.1:1".to_string(),
        doodle_base_url: "http://127.0.0.1:1".to_string(),
        llm_timeout_secs: 1,
    }
}

fn create_test_state(scorer: LeadScorer) -> Arc<AppState> {
    let config = create_test_config();
    let llm = LlmClient::new(&config).unwrap();
    Arc::new(AppState {
        scorer,
        sales_model: SalesModel::new(None),
        rag_index: RagIndex::empty(),
        llm,
        classification_cache: Cache::builder()
            .time_to_live(Duration::from_secs(300))
            .max_capacity(1_000)
            .build(),
        content_cache: Cache::builder()
            .time_to_live(Duration::from_secs(3600))
            .max_capacity(1_000)
            .build(),
        config,
    })
}

fn lead(json: serde_json::Value) -> LeadRecord {
    serde_json::from_value(json).unwrap()
}

/// A complete record matching the shipped artifact's columns.
fn complete_lead() -> LeadRecord {
    lead(serde_json::json!({
        "age": 35,
        "job": "technician",
        "marital": "single",
        "education": "tertiary",
        "default": "no",
        "balance": 1200,
        "housing": "no",
        "loan": "no",
        "contact": "cellular",
        "day_of_week": 12,
        "month": "may",
        "duration": 180,
        "campaign": 2,
        "pdays": 30,
        "previous": 1,
        "poutcome": "unknown"
    }))
}

#[test]
fn shipped_artifact_loads() {
    let artifact = PipelineArtifact::load("models/lead_model.json").unwrap();
    assert_eq!(artifact.numeric.len(), 7);
    assert_eq!(artifact.categorical.len(), 9);
}

#[tokio::test]
async fn single_lead_scores_within_unit_interval() {
    let state = create_test_state(LeadScorer::from_file("models/lead_model.json"));
    let Json(response) = predict_single_lead(State(state), Json(complete_lead())).await;

    assert!((0.0..=1.0).contains(&response.conversion_probability));
    assert!(
        response.message == "High Potential Lead" || response.message == "Low Potential Lead"
    );
}

#[tokio::test]
async fn malformed_numeric_degrades_to_neutral_score() {
    let state = create_test_state(LeadScorer::from_file("models/lead_model.json"));
    let mut record = complete_lead();
    record
        .fields
        .insert("age".to_string(), serde_json::json!("thirty-five"));

    let Json(response) = predict_single_lead(State(state), Json(record)).await;

    assert_eq!(response.conversion_probability, 0.5);
    assert_eq!(response.message, "Low Potential Lead");
}

#[tokio::test]
async fn unknown_categories_do_not_break_scoring() {
    let state = create_test_state(LeadScorer::from_file("models/lead_model.json"));
    let mut record = complete_lead();
    record
        .fields
        .insert("job".to_string(), serde_json::json!("astronaut"));

    let Json(response) = predict_single_lead(State(state), Json(record)).await;
    assert!((0.0..=1.0).contains(&response.conversion_probability));
}

#[tokio::test]
async fn missing_artifact_falls_back_to_heuristic_range() {
    // Nonexistent path: the scorer must come up without a model
    let state = create_test_state(LeadScorer::from_file("models/does_not_exist.json"));

    let Json(response) = predict_single_lead(
        State(state),
        Json(lead(serde_json::json!({"age": 45, "balance": 3000}))),
    )
    .await;

    assert!((0.1..=0.9).contains(&response.conversion_probability));
}

#[tokio::test]
async fn bulk_prediction_count_matches_input() {
    let state = create_test_state(LeadScorer::from_file("models/lead_model.json"));
    let leads = vec![
        complete_lead(),
        lead(serde_json::json!({"age": "bad"})),
        lead(serde_json::json!({})),
    ];
    let expected = leads.len();

    let Json(response) = predict_leads_bulk(State(state), Json(BulkScoreRequest { leads }))
        .await
        .unwrap();

    assert_eq!(response.predictions.len(), expected);
    assert_eq!(response.message, "Scored 3 leads successfully");
    assert!(response
        .predictions
        .iter()
        .all(|p| (0.0..=1.0).contains(p)));
}

#[tokio::test]
async fn empty_lead_batch_is_rejected() {
    let state = create_test_state(LeadScorer::from_file("models/lead_model.json"));

    let result = predict_leads_bulk(State(state), Json(BulkScoreRequest { leads: vec![] })).await;

    match result {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "No leads provided"),
        other => panic!("expected BadRequest, got {:?}", other.map(|Json(r)| r)),
    }
}

#[tokio::test]
async fn forecast_handler_echoes_periods_and_model() {
    let state = create_test_state(LeadScorer::new(None));

    let Json(response) = run_forecast(
        State(state),
        Json(ForecastRequest {
            data: vec![100.0, 110.0, 105.0, 120.0],
            periods: 6,
            model: "simple".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.forecast.len(), 6);
    assert_eq!(response.periods, 6);
    assert_eq!(response.model, "simple");
}

#[tokio::test]
async fn forecast_handler_rejects_empty_series() {
    let state = create_test_state(LeadScorer::new(None));

    let result = run_forecast(
        State(state),
        Json(ForecastRequest {
            data: vec![],
            periods: 12,
            model: "simple".to_string(),
        }),
    )
    .await;

    match result {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "No data provided"),
        other => panic!("expected BadRequest, got {:?}", other.map(|Json(r)| r)),
    }
}
