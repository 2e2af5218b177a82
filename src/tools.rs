//! Tool implementations the agent dispatches to.

use crate::errors::AppError;
use crate::models::RagHit;
use serde::{Deserialize, Serialize};

// ============ Sales Prediction ============

/// Serialized linear sales-prediction model (weights + bias).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesArtifact {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Naive sales regressor. Degrades to a mock prediction when no artifact was
/// found at startup.
pub struct SalesModel {
    artifact: Option<SalesArtifact>,
}

impl SalesModel {
    pub fn new(artifact: Option<SalesArtifact>) -> Self {
        Self { artifact }
    }

    /// Loads the artifact from disk; a missing file is not fatal.
    pub fn from_file(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<SalesArtifact>(&raw) {
                Ok(artifact) => {
                    tracing::info!("Sales model loaded from {}", path);
                    Self::new(Some(artifact))
                }
                Err(e) => {
                    tracing::warn!("Failed to parse sales model {}: {} - using mock", path, e);
                    Self::new(None)
                }
            },
            Err(e) => {
                tracing::warn!("Sales model not available at {}: {} - using mock", path, e);
                Self::new(None)
            }
        }
    }

    pub fn has_model(&self) -> bool {
        self.artifact.is_some()
    }

    /// Predicts sales for a numeric feature vector.
    ///
    /// Without an artifact the mock prediction is `mean(features) * 10`.
    pub fn predict(&self, features: &[f64]) -> Result<f64, AppError> {
        if features.is_empty() {
            return Err(AppError::BadRequest("No features provided".to_string()));
        }
        match &self.artifact {
            Some(artifact) => {
                if features.len() != artifact.weights.len() {
                    return Err(AppError::ModelError(format!(
                        "expected {} features, got {}",
                        artifact.weights.len(),
                        features.len()
                    )));
                }
                let dot: f64 = artifact
                    .weights
                    .iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum();
                Ok(dot + artifact.bias)
            }
            None => {
                let mean = features.iter().sum::<f64>() / features.len() as f64;
                Ok(mean * 10.0)
            }
        }
    }
}

// ============ Retrieval Search ============

/// In-process document retrieval.
///
/// Modeled as a capability with an explicit configured/unconfigured runtime
/// check: an index with no documents answers with a placeholder hit instead
/// of erroring.
pub struct RagIndex {
    documents: Vec<String>,
}

impl RagIndex {
    pub fn new(documents: Vec<String>) -> Self {
        Self { documents }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn is_configured(&self) -> bool {
        !self.documents.is_empty()
    }

    /// Ranks indexed documents by naive keyword overlap with the query and
    /// returns the top 3 hits, scored 1/(rank+1).
    pub fn search(&self, query: &str) -> Vec<RagHit> {
        if !self.is_configured() {
            return vec![RagHit {
                content: "No documents indexed".to_string(),
                score: 0.0,
            }];
        }

        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        let mut ranked: Vec<(usize, &String)> = self
            .documents
            .iter()
            .map(|doc| {
                let lowered = doc.to_lowercase();
                let overlap = terms.iter().filter(|t| lowered.contains(t.as_str())).count();
                (overlap, doc)
            })
            .filter(|(overlap, _)| *overlap > 0)
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        ranked
            .into_iter()
            .take(3)
            .enumerate()
            .map(|(rank, (_, doc))| RagHit {
                content: doc.clone(),
                score: 1.0 / (rank as f64 + 1.0),
            })
            .collect()
    }
}

// ============ Image Generation ============

/// Builds a placeholder marketing-image URL for a prompt.
///
/// Real image generation sits behind a provider that is not wired up; the
/// placeholder keeps the endpoint shape stable. Spaces become `+` and the
/// text is truncated to 50 characters.
pub fn marketing_image_url(prompt: &str) -> String {
    let text: String = prompt.replace(' ', "+").chars().take(50).collect();
    format!("https://via.placeholder.com/512x512.png?text={}", text)
}
