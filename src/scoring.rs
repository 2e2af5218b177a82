//! Lead-scoring inference.
//!
//! A `PipelineArtifact` is the serialized combination of a column-wise
//! preprocessor (numeric scaling + categorical one-hot encoding) and a
//! logistic classifier. It is produced offline, loaded read-only at process
//! start, and held in memory for the process lifetime. Request handlers
//! receive it through an explicit [`LeadScorer`] handle, never a global.

use crate::errors::AppError;
use crate::models::LeadRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The recognized numeric fields of a lead record. Everything else is
/// treated as categorical text.
pub const NUMERIC_FIELDS: [&str; 12] = [
    "age",
    "balance",
    "day_of_week",
    "duration",
    "campaign",
    "pdays",
    "previous",
    "emp.var.rate",
    "cons.price.idx",
    "cons.conf.idx",
    "euribor3m",
    "nr.employed",
];

pub fn is_numeric_field(name: &str) -> bool {
    NUMERIC_FIELDS.contains(&name)
}

/// A lead record after the typed coercion step.
///
/// Numeric fields that fail to parse become NaN (silently); all other fields
/// are carried as their string form.
#[derive(Debug, Clone, Default)]
pub struct CoercedLead {
    pub numeric: BTreeMap<String, f64>,
    pub categorical: BTreeMap<String, String>,
}

/// Coerces a raw lead record into typed columns.
pub fn coerce_lead(record: &LeadRecord) -> CoercedLead {
    let mut coerced = CoercedLead::default();
    for (name, value) in &record.fields {
        if is_numeric_field(name) {
            coerced
                .numeric
                .insert(name.clone(), numeric_value(value).unwrap_or(f64::NAN));
        } else {
            coerced.categorical.insert(name.clone(), text_value(value));
        }
    }
    coerced
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============ Pipeline Artifact ============

/// One scaled numeric input column of the trained pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub mean: f64,
    pub std: f64,
    pub coefficient: f64,
}

/// One known level of a one-hot encoded categorical column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalLevel {
    pub value: String,
    pub coefficient: f64,
}

/// One one-hot encoded categorical input column. Unknown levels at inference
/// time are silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub levels: Vec<CategoricalLevel>,
}

/// The trained preprocessing + logistic-regression pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub intercept: f64,
    pub numeric: Vec<NumericColumn>,
    pub categorical: Vec<CategoricalColumn>,
}

impl PipelineArtifact {
    /// Loads a serialized artifact from disk.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::ModelError(format!("failed to read {}: {}", path, e)))?;
        let artifact: PipelineArtifact = serde_json::from_str(&raw)
            .map_err(|e| AppError::ModelError(format!("failed to parse {}: {}", path, e)))?;
        if artifact.numeric.is_empty() && artifact.categorical.is_empty() {
            return Err(AppError::ModelError(format!(
                "artifact {} has no input columns",
                path
            )));
        }
        Ok(artifact)
    }

    /// Probability of the positive class for a coerced lead.
    ///
    /// Fails when an expected column is absent, a numeric input is NaN, or a
    /// scaling std is non-positive. The caller decides how to degrade.
    pub fn predict_proba(&self, lead: &CoercedLead) -> Result<f64, AppError> {
        let mut z = self.intercept;

        for col in &self.numeric {
            let x = lead
                .numeric
                .get(&col.name)
                .copied()
                .ok_or_else(|| AppError::ModelError(format!("missing numeric column {}", col.name)))?;
            if !x.is_finite() {
                return Err(AppError::ModelError(format!(
                    "non-finite value in numeric column {}",
                    col.name
                )));
            }
            if col.std <= 0.0 {
                return Err(AppError::ModelError(format!(
                    "non-positive std for column {}",
                    col.name
                )));
            }
            z += col.coefficient * (x - col.mean) / col.std;
        }

        for col in &self.categorical {
            let observed = lead.categorical.get(&col.name).ok_or_else(|| {
                AppError::ModelError(format!("missing categorical column {}", col.name))
            })?;
            // Unknown levels contribute nothing (encoder ignores them)
            if let Some(level) = col.levels.iter().find(|l| &l.value == observed) {
                z += level.coefficient;
            }
        }

        Ok(sigmoid(z))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ============ Scorer ============

/// Read-only scoring handle shared across request handlers.
pub struct LeadScorer {
    artifact: Option<PipelineArtifact>,
}

impl LeadScorer {
    pub fn new(artifact: Option<PipelineArtifact>) -> Self {
        Self { artifact }
    }

    /// Loads the artifact from disk. A missing or unreadable artifact is not
    /// fatal: the scorer degrades to the linear heuristic.
    pub fn from_file(path: &str) -> Self {
        match PipelineArtifact::load(path) {
            Ok(artifact) => {
                tracing::info!(
                    "Lead model loaded from {} ({} numeric, {} categorical columns)",
                    path,
                    artifact.numeric.len(),
                    artifact.categorical.len()
                );
                Self::new(Some(artifact))
            }
            Err(e) => {
                tracing::warn!("{} - using fallback scoring method", e);
                Self::new(None)
            }
        }
    }

    pub fn has_model(&self) -> bool {
        self.artifact.is_some()
    }

    /// Scores a single lead.
    ///
    /// With an artifact, inference failures substitute a neutral 0.5 rather
    /// than propagating. Without an artifact, a linear heuristic over age and
    /// balance is used, clipped to [0.1, 0.9].
    pub fn score(&self, record: &LeadRecord) -> f64 {
        match &self.artifact {
            Some(artifact) => {
                let coerced = coerce_lead(record);
                match artifact.predict_proba(&coerced) {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::debug!("Inference failed, substituting neutral score: {}", e);
                        0.5
                    }
                }
            }
            None => heuristic_score(record),
        }
    }

    /// Scores each lead independently. Output length always equals input
    /// length; a failing record falls back to 0.5 without affecting others.
    pub fn score_bulk(&self, leads: &[LeadRecord]) -> Vec<f64> {
        leads.iter().map(|lead| self.score(lead)).collect()
    }
}

/// Linear fallback used when no model artifact is present.
fn heuristic_score(record: &LeadRecord) -> f64 {
    let age = record
        .get("age")
        .and_then(numeric_value)
        .filter(|v| v.is_finite())
        .unwrap_or(30.0);
    let balance = record
        .get("balance")
        .and_then(numeric_value)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    (age * 0.01 + balance * 0.00001 + 0.3).clamp(0.1, 0.9)
}

/// Natural-language label at the 0.5 decision threshold.
pub fn score_label(probability: f64) -> &'static str {
    if probability > 0.5 {
        "High Potential Lead"
    } else {
        "Low Potential Lead"
    }
}
