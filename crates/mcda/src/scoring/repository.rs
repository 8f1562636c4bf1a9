use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ScoreResult, ScoringMethod};

/// Result handed to the store once per successful scoring (or explicit save) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub method: ScoringMethod,
    pub criteria_weights: Vec<f64>,
    /// JSON text of the decision matrix the scores were computed from.
    pub decision_matrix: String,
    pub scores: ScoreResult,
}

/// Record as kept by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub method: ScoringMethod,
    pub criteria_weights: Vec<f64>,
    pub decision_matrix: String,
    pub scores: ScoreResult,
    pub created_at: DateTime<Utc>,
}

impl StoredRecord {
    pub fn from_new(id: String, record: NewRecord) -> Self {
        Self {
            id,
            method: record.method,
            criteria_weights: record.criteria_weights,
            decision_matrix: record.decision_matrix,
            scores: record.scores,
            created_at: Utc::now(),
        }
    }

    /// Listing view with the matrix decoded; undecodable text becomes `None`.
    pub fn view(&self) -> ResultView {
        ResultView {
            id: self.id.clone(),
            method: self.method,
            criteria_weights: self.criteria_weights.clone(),
            decision_matrix: serde_json::from_str(&self.decision_matrix).ok(),
            scores: self.scores.clone(),
            created_at: self.created_at,
        }
    }
}

/// Stored record as returned by the results listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub id: String,
    pub method: ScoringMethod,
    pub criteria_weights: Vec<f64>,
    pub decision_matrix: Option<Vec<Vec<f64>>>,
    pub scores: ScoreResult,
    pub created_at: DateTime<Utc>,
}

/// Append-only sink for scoring results, injected into the engine.
pub trait ResultStore: Send + Sync {
    fn add(&self, record: NewRecord) -> Result<StoredRecord, StoreError>;
    fn stream(&self) -> Result<Vec<StoredRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("result store unavailable: {0}")]
    Unavailable(String),
    #[error("result store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("result record could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub(crate) fn record_id(sequence: u64) -> String {
    format!("rec-{sequence:06}")
}
