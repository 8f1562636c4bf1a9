//! Simple Additive Weighting and Weighted Product scoring over flat or two-level criteria.

pub mod adapters;
pub mod domain;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod import;
pub(crate) mod matrix;
pub mod repository;
pub mod router;

#[cfg(test)]
mod tests;

pub use adapters::{InMemoryResultStore, JsonLinesResultStore};
pub use domain::{
    AlternativeScores, Criterion, CriterionType, FlatRequest, HierarchicalRequest, MethodFamily,
    ScoreResult, ScoringMethod, ScoringRequest,
};
pub use engine::{EngineError, ScoreRange, ScoringEngine, ScoringOptions};
pub use error::{ColumnRef, ScoringError};
pub use flatten::{flatten_for_saw, flatten_for_wp, FlattenedCriteria};
pub use import::{read_matrix_csv, ImportError, ImportedMatrix};
pub use matrix::DecisionMatrix;
pub use repository::{NewRecord, ResultStore, ResultView, StoreError, StoredRecord};
pub use router::{scoring_router, SaveRequest};
