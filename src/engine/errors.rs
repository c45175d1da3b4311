use thiserror::Error;
use tracing::{debug, error};

use crate::engine::aggregate::Observation;
use crate::engine::changelog::RowId;

/// Guard violations raised by a host view before a change event reaches the
/// aggregate. The aggregate state itself never fails.
#[derive(Debug, Error, PartialEq)]
pub enum ChangeLogError {
    #[error("Non-finite number on row {row_id}: {number}")]
    NonFinite { row_id: RowId, number: f64 },

    #[error("Negative weight on row {row_id}: {weight}")]
    NegativeWeight { row_id: RowId, weight: f64 },

    #[error("Row {0} inserted while already active")]
    DuplicateInsert(RowId),

    #[error("Row {0} retracted but not active")]
    UnpairedRetraction(RowId),

    #[error("Row {row_id} retracted with {got:?}, but {expected:?} is active")]
    MismatchedRetraction {
        row_id: RowId,
        expected: Observation,
        got: Observation,
    },

    #[error("Cannot merge views with different row tracking (ours: {ours}, theirs: {theirs})")]
    TrackingMismatch { ours: bool, theirs: bool },
}

impl ChangeLogError {
    /// Row the rejected event belonged to; `None` for view-level errors.
    pub fn row_id(&self) -> Option<RowId> {
        match self {
            ChangeLogError::NonFinite { row_id, .. }
            | ChangeLogError::NegativeWeight { row_id, .. }
            | ChangeLogError::MismatchedRetraction { row_id, .. } => Some(*row_id),
            ChangeLogError::DuplicateInsert(row_id)
            | ChangeLogError::UnpairedRetraction(row_id) => Some(*row_id),
            ChangeLogError::TrackingMismatch { .. } => None,
        }
    }

    pub fn log_error(&self) {
        match self {
            ChangeLogError::NonFinite { row_id, number } => {
                error!(%row_id, "Rejected non-finite number {}", number);
            }
            ChangeLogError::NegativeWeight { row_id, weight } => {
                error!(%row_id, "Rejected negative weight {}", weight);
            }
            ChangeLogError::DuplicateInsert(row_id) => {
                error!(%row_id, "Duplicate insert");
                debug!("Row {} already contributes to its group", row_id);
            }
            ChangeLogError::UnpairedRetraction(row_id) => {
                error!(%row_id, "Retraction without prior insert");
            }
            ChangeLogError::MismatchedRetraction {
                row_id,
                expected,
                got,
            } => {
                error!(%row_id, "Retraction does not match active row");
                debug!("expected {:?}, got {:?}", expected, got);
            }
            ChangeLogError::TrackingMismatch { ours, theirs } => {
                error!(ours, theirs, "Refused merge of views with different row tracking");
            }
        }
    }
}
