use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::aggregate::{AggregateState, Observation};

/// Stable identity of a source row, used to pair a retraction with the
/// accumulation it undoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl From<u64> for RowId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    Insert(Observation),
    Delete(Observation),
    /// Row update: retract `before`, then accumulate `after`.
    Update {
        before: Observation,
        after: Observation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub row_id: RowId,
    pub change: Change,
}

impl ChangeEvent {
    pub fn insert(row_id: impl Into<RowId>, obs: impl Into<Observation>) -> Self {
        Self {
            row_id: row_id.into(),
            change: Change::Insert(obs.into()),
        }
    }

    pub fn delete(row_id: impl Into<RowId>, obs: impl Into<Observation>) -> Self {
        Self {
            row_id: row_id.into(),
            change: Change::Delete(obs.into()),
        }
    }

    pub fn update(
        row_id: impl Into<RowId>,
        before: impl Into<Observation>,
        after: impl Into<Observation>,
    ) -> Self {
        Self {
            row_id: row_id.into(),
            change: Change::Update {
                before: before.into(),
                after: after.into(),
            },
        }
    }

    #[inline]
    pub fn apply_to(&self, state: AggregateState) -> AggregateState {
        match self.change {
            Change::Insert(obs) => state.accumulate(obs),
            Change::Delete(obs) => state.retract(obs),
            Change::Update { before, after } => state.retract(before).accumulate(after),
        }
    }

    /// Observations this event asks to retract and to accumulate, in order.
    pub fn parts(&self) -> (Option<Observation>, Option<Observation>) {
        match self.change {
            Change::Insert(obs) => (None, Some(obs)),
            Change::Delete(obs) => (Some(obs), None),
            Change::Update { before, after } => (Some(before), Some(after)),
        }
    }
}

/// Folds a run of change events into `state` in slice order.
pub fn fold_events(state: AggregateState, events: &[ChangeEvent]) -> AggregateState {
    events.iter().fold(state, |s, e| e.apply_to(s))
}
