use ahash::RandomState as AHashRandomState;
use std::collections::HashMap;

use crate::engine::aggregate::Observation;
use crate::engine::changelog::{Change, ChangeEvent, RowId};
use crate::engine::errors::ChangeLogError;

/// Active observation per row for one aggregation group.
#[derive(Debug, Clone, Default)]
pub struct RowLedger {
    active: HashMap<RowId, Observation, AHashRandomState>,
}

impl RowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row_id: RowId) -> Option<&Observation> {
        self.active.get(&row_id)
    }

    pub fn is_active(&self, row_id: RowId) -> bool {
        self.active.contains_key(&row_id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Validates `event` against the observation currently recorded for its
    /// row (`None` when the row is not active).
    pub fn check_pairing(
        event: &ChangeEvent,
        active: Option<&Observation>,
    ) -> Result<(), ChangeLogError> {
        let row_id = event.row_id;
        let retracted = match event.change {
            Change::Insert(_) => {
                return match active {
                    Some(_) => Err(ChangeLogError::DuplicateInsert(row_id)),
                    None => Ok(()),
                };
            }
            Change::Delete(obs) => obs,
            Change::Update { before, .. } => before,
        };
        match active {
            None => Err(ChangeLogError::UnpairedRetraction(row_id)),
            Some(expected) if !expected.same_bits(&retracted) => {
                Err(ChangeLogError::MismatchedRetraction {
                    row_id,
                    expected: *expected,
                    got: retracted,
                })
            }
            Some(_) => Ok(()),
        }
    }

    pub fn check(&self, event: &ChangeEvent) -> Result<(), ChangeLogError> {
        Self::check_pairing(event, self.get(event.row_id))
    }

    /// Records an event that already passed [`check`](Self::check).
    pub fn record(&mut self, event: &ChangeEvent) {
        match event.change {
            Change::Insert(obs) | Change::Update { after: obs, .. } => {
                self.active.insert(event.row_id, obs);
            }
            Change::Delete(_) => {
                self.active.remove(&event.row_id);
            }
        }
    }

    pub fn admit(&mut self, event: &ChangeEvent) -> Result<(), ChangeLogError> {
        self.check(event)?;
        self.record(event);
        Ok(())
    }

    /// First row active in both ledgers, if any.
    pub fn overlap(&self, other: &RowLedger) -> Option<RowId> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.active.keys().copied().find(|row| large.is_active(*row))
    }

    /// Takes over every row of `other`. Callers check [`overlap`](Self::overlap) first.
    pub fn absorb(&mut self, other: RowLedger) {
        self.active.extend(other.active);
    }
}
