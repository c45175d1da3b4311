use ahash::RandomState as AHashRandomState;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::engine::aggregate::{AggregateState, Observation};
use crate::engine::changelog::{ChangeEvent, RowId};
use crate::engine::errors::ChangeLogError;
use crate::engine::view::ledger::RowLedger;
use crate::shared::config::{CONFIG, ViewConfig};

#[derive(Debug, Clone, Default)]
struct GroupEntry {
    state: AggregateState,
    ledger: RowLedger,
}

/// Materialized weighted mean per group, maintained from a change log.
///
/// The view owns one [`AggregateState`] per group key and is the only place
/// that knows about groups; states are created on the first event for a key
/// and live until [`evict`](Self::evict).
#[derive(Debug, Clone)]
pub struct AggregateView<K> {
    config: ViewConfig,
    groups: HashMap<K, GroupEntry, AHashRandomState>,
}

impl<K> AggregateView<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::with_config(CONFIG.view)
    }

    pub fn with_config(config: ViewConfig) -> Self {
        Self {
            config,
            groups: HashMap::with_hasher(AHashRandomState::new()),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains(&self, group: &K) -> bool {
        self.groups.contains_key(group)
    }

    pub fn state(&self, group: &K) -> Option<AggregateState> {
        self.groups.get(group).map(|e| e.state)
    }

    /// Current mean for `group`. `None` both for an unknown group and for a
    /// tracked group whose total weight is zero.
    pub fn finalize(&self, group: &K) -> Option<f64> {
        self.groups.get(group).and_then(|e| e.state.finalize())
    }

    /// Every tracked group with its current mean, for emission downstream.
    pub fn rows(&self) -> impl Iterator<Item = (&K, Option<f64>)> + '_ {
        self.groups.iter().map(|(k, e)| (k, e.state.finalize()))
    }

    /// Applies one change event to `group`. A rejected event leaves the view
    /// untouched.
    pub fn apply(&mut self, group: K, event: &ChangeEvent) -> Result<(), ChangeLogError> {
        self.validate(event)?;

        if self.config.track_row_identity {
            let active = self
                .groups
                .get(&group)
                .and_then(|e| e.ledger.get(event.row_id));
            RowLedger::check_pairing(event, active)?;
        }

        let entry = self.groups.entry(group).or_default();
        if self.config.track_row_identity {
            entry.ledger.record(event);
        }
        entry.state = event.apply_to(entry.state);
        trace!(
            target: "retract_agg::view",
            row_id = %event.row_id,
            total_weight = entry.state.total_weight(),
            "Applied change event"
        );
        Ok(())
    }

    /// Applies events in order and returns how many were applied. Stops at
    /// the first rejected event; events before it remain applied.
    pub fn apply_batch<I>(&mut self, batch: I) -> Result<usize, ChangeLogError>
    where
        I: IntoIterator<Item = (K, ChangeEvent)>,
    {
        let mut applied = 0;
        for (group, event) in batch {
            if let Err(e) = self.apply(group, &event) {
                e.log_error();
                debug!(target: "retract_agg::view", applied, "Change batch stopped early");
                return Err(e);
            }
            applied += 1;
        }
        debug!(
            target: "retract_agg::view",
            applied,
            groups = self.groups.len(),
            "Applied change batch"
        );
        Ok(applied)
    }

    /// Drops the state for `group`, returning it.
    pub fn evict(&mut self, group: &K) -> Option<AggregateState> {
        let entry = self.groups.remove(group)?;
        debug!(
            target: "retract_agg::view",
            active_rows = entry.ledger.len(),
            "Evicted aggregation group"
        );
        Some(entry.state)
    }

    /// Combines a partial view built over a disjoint part of the change log.
    /// Both views must agree on row tracking. With tracking enabled, a row
    /// active in both views is rejected and neither view changes.
    pub fn merge(&mut self, other: AggregateView<K>) -> Result<(), ChangeLogError> {
        if self.config.track_row_identity != other.config.track_row_identity {
            return Err(ChangeLogError::TrackingMismatch {
                ours: self.config.track_row_identity,
                theirs: other.config.track_row_identity,
            });
        }
        if self.config.track_row_identity {
            for (group, theirs) in &other.groups {
                if let Some(ours) = self.groups.get(group) {
                    if let Some(row_id) = ours.ledger.overlap(&theirs.ledger) {
                        return Err(ChangeLogError::DuplicateInsert(row_id));
                    }
                }
            }
        }

        let incoming = other.groups.len();
        for (group, theirs) in other.groups {
            let entry = self.groups.entry(group).or_default();
            entry.state = entry.state.merge(theirs.state);
            if self.config.track_row_identity {
                entry.ledger.absorb(theirs.ledger);
            }
        }
        debug!(
            target: "retract_agg::view",
            incoming,
            groups = self.groups.len(),
            "Merged partial view"
        );
        Ok(())
    }

    fn validate(&self, event: &ChangeEvent) -> Result<(), ChangeLogError> {
        let (retracted, accumulated) = event.parts();
        for obs in retracted.iter().chain(accumulated.iter()) {
            self.validate_observation(event.row_id, obs)?;
        }
        Ok(())
    }

    fn validate_observation(&self, row_id: RowId, obs: &Observation) -> Result<(), ChangeLogError> {
        if self.config.reject_non_finite {
            if let Some(number) = [obs.value, obs.weight]
                .into_iter()
                .flatten()
                .find(|n| !n.is_finite())
            {
                return Err(ChangeLogError::NonFinite { row_id, number });
            }
        }
        if !self.config.allow_negative_weights {
            if let Some(weight) = obs.weight.filter(|w| *w < 0.0) {
                return Err(ChangeLogError::NegativeWeight { row_id, weight });
            }
        }
        Ok(())
    }
}

impl<K> Default for AggregateView<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
