use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

use crate::engine::changelog::{ChangeEvent, RowId};
use crate::shared::config::CONFIG;

/// Routes change events to shards by row identity so that every event for a
/// row lands on the same partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRouter {
    shard_count: usize,
}

impl ShardRouter {
    pub fn new(shard_count: usize) -> Self {
        Self {
            shard_count: shard_count.max(1),
        }
    }

    pub fn from_config() -> Self {
        Self::new(CONFIG.engine.shard_count)
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// FxHash is stable across processes, so a replayed change log is
    /// partitioned the same way on every run.
    pub fn shard_for(&self, row_id: RowId) -> usize {
        let mut hasher = FxHasher::default();
        row_id.hash(&mut hasher);
        (hasher.finish() as usize) % self.shard_count
    }

    /// Splits `events` into one run per shard, preserving order within a run.
    pub fn partition(&self, events: &[ChangeEvent]) -> Vec<Vec<ChangeEvent>> {
        let mut shards = vec![Vec::new(); self.shard_count];
        for event in events {
            shards[self.shard_for(event.row_id)].push(*event);
        }
        debug!(
            target: "retract_agg::shard",
            shard_count = self.shard_count,
            events = events.len(),
            "Partitioned change log"
        );
        shards
    }
}
