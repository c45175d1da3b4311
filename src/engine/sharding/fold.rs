use rayon::prelude::*;

use crate::engine::aggregate::AggregateState;
use crate::engine::changelog::{ChangeEvent, fold_events};
use crate::engine::sharding::router::ShardRouter;

/// Folds each shard's events into its own partial state on the rayon pool
/// and merges the partials. Equivalent, up to rounding, to folding `events`
/// into a single state.
pub fn fold_sharded(events: &[ChangeEvent], router: &ShardRouter) -> AggregateState {
    router
        .partition(events)
        .par_iter()
        .map(|shard| fold_events(AggregateState::empty(), shard))
        .reduce(AggregateState::empty, AggregateState::merge)
}

/// Pairwise reduction: each level merges neighbours until one state is left.
pub fn merge_tree(mut states: Vec<AggregateState>) -> AggregateState {
    while states.len() > 1 {
        states = states.chunks(2).map(|pair| pair.iter().sum()).collect();
    }
    states.pop().unwrap_or_default()
}
