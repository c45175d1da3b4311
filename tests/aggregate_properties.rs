use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use retract_agg::engine::aggregate::{AggregateState, Observation};
use retract_agg::engine::changelog::{ChangeEvent, fold_events};
use retract_agg::engine::sharding::{ShardRouter, fold_sharded, merge_tree};
use retract_agg::engine::view::AggregateView;
use retract_agg::shared::config::ViewConfig;

fn assert_mean_close(actual: Option<f64>, expected: Option<f64>) {
    match (actual, expected) {
        (Some(a), Some(e)) => {
            let tol = 1e-9 * e.abs().max(1.0);
            assert!((a - e).abs() <= tol, "expected {e}, got {a}");
        }
        (None, None) => {}
        other => panic!("definedness differs: {other:?}"),
    }
}

/// Integer-valued observations, so every partial sum is exact in f64.
fn integer_observations(rng: &mut StdRng, n: usize) -> Vec<Observation> {
    (0..n)
        .map(|_| {
            let value = rng.gen_range(-50..=50) as f64;
            let weight = rng.gen_range(1..=5) as f64;
            Observation::weighted(value, weight)
        })
        .collect()
}

fn real_observations(rng: &mut StdRng, n: usize) -> Vec<Observation> {
    (0..n)
        .map(|_| Observation::weighted(rng.gen_range(-1e3..1e3), rng.gen_range(0.01..10.0)))
        .collect()
}

fn reference(obs: &[Observation]) -> AggregateState {
    obs.iter().fold(AggregateState::empty(), |s, o| s.accumulate(*o))
}

#[test]
fn accumulation_order_does_not_change_the_mean() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let obs = real_observations(&mut rng, 20);
        let expected = reference(&obs).finalize();
        let mut shuffled = obs.clone();
        shuffled.shuffle(&mut rng);
        assert_mean_close(reference(&shuffled).finalize(), expected);
    }
}

#[test]
fn retracting_a_subset_in_any_order_matches_reference() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let obs = integer_observations(&mut rng, 12);
        let (kept, retracted): (Vec<_>, Vec<_>) = obs.iter().partition(|_| rng.gen_bool(0.5));

        let mut insert_order = obs.clone();
        insert_order.shuffle(&mut rng);
        let mut retract_order: Vec<Observation> = retracted.into_iter().copied().collect();
        retract_order.shuffle(&mut rng);

        let state = retract_order
            .iter()
            .fold(reference(&insert_order), |s, o| s.retract(*o));
        let kept: Vec<Observation> = kept.into_iter().copied().collect();
        assert_eq!(state.finalize(), reference(&kept).finalize());
    }
}

#[test]
fn retracting_everything_leaves_mean_undefined() {
    let mut rng = StdRng::seed_from_u64(13);
    let obs = integer_observations(&mut rng, 30);
    let mut state = reference(&obs);
    let mut order = obs.clone();
    order.shuffle(&mut rng);
    for o in &order {
        state = state.retract(*o);
    }
    assert_eq!(state, AggregateState::empty());
    assert_eq!(state.finalize(), None);
}

#[test]
fn merging_two_arbitrary_shards_matches_single_stream() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..50 {
        let obs = real_observations(&mut rng, 25);
        let (left, right): (Vec<Observation>, Vec<Observation>) =
            obs.iter().partition(|_| rng.gen_bool(0.3));
        let merged = reference(&left).merge(reference(&right));
        assert_mean_close(merged.finalize(), reference(&obs).finalize());
    }
}

#[test]
fn merge_is_commutative_and_associative_on_random_states() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..50 {
        let a = reference(&real_observations(&mut rng, 5));
        let b = reference(&real_observations(&mut rng, 5));
        let c = reference(&real_observations(&mut rng, 5));

        assert_eq!(a.merge(b), b.merge(a));
        assert_mean_close(
            a.merge(b).merge(c).finalize(),
            a.merge(b.merge(c)).finalize(),
        );
        assert_mean_close(merge_tree(vec![a, b, c]).finalize(), (a + b + c).finalize());
    }
}

#[test]
fn sharded_change_log_matches_sequential_replay() {
    let mut rng = StdRng::seed_from_u64(23);
    let obs = integer_observations(&mut rng, 40);
    let mut events: Vec<ChangeEvent> = obs
        .iter()
        .enumerate()
        .map(|(i, o)| ChangeEvent::insert(i as u64, *o))
        .collect();
    for (i, o) in obs.iter().enumerate().filter(|(i, _)| i % 3 == 0) {
        events.push(ChangeEvent::delete(i as u64, *o));
    }

    let sequential = fold_events(AggregateState::empty(), &events);
    for shard_count in [1, 2, 5, 16] {
        let sharded = fold_sharded(&events, &ShardRouter::new(shard_count));
        assert_eq!(sharded.finalize(), sequential.finalize());
    }
}

#[test]
fn partial_views_merge_into_the_single_view_result() {
    let config = ViewConfig {
        track_row_identity: true,
        ..ViewConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(29);
    let router = ShardRouter::new(3);

    let mut single: AggregateView<u8> = AggregateView::with_config(config);
    let mut partials: Vec<AggregateView<u8>> = (0..router.shard_count())
        .map(|_| AggregateView::with_config(config))
        .collect();

    let obs = integer_observations(&mut rng, 60);
    for (i, o) in obs.iter().enumerate() {
        let group = (i % 4) as u8;
        let insert = ChangeEvent::insert(i as u64, *o);
        single.apply(group, &insert).unwrap();
        partials[router.shard_for(insert.row_id)]
            .apply(group, &insert)
            .unwrap();
        if rng.gen_bool(0.25) {
            let delete = ChangeEvent::delete(i as u64, *o);
            single.apply(group, &delete).unwrap();
            partials[router.shard_for(delete.row_id)]
                .apply(group, &delete)
                .unwrap();
        }
    }

    let mut combined = AggregateView::with_config(config);
    for partial in partials {
        combined.merge(partial).unwrap();
    }

    for group in 0..4u8 {
        assert_eq!(combined.finalize(&group), single.finalize(&group), "group {group}");
    }
}
