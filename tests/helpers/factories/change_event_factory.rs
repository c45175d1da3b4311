use crate::engine::aggregate::Observation;
use crate::engine::changelog::{ChangeEvent, RowId};

#[derive(Clone, Copy)]
enum Kind {
    Insert,
    Delete,
}

pub struct ChangeEventFactory {
    row_id: RowId,
    kind: Kind,
    value: Option<f64>,
    weight: Option<f64>,
}

impl ChangeEventFactory {
    pub fn new() -> Self {
        Self {
            row_id: RowId(1),
            kind: Kind::Insert,
            value: Some(10.0),
            weight: Some(1.0),
        }
    }

    pub fn with_row(mut self, row_id: u64) -> Self {
        self.row_id = RowId(row_id);
        self
    }

    pub fn with_value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }

    pub fn with_weight(mut self, weight: Option<f64>) -> Self {
        self.weight = weight;
        self
    }

    pub fn deleting(mut self) -> Self {
        self.kind = Kind::Delete;
        self
    }

    pub fn create(self) -> ChangeEvent {
        let obs = Observation::new(self.value, self.weight);
        match self.kind {
            Kind::Insert => ChangeEvent::insert(self.row_id, obs),
            Kind::Delete => ChangeEvent::delete(self.row_id, obs),
        }
    }

    /// One insert per pair, with row ids counting up from the factory's row.
    pub fn create_inserts(self, pairs: &[(f64, f64)]) -> Vec<ChangeEvent> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, &pair)| ChangeEvent::insert(self.row_id.0 + i as u64, pair))
            .collect()
    }
}
