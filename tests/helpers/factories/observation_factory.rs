use crate::engine::aggregate::Observation;

pub struct ObservationFactory {
    value: Option<f64>,
    weight: Option<f64>,
}

impl ObservationFactory {
    pub fn new() -> Self {
        Self {
            value: Some(10.0),
            weight: Some(1.0),
        }
    }

    pub fn with_value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }

    pub fn with_weight(mut self, weight: Option<f64>) -> Self {
        self.weight = weight;
        self
    }

    pub fn null_value(self) -> Self {
        self.with_value(None)
    }

    pub fn null_weight(self) -> Self {
        self.with_weight(None)
    }

    pub fn create(self) -> Observation {
        Observation::new(self.value, self.weight)
    }

    pub fn create_list(self, pairs: &[(f64, f64)]) -> Vec<Observation> {
        pairs
            .iter()
            .map(|&(v, w)| Observation::weighted(v, w))
            .collect()
    }
}
