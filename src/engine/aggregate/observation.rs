use serde::{Deserialize, Serialize};

/// A single `(value, weight)` pair supplied with a change event.
///
/// Either side may be absent, in which case the observation contributes
/// nothing to an aggregate (SQL null propagation).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub value: Option<f64>,
    pub weight: Option<f64>,
}

impl Observation {
    pub fn new(value: Option<f64>, weight: Option<f64>) -> Self {
        Self { value, weight }
    }

    pub fn weighted(value: f64, weight: f64) -> Self {
        Self {
            value: Some(value),
            weight: Some(weight),
        }
    }

    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none() || self.weight.is_none()
    }

    /// Bitwise equality on both fields, so a NaN observation matches itself.
    pub fn same_bits(&self, other: &Observation) -> bool {
        fn bits(n: Option<f64>) -> Option<u64> {
            n.map(f64::to_bits)
        }
        bits(self.value) == bits(other.value) && bits(self.weight) == bits(other.weight)
    }

    /// Returns `(value * weight, weight)` for a non-null observation.
    #[inline]
    pub fn contribution(&self) -> Option<(f64, f64)> {
        match (self.value, self.weight) {
            (Some(v), Some(w)) => Some((v * w, w)),
            _ => None,
        }
    }
}

impl From<(f64, f64)> for Observation {
    fn from((value, weight): (f64, f64)) -> Self {
        Self::weighted(value, weight)
    }
}

impl From<(Option<f64>, Option<f64>)> for Observation {
    fn from((value, weight): (Option<f64>, Option<f64>)) -> Self {
        Self::new(value, weight)
    }
}
