use crate::model::{Action, Params};
use rand::Rng;

/// Discrete space of the three harvest adjustments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ActionSpace {
    n: usize,
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self {
            n: Action::ALL.len(),
        }
    }
}

impl ActionSpace {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn contains(&self, idx: usize) -> bool {
        idx < self.n
    }

    /// Draw an action uniformly at random.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Action {
        Action::ALL[rng.random_range(0..self.n)]
    }
}

/// Box space of the observed stock size.
///
/// The upper bound is nominal: the stock is only clamped at zero.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ObservationSpace {
    pub low: f64,
    pub high: f64,
}

impl ObservationSpace {
    pub fn new(params: &Params) -> Self {
        Self {
            low: 0.0,
            high: 2.0 * params.carrying_capacity,
        }
    }

    pub fn contains(&self, obs: f64) -> bool {
        (self.low..=self.high).contains(&obs)
    }
}
