//! Fishery model types and the pure transition functions.

use crate::utils::check_num;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Biological and economic parameters of an episode.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Params {
    /// Stock size at the start of the episode.
    pub init_population: f64,
    /// Intrinsic growth rate per step (`r`).
    pub growth_rate: f64,
    /// Logistic ceiling of the stock (`K`).
    pub carrying_capacity: f64,
    /// Revenue per unit harvested.
    pub price: f64,
    /// Magnitude of the multiplicative growth noise (`sigma`).
    pub volatility: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            init_population: 0.75,
            growth_rate: 0.1,
            carrying_capacity: 1.0,
            price: 1.0,
            volatility: 0.0,
        }
    }
}

impl Params {
    /// Maximum sustainable yield of the logistic model, `r*K/4`.
    pub fn msy(&self) -> f64 {
        self.growth_rate * self.carrying_capacity / 4.0
    }

    /// Harvest baseline set at the start of every episode, half the MSY.
    pub fn initial_harvest(&self) -> f64 {
        self.msy() / 2.0
    }

    /// Check that the parameters describe a well-defined model.
    ///
    /// # Errors
    /// Returns an error naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        check_num(self.init_population, 0.0..f64::INFINITY)
            .context("invalid initial population")?;
        check_num(self.growth_rate, -1.0..=3.0).context("invalid growth rate")?;
        check_num(self.carrying_capacity, f64::MIN_POSITIVE..f64::INFINITY)
            .context("invalid carrying capacity")?;
        check_num(self.price, 0.0..f64::INFINITY).context("invalid price")?;
        check_num(self.volatility, 0.0..f64::INFINITY).context("invalid volatility")?;
        Ok(())
    }
}

/// Mutable state of the simulation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct State {
    /// Current stock size, never negative.
    pub fish_population: f64,
    /// Latest harvest taken, also the baseline scaled by the next action.
    pub harvest: f64,
    /// Number of steps since the episode started.
    pub years_passed: usize,
}

impl State {
    /// Initial state for the given parameters.
    pub fn new(params: &Params) -> Self {
        Self {
            fish_population: params.init_population,
            harvest: params.initial_harvest(),
            years_passed: 0,
        }
    }
}

/// Harvest adjustment chosen by the agent each step.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Action {
    /// Keep the harvest baseline.
    Hold,
    /// Raise the harvest baseline by 20%.
    Increase,
    /// Lower the harvest baseline by 20%.
    Decrease,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Hold, Action::Increase, Action::Decrease];

    pub fn multiplier(self) -> f64 {
        match self {
            Action::Hold => 1.0,
            Action::Increase => 1.2,
            Action::Decrease => 0.8,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Action::Hold => 0,
            Action::Increase => 1,
            Action::Decrease => 2,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = anyhow::Error;

    fn try_from(idx: usize) -> Result<Self> {
        match Action::ALL.get(idx) {
            Some(&action) => Ok(action),
            None => bail!("invalid action {idx}, must be one of 0, 1, 2"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Diagnostic payload of a step. Currently empty.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct Info {}

/// Outcome of advancing the environment by one step.
#[derive(Debug, PartialEq, Clone)]
pub struct Step<O> {
    pub observation: O,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

/// Summary of a finished episode.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Episode index within the run.
    pub episode: usize,
    /// Number of steps the episode lasted.
    pub length: usize,
    /// Sum of the rewards collected.
    pub total_reward: f64,
    /// Stock size at the end of the episode.
    pub final_population: f64,
    /// The stock collapsed before the time limit.
    pub collapsed: bool,
}

/// Remove up to `quota` fish from the stock and return the amount taken.
///
/// The amount taken becomes the new harvest baseline.
pub fn harvest_draw(state: &mut State, quota: f64) -> f64 {
    let taken = state.fish_population.min(quota);
    state.harvest = taken;
    state.fish_population = (state.fish_population - taken).max(0.0);
    taken
}

/// Stock after one step of logistic growth with noise sample `z ~ N(0,1)`.
pub fn population_draw(params: &Params, pop: f64, z: f64) -> f64 {
    let growth = params.growth_rate * pop * (1.0 - pop / params.carrying_capacity);
    let noise = pop * params.volatility * z;
    (pop + growth + noise).max(0.0)
}

/// Revenue for a realized harvest.
pub fn reward(params: &Params, taken: f64) -> f64 {
    (params.price * taken).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_harvest_is_half_msy() {
        let params = Params::default();
        assert_eq!(params.msy(), 0.025);
        assert_eq!(params.initial_harvest(), 0.0125);
        assert_eq!(State::new(&params).harvest, 0.0125);
    }

    #[test]
    fn action_indices_map_to_multipliers() {
        assert_eq!(Action::try_from(0).unwrap().multiplier(), 1.0);
        assert_eq!(Action::try_from(1).unwrap().multiplier(), 1.2);
        assert_eq!(Action::try_from(2).unwrap().multiplier(), 0.8);
        for action in Action::ALL {
            assert_eq!(Action::try_from(action.index()).unwrap(), action);
        }
    }

    #[test]
    fn out_of_range_action_is_rejected() {
        let err = Action::try_from(3).unwrap_err();
        assert!(err.to_string().contains("invalid action"));
    }

    #[test]
    fn harvest_is_capped_at_stock() {
        let mut state = State {
            fish_population: 0.01,
            harvest: 0.0125,
            years_passed: 0,
        };
        let taken = harvest_draw(&mut state, 0.0125);
        assert_eq!(taken, 0.01);
        assert_eq!(state.harvest, 0.01);
        assert_eq!(state.fish_population, 0.0);
    }

    #[test]
    fn harvest_below_stock_is_taken_in_full() {
        let mut state = State::new(&Params::default());
        let taken = harvest_draw(&mut state, 0.0125);
        assert_eq!(taken, 0.0125);
        assert_eq!(state.fish_population, 0.75 - 0.0125);
    }

    #[test]
    fn zero_volatility_ignores_noise() {
        let params = Params::default();
        let a = population_draw(&params, 0.7375, 0.0);
        let b = population_draw(&params, 0.7375, 2.5);
        assert_eq!(a, b);
        assert!((a - 0.756859375).abs() < 1e-12);
    }

    #[test]
    fn population_is_clamped_at_zero() {
        let params = Params {
            volatility: 1.0,
            ..Params::default()
        };
        assert_eq!(population_draw(&params, 0.5, -5.0), 0.0);
        assert_eq!(population_draw(&params, 0.0, 1.0), 0.0);
    }

    #[test]
    fn stock_above_capacity_shrinks() {
        let params = Params::default();
        assert!(population_draw(&params, 1.5, 0.0) < 1.5);
    }

    #[test]
    fn reward_scales_with_price() {
        let params = Params {
            price: 2.0,
            ..Params::default()
        };
        assert_eq!(reward(&params, 0.5), 1.0);
        assert_eq!(reward(&params, 0.0), 0.0);
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(Params::default().validate().is_ok());

        let cases = [
            Params {
                carrying_capacity: 0.0,
                ..Params::default()
            },
            Params {
                carrying_capacity: -1.0,
                ..Params::default()
            },
            Params {
                volatility: -0.1,
                ..Params::default()
            },
            Params {
                init_population: -0.5,
                ..Params::default()
            },
            Params {
                price: f64::NAN,
                ..Params::default()
            },
            Params {
                growth_rate: 5.0,
                ..Params::default()
            },
        ];
        for params in cases {
            assert!(params.validate().is_err(), "{params:?} should be invalid");
        }
    }
}
