use crate::model::{Action, Params};
use crate::spaces::ActionSpace;
use crate::utils::check_num;
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Harvest policy used to drive episodes from the command line.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Policy {
    /// Always take the same action.
    Fixed { action: usize },
    /// Pick an action uniformly at random.
    Random,
    /// Steer the stock towards `target * K`: harvest more above it, less below it.
    Threshold { target: f64 },
}

impl Policy {
    pub fn validate(&self) -> Result<()> {
        match self {
            Policy::Fixed { action } => {
                Action::try_from(*action).context("invalid fixed action")?;
            }
            Policy::Random => {}
            Policy::Threshold { target } => {
                check_num(*target, 0.0..=2.0).context("invalid threshold target")?;
            }
        }
        Ok(())
    }

    /// Choose the next action given the observed stock.
    pub fn select<R: Rng>(&self, obs: f64, params: &Params, rng: &mut R) -> Result<Action> {
        let action = match self {
            Policy::Fixed { action } => Action::try_from(*action)?,
            Policy::Random => ActionSpace::default().sample(rng),
            Policy::Threshold { target } => {
                let level = target * params.carrying_capacity;
                if obs > level {
                    Action::Increase
                } else if obs < level {
                    Action::Decrease
                } else {
                    Action::Hold
                }
            }
        };
        Ok(action)
    }
}
