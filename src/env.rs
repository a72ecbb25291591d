//! Reinforcement-learning interface of the fishery.

use crate::model::{self, Action, Info, Params, State, Step};
use crate::spaces::{ActionSpace, ObservationSpace};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Number of steps after which an episode ends.
pub const MAX_YEARS: usize = 1000;

/// Render log used unless another file is configured.
pub const DEFAULT_LOG_FILE: &str = "fishing.csv";

/// Episodic environment driven by an agent.
pub trait Environment {
    type Params;
    type Action;
    type Observation;

    /// Start a new episode and return its first observation.
    #[doc(alias = "reset")]
    fn initialize(&mut self, params: Self::Params) -> Result<Self::Observation>;

    /// Apply an action and advance the environment by one step.
    #[doc(alias = "step")]
    fn advance(&mut self, action: Self::Action) -> Result<Step<Self::Observation>>;

    /// Record the current state.
    fn render(&self) -> Result<()>;

    /// Release any resources held by the environment.
    #[doc(alias = "close")]
    fn shutdown(&mut self) -> Result<()>;
}

/// Single-species fishery with logistic growth and a harvest quota.
///
/// Owns the episode parameters, the simulation state and the random number
/// generator used for the growth noise. Not meant to be shared between
/// concurrent episodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FishingEnv {
    params: Params,
    state: State,
    rng: ChaCha12Rng,
    log_file: PathBuf,
}

impl FishingEnv {
    /// Create an environment whose noise is drawn from `rng`.
    pub fn new(rng: ChaCha12Rng) -> Self {
        let params = Params::default();
        Self {
            state: State::new(&params),
            params,
            rng,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }

    /// Create a reproducible environment from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(ChaCha12Rng::seed_from_u64(seed))
    }

    /// Create an environment seeded from another random number generator.
    pub fn from_rng<R: RngCore>(rng: &mut R) -> Self {
        Self::new(ChaCha12Rng::from_rng(rng))
    }

    /// Create an environment seeded from operating system entropy.
    pub fn from_os_rng() -> Result<Self> {
        let rng = ChaCha12Rng::try_from_os_rng().context("failed to seed from os")?;
        Ok(Self::new(rng))
    }

    /// Set the file appended to by [`Environment::render`].
    pub fn with_log_file<P: AsRef<Path>>(mut self, file: P) -> Self {
        self.log_file = file.as_ref().to_path_buf();
        self
    }

    /// Reseed the noise generator.
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::default()
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::new(&self.params)
    }

    /// The episode has reached its time limit or the stock has collapsed.
    pub fn is_terminal(&self) -> bool {
        self.state.years_passed >= MAX_YEARS || self.state.fish_population <= 0.0
    }

    /// Advance by one step with an already validated action.
    pub fn apply(&mut self, action: Action) -> Step<f64> {
        if self.state.years_passed > 0 && self.is_terminal() {
            log::warn!(
                "advancing a terminated episode (year {})",
                self.state.years_passed
            );
        }

        log::trace!("year {}: action {action}", self.state.years_passed);

        let quota = self.state.harvest * action.multiplier();
        let taken = model::harvest_draw(&mut self.state, quota);

        // One draw per step keeps the stream independent of the volatility.
        let z: f64 = self.rng.sample(StandardNormal);
        self.state.fish_population =
            model::population_draw(&self.params, self.state.fish_population, z);

        let reward = model::reward(&self.params, taken);

        self.state.years_passed += 1;
        let done = self.is_terminal();

        Step {
            observation: self.state.fish_population,
            reward,
            done,
            info: Info::default(),
        }
    }
}

impl Environment for FishingEnv {
    type Params = Params;
    type Action = usize;
    type Observation = f64;

    fn initialize(&mut self, params: Params) -> Result<f64> {
        params.validate().context("failed to validate params")?;
        self.params = params;
        self.state = State::new(&self.params);
        Ok(self.state.fish_population)
    }

    fn advance(&mut self, action: usize) -> Result<Step<f64>> {
        let action = Action::try_from(action)?;
        Ok(self.apply(action))
    }

    fn render(&self) -> Result<()> {
        let file = &self.log_file;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .with_context(|| format!("failed to open {file:?}"))?;
        writeln!(
            file,
            "{},{:?},{:?}",
            self.state.years_passed, self.state.fish_population, self.state.harvest
        )
        .context("failed to write log row")?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
