//! Stochastic logistic fishery exposed as a reinforcement-learning environment.
//!
//! [`env::FishingEnv`] is the environment itself. The remaining modules run
//! batches of episodes under a harvest [`policy::Policy`] and summarize them.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod env;
pub mod manager;
pub mod model;
pub mod policy;
pub mod spaces;
pub mod stats;
mod utils;
