use crate::config::Config;
use crate::env::{Environment, FishingEnv};
use crate::model::Record;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Episode runner.
///
/// Holds the configuration, the fishing environment and the random number
/// generator of the policy, and provides methods to run batches of episodes,
/// save, and load them.
#[derive(Serialize, Deserialize)]
pub struct Engine {
    cfg: Config,
    env: FishingEnv,
    rng: ChaCha12Rng,
    n_episodes: usize,
}

impl Engine {
    /// Create a new `Engine` whose environment renders to `log_file`.
    ///
    /// Both random number generators derive from `init.seed` when set,
    /// otherwise from operating system entropy.
    pub fn generate_initial_condition<P: AsRef<Path>>(cfg: Config, log_file: P) -> Result<Self> {
        let mut rng = match cfg.init.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let env = FishingEnv::from_rng(&mut rng).with_log_file(log_file);

        Ok(Self {
            cfg,
            env,
            rng,
            n_episodes: 0,
        })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn n_episodes(&self) -> usize {
        self.n_episodes
    }

    /// Run a batch of episodes and save their records to a binary file.
    pub fn perform_simulation<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let episodes_per_file = self.cfg.output.episodes_per_file;
        for i_episode in 0..episodes_per_file {
            let record = self.perform_episode().context("failed to perform episode")?;

            encode::write(&mut writer, &record).context("failed to serialize record")?;

            let progress = 100.0 * (i_episode + 1) as f64 / episodes_per_file as f64;
            log::info!("completed {progress:06.2}%");
        }

        writer.flush().context("failed to flush writer stream")?;

        self.env.shutdown()?;

        Ok(())
    }

    /// Save a checkpoint of the entire engine state.
    ///
    /// Can be used to resume the simulation later.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        // Named fields keep the tagged policy decodable.
        encode::write_named(&mut writer, &self).context("failed to serialize engine")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }

    /// Load a previously saved engine checkpoint.
    pub fn load_checkpoint<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);
        let engine = decode::from_read(&mut reader).context("failed to deserialize engine")?;
        Ok(engine)
    }

    fn perform_episode(&mut self) -> Result<Record> {
        let params = self.cfg.params();
        let steps_per_render = self.cfg.output.steps_per_render;

        let mut obs = self
            .env
            .initialize(params)
            .context("failed to initialize environment")?;

        let mut total_reward = 0.0;
        loop {
            if steps_per_render > 0 && self.env.state().years_passed % steps_per_render == 0 {
                self.env.render().context("failed to render")?;
            }

            let action = self.cfg.policy.select(obs, &params, &mut self.rng)?;
            let step = self.env.apply(action);

            total_reward += step.reward;
            obs = step.observation;
            if step.done {
                break;
            }
        }

        // Always keep the terminal row.
        if steps_per_render > 0 {
            self.env.render().context("failed to render")?;
        }

        let record = Record {
            episode: self.n_episodes,
            length: self.env.state().years_passed,
            total_reward,
            final_population: obs,
            collapsed: obs <= 0.0,
        };
        log::debug!("{record:?}");

        self.n_episodes += 1;

        Ok(record)
    }
}
