use crate::analysis::Analyzer;
use crate::config::Config;
use crate::engine::Engine;
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

/// Layout of a simulation directory.
///
/// ```text
/// <sim_dir>/config.toml
/// <sim_dir>/run-NNNN/episodes-NNNN.msgpack
/// <sim_dir>/run-NNNN/checkpoint.msgpack
/// <sim_dir>/run-NNNN/fishing.csv
/// <sim_dir>/run-NNNN/results.msgpack
/// ```
pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg = Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Start a new run and simulate `n_files` episodes files.
    pub fn create_run(&self, n_files: usize) -> Result<()> {
        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;

        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let mut engine =
            Engine::generate_initial_condition(self.cfg.clone(), self.log_file(run_idx))
                .context("failed to generate initial condition")?;

        self.run_simulation(run_idx, 0..n_files, &mut engine)
    }

    /// Continue an existing run from its checkpoint for `n_files` more files.
    pub fn resume_run(&self, run_idx: usize, n_files: usize) -> Result<()> {
        self.check_run_idx(run_idx)?;

        let file_idx = self
            .count_episode_files(run_idx)
            .context("failed to count episode files")?;

        let checkpoint_file = self.checkpoint_file(run_idx);
        let mut engine = Engine::load_checkpoint(&checkpoint_file)
            .with_context(|| format!("failed to load {checkpoint_file:?}"))?;
        if engine.cfg() != &self.cfg {
            bail!("checkpoint config differs from the current config");
        }
        log::info!("loaded {checkpoint_file:?} ({} episodes)", engine.n_episodes());

        self.run_simulation(run_idx, file_idx..file_idx + n_files, &mut engine)
    }

    /// Summarize the episodes of one run, or of every run if `run_idx` is `None`.
    pub fn analyze_sim(&self, run_idx: Option<usize>) -> Result<()> {
        let run_idxs = match run_idx {
            Some(run_idx) => {
                self.check_run_idx(run_idx)?;
                run_idx..run_idx + 1
            }
            None => 0..self.count_run_dirs().context("failed to count run dirs")?,
        };

        for run_idx in run_idxs {
            let mut analyzer = Analyzer::new(self.cfg.clone());

            let n_files = self
                .count_episode_files(run_idx)
                .context("failed to count episode files")?;
            for file_idx in 0..n_files {
                analyzer
                    .add_file(self.episodes_file(run_idx, file_idx))
                    .context("failed to add file")?;
            }

            let results_file = self.results_file(run_idx);
            analyzer
                .save_results(&results_file)
                .context("failed to save results")?;
            log::info!("saved {results_file:?}");
        }

        Ok(())
    }

    /// Remove every run directory.
    pub fn clean_sim(&self) -> Result<()> {
        for run_dir in self.run_dirs().context("failed to list run dirs")? {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }
        Ok(())
    }

    fn run_simulation(
        &self,
        run_idx: usize,
        file_idxs: Range<usize>,
        engine: &mut Engine,
    ) -> Result<()> {
        for file_idx in file_idxs {
            engine
                .perform_simulation(self.episodes_file(run_idx, file_idx))
                .context("failed to perform simulation")?;

            // A checkpoint always matches the last complete episodes file.
            engine
                .save_checkpoint(self.checkpoint_file(run_idx))
                .context("failed to save checkpoint")?;
        }

        Ok(())
    }

    fn check_run_idx(&self, run_idx: usize) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        if run_idx >= n_runs {
            bail!("run index must be less than {n_runs}, but is {run_idx}");
        }
        Ok(())
    }

    fn run_dirs(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let run_dirs = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .collect();
        Ok(run_dirs)
    }

    fn count_run_dirs(&self) -> Result<usize> {
        Ok(self.run_dirs()?.len())
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }

    fn count_episode_files(&self, run_idx: usize) -> Result<usize> {
        let pattern = self.run_dir(run_idx).join("episodes-*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob episode files")?
            .filter_map(Result::ok)
            .count();
        Ok(count)
    }

    fn checkpoint_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("checkpoint.msgpack")
    }

    fn episodes_file(&self, run_idx: usize, file_idx: usize) -> PathBuf {
        self.run_dir(run_idx)
            .join(format!("episodes-{file_idx:04}.msgpack"))
    }

    fn log_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("fishing.csv")
    }

    fn results_file(&self, run_idx: usize) -> PathBuf {
        self.run_dir(run_idx).join("results.msgpack")
    }
}
