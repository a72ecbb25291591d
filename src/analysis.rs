use crate::config::Config;
use crate::model::Record;
use crate::stats::Accumulator;
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::Serialize;
use serde_value::Value;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Quantity measured over the episodes of a run.
pub trait Obs {
    fn update(&mut self, record: &Record);
    fn report(&self) -> Result<Value>;
}

fn named_report<T: Serialize>(name: &str, report: T) -> Result<Value> {
    let value = serde_value::to_value(report).context("failed to convert report")?;
    Ok(Value::Map(BTreeMap::from([(
        Value::String(name.to_string()),
        value,
    )])))
}

/// Total reward per episode.
#[derive(Default)]
pub struct EpisodeReturn {
    acc: Accumulator,
}

impl Obs for EpisodeReturn {
    fn update(&mut self, record: &Record) {
        self.acc.add(record.total_reward);
    }

    fn report(&self) -> Result<Value> {
        named_report("episode_return", self.acc.report())
    }
}

#[derive(Default)]
pub struct EpisodeLength {
    acc: Accumulator,
}

impl Obs for EpisodeLength {
    fn update(&mut self, record: &Record) {
        self.acc.add(record.length as f64);
    }

    fn report(&self) -> Result<Value> {
        named_report("episode_length", self.acc.report())
    }
}

#[derive(Default)]
pub struct FinalPopulation {
    acc: Accumulator,
}

impl Obs for FinalPopulation {
    fn update(&mut self, record: &Record) {
        self.acc.add(record.final_population);
    }

    fn report(&self) -> Result<Value> {
        named_report("final_population", self.acc.report())
    }
}

/// Fraction of episodes ending in a collapsed stock.
#[derive(Default)]
pub struct CollapseRate {
    acc: Accumulator,
}

impl Obs for CollapseRate {
    fn update(&mut self, record: &Record) {
        self.acc.add(if record.collapsed { 1.0 } else { 0.0 });
    }

    fn report(&self) -> Result<Value> {
        named_report("collapse_rate", self.acc.report())
    }
}

pub struct Analyzer {
    cfg: Config,
    obs_ptr_vec: Vec<Box<dyn Obs>>,
}

impl Analyzer {
    pub fn new(cfg: Config) -> Self {
        let obs_ptr_vec: Vec<Box<dyn Obs>> = vec![
            Box::new(EpisodeReturn::default()),
            Box::new(EpisodeLength::default()),
            Box::new(FinalPopulation::default()),
            Box::new(CollapseRate::default()),
        ];
        Self { cfg, obs_ptr_vec }
    }

    /// Feed every record of an episodes file to the observables.
    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        let mut reader = BufReader::new(file);

        for _ in 0..self.cfg.output.episodes_per_file {
            let record = decode::from_read(&mut reader).context("failed to read record")?;
            self.add_record(&record);
        }
        Ok(())
    }

    pub fn add_record(&mut self, record: &Record) {
        for obs in &mut self.obs_ptr_vec {
            obs.update(record);
        }
    }

    pub fn reports(&self) -> Result<Vec<Value>> {
        self.obs_ptr_vec.iter().map(|obs| obs.report()).collect()
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let reports = self.reports().context("failed to build reports")?;

        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);
        encode::write_named(&mut writer, &reports).context("failed to serialize results")?;
        writer.flush().context("failed to flush writer stream")?;
        Ok(())
    }
}
