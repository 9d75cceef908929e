use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_POINTS_STAT, DEFAULT_SCORE_STAT,
    DEFAULT_TRIALS, SUMMARY_CATEGORY,
};
use crate::error::{GridironError, Result};
use crate::stats::StatKey;

/// Knobs for the game simulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Games simulated per series
    pub trials: usize,

    /// Fixed RNG seed for reproducible runs; entropy when unset
    pub seed: Option<u64>,

    /// Series with at least this many trials run on the rayon pool
    pub parallel_threshold: usize,

    /// Trials per parallel work unit
    pub chunk_size: usize,

    /// Derived stat binned into each side's empirical distribution
    pub score_key: StatKey,

    /// Derived stat compared to decide a game
    pub points_key: StatKey,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            trials: DEFAULT_TRIALS,
            seed: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            score_key: StatKey::new(SUMMARY_CATEGORY, DEFAULT_SCORE_STAT),
            points_key: StatKey::new(SUMMARY_CATEGORY, DEFAULT_POINTS_STAT),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(GridironError::Configuration(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One bracket entrant as listed in a conference roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedEntry {
    pub team: String,
    pub seed: u32,
    pub year: i32,
}

impl SeedEntry {
    pub fn new(team: impl Into<String>, seed: u32, year: i32) -> Self {
        SeedEntry {
            team: team.into(),
            seed,
            year,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConferenceRoster {
    pub name: String,
    pub teams: Vec<SeedEntry>,
}

impl ConferenceRoster {
    pub fn new(name: impl Into<String>, teams: Vec<SeedEntry>) -> Self {
        ConferenceRoster {
            name: name.into(),
            teams,
        }
    }
}

fn default_reseed() -> bool {
    true
}

/// Input for building a bracket: ordered conference rosters, the number of
/// first-round byes per conference, and whether later rounds are reseeded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BracketConfig {
    pub conferences: Vec<ConferenceRoster>,
    pub byes: HashMap<String, usize>,
    #[serde(default = "default_reseed")]
    pub reseed: bool,
}

impl BracketConfig {
    pub fn new(conferences: Vec<ConferenceRoster>, byes: HashMap<String, usize>) -> Self {
        BracketConfig {
            conferences,
            byes,
            reseed: true,
        }
    }

    pub fn with_reseed(mut self, reseed: bool) -> Self {
        self.reseed = reseed;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
