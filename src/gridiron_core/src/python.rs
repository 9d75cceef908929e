use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;

use crate::bracket::Bracket;
use crate::config::{BracketConfig, SimulationConfig};
use crate::derive::StandardDerivation;
use crate::elo;
use crate::error::GridironError;
use crate::simulator::GameSimulator;
use crate::stats::MemoryStatStore;
use crate::team::TeamSeason;
use crate::tournament;

impl From<GridironError> for PyErr {
    fn from(err: GridironError) -> PyErr {
        match err {
            GridironError::UnknownTeam(_) | GridironError::MissingWeek { .. } => {
                PyKeyError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

fn team_id(raw: &str) -> PyResult<TeamSeason> {
    Ok(raw.parse::<TeamSeason>()?)
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| GridironError::from(e).into())
}

/// Playoff bracket built from a JSON configuration.
#[pyclass(name = "Bracket")]
#[derive(Clone)]
pub struct PyBracket {
    inner: Bracket,
}

#[pymethods]
impl PyBracket {
    #[new]
    pub fn new(config_json: &str) -> PyResult<Self> {
        let config = BracketConfig::from_json_str(config_json)?;
        Ok(PyBracket {
            inner: Bracket::build(&config)?,
        })
    }

    #[getter]
    pub fn num_rounds(&self) -> usize {
        self.inner.num_rounds()
    }

    /// Record the winner (as `CODE-YEAR`) of a matchup; rounds start at 1.
    pub fn record_winner(&mut self, round: usize, index: usize, winner: &str) -> PyResult<()> {
        Ok(self.inner.record_winner(round, index, &team_id(winner)?)?)
    }

    /// Round matchups with season years, as a JSON list.
    pub fn round_matchups(&self, round: usize) -> PyResult<String> {
        to_json(&self.inner.round_matchups(round)?)
    }

    pub fn ready_matchups(&self, round: usize) -> PyResult<Vec<usize>> {
        Ok(self.inner.ready_matchups(round)?)
    }

    pub fn champion(&self) -> Option<String> {
        self.inner.champion().map(|t| t.to_string())
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "Bracket({} conferences, {} rounds)",
            self.inner.conferences().len(),
            self.inner.num_rounds()
        )
    }
}

/// Game simulator over an in-memory stat store loaded from JSON.
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    inner: GameSimulator<MemoryStatStore, StandardDerivation>,
}

#[pymethods]
impl PySimulator {
    #[new]
    #[pyo3(signature = (stats_json, config_json = None, seed = None))]
    pub fn new(stats_json: &str, config_json: Option<&str>, seed: Option<u64>) -> PyResult<Self> {
        let store = MemoryStatStore::from_json_str(stats_json)?;
        let mut config = match config_json {
            Some(json) => SimulationConfig::from_json_str(json)?,
            None => SimulationConfig::default(),
        };
        if seed.is_some() {
            config.seed = seed;
        }
        Ok(PySimulator {
            inner: GameSimulator::new(store, StandardDerivation, config),
        })
    }

    /// 1 if `a` wins, -1 if `b` wins, 0 for a tie.
    pub fn simulate_game(&mut self, a: &str, b: &str) -> PyResult<i8> {
        let outcome = self.inner.simulate_game(&team_id(a)?, &team_id(b)?)?;
        Ok(outcome.value())
    }

    /// `(winner, wins, losses, ties)`; the winner is `"TIED"` on equal wins.
    #[pyo3(signature = (a, b, trials = None))]
    pub fn simulate_series(
        &mut self,
        a: &str,
        b: &str,
        trials: Option<usize>,
    ) -> PyResult<(String, u64, u64, u64)> {
        let trials = trials.unwrap_or(self.inner.config().trials);
        let result = self.inner.simulate_series(&team_id(a)?, &team_id(b)?, trials)?;
        Ok((result.winner.to_string(), result.tally.wins, result.tally.losses, result.tally.ties))
    }

    /// Play every remaining matchup of `bracket` and return the champion.
    #[pyo3(signature = (bracket, trials = None))]
    pub fn play_bracket(
        &mut self,
        mut bracket: PyRefMut<'_, PyBracket>,
        trials: Option<usize>,
    ) -> PyResult<String> {
        let trials = trials.unwrap_or(self.inner.config().trials);
        let run = tournament::play(&mut bracket.inner, &mut self.inner, trials)?;
        Ok(run.champion.to_string())
    }

    #[pyo3(signature = (config_json, runs, trials = None))]
    pub fn champion_odds(
        &mut self,
        config_json: &str,
        runs: usize,
        trials: Option<usize>,
    ) -> PyResult<Vec<(String, f64)>> {
        let config = BracketConfig::from_json_str(config_json)?;
        let trials = trials.unwrap_or(self.inner.config().trials);
        let odds = tournament::champion_odds(&config, &mut self.inner, runs, trials)?;
        Ok(odds.into_iter().map(|(t, p)| (t.to_string(), p)).collect())
    }

    /// Round-robin Elo league; rows are `(team, wins, losses, ties, rating)`.
    pub fn run_league(
        &mut self,
        teams: Vec<String>,
        games_per_pair: usize,
    ) -> PyResult<Vec<(String, u64, u64, u64, f64)>> {
        let teams = teams
            .iter()
            .map(|t| team_id(t))
            .collect::<PyResult<Vec<_>>>()?;
        let standings = elo::run_league(&mut self.inner, &teams, games_per_pair)?;
        Ok(standings
            .into_iter()
            .map(|s| (s.team.to_string(), s.wins, s.losses, s.ties, s.rating))
            .collect())
    }

    pub fn reseed(&mut self, seed: u64) {
        self.inner.reseed(seed);
    }

    fn __repr__(&self) -> String {
        format!("Simulator(trials={})", self.inner.config().trials)
    }
}
