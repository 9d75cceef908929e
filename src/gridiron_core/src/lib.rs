//! Gridiron Core - empirical-distribution football game simulation and
//! playoff bracket engine.
//!
//! Games are simulated by resampling historical weekly stat lines: each
//! team-season's offense and defense are binned by a derived score, one
//! week is drawn from each side, and the two are blended into a synthetic
//! game. Series of such games decide bracket matchups. Python bindings are
//! available behind the `python` feature.

pub mod aggregate;
pub mod bracket;
pub mod config;
pub mod constants;
pub mod derive;
pub mod distribution;
pub mod elo;
pub mod error;
pub mod sampler;
pub mod series;
pub mod simulator;
pub mod stats;
pub mod team;
pub mod tournament;

#[cfg(feature = "python")]
pub mod python;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{aggregate_side_totals, SideSelection, SideTotals, StatQuery, WeekFilter};
pub use bracket::{Bracket, BracketState, Matchup, MatchupView, Round, TeamInfo};
pub use config::{BracketConfig, ConferenceRoster, SeedEntry, SimulationConfig};
pub use derive::{Derive, StandardDerivation};
pub use distribution::EmpiricalDistribution;
pub use elo::{run_league, League, Standing};
pub use error::{GridironError, Result};
pub use sampler::{SideProfile, SyntheticGame};
pub use series::{GameOutcome, SeriesResult, SeriesTally, SeriesWinner};
pub use simulator::GameSimulator;
pub use stats::{MemoryStatStore, StatKey, StatStore, StatTotals, WeeklyStatLine};
pub use team::{Side, TeamSeason};
pub use tournament::{champion_odds, TournamentRun};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn gridiron_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyBracket>()?;
    m.add_class::<python::PySimulator>()?;

    m.add("DEFAULT_TRIALS", constants::DEFAULT_TRIALS)?;
    m.add("MIN_SEASON_YEAR", constants::MIN_SEASON_YEAR)?;
    m.add("ELO_K_FACTOR", constants::ELO_K_FACTOR)?;

    Ok(())
}
