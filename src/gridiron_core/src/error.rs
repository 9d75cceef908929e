use thiserror::Error;

use crate::bracket::BracketState;
use crate::team::TeamSeason;

/// Errors raised by bracket construction, stat lookups and simulation.
#[derive(Debug, Error)]
pub enum GridironError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid round number: {round}")]
    InvalidRound { round: usize },

    #[error("Invalid matchup index {index} for round {round}")]
    InvalidMatchup { round: usize, index: usize },

    #[error("{team} is not part of matchup {index} in round {round}")]
    NotInMatchup {
        team: TeamSeason,
        round: usize,
        index: usize,
    },

    #[error("Matchup {index} in round {round} was already won by {winner}")]
    AlreadyDecided {
        round: usize,
        index: usize,
        winner: TeamSeason,
    },

    #[error("Bracket has no champion yet ({0:?})")]
    NoChampion(BracketState),

    #[error("Unknown team: {0}")]
    UnknownTeam(TeamSeason),

    #[error("{0} has no recorded games")]
    NoGames(TeamSeason),

    #[error("Insufficient history for {team}: missing weeks {missing:?}")]
    DataGap { team: TeamSeason, missing: Vec<u32> },

    #[error("No record for {team} in week {week}")]
    MissingWeek { team: TeamSeason, week: u32 },

    #[error("Invalid team identifier: {0}")]
    InvalidTeamId(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GridironError>;
