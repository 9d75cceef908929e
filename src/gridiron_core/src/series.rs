use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use std::ops::{Add, AddAssign};

use crate::team::TeamSeason;

/// Result of one simulated game from the first team's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Win,
    Loss,
    Tie,
}

impl GameOutcome {
    /// `1` for a win, `-1` for a loss, `0` for a tie.
    pub fn value(self) -> i8 {
        match self {
            GameOutcome::Win => 1,
            GameOutcome::Loss => -1,
            GameOutcome::Tie => 0,
        }
    }

    /// Outcome of scoring `ours` against `theirs`.
    pub fn from_points(ours: f64, theirs: f64) -> Self {
        if ours > theirs {
            GameOutcome::Win
        } else if ours < theirs {
            GameOutcome::Loss
        } else {
            GameOutcome::Tie
        }
    }

    /// Elo result score: 1 for a win, 0 for a loss, 0.5 for a tie.
    pub fn score(self) -> f64 {
        match self {
            GameOutcome::Win => 1.0,
            GameOutcome::Loss => 0.0,
            GameOutcome::Tie => 0.5,
        }
    }
}

impl From<GameOutcome> for i8 {
    fn from(outcome: GameOutcome) -> Self {
        outcome.value()
    }
}

/// Win/loss/tie counts for a series, from the first team's point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesTally {
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
}

impl SeriesTally {
    pub fn record(&mut self, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win => self.wins += 1,
            GameOutcome::Loss => self.losses += 1,
            GameOutcome::Tie => self.ties += 1,
        }
    }

    pub fn games(&self) -> u64 {
        self.wins + self.losses + self.ties
    }
}

impl Add for SeriesTally {
    type Output = SeriesTally;

    fn add(self, rhs: SeriesTally) -> SeriesTally {
        SeriesTally {
            wins: self.wins + rhs.wins,
            losses: self.losses + rhs.losses,
            ties: self.ties + rhs.ties,
        }
    }
}

impl AddAssign for SeriesTally {
    fn add_assign(&mut self, rhs: SeriesTally) {
        *self = *self + rhs;
    }
}

/// Majority winner of a series, or a tie marker when the win counts match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesWinner {
    Team(TeamSeason),
    Tied,
}

impl fmt::Display for SeriesWinner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesWinner::Team(team) => write!(f, "{}", team),
            SeriesWinner::Tied => write!(f, "TIED"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub team_a: TeamSeason,
    pub team_b: TeamSeason,
    pub tally: SeriesTally,
    pub winner: SeriesWinner,
}

impl SeriesResult {
    pub fn new(team_a: TeamSeason, team_b: TeamSeason, tally: SeriesTally) -> Self {
        let winner = if tally.wins > tally.losses {
            SeriesWinner::Team(team_a.clone())
        } else if tally.losses > tally.wins {
            SeriesWinner::Team(team_b.clone())
        } else {
            SeriesWinner::Tied
        };
        SeriesResult {
            team_a,
            team_b,
            tally,
            winner,
        }
    }

    /// Share of all trials won by the first team (ties count as half).
    pub fn win_rate(&self) -> f64 {
        let games = self.tally.games();
        if games == 0 {
            return 0.5;
        }
        (self.tally.wins as f64 + 0.5 * self.tally.ties as f64) / games as f64
    }

    /// Normal-approximation probability that the first team's true win rate
    /// against the second exceeds one half.
    ///
    /// Uses decided games only. With no decided games the answer is 0.5.
    pub fn confidence(&self) -> f64 {
        let decided = self.tally.wins + self.tally.losses;
        if decided == 0 {
            return 0.5;
        }
        let n = decided as f64;
        let p = self.tally.wins as f64 / n;
        let stderr = (0.25 / n).sqrt();
        Normal::new(0.0, 1.0)
            .map(|normal| normal.cdf((p - 0.5) / stderr))
            .unwrap_or(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> (TeamSeason, TeamSeason) {
        (TeamSeason::new("BUF", 2024), TeamSeason::new("BAL", 2024))
    }

    #[test]
    fn test_outcome_values() {
        assert_eq!(GameOutcome::from_points(24.0, 17.0).value(), 1);
        assert_eq!(GameOutcome::from_points(10.0, 17.0).value(), -1);
        assert_eq!(GameOutcome::from_points(17.0, 17.0).value(), 0);
        assert_eq!(i8::from(GameOutcome::Tie), 0);
    }

    #[test]
    fn test_majority_winner() {
        let (a, b) = teams();
        let tally = SeriesTally {
            wins: 6,
            losses: 3,
            ties: 1,
        };
        let result = SeriesResult::new(a.clone(), b.clone(), tally);
        assert_eq!(result.winner, SeriesWinner::Team(a.clone()));

        let flipped = SeriesResult::new(
            a,
            b.clone(),
            SeriesTally {
                wins: 3,
                losses: 6,
                ties: 1,
            },
        );
        assert_eq!(flipped.winner, SeriesWinner::Team(b));
    }

    #[test]
    fn test_equal_wins_is_tied() {
        let (a, b) = teams();
        let result = SeriesResult::new(
            a,
            b,
            SeriesTally {
                wins: 4,
                losses: 4,
                ties: 2,
            },
        );
        assert_eq!(result.winner, SeriesWinner::Tied);
        assert_eq!(result.winner.to_string(), "TIED");
        assert!((result.win_rate() - 0.5).abs() < 1e-12);
        assert!((result.confidence() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_grows_with_margin() {
        let (a, b) = teams();
        let close = SeriesResult::new(
            a.clone(),
            b.clone(),
            SeriesTally {
                wins: 52,
                losses: 48,
                ties: 0,
            },
        );
        let clear = SeriesResult::new(
            a,
            b,
            SeriesTally {
                wins: 70,
                losses: 30,
                ties: 0,
            },
        );
        assert!(close.confidence() > 0.5);
        assert!(clear.confidence() > close.confidence());
        assert!(clear.confidence() <= 1.0);
    }

    #[test]
    fn test_tally_add() {
        let mut total = SeriesTally::default();
        total += SeriesTally {
            wins: 1,
            losses: 2,
            ties: 3,
        };
        total.record(GameOutcome::Win);
        assert_eq!(
            total,
            SeriesTally {
                wins: 2,
                losses: 2,
                ties: 3
            }
        );
        assert_eq!(total.games(), 7);
    }
}
