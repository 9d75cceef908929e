use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GridironError;

/// A team identified together with one season.
///
/// The same franchise in two different years is two distinct team-seasons;
/// their histories are never merged. Displays and parses as `CODE-YEAR`
/// (e.g. `KAN-2007`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamSeason {
    pub code: String,
    pub year: i32,
}

impl TeamSeason {
    pub fn new(code: impl Into<String>, year: i32) -> Self {
        TeamSeason {
            code: code.into(),
            year,
        }
    }
}

impl fmt::Display for TeamSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.code, self.year)
    }
}

impl FromStr for TeamSeason {
    type Err = GridironError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, year) = s
            .rsplit_once('-')
            .ok_or_else(|| GridironError::InvalidTeamId(s.to_string()))?;
        let year: i32 = year
            .trim()
            .parse()
            .map_err(|_| GridironError::InvalidTeamId(s.to_string()))?;
        let code = code.trim();
        if code.is_empty() {
            return Err(GridironError::InvalidTeamId(s.to_string()));
        }
        Ok(TeamSeason::new(code, year))
    }
}

impl TryFrom<String> for TeamSeason {
    type Error = GridironError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TeamSeason> for String {
    fn from(team: TeamSeason) -> Self {
        team.to_string()
    }
}

/// Side of the ball a distribution or sample describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// What the team produced
    Offense,
    /// What the team allowed (its opponents' production against it)
    Defense,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Offense => write!(f, "offense"),
            Side::Defense => write!(f, "defense"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let team = TeamSeason::new("KAN", 2007);
        assert_eq!(team.to_string(), "KAN-2007");
        let parsed: TeamSeason = "KAN-2007".parse().unwrap();
        assert_eq!(parsed, team);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("KAN".parse::<TeamSeason>().is_err());
        assert!("KAN-20x7".parse::<TeamSeason>().is_err());
        assert!("-2007".parse::<TeamSeason>().is_err());
    }

    #[test]
    fn test_same_franchise_different_years_are_distinct() {
        let a = TeamSeason::new("SFO", 1989);
        let b = TeamSeason::new("SFO", 2023);
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_as_string() {
        let team = TeamSeason::new("BUF", 2021);
        let json = serde_json::to_string(&team).unwrap();
        assert_eq!(json, "\"BUF-2021\"");
        let back: TeamSeason = serde_json::from_str(&json).unwrap();
        assert_eq!(back, team);
    }
}
