use log::{debug, info};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::BracketConfig;
use crate::constants::MIN_SEASON_YEAR;
use crate::error::{GridironError, Result};
use crate::team::TeamSeason;

/// Fixed per-entrant data, set when the bracket is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TeamInfo {
    pub seed: u32,
    pub conference: String,
    pub year: i32,
}

/// Two slots, a conference label and a winner. Empty slots are "TBD".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Matchup {
    pub team1: Option<TeamSeason>,
    pub team2: Option<TeamSeason>,
    pub conference: Option<String>,
    pub winner: Option<TeamSeason>,
}

impl Matchup {
    fn game(team1: TeamSeason, team2: TeamSeason, conference: Option<String>) -> Self {
        Matchup {
            team1: Some(team1),
            team2: Some(team2),
            conference,
            winner: None,
        }
    }

    /// Lone entrant advancing without an opponent.
    fn walkover(team: TeamSeason, conference: Option<String>) -> Self {
        Matchup {
            team1: Some(team.clone()),
            team2: None,
            conference,
            winner: Some(team),
        }
    }

    pub fn is_walkover(&self) -> bool {
        self.team1.is_some() && self.team2.is_none()
    }

    /// Both slots filled and no winner yet.
    pub fn is_ready(&self) -> bool {
        self.team1.is_some() && self.team2.is_some() && self.winner.is_none()
    }

    pub fn contains(&self, team: &TeamSeason) -> bool {
        self.team1.as_ref() == Some(team) || self.team2.as_ref() == Some(team)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Round {
    pub matchups: Vec<Matchup>,
    /// Entrants skipping this round; they join the next round's pool
    pub byes: Vec<TeamSeason>,
}

impl Round {
    pub fn is_complete(&self) -> bool {
        self.matchups.iter().all(|m| m.winner.is_some())
    }
}

/// Matchup enriched with each slot's season year, for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchupView {
    pub team1: Option<TeamSeason>,
    pub team1_year: Option<i32>,
    pub team2: Option<TeamSeason>,
    pub team2_year: Option<i32>,
    pub conference: Option<String>,
    pub winner: Option<TeamSeason>,
    pub winner_year: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BracketState {
    /// Round 1 seeded, no game decided yet
    Built,
    /// The given round is the earliest with an undecided matchup
    RoundInProgress(usize),
    /// The final matchup has a winner
    Complete,
}

/// Seeded playoff bracket with per-conference reseeding.
///
/// Rounds are numbered from 1. Conferences stay apart in every round but the
/// last, where the remaining entrants merge into one championship game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bracket {
    conferences: Vec<String>,
    team_info: HashMap<TeamSeason, TeamInfo>,
    rounds: Vec<Round>,
    reseed: bool,
    num_rounds: usize,
}

impl Bracket {
    /// Validate the rosters and seed round 1.
    ///
    /// Top seeds up to the conference's bye count skip round 1. The others
    /// are paired best against worst; an odd one out advances unopposed.
    pub fn build(config: &BracketConfig) -> Result<Self> {
        let mut team_info = HashMap::new();
        let mut conferences = Vec::with_capacity(config.conferences.len());
        let mut seen_conferences = HashSet::new();

        for roster in &config.conferences {
            if !seen_conferences.insert(roster.name.as_str()) {
                return Err(GridironError::Configuration(format!(
                    "Conference {} listed more than once",
                    roster.name
                )));
            }
            let num_byes = *config.byes.get(&roster.name).ok_or_else(|| {
                GridironError::Configuration(format!("Conference {} not found in byes", roster.name))
            })?;
            if num_byes >= roster.teams.len() {
                return Err(GridironError::Configuration(format!(
                    "Number of byes ({}) cannot be greater than or equal to number of teams in conference {} ({})",
                    num_byes,
                    roster.name,
                    roster.teams.len()
                )));
            }
            for entry in &roster.teams {
                if entry.year < MIN_SEASON_YEAR {
                    return Err(GridironError::Configuration(format!(
                        "Invalid year for team {}: {}. Year must be >= {}",
                        entry.team, entry.year, MIN_SEASON_YEAR
                    )));
                }
                let id = TeamSeason::new(entry.team.clone(), entry.year);
                let info = TeamInfo {
                    seed: entry.seed,
                    conference: roster.name.clone(),
                    year: entry.year,
                };
                if team_info.insert(id.clone(), info).is_some() {
                    return Err(GridironError::Configuration(format!(
                        "Team {} entered more than once",
                        id
                    )));
                }
            }
            conferences.push(roster.name.clone());
        }

        let total = team_info.len();
        if total < 2 {
            return Err(GridironError::Configuration(format!(
                "A bracket needs at least two teams, got {}",
                total
            )));
        }
        let num_rounds = ceil_log2(total);

        let mut first = Round::default();
        if num_rounds == 1 {
            let entrants: Vec<(TeamSeason, u32)> = config
                .conferences
                .iter()
                .flat_map(|r| r.teams.iter())
                .map(|e| (TeamSeason::new(e.team.clone(), e.year), e.seed))
                .collect();
            first.matchups = championship(entrants);
        } else {
            for roster in &config.conferences {
                let mut teams: Vec<(TeamSeason, u32)> = roster
                    .teams
                    .iter()
                    .map(|e| (TeamSeason::new(e.team.clone(), e.year), e.seed))
                    .collect();
                teams.sort_by_key(|(_, seed)| *seed);

                let num_byes = config.byes.get(&roster.name).copied().unwrap_or(0);
                let remaining = teams.split_off(num_byes);
                first.byes.extend(teams.into_iter().map(|(team, _)| team));
                first
                    .matchups
                    .extend(pair_by_seed(remaining, Some(&roster.name)));
            }
        }

        let mut rounds = vec![first];
        for _ in 2..=num_rounds {
            let prev = &rounds[rounds.len() - 1];
            let entrants = prev.matchups.len() + prev.byes.len();
            rounds.push(Round {
                matchups: vec![Matchup::default(); entrants / 2],
                byes: Vec::new(),
            });
        }

        let mut bracket = Bracket {
            conferences,
            team_info,
            rounds,
            reseed: config.reseed,
            num_rounds,
        };
        info!(
            "built bracket: {} teams, {} rounds, {} first-round games",
            total,
            num_rounds,
            bracket.rounds[0].matchups.len()
        );
        bracket.advance_completed(1);
        Ok(bracket)
    }

    pub fn num_rounds(&self) -> usize {
        self.num_rounds
    }

    pub fn conferences(&self) -> &[String] {
        &self.conferences
    }

    pub fn team_info(&self, team: &TeamSeason) -> Option<&TeamInfo> {
        self.team_info.get(team)
    }

    /// The 1-based round `round`, or `InvalidRound` outside the bracket.
    pub fn round(&self, round: usize) -> Result<&Round> {
        if round == 0 || round > self.rounds.len() {
            return Err(GridironError::InvalidRound { round });
        }
        Ok(&self.rounds[round - 1])
    }

    /// Record the winner of a matchup.
    ///
    /// When this completes a round, the next round is seeded from the
    /// round's winners plus its bye entrants. Nothing changes on error.
    pub fn record_winner(&mut self, round: usize, index: usize, winner: &TeamSeason) -> Result<()> {
        let matchup = self
            .round(round)?
            .matchups
            .get(index)
            .ok_or(GridironError::InvalidMatchup { round, index })?;
        if !matchup.contains(winner) {
            return Err(GridironError::NotInMatchup {
                team: winner.clone(),
                round,
                index,
            });
        }
        if let Some(existing) = &matchup.winner {
            if existing == winner {
                return Ok(());
            }
            return Err(GridironError::AlreadyDecided {
                round,
                index,
                winner: existing.clone(),
            });
        }

        self.rounds[round - 1].matchups[index].winner = Some(winner.clone());
        debug!("round {} matchup {}: {} advances", round, index, winner);
        self.advance_completed(round);
        Ok(())
    }

    /// Matchups of a round with each slot's season year.
    pub fn round_matchups(&self, round: usize) -> Result<Vec<MatchupView>> {
        let year_of = |team: &Option<TeamSeason>| {
            team.as_ref()
                .and_then(|t| self.team_info.get(t))
                .map(|info| info.year)
        };
        Ok(self
            .round(round)?
            .matchups
            .iter()
            .map(|m| MatchupView {
                team1: m.team1.clone(),
                team1_year: year_of(&m.team1),
                team2: m.team2.clone(),
                team2_year: year_of(&m.team2),
                conference: m.conference.clone(),
                winner: m.winner.clone(),
                winner_year: year_of(&m.winner),
            })
            .collect())
    }

    /// Indices of matchups in `round` with both teams set and no winner.
    pub fn ready_matchups(&self, round: usize) -> Result<Vec<usize>> {
        Ok(self
            .round(round)?
            .matchups
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_ready())
            .map(|(i, _)| i)
            .collect())
    }

    /// Progress of the bracket, read off its rounds.
    pub fn state(&self) -> BracketState {
        if let Some(last) = self.rounds.last() {
            if !last.matchups.is_empty() && last.is_complete() {
                return BracketState::Complete;
            }
        }
        let any_played = self
            .rounds
            .iter()
            .flat_map(|r| r.matchups.iter())
            .any(|m| m.winner.is_some() && !m.is_walkover());
        if !any_played {
            return BracketState::Built;
        }
        let current = self
            .rounds
            .iter()
            .position(|r| !r.is_complete())
            .map(|i| i + 1)
            .unwrap_or(self.num_rounds);
        BracketState::RoundInProgress(current)
    }

    pub fn champion(&self) -> Option<&TeamSeason> {
        match self.state() {
            BracketState::Complete => self
                .rounds
                .last()
                .and_then(|r| r.matchups.first())
                .and_then(|m| m.winner.as_ref()),
            _ => None,
        }
    }

    /// Entrants of `round`, grouped by conference in bracket order: the
    /// previous round's bye entrants first, then its winners.
    fn entrants(&self, round: usize) -> Vec<(String, Vec<(TeamSeason, u32)>)> {
        let mut by_conference: Vec<(String, Vec<(TeamSeason, u32)>)> = self
            .conferences
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect();
        let prev = &self.rounds[round - 2];
        let advancing = prev
            .byes
            .iter()
            .chain(prev.matchups.iter().filter_map(|m| m.winner.as_ref()));
        for team in advancing {
            if let Some(info) = self.team_info.get(team) {
                if let Some((_, teams)) = by_conference
                    .iter_mut()
                    .find(|(name, _)| *name == info.conference)
                {
                    teams.push((team.clone(), info.seed));
                }
            }
        }
        by_conference
    }

    /// Matchups for `round` from the entrants advancing out of `round - 1`.
    fn next_matchups(&self, round: usize) -> Vec<Matchup> {
        let entrants = self.entrants(round);
        if round == self.num_rounds {
            let merged: Vec<(TeamSeason, u32)> =
                entrants.into_iter().flat_map(|(_, teams)| teams).collect();
            if self.reseed {
                return championship(merged);
            }
            return pair_in_order(merged, None);
        }
        entrants
            .into_iter()
            .flat_map(|(conference, teams)| {
                if self.reseed {
                    pair_by_seed(teams, Some(&conference))
                } else {
                    pair_in_order(teams, Some(&conference))
                }
            })
            .collect()
    }

    /// Seed every following round whose predecessor is complete, starting
    /// after `round`.
    fn advance_completed(&mut self, round: usize) {
        let mut current = round;
        while current < self.num_rounds && self.rounds[current - 1].is_complete() {
            let next = current + 1;
            let matchups = self.next_matchups(next);
            info!(
                "round {} complete, seeded round {} with {} matchups{}",
                current,
                next,
                matchups.len(),
                if self.reseed { " (reseeded)" } else { "" }
            );
            self.rounds[next - 1].matchups = matchups;
            current = next;
        }
    }
}

/// Smallest `r` with `2^r >= n`.
fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    (usize::BITS - (n - 1).leading_zeros()) as usize
}

/// Best seed against worst, second against second worst, and so on; an odd
/// middle entrant advances unopposed.
fn pair_by_seed(mut teams: Vec<(TeamSeason, u32)>, conference: Option<&str>) -> Vec<Matchup> {
    teams.sort_by_key(|(_, seed)| *seed);
    let n = teams.len();
    let conf = conference.map(str::to_string);
    let mut matchups: Vec<Matchup> = (0..n / 2)
        .map(|i| Matchup::game(teams[i].0.clone(), teams[n - 1 - i].0.clone(), conf.clone()))
        .collect();
    if n % 2 == 1 {
        matchups.push(Matchup::walkover(teams[n / 2].0.clone(), conf));
    }
    matchups
}

/// Adjacent entrants in bracket order; an odd last entrant advances unopposed.
fn pair_in_order(teams: Vec<(TeamSeason, u32)>, conference: Option<&str>) -> Vec<Matchup> {
    let conf = conference.map(str::to_string);
    teams
        .chunks(2)
        .filter_map(|pair| match pair {
            [a] => Some(Matchup::walkover(a.0.clone(), conf.clone())),
            [a, b, ..] => Some(Matchup::game(a.0.clone(), b.0.clone(), conf.clone())),
            [] => None,
        })
        .collect()
}

/// The two best remaining seeds across all conferences.
fn championship(mut teams: Vec<(TeamSeason, u32)>) -> Vec<Matchup> {
    teams.sort_by_key(|(_, seed)| *seed);
    let mut top = teams.into_iter().map(|(team, _)| team);
    match (top.next(), top.next()) {
        (Some(a), Some(b)) => vec![Matchup::game(a, b, None)],
        (Some(a), None) => vec![Matchup::walkover(a, None)],
        _ => Vec::new(),
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |team: &Option<TeamSeason>| match team {
            Some(t) => format!("{} ({})", t.code, t.year),
            None => "TBD".to_string(),
        };
        for (r, round) in self.rounds.iter().enumerate() {
            writeln!(f, "Round {}:", r + 1)?;
            for (i, m) in round.matchups.iter().enumerate() {
                write!(f, "  Matchup {}: {} vs {}", i + 1, label(&m.team1), label(&m.team2))?;
                if let Some(conf) = &m.conference {
                    write!(f, " ({})", conf)?;
                }
                if m.winner.is_some() {
                    write!(f, " -> Winner: {}", label(&m.winner))?;
                }
                writeln!(f)?;
            }
            for team in &round.byes {
                writeln!(f, "  Bye: {} ({})", team.code, team.year)?;
            }
        }
        Ok(())
    }
}
