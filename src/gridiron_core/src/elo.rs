use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{ELO_BASELINE, ELO_K_FACTOR};
use crate::derive::Derive;
use crate::error::{GridironError, Result};
use crate::series::GameOutcome;
use crate::simulator::GameSimulator;
use crate::stats::StatStore;
use crate::team::TeamSeason;

/// Probability-like expected score of a team rated `ra` against `rb`.
pub fn expected_score(ra: f64, rb: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rb - ra) / 400.0))
}

/// New ratings after a game where the first team scored `score`
/// (1 win, 0.5 tie, 0 loss). Both ratings are rounded to whole points.
pub fn update_ratings(ra: f64, rb: f64, score: f64, k: f64) -> (f64, f64) {
    let ea = expected_score(ra, rb);
    let eb = 1.0 - ea;
    let new_a = ra + k * (score - ea);
    let new_b = rb + k * ((1.0 - score) - eb);
    (new_a.round(), new_b.round())
}

/// Every pair of teams meets `games_per_pair` times, in shuffled order.
/// The earlier team in `teams` is listed first in each game.
pub fn round_robin_schedule<R: Rng>(
    teams: &[TeamSeason],
    games_per_pair: usize,
    rng: &mut R,
) -> Vec<(TeamSeason, TeamSeason)> {
    let mut schedule = Vec::new();
    for (i, home) in teams.iter().enumerate() {
        for away in &teams[i + 1..] {
            for _ in 0..games_per_pair {
                schedule.push((home.clone(), away.clone()));
            }
        }
    }
    schedule.shuffle(rng);
    schedule
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team: TeamSeason,
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
    pub rating: f64,
}

impl Standing {
    fn new(team: TeamSeason, rating: f64) -> Self {
        Standing {
            team,
            wins: 0,
            losses: 0,
            ties: 0,
            rating,
        }
    }

    /// Wins over decided games; 0 when nothing was decided.
    pub fn win_pct(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            0.0
        } else {
            self.wins as f64 / decided as f64
        }
    }
}

/// Running Elo table for a simulated league.
#[derive(Clone, Debug)]
pub struct League {
    table: HashMap<TeamSeason, Standing>,
}

impl League {
    /// Every team starts at the baseline rating.
    pub fn new(teams: &[TeamSeason]) -> Self {
        League::with_ratings(teams.iter().map(|t| (t.clone(), ELO_BASELINE)))
    }

    /// Start from existing ratings, e.g. a previous run's standings.
    pub fn with_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = (TeamSeason, f64)>,
    {
        League {
            table: ratings
                .into_iter()
                .map(|(team, rating)| (team.clone(), Standing::new(team, rating)))
                .collect(),
        }
    }

    pub fn rating(&self, team: &TeamSeason) -> Option<f64> {
        self.table.get(team).map(|s| s.rating)
    }

    /// Apply one game's result, `outcome` from `a`'s point of view.
    pub fn record(&mut self, a: &TeamSeason, b: &TeamSeason, outcome: GameOutcome) -> Result<()> {
        let ra = self.current(a)?;
        let rb = self.current(b)?;
        let (new_a, new_b) = update_ratings(ra, rb, outcome.score(), ELO_K_FACTOR);

        if let Some(s) = self.table.get_mut(a) {
            s.rating = new_a;
            match outcome {
                GameOutcome::Win => s.wins += 1,
                GameOutcome::Loss => s.losses += 1,
                GameOutcome::Tie => s.ties += 1,
            }
        }
        if let Some(s) = self.table.get_mut(b) {
            s.rating = new_b;
            match outcome {
                GameOutcome::Win => s.losses += 1,
                GameOutcome::Loss => s.wins += 1,
                GameOutcome::Tie => s.ties += 1,
            }
        }
        Ok(())
    }

    fn current(&self, team: &TeamSeason) -> Result<f64> {
        self.rating(team)
            .ok_or_else(|| GridironError::UnknownTeam(team.clone()))
    }

    /// Simulate each scheduled game once and fold it into the table.
    pub fn play_schedule<S, D>(
        &mut self,
        sim: &mut GameSimulator<S, D>,
        schedule: &[(TeamSeason, TeamSeason)],
    ) -> Result<()>
    where
        S: StatStore,
        D: Derive,
    {
        for (a, b) in schedule {
            let outcome = sim.simulate_game(a, b)?;
            self.record(a, b, outcome)?;
        }
        Ok(())
    }

    /// Standings by rating, highest first.
    pub fn standings(&self) -> Vec<Standing> {
        let mut rows: Vec<Standing> = self.table.values().cloned().collect();
        rows.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.team.cmp(&b.team)));
        rows
    }
}

/// Round-robin league over `teams`, every pair meeting `games_per_pair`
/// times, each game a single simulation. The schedule is shuffled with the
/// simulator's random stream.
pub fn run_league<S, D>(
    sim: &mut GameSimulator<S, D>,
    teams: &[TeamSeason],
    games_per_pair: usize,
) -> Result<Vec<Standing>>
where
    S: StatStore,
    D: Derive,
{
    let schedule = round_robin_schedule(teams, games_per_pair, sim.rng_mut());
    let mut league = League::new(teams);
    league.play_schedule(sim, &schedule)?;
    let standings = league.standings();
    if let Some(top) = standings.first() {
        info!(
            "league of {} teams, {} games: {} leads at {}",
            teams.len(),
            schedule.len(),
            top.team,
            top.rating
        );
    }
    Ok(standings)
}
