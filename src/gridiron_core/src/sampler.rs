use log::debug;
use rand::Rng;
use std::collections::BTreeMap;

use crate::derive::Derive;
use crate::distribution::EmpiricalDistribution;
use crate::error::{GridironError, Result};
use crate::stats::{StatKey, StatStore, StatTotals};
use crate::team::{Side, TeamSeason};

/// One side of the ball for one team-season: its weekly raw lines and the
/// empirical distribution of their scores.
///
/// For `Side::Offense` the weekly line is what the team produced; for
/// `Side::Defense` it is what the opponent produced against it that week.
#[derive(Clone, Debug)]
pub struct SideProfile {
    pub team: TeamSeason,
    pub side: Side,
    pub distribution: EmpiricalDistribution,
    lines: BTreeMap<u32, StatTotals>,
}

/// A historical week drawn from a profile.
#[derive(Clone, Copy, Debug)]
pub struct Draw<'a> {
    pub week: u32,
    /// Cumulative fraction of the bin the week was drawn from
    pub cumulative: f64,
    pub line: &'a StatTotals,
}

/// Blend of one offensive week and one defensive week.
#[derive(Clone, Debug)]
pub struct SyntheticGame {
    pub offense_week: u32,
    pub defense_week: u32,
    pub offense_weight: f64,
    pub defense_weight: f64,
    pub line: StatTotals,
}

impl SideProfile {
    /// Collect a team's weekly lines for `side` and bin them by `score_key`
    /// after derivation.
    pub fn build<S, D>(
        store: &S,
        deriver: &D,
        team: &TeamSeason,
        side: Side,
        score_key: &StatKey,
    ) -> Result<Self>
    where
        S: StatStore + ?Sized,
        D: Derive + ?Sized,
    {
        let weeks = store.weeks(team)?;
        if weeks.is_empty() {
            return Err(GridironError::NoGames(team.clone()));
        }

        let mut lines = BTreeMap::new();
        let mut samples = Vec::with_capacity(weeks.len());
        for week in weeks {
            let record = store.weekly_record(team, week)?;
            let line = match side {
                Side::Offense => record.totals.clone(),
                Side::Defense => store.weekly_record(&record.opponent, week)?.totals.clone(),
            };
            samples.push((week, score_key.read(&deriver.derive(&line))));
            lines.insert(week, line);
        }

        let distribution = EmpiricalDistribution::build(&samples);
        debug!(
            "built {} profile for {}: {} weeks in {} bins",
            side,
            team,
            samples.len(),
            distribution.len()
        );

        Ok(SideProfile {
            team: team.clone(),
            side,
            distribution,
            lines,
        })
    }

    pub fn line(&self, week: u32) -> Option<&StatTotals> {
        self.lines.get(&week)
    }

    /// Draw a week from the bin located by `fraction`, uniformly among the
    /// bin's weeks.
    pub fn draw_at<R: Rng>(&self, fraction: f64, rng: &mut R) -> Option<Draw<'_>> {
        let bin = &self.distribution.bins()[self.distribution.locate(fraction)?];
        let week = bin.weeks[rng.gen_range(0..bin.weeks.len())];
        Some(Draw {
            week,
            cumulative: bin.cumulative,
            line: self.lines.get(&week)?,
        })
    }
}

/// Offensive draw: the uniform fraction is used as is.
pub fn draw_offense<'a, R: Rng>(profile: &'a SideProfile, rng: &mut R) -> Option<Draw<'a>> {
    let fraction: f64 = rng.gen();
    profile.draw_at(fraction, rng)
}

/// Defensive draw: the fraction is mirrored (`1 - u`), since a defense's
/// strength runs opposite to an offense's.
pub fn draw_defense<'a, R: Rng>(profile: &'a SideProfile, rng: &mut R) -> Option<Draw<'a>> {
    let fraction = 1.0 - rng.gen::<f64>();
    profile.draw_at(fraction, rng)
}

/// Weighted blend of the two draws, weights proportional to each draw's
/// cumulative fraction and normalized to sum to 1.
pub fn blend(offense: &Draw<'_>, defense: &Draw<'_>) -> SyntheticGame {
    let total = offense.cumulative + defense.cumulative;
    let (offense_weight, defense_weight) = if total > 0.0 {
        (offense.cumulative / total, defense.cumulative / total)
    } else {
        (0.5, 0.5)
    };
    SyntheticGame {
        offense_week: offense.week,
        defense_week: defense.week,
        offense_weight,
        defense_weight,
        line: StatTotals::weighted_sum(offense.line, offense_weight, defense.line, defense_weight),
    }
}

/// Build one synthetic game for `offense` playing against `defense`.
pub fn sample_game<R: Rng>(
    offense: &SideProfile,
    defense: &SideProfile,
    rng: &mut R,
) -> Result<SyntheticGame> {
    let off = draw_offense(offense, rng).ok_or_else(|| GridironError::NoGames(offense.team.clone()))?;
    let def = draw_defense(defense, rng).ok_or_else(|| GridironError::NoGames(defense.team.clone()))?;
    Ok(blend(&off, &def))
}
