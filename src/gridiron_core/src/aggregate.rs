use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::derive::Derive;
use crate::error::{GridironError, Result};
use crate::stats::{StatStore, StatTotals};
use crate::team::{Side, TeamSeason};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSelection {
    #[default]
    Both,
    OffenseOnly,
    DefenseOnly,
}

impl SideSelection {
    fn sides(self) -> &'static [Side] {
        match self {
            SideSelection::Both => &[Side::Offense, Side::Defense],
            SideSelection::OffenseOnly => &[Side::Offense],
            SideSelection::DefenseOnly => &[Side::Defense],
        }
    }
}

/// Which weeks of a season to include.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekFilter {
    #[default]
    All,
    /// Inclusive on both ends
    Range { start: u32, end: u32 },
    Set(BTreeSet<u32>),
}

impl WeekFilter {
    /// Weeks the filter explicitly asks for. `None` for `All`.
    fn requested(&self) -> Result<Option<BTreeSet<u32>>> {
        match self {
            WeekFilter::All => Ok(None),
            WeekFilter::Range { start, end } => {
                if start > end {
                    return Err(GridironError::Configuration(format!(
                        "Week range start {} is after end {}",
                        start, end
                    )));
                }
                Ok(Some((*start..=*end).collect()))
            }
            WeekFilter::Set(weeks) => Ok(Some(weeks.clone())),
        }
    }
}

/// Stat aggregation request: sides, weeks, and an optional category subset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatQuery {
    pub sides: SideSelection,
    pub weeks: WeekFilter,
    pub categories: Option<BTreeSet<String>>,
}

impl StatQuery {
    pub fn sides(mut self, sides: SideSelection) -> Self {
        self.sides = sides;
        self
    }

    pub fn weeks(mut self, weeks: WeekFilter) -> Self {
        self.weeks = weeks;
        self
    }

    pub fn categories<I, C>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }
}

/// Summed and derived totals for one team-season.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SideTotals {
    pub team: TeamSeason,
    pub weeks: Vec<u32>,
    pub offense: Option<StatTotals>,
    pub defense: Option<StatTotals>,
}

impl SideTotals {
    pub fn side(&self, side: Side) -> Option<&StatTotals> {
        match side {
            Side::Offense => self.offense.as_ref(),
            Side::Defense => self.defense.as_ref(),
        }
    }
}

/// Sum `team`'s weekly lines over the query's weeks and derive the result.
///
/// Offense sums the team's own lines; defense sums what its opponents
/// produced against it. Asking for weeks the team has no record of is a
/// `DataGap`, distinct from a team with no games at all.
pub fn aggregate_side_totals<S, D>(
    store: &S,
    deriver: &D,
    team: &TeamSeason,
    query: &StatQuery,
) -> Result<SideTotals>
where
    S: StatStore + ?Sized,
    D: Derive + ?Sized,
{
    let played = store.weeks(team)?;
    if played.is_empty() {
        return Err(GridironError::NoGames(team.clone()));
    }

    let weeks: Vec<u32> = match query.weeks.requested()? {
        None => played,
        Some(requested) => {
            let missing: Vec<u32> = requested
                .iter()
                .copied()
                .filter(|w| !played.contains(w))
                .collect();
            if !missing.is_empty() {
                return Err(GridironError::DataGap {
                    team: team.clone(),
                    missing,
                });
            }
            requested.into_iter().collect()
        }
    };

    let mut offense = None;
    let mut defense = None;
    for &side in query.sides.sides() {
        let mut sum = StatTotals::new();
        for &week in &weeks {
            let record = store.weekly_record(team, week)?;
            let line = match side {
                Side::Offense => &record.totals,
                Side::Defense => &store.weekly_record(&record.opponent, week)?.totals,
            };
            match &query.categories {
                Some(categories) => sum.accumulate(&line.restricted_to(categories)),
                None => sum.accumulate(line),
            }
        }
        let derived = deriver.derive(&sum);
        match side {
            Side::Offense => offense = Some(derived),
            Side::Defense => defense = Some(derived),
        }
    }

    Ok(SideTotals {
        team: team.clone(),
        weeks,
        offense,
        defense,
    })
}
