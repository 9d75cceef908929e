use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{GridironError, Result};
use crate::team::TeamSeason;

/// Per-game (or aggregated) statistics: category name -> stat name -> value.
///
/// Categories follow the box-score groups (`passing`, `rushing`, `pressure`,
/// `conversions`, `penalties`, `scoring`); derivation adds a `summary` group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatTotals(BTreeMap<String, BTreeMap<String, f64>>);

impl StatTotals {
    pub fn new() -> Self {
        StatTotals(BTreeMap::new())
    }

    /// Value of `category.stat`, or 0.0 when absent.
    pub fn get(&self, category: &str, stat: &str) -> f64 {
        self.try_get(category, stat).unwrap_or(0.0)
    }

    pub fn try_get(&self, category: &str, stat: &str) -> Option<f64> {
        self.0.get(category).and_then(|c| c.get(stat)).copied()
    }

    pub fn set(&mut self, category: &str, stat: &str, value: f64) {
        self.0
            .entry(category.to_string())
            .or_default()
            .insert(stat.to_string(), value);
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    /// Add every stat of `other` into this total.
    pub fn accumulate(&mut self, other: &StatTotals) {
        for (category, stats) in &other.0 {
            let target = self.0.entry(category.clone()).or_default();
            for (stat, value) in stats {
                *target.entry(stat.clone()).or_insert(0.0) += value;
            }
        }
    }

    /// Keep only the named categories.
    pub fn restricted_to<'a, I>(&self, categories: I) -> StatTotals
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut out = StatTotals::new();
        for category in categories {
            if let Some(stats) = self.0.get(category) {
                out.0.insert(category.clone(), stats.clone());
            }
        }
        out
    }

    /// `a * wa + b * wb`, stat by stat. A stat missing on one side counts as 0.
    pub fn weighted_sum(a: &StatTotals, wa: f64, b: &StatTotals, wb: f64) -> StatTotals {
        let mut out = StatTotals::new();
        for (category, stats) in &a.0 {
            let target = out.0.entry(category.clone()).or_default();
            for (stat, value) in stats {
                *target.entry(stat.clone()).or_insert(0.0) += value * wa;
            }
        }
        for (category, stats) in &b.0 {
            let target = out.0.entry(category.clone()).or_default();
            for (stat, value) in stats {
                *target.entry(stat.clone()).or_insert(0.0) += value * wb;
            }
        }
        out
    }
}

impl<const N: usize> From<[(&str, &[(&str, f64)]); N]> for StatTotals {
    fn from(groups: [(&str, &[(&str, f64)]); N]) -> Self {
        let mut totals = StatTotals::new();
        for (category, stats) in groups {
            for (stat, value) in stats {
                totals.set(category, stat, *value);
            }
        }
        totals
    }
}

/// Address of one stat inside [`StatTotals`], written `category.stat`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatKey {
    pub category: String,
    pub stat: String,
}

impl StatKey {
    pub fn new(category: impl Into<String>, stat: impl Into<String>) -> Self {
        StatKey {
            category: category.into(),
            stat: stat.into(),
        }
    }

    pub fn read(&self, totals: &StatTotals) -> f64 {
        totals.get(&self.category, &self.stat)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.stat)
    }
}

impl TryFrom<String> for StatKey {
    type Error = GridironError;

    fn try_from(value: String) -> Result<Self> {
        match value.split_once('.') {
            Some((category, stat)) if !category.is_empty() && !stat.is_empty() => {
                Ok(StatKey::new(category, stat))
            }
            _ => Err(GridironError::Configuration(format!(
                "stat key must look like `category.stat`, got {value:?}"
            ))),
        }
    }
}

impl From<StatKey> for String {
    fn from(key: StatKey) -> Self {
        key.to_string()
    }
}

/// One team's box score for one week, plus who it played.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStatLine {
    pub opponent: TeamSeason,
    pub totals: StatTotals,
}

/// Read-only access to ingested per-week records.
pub trait StatStore {
    /// Weeks with a recorded game for `team`, ascending.
    fn weeks(&self, team: &TeamSeason) -> Result<Vec<u32>>;

    fn weekly_record(&self, team: &TeamSeason, week: u32) -> Result<&WeeklyStatLine>;

    fn opponent(&self, team: &TeamSeason, week: u32) -> Result<TeamSeason> {
        Ok(self.weekly_record(team, week)?.opponent.clone())
    }
}

impl<T: StatStore + ?Sized> StatStore for &T {
    fn weeks(&self, team: &TeamSeason) -> Result<Vec<u32>> {
        (**self).weeks(team)
    }

    fn weekly_record(&self, team: &TeamSeason, week: u32) -> Result<&WeeklyStatLine> {
        (**self).weekly_record(team, week)
    }
}

/// In-memory stat store, loadable from JSON of the shape
/// `{"KAN-2023": {"1": {"opponent": "DET-2023", "totals": {...}}}}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStatStore {
    records: HashMap<TeamSeason, BTreeMap<u32, WeeklyStatLine>>,
}

impl MemoryStatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, team: TeamSeason, week: u32, line: WeeklyStatLine) {
        self.records.entry(team).or_default().insert(week, line);
    }
}

impl StatStore for MemoryStatStore {
    fn weeks(&self, team: &TeamSeason) -> Result<Vec<u32>> {
        self.records
            .get(team)
            .map(|weeks| weeks.keys().copied().collect())
            .ok_or_else(|| GridironError::UnknownTeam(team.clone()))
    }

    fn weekly_record(&self, team: &TeamSeason, week: u32) -> Result<&WeeklyStatLine> {
        let weeks = self
            .records
            .get(team)
            .ok_or_else(|| GridironError::UnknownTeam(team.clone()))?;
        weeks.get(&week).ok_or_else(|| GridironError::MissingWeek {
            team: team.clone(),
            week,
        })
    }
}
