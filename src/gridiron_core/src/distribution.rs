use log::warn;
use std::collections::BTreeMap;

use crate::constants::BIN_WIDTH_IQR_FACTOR;

/// One histogram bin of an empirical distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct Bin {
    /// Position of the bin on the `lower + i * width` grid
    pub index: usize,
    /// Upper edge of the bin
    pub upper: f64,
    /// Fraction of all samples falling in this bin or any lower one
    pub cumulative: f64,
    /// Weeks whose score landed in this bin, in input order
    pub weeks: Vec<u32>,
}

/// Binned empirical distribution of one side's per-week scores.
///
/// Bin width follows the Freedman-Diaconis rule, so the bin count adapts to
/// both the spread and the size of the sample. Empty grid cells are not
/// stored, so there are never more bins than samples. Built once, then only
/// read.
#[derive(Clone, Debug, PartialEq)]
pub struct EmpiricalDistribution {
    lower: f64,
    width: f64,
    bins: Vec<Bin>,
}

impl EmpiricalDistribution {
    /// Build from `(week, score)` samples.
    ///
    /// A sample whose scores are all equal (or whose interquartile range is
    /// zero) collapses to a single bin with cumulative fraction 1.0. An empty
    /// sample yields an empty distribution that never produces a draw.
    /// Non-finite scores are skipped.
    pub fn build(samples: &[(u32, f64)]) -> Self {
        let finite: Vec<(u32, f64)> = samples
            .iter()
            .copied()
            .filter(|(_, score)| score.is_finite())
            .collect();
        if finite.len() != samples.len() {
            warn!(
                "skipping {} non-finite scores while building distribution",
                samples.len() - finite.len()
            );
        }

        if finite.is_empty() {
            return EmpiricalDistribution {
                lower: 0.0,
                width: 0.0,
                bins: Vec::new(),
            };
        }

        let mut sorted: Vec<f64> = finite.iter().map(|(_, s)| *s).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let lower = sorted[0];
        let upper = sorted[n - 1];

        let width = freedman_diaconis_width(&sorted);
        let binned = width > 0.0 && width.is_finite() && upper > lower;
        let last = if binned {
            ((upper - lower) / width).ceil().max(1.0) - 1.0
        } else {
            0.0
        };

        // Only occupied grid cells are stored; a tiny width over a wide span
        // can describe far more cells than there are samples.
        let mut members: BTreeMap<usize, Vec<u32>> = BTreeMap::new();
        for &(week, score) in &finite {
            let idx = if binned {
                ((score - lower) / width).floor().min(last) as usize
            } else {
                0
            };
            members.entry(idx).or_default().push(week);
        }

        let top = members.keys().next_back().copied().unwrap_or(0);
        let mut running = 0usize;
        let bins = members
            .into_iter()
            .map(|(index, weeks)| {
                running += weeks.len();
                let edge = if index == top {
                    upper
                } else {
                    lower + (index + 1) as f64 * width
                };
                Bin {
                    index,
                    upper: edge,
                    cumulative: running as f64 / n as f64,
                    weeks,
                }
            })
            .collect();

        EmpiricalDistribution {
            lower,
            width: if binned { width } else { upper - lower },
            bins,
        }
    }

    /// Occupied bins in ascending order.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Number of occupied bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True only for a distribution built from no finite scores.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Smallest sampled score; the grid starts here.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Bin width, or the full span when everything is in one bin.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Index of the first bin whose cumulative fraction reaches `fraction`.
    ///
    /// A fraction landing exactly on a boundary resolves to the lower bin.
    /// The located bin always has at least one week.
    pub fn locate(&self, fraction: f64) -> Option<usize> {
        if self.bins.is_empty() {
            return None;
        }
        let idx = self.bins.partition_point(|bin| bin.cumulative < fraction);
        Some(idx.min(self.bins.len() - 1))
    }
}

/// `2 * IQR * n^(-1/3)`
pub fn freedman_diaconis_width(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let iqr = percentile(sorted, 75.0) - percentile(sorted, 25.0);
    BIN_WIDTH_IQR_FACTOR * iqr * (sorted.len() as f64).powf(-1.0 / 3.0)
}

/// Percentile of already sorted data with linear interpolation between
/// closest ranks.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}
