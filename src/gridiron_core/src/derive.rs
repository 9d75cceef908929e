use crate::constants::{PASSER_RATING_COMPONENT_CAP, SUMMARY_CATEGORY};
use crate::stats::StatTotals;

/// Turns raw stat totals into augmented totals (percentages, ratings,
/// fantasy points, points scored).
///
/// Implementations must be pure: the simulator calls this from worker
/// threads on blended, fractional stat lines.
pub trait Derive: Send + Sync {
    fn derive(&self, raw: &StatTotals) -> StatTotals;
}

impl<F> Derive for F
where
    F: Fn(&StatTotals) -> StatTotals + Send + Sync,
{
    fn derive(&self, raw: &StatTotals) -> StatTotals {
        self(raw)
    }
}

/// Football box-score derivation.
///
/// Adds per-category rates next to the raw stats and a `summary` category
/// with `fantasy_points` (sum of every category's contribution) and `pts`
/// (points scored, from the `scoring` category).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDerivation;

impl Derive for StandardDerivation {
    fn derive(&self, raw: &StatTotals) -> StatTotals {
        let mut out = raw.clone();
        let mut fantasy = 0.0;

        if raw.has_category("passing") {
            let att = raw.get("passing", "p_att");
            let cmp = raw.get("passing", "cmp");
            let yds = raw.get("passing", "p_yds");
            let td = raw.get("passing", "p_td");
            let int = raw.get("passing", "int");
            let first_downs = raw.get("passing", "p_1d");
            out.set("passing", "cmp%", pct(cmp, att));
            out.set("passing", "p_y/a", per_att(yds, att));
            out.set("passing", "p_td%", pct(td, att));
            out.set("passing", "p_int%", pct(int, att));
            out.set("passing", "p_1d%", pct(first_downs, att));
            out.set("passing", "rate", passer_rating(cmp, att, yds, td, int));
            fantasy += yds * 0.05 + td * 6.0 - int * 6.0 + first_downs * 0.5;
        }

        if raw.has_category("rushing") {
            let att = raw.get("rushing", "r_att");
            let yds = raw.get("rushing", "r_yds");
            let td = raw.get("rushing", "r_td");
            let fum = raw.get("rushing", "fum");
            let first_downs = raw.get("rushing", "r_1d");
            out.set("rushing", "r_y/a", per_att(yds, att));
            out.set("rushing", "r_td%", pct(td, att));
            out.set("rushing", "fum%", pct(fum, att));
            out.set("rushing", "r_1d%", pct(first_downs, att));
            fantasy += yds * 0.1 + td * 6.0 - fum * 6.0 + first_downs * 0.5;
        }

        if raw.has_category("pressure") {
            let sacks = raw.get("pressure", "sk");
            let sack_yds = raw.get("pressure", "s_yds");
            out.set("pressure", "y/s", per_att(sack_yds, sacks));
            out.set("pressure", "sk%", pct(sacks, raw.get("passing", "p_att")));
            fantasy += sacks * -2.0 + sack_yds * -0.05;
        }

        if raw.has_category("conversions") {
            let third_conv = raw.get("conversions", "3dc");
            let fourth_conv = raw.get("conversions", "4dc");
            out.set("conversions", "3d%", pct(third_conv, raw.get("conversions", "3da")));
            out.set("conversions", "4d%", pct(fourth_conv, raw.get("conversions", "4da")));
            fantasy += third_conv * 0.2 + fourth_conv * 2.0;
        }

        if raw.has_category("penalties") {
            fantasy += raw.get("penalties", "pen") * -0.5
                + raw.get("penalties", "yds") * -0.01
                + raw.get("penalties", "pen_1d") * 0.25;
        }

        if raw.has_category("scoring") {
            out.set(SUMMARY_CATEGORY, "pts", points_scored(raw));
        }
        out.set(SUMMARY_CATEGORY, "fantasy_points", fantasy);

        out
    }
}

/// Percentage, 0 when the denominator is 0.
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator * 100.0
}

/// Rate per attempt, 0 when there were no attempts.
pub fn per_att(stat: f64, att: f64) -> f64 {
    if att == 0.0 {
        return 0.0;
    }
    stat / att
}

/// NFL-style passer rating.
///
/// The touchdown component is floored at the cap, not capped.
pub fn passer_rating(cmp: f64, att: f64, yds: f64, td: f64, int: f64) -> f64 {
    if att == 0.0 {
        return 0.0;
    }
    let cap = PASSER_RATING_COMPONENT_CAP;
    let a = ((cmp / att * 100.0) - 30.0) * 0.05;
    let b = ((yds / att) - 3.0) * 0.25;
    let c = (td / att * 100.0) * 0.2;
    let d = cap - ((int / att * 100.0) * 0.25);

    let a = a.min(cap).max(0.0);
    let b = b.min(cap).max(0.0);
    let c = c.max(cap);
    let d = d.max(0.0);

    ((a + b + c + d) / 6.0) * 100.0
}

/// Points from the `scoring` category.
pub fn points_scored(raw: &StatTotals) -> f64 {
    raw.get("scoring", "t_td") * 6.0
        + raw.get("scoring", "xpm")
        + raw.get("scoring", "fgm") * 3.0
        + raw.get("scoring", "2pm") * 2.0
        + raw.get("scoring", "sfty") * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_guards_zero() {
        assert_eq!(pct(3.0, 0.0), 0.0);
        assert!((pct(1.0, 4.0) - 25.0).abs() < 1e-10);
        assert_eq!(per_att(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_points_scored() {
        let raw = StatTotals::from([(
            "scoring",
            &[("t_td", 3.0), ("xpm", 2.0), ("fgm", 2.0), ("2pm", 1.0), ("sfty", 1.0)][..],
        )]);
        // 18 + 2 + 6 + 2 + 2
        assert!((points_scored(&raw) - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_passer_rating_touchdown_floor() {
        // zero touchdowns still contributes the full touchdown component
        let rating = passer_rating(20.0, 30.0, 250.0, 0.0, 0.0);
        let a: f64 = ((20.0 / 30.0 * 100.0) - 30.0) * 0.05;
        let b: f64 = ((250.0 / 30.0) - 3.0) * 0.25;
        let expected = ((a.min(2.375) + b.min(2.375) + 2.375 + 2.375) / 6.0) * 100.0;
        assert!((rating - expected).abs() < 1e-9);
    }

    #[test]
    fn test_standard_derivation_adds_summary() {
        let raw = StatTotals::from([
            (
                "passing",
                &[("cmp", 20.0), ("p_att", 30.0), ("p_yds", 200.0), ("p_td", 2.0), ("int", 1.0), ("p_1d", 10.0)][..],
            ),
            ("rushing", &[("r_att", 25.0), ("r_yds", 100.0), ("r_td", 1.0), ("fum", 0.0), ("r_1d", 6.0)][..]),
            ("scoring", &[("t_td", 3.0), ("xpm", 3.0), ("fgm", 1.0)][..]),
        ]);
        let derived = StandardDerivation.derive(&raw);

        assert!((derived.get("passing", "cmp%") - 200.0 / 3.0).abs() < 1e-9);
        assert!((derived.get("rushing", "r_y/a") - 4.0).abs() < 1e-9);
        assert!((derived.get(SUMMARY_CATEGORY, "pts") - 24.0).abs() < 1e-9);

        // passing: 10 + 12 - 6 + 5 = 21, rushing: 10 + 6 + 0 + 3 = 19
        assert!((derived.get(SUMMARY_CATEGORY, "fantasy_points") - 40.0).abs() < 1e-9);
        // raw stats are kept
        assert_eq!(derived.get("passing", "p_yds"), 200.0);
    }

    #[test]
    fn test_closure_derivation() {
        let double_td = |raw: &StatTotals| {
            let mut out = raw.clone();
            out.set("summary", "pts", raw.get("scoring", "t_td") * 2.0);
            out
        };
        let raw = StatTotals::from([("scoring", &[("t_td", 4.0)][..])]);
        assert_eq!(double_td.derive(&raw).get("summary", "pts"), 8.0);
    }
}
