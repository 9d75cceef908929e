//! Synthetic stat stores shared by the unit tests.

use crate::stats::{MemoryStatStore, StatTotals, WeeklyStatLine};
use crate::team::TeamSeason;

pub const LEAGUE_YEAR: i32 = 2023;
pub const LEAGUE: [&str; 6] = ["KAN", "DET", "BUF", "BAL", "SFO", "PHI"];
const STRENGTH: [f64; 6] = [4.0, 3.5, 3.0, 2.5, 2.0, 1.5];

pub fn team(code: &str) -> TeamSeason {
    TeamSeason::new(code, LEAGUE_YEAR)
}

/// Box score whose point total grows with `tds` and `fgs`.
pub fn box_score(tds: f64, fgs: f64, pass_yds: f64, rush_yds: f64) -> StatTotals {
    StatTotals::from([
        (
            "passing",
            &[
                ("cmp", 20.0),
                ("p_att", 32.0),
                ("p_yds", pass_yds),
                ("p_td", (tds / 2.0).floor()),
                ("int", 1.0),
                ("p_1d", pass_yds / 15.0),
            ][..],
        ),
        (
            "rushing",
            &[
                ("r_att", 26.0),
                ("r_yds", rush_yds),
                ("r_td", tds - (tds / 2.0).floor()),
                ("fum", 0.0),
                ("r_1d", rush_yds / 12.0),
            ][..],
        ),
        (
            "scoring",
            &[("t_td", tds), ("xpm", tds), ("fgm", fgs), ("2pm", 0.0), ("sfty", 0.0)][..],
        ),
    ])
}

/// Circle-method pairings for an even number of teams.
fn pairings(n: usize, round: usize) -> Vec<(usize, usize)> {
    let mut ring: Vec<usize> = (1..n).collect();
    ring.rotate_left(round % (n - 1));
    let mut order = vec![0];
    order.extend(ring);
    (0..n / 2).map(|i| (order[i], order[n - 1 - i])).collect()
}

/// Six-team, ten-week league with a clear strength ordering (KAN strongest).
pub fn league_store() -> MemoryStatStore {
    let mut store = MemoryStatStore::new();
    for week in 1..=10u32 {
        for (home, away) in pairings(LEAGUE.len(), week as usize) {
            for (me, them) in [(home, away), (away, home)] {
                let wobble = ((me * 7 + week as usize * 13) % 11) as f64 / 5.0;
                let tds = (STRENGTH[me] + wobble - 1.0).round().max(0.0);
                let fgs = ((me + week as usize) % 4) as f64;
                let line = box_score(
                    tds,
                    fgs,
                    170.0 + 25.0 * STRENGTH[me] + 10.0 * wobble,
                    80.0 + 10.0 * STRENGTH[me] + 5.0 * wobble,
                );
                store.insert(
                    team(LEAGUE[me]),
                    week,
                    WeeklyStatLine {
                        opponent: team(LEAGUE[them]),
                        totals: line,
                    },
                );
            }
        }
    }
    store
}

/// `STR` and `WEK` play each other every week; `STR` always outscores `WEK`
/// by a wide margin.
pub fn mismatch_store(weeks: u32) -> MemoryStatStore {
    let mut store = MemoryStatStore::new();
    for week in 1..=weeks {
        let wobble = (week % 3) as f64;
        store.insert(
            team("STR"),
            week,
            WeeklyStatLine {
                opponent: team("WEK"),
                totals: box_score(5.0 + wobble, 2.0, 320.0, 150.0),
            },
        );
        store.insert(
            team("WEK"),
            week,
            WeeklyStatLine {
                opponent: team("STR"),
                totals: box_score(wobble * 0.5, 1.0, 150.0, 60.0),
            },
        );
    }
    store
}

/// `FLT` and `OPP` with identical lines every week.
pub fn flat_store(tds: f64, weeks: u32) -> MemoryStatStore {
    let mut store = MemoryStatStore::new();
    for week in 1..=weeks {
        for (me, them) in [("FLT", "OPP"), ("OPP", "FLT")] {
            store.insert(
                team(me),
                week,
                WeeklyStatLine {
                    opponent: team(them),
                    totals: box_score(tds, 0.0, 200.0, 100.0),
                },
            );
        }
    }
    store
}
