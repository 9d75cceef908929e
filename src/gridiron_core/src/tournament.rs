use log::{debug, info, warn};
use std::collections::HashMap;

use crate::bracket::Bracket;
use crate::config::BracketConfig;
use crate::derive::Derive;
use crate::error::{GridironError, Result};
use crate::series::{SeriesResult, SeriesWinner};
use crate::simulator::GameSimulator;
use crate::stats::StatStore;
use crate::team::TeamSeason;

/// A series played while driving a bracket.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayedSeries {
    pub round: usize,
    pub index: usize,
    pub result: SeriesResult,
    /// Team recorded as the matchup winner
    pub advanced: TeamSeason,
}

/// Outcome of driving one bracket to completion.
#[derive(Clone, Debug, PartialEq)]
pub struct TournamentRun {
    pub champion: TeamSeason,
    pub series: Vec<PlayedSeries>,
}

/// Resolve every matchup in `bracket` with a `trials`-game series.
///
/// Rounds are played in order. A tied series advances the better seed,
/// and team1 when the seeds are equal.
pub fn play<S, D>(
    bracket: &mut Bracket,
    sim: &mut GameSimulator<S, D>,
    trials: usize,
) -> Result<TournamentRun>
where
    S: StatStore,
    D: Derive,
{
    let mut series = Vec::new();
    for round in 1..=bracket.num_rounds() {
        for index in bracket.ready_matchups(round)? {
            let matchup = &bracket.round(round)?.matchups[index];
            let (team1, team2) = match (&matchup.team1, &matchup.team2) {
                (Some(a), Some(b)) => (a.clone(), b.clone()),
                _ => continue,
            };

            let result = sim.simulate_series(&team1, &team2, trials)?;
            let advanced = match &result.winner {
                SeriesWinner::Team(team) => team.clone(),
                SeriesWinner::Tied => {
                    let better = better_seed(bracket, &team1, &team2)?;
                    warn!(
                        "{} vs {} tied over {} trials, advancing higher seed {}",
                        team1, team2, trials, better
                    );
                    better
                }
            };
            bracket.record_winner(round, index, &advanced)?;
            debug!("round {} matchup {}: {} over {}", round, index, advanced, trials);
            series.push(PlayedSeries {
                round,
                index,
                result,
                advanced,
            });
        }
    }

    let champion = crowned(bracket)?;
    info!("{} wins the bracket after {} series", champion, series.len());
    Ok(TournamentRun { champion, series })
}

fn crowned(bracket: &Bracket) -> Result<TeamSeason> {
    bracket
        .champion()
        .cloned()
        .ok_or_else(|| GridironError::NoChampion(bracket.state()))
}

fn better_seed(bracket: &Bracket, team1: &TeamSeason, team2: &TeamSeason) -> Result<TeamSeason> {
    let seed = |team: &TeamSeason| {
        bracket
            .team_info(team)
            .map(|info| info.seed)
            .ok_or_else(|| GridironError::UnknownTeam(team.clone()))
    };
    if seed(team2)? < seed(team1)? {
        Ok(team2.clone())
    } else {
        Ok(team1.clone())
    }
}

/// Championship frequency per team over `runs` fresh brackets.
///
/// Every run draws from the simulator's random stream, so a seeded
/// simulator gives the same odds each time. Sorted by frequency, highest
/// first; teams that never won are left out.
pub fn champion_odds<S, D>(
    config: &BracketConfig,
    sim: &mut GameSimulator<S, D>,
    runs: usize,
    trials: usize,
) -> Result<Vec<(TeamSeason, f64)>>
where
    S: StatStore,
    D: Derive,
{
    if runs == 0 {
        return Err(GridironError::Configuration(
            "champion_odds needs at least one run".to_string(),
        ));
    }
    let template = Bracket::build(config)?;
    let mut titles: HashMap<TeamSeason, usize> = HashMap::new();
    for _ in 0..runs {
        let mut bracket = template.clone();
        let run = play(&mut bracket, sim, trials)?;
        *titles.entry(run.champion).or_insert(0) += 1;
    }

    let mut odds: Vec<(TeamSeason, f64)> = titles
        .into_iter()
        .map(|(team, count)| (team, count as f64 / runs as f64))
        .collect();
    odds.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(odds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::BracketState;
    use crate::config::{ConferenceRoster, SeedEntry};
    use crate::stats::MemoryStatStore;
    use crate::test_support::{flat_store, league_store, mismatch_store, team, LEAGUE_YEAR};

    fn head_to_head(top: &str, bottom: &str) -> BracketConfig {
        BracketConfig::new(
            vec![
                ConferenceRoster::new("AFC", vec![SeedEntry::new(top, 1, LEAGUE_YEAR)]),
                ConferenceRoster::new("NFC", vec![SeedEntry::new(bottom, 2, LEAGUE_YEAR)]),
            ],
            [("AFC".to_string(), 0), ("NFC".to_string(), 0)].into_iter().collect(),
        )
    }

    fn league_bracket() -> BracketConfig {
        let roster = |name: &str, codes: [&str; 3]| {
            ConferenceRoster::new(
                name,
                codes
                    .iter()
                    .enumerate()
                    .map(|(i, code)| SeedEntry::new(*code, i as u32 + 1, LEAGUE_YEAR))
                    .collect(),
            )
        };
        BracketConfig::new(
            vec![
                roster("AFC", ["KAN", "BUF", "SFO"]),
                roster("NFC", ["DET", "BAL", "PHI"]),
            ],
            [("AFC".to_string(), 1), ("NFC".to_string(), 1)].into_iter().collect(),
        )
    }

    fn simulator(store: MemoryStatStore, seed: u64) -> GameSimulator<MemoryStatStore> {
        GameSimulator::with_seed(store, Some(seed))
    }

    #[test]
    fn test_unplayed_bracket_has_no_champion() {
        let bracket = Bracket::build(&league_bracket()).unwrap();
        let err = crowned(&bracket).unwrap_err();
        assert!(matches!(err, GridironError::NoChampion(BracketState::Built)));
        assert!(err.to_string().contains("no champion"));
    }

    #[test]
    fn test_play_completes_bracket() {
        let mut bracket = Bracket::build(&league_bracket()).unwrap();
        let mut sim = simulator(league_store(), 11);
        let run = play(&mut bracket, &mut sim, 200).unwrap();

        assert_eq!(bracket.state(), BracketState::Complete);
        assert_eq!(bracket.champion(), Some(&run.champion));
        // 2 wildcard games, 2 conference finals, 1 championship
        assert_eq!(run.series.len(), 5);
        assert!(run.series.windows(2).all(|w| w[0].round <= w[1].round));
    }

    #[test]
    fn test_dominant_team_takes_the_title() {
        let mut bracket = Bracket::build(&head_to_head("WEK", "STR")).unwrap();
        let mut sim = simulator(mismatch_store(8), 3);
        let run = play(&mut bracket, &mut sim, 200).unwrap();
        assert_eq!(run.champion, team("STR"));
        assert_eq!(run.series[0].result.tally.losses, 200);
    }

    #[test]
    fn test_tied_series_advances_better_seed() {
        let mut bracket = Bracket::build(&head_to_head("OPP", "FLT")).unwrap();
        let mut sim = simulator(flat_store(3.0, 4), 8);
        let run = play(&mut bracket, &mut sim, 100).unwrap();
        assert_eq!(run.series[0].result.winner, SeriesWinner::Tied);
        assert_eq!(run.champion, team("OPP"));
    }

    #[test]
    fn test_unknown_team_surfaces() {
        let mut bracket = Bracket::build(&head_to_head("KAN", "XXX")).unwrap();
        let mut sim = simulator(league_store(), 1);
        assert!(matches!(
            play(&mut bracket, &mut sim, 10),
            Err(GridironError::UnknownTeam(_))
        ));
    }

    #[test]
    fn test_champion_odds_sum_to_one() {
        let mut sim = simulator(league_store(), 21);
        let odds = champion_odds(&league_bracket(), &mut sim, 20, 50).unwrap();
        let total: f64 = odds.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(odds.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_champion_odds_reproducible() {
        let first = champion_odds(&league_bracket(), &mut simulator(league_store(), 4), 10, 30).unwrap();
        let second = champion_odds(&league_bracket(), &mut simulator(league_store(), 4), 10, 30).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_champion_odds_for_mismatch() {
        let mut sim = simulator(mismatch_store(6), 2);
        let odds = champion_odds(&head_to_head("WEK", "STR"), &mut sim, 5, 40).unwrap();
        assert_eq!(odds, vec![(team("STR"), 1.0)]);
        assert!(champion_odds(&head_to_head("WEK", "STR"), &mut sim, 0, 40).is_err());
    }
}
