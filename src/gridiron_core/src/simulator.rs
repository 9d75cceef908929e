use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SimulationConfig;
use crate::derive::{Derive, StandardDerivation};
use crate::error::Result;
use crate::sampler::{sample_game, SideProfile};
use crate::series::{GameOutcome, SeriesResult, SeriesTally};
use crate::stats::{StatKey, StatStore};
use crate::team::{Side, TeamSeason};

/// Offense and defense profiles for both teams of a matchup.
#[derive(Clone, Debug)]
struct MatchupProfiles {
    a_offense: Arc<SideProfile>,
    a_defense: Arc<SideProfile>,
    b_offense: Arc<SideProfile>,
    b_defense: Arc<SideProfile>,
}

/// Monte Carlo game simulator over historical weekly stat lines.
///
/// Each team-season's offense and defense profile is built the first time
/// the team is simulated and reused for every later game and series run by
/// this instance.
pub struct GameSimulator<S, D = StandardDerivation> {
    store: S,
    deriver: D,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    profiles: HashMap<(TeamSeason, Side), Arc<SideProfile>>,
}

impl<S: StatStore> GameSimulator<S, StandardDerivation> {
    /// Simulator with the standard derivation and default settings.
    pub fn with_seed(store: S, seed: Option<u64>) -> Self {
        let mut config = SimulationConfig::default();
        config.seed = seed;
        GameSimulator::new(store, StandardDerivation, config)
    }
}

impl<S, D> GameSimulator<S, D>
where
    S: StatStore,
    D: Derive,
{
    pub fn new(store: S, deriver: D, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        GameSimulator {
            store,
            deriver,
            config,
            rng,
            profiles: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Reset the random stream to `seed`. Cached profiles are kept.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub(crate) fn cached_profiles(&self) -> usize {
        self.profiles.len()
    }

    fn profile(&mut self, team: &TeamSeason, side: Side) -> Result<Arc<SideProfile>> {
        let key = (team.clone(), side);
        if let Some(profile) = self.profiles.get(&key) {
            return Ok(Arc::clone(profile));
        }
        let profile = Arc::new(SideProfile::build(
            &self.store,
            &self.deriver,
            team,
            side,
            &self.config.score_key,
        )?);
        self.profiles.insert(key, Arc::clone(&profile));
        Ok(profile)
    }

    fn matchup(&mut self, a: &TeamSeason, b: &TeamSeason) -> Result<MatchupProfiles> {
        Ok(MatchupProfiles {
            a_offense: self.profile(a, Side::Offense)?,
            a_defense: self.profile(a, Side::Defense)?,
            b_offense: self.profile(b, Side::Offense)?,
            b_defense: self.profile(b, Side::Defense)?,
        })
    }

    /// Simulate one game between `a` and `b`.
    ///
    /// `a`'s offense is blended with `b`'s defense and vice versa; the two
    /// derived point totals decide the result from `a`'s point of view.
    pub fn simulate_game(&mut self, a: &TeamSeason, b: &TeamSeason) -> Result<GameOutcome> {
        let profiles = self.matchup(a, b)?;
        play_once(&profiles, &self.deriver, &self.config.points_key, &mut self.rng)
    }

    /// Simulate `trials` games and report the majority winner.
    ///
    /// Large series are split into chunks, each seeded from this simulator's
    /// random stream, and run on the rayon pool. The tally for a given seed
    /// does not depend on thread scheduling.
    pub fn simulate_series(
        &mut self,
        a: &TeamSeason,
        b: &TeamSeason,
        trials: usize,
    ) -> Result<SeriesResult> {
        let profiles = self.matchup(a, b)?;
        let points_key = &self.config.points_key;

        let tally = if trials >= self.config.parallel_threshold {
            let chunk = self.config.chunk_size.max(1);
            let work: Vec<(u64, usize)> = (0..trials)
                .step_by(chunk)
                .map(|start| (self.rng.gen::<u64>(), chunk.min(trials - start)))
                .collect();
            let deriver = &self.deriver;
            work.par_iter()
                .map(|&(seed, size)| {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);
                    run_trials(&profiles, deriver, points_key, size, &mut rng)
                })
                .try_reduce(SeriesTally::default, |x, y| Ok(x + y))?
        } else {
            run_trials(&profiles, &self.deriver, points_key, trials, &mut self.rng)?
        };

        let result = SeriesResult::new(a.clone(), b.clone(), tally);
        debug!(
            "{} vs {}: {}-{}-{} over {} trials -> {}",
            a, b, tally.wins, tally.losses, tally.ties, trials, result.winner
        );
        Ok(result)
    }
}

fn run_trials<D: Derive + ?Sized, R: Rng>(
    profiles: &MatchupProfiles,
    deriver: &D,
    points_key: &StatKey,
    trials: usize,
    rng: &mut R,
) -> Result<SeriesTally> {
    let mut tally = SeriesTally::default();
    for _ in 0..trials {
        tally.record(play_once(profiles, deriver, points_key, rng)?);
    }
    Ok(tally)
}

fn play_once<D: Derive + ?Sized, R: Rng>(
    profiles: &MatchupProfiles,
    deriver: &D,
    points_key: &StatKey,
    rng: &mut R,
) -> Result<GameOutcome> {
    let a_game = sample_game(&profiles.a_offense, &profiles.b_defense, rng)?;
    let b_game = sample_game(&profiles.b_offense, &profiles.a_defense, rng)?;
    let a_points = points_key.read(&deriver.derive(&a_game.line));
    let b_points = points_key.read(&deriver.derive(&b_game.line));
    Ok(GameOutcome::from_points(a_points, b_points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridironError;
    use crate::series::SeriesWinner;
    use crate::stats::MemoryStatStore;
    use crate::test_support::{flat_store, league_store, mismatch_store, team};

    fn simulator(store: MemoryStatStore, seed: u64) -> GameSimulator<MemoryStatStore> {
        GameSimulator::with_seed(store, Some(seed))
    }

    #[test]
    fn test_outcome_always_in_range() {
        let mut sim = simulator(league_store(), 1);
        for _ in 0..500 {
            let outcome = sim.simulate_game(&team("KAN"), &team("PHI")).unwrap();
            assert!([-1, 0, 1].contains(&outcome.value()));
        }
    }

    #[test]
    fn test_dominant_team_always_wins() {
        let mut sim = simulator(mismatch_store(8), 2);
        for _ in 0..200 {
            assert_eq!(
                sim.simulate_game(&team("STR"), &team("WEK")).unwrap(),
                GameOutcome::Win
            );
        }
        let result = sim.simulate_series(&team("WEK"), &team("STR"), 500).unwrap();
        assert_eq!(result.winner, SeriesWinner::Team(team("STR")));
        assert_eq!(result.tally.losses, 500);
    }

    #[test]
    fn test_identical_teams_always_tie() {
        let mut sim = simulator(flat_store(3.0, 4), 3);
        let result = sim.simulate_series(&team("FLT"), &team("OPP"), 300).unwrap();
        assert_eq!(result.tally.ties, 300);
        assert_eq!(result.winner, SeriesWinner::Tied);
    }

    #[test]
    fn test_fixed_seed_reproduces_tallies() {
        let mut first = simulator(league_store(), 42);
        let mut second = simulator(league_store(), 42);
        let a = first.simulate_series(&team("BUF"), &team("BAL"), 2_000).unwrap();
        let b = second.simulate_series(&team("BUF"), &team("BAL"), 2_000).unwrap();
        assert_eq!(a.tally, b.tally);
        assert_eq!(a.tally.games(), 2_000);
    }

    #[test]
    fn test_parallel_series_reproducible() {
        let config = SimulationConfig {
            parallel_threshold: 1_000,
            chunk_size: 256,
            ..SimulationConfig::default()
        }
        .with_seed(9);
        let mut first = GameSimulator::new(league_store(), StandardDerivation, config.clone());
        let mut second = GameSimulator::new(league_store(), StandardDerivation, config);

        let a = first.simulate_series(&team("KAN"), &team("SFO"), 10_000).unwrap();
        let b = second.simulate_series(&team("KAN"), &team("SFO"), 10_000).unwrap();
        assert_eq!(a.tally, b.tally);
        assert_eq!(a.tally.games(), 10_000);
    }

    #[test]
    fn test_repeated_games_vary() {
        let mut sim = simulator(league_store(), 77);
        let mut tally = SeriesTally::default();
        for _ in 0..400 {
            tally.record(sim.simulate_game(&team("BUF"), &team("BAL")).unwrap());
        }
        assert!(tally.wins > 0 && tally.losses > 0);
    }

    #[test]
    fn test_profiles_built_once_per_team_side() {
        let mut sim = simulator(league_store(), 5);
        sim.simulate_series(&team("KAN"), &team("DET"), 100).unwrap();
        assert_eq!(sim.cached_profiles(), 4);
        sim.simulate_series(&team("KAN"), &team("BUF"), 100).unwrap();
        assert_eq!(sim.cached_profiles(), 6);
        sim.simulate_game(&team("DET"), &team("BUF")).unwrap();
        assert_eq!(sim.cached_profiles(), 6);
    }

    #[test]
    fn test_unknown_team_errors() {
        let mut sim = simulator(league_store(), 5);
        let err = sim
            .simulate_game(&team("KAN"), &TeamSeason::new("KAN", 1999))
            .unwrap_err();
        assert!(matches!(err, GridironError::UnknownTeam(_)));
    }

    #[test]
    fn test_custom_points_key() {
        let config = SimulationConfig {
            points_key: StatKey::new("scoring", "t_td"),
            ..SimulationConfig::default()
        }
        .with_seed(4);
        let mut sim = GameSimulator::new(mismatch_store(6), StandardDerivation, config);
        let result = sim.simulate_series(&team("STR"), &team("WEK"), 200).unwrap();
        assert_eq!(result.tally.wins, 200);
    }
}
