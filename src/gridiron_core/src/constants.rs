/// Default number of simulated games used to decide a series
pub const DEFAULT_TRIALS: usize = 10_000;

/// Series at or above this trial count are split across rayon workers
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4_096;

/// Trials handled by one worker chunk in a parallel series
pub const DEFAULT_CHUNK_SIZE: usize = 1_024;

/// Earliest season accepted in a bracket roster
pub const MIN_SEASON_YEAR: i32 = 1920;

/// Freedman-Diaconis multiplier applied to the interquartile range
pub const BIN_WIDTH_IQR_FACTOR: f64 = 2.0;

/// Category holding the summary fields added by derivation
pub const SUMMARY_CATEGORY: &str = "summary";

/// Default stat used as the resampling key for each side of the ball
pub const DEFAULT_SCORE_STAT: &str = "fantasy_points";

/// Default stat compared to decide a simulated game
pub const DEFAULT_POINTS_STAT: &str = "pts";

/// Elo K-factor for league simulations
pub const ELO_K_FACTOR: f64 = 45.0;

/// Starting Elo rating for a team entering a league simulation
pub const ELO_BASELINE: f64 = 1500.0;

/// Passer rating component cap
pub const PASSER_RATING_COMPONENT_CAP: f64 = 2.375;
