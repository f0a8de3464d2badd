use rand::seq::SliceRandom;
use rand::Rng;

use crate::score::{Bounds, Score};
use crate::settings::SettingsDocument;
use crate::weights::WeightTable;

// Item locations that are not potted.
const NON_DUNGEON: u32 = 93;
const DUNGEON: u32 = 8 + 6 + 6 + 6 + 2 + 14 + 10 + 8 + 8 + 8 + 8 + 12 + 27;
const KEY_DROPS: u32 = 13;
const SHOP_SLOTS: u32 = 32;
const TAKE_ANY_CAVES: u32 = 9;

// Pots.
const POT_KEYS: u32 = 19;
const POT_CAVE: u32 = 144;
const POT_DUNGEON: u32 = 38 + 52 + 50 + 37 + 27 + 39 + 61 + 83 + 46 + 55 + 40 + 51 + 93 - 13;

// Items that have to be placed before any triforce pieces.
const INVENTORY: u32 = 41;
const MAPS_AND_COMPASSES: u32 = 24;
const BIG_KEYS: u32 = 11;
const SMALL_KEYS: u32 = 29;
const BOSS_HEARTS: u32 = 11;
const SHOP_UPGRADES: u32 = 2 + 3;
const RETRO_ARROWS: u32 = 3;

/// Baseline the `tfh_goal` fractions are expressed against.
const GOAL_BASE_POOL: f64 = 216.0;
const MIN_SPARE_LOCATIONS: i64 = 50;
const MAX_POOL_SHARE: f64 = 0.8;

pub const DEFAULT_TRIALS: usize = 500;

fn pottery_locations(pottery: Option<&str>) -> u32 {
    match pottery.unwrap_or("none") {
        "keys" => POT_KEYS,
        "cave" => POT_CAVE,
        "dungeon" => POT_DUNGEON,
        "cavekeys" => POT_CAVE + POT_KEYS,
        "lottery" => POT_DUNGEON + POT_CAVE,
        "reduced" | "clustered" => POT_CAVE + POT_DUNGEON / 4,
        "reduced_dungeon" => POT_DUNGEON / 4,
        "clustered_dungeon" => POT_DUNGEON / 2,
        "nonempty" => (POT_DUNGEON + POT_CAVE) * 9 / 10,
        "nonempty_dungeon" => POT_DUNGEON * 9 / 10,
        _ => 0,
    }
}

/// Total number of item locations for the drawn settings.
pub fn pool_size(settings: &SettingsDocument) -> u32 {
    let mut size = NON_DUNGEON + DUNGEON;
    size += pottery_locations(settings.text("pottery"));
    if settings.is_on("shopsanity") {
        size += SHOP_SLOTS;
    }
    if settings.is_on("dropshuffle") {
        size += KEY_DROPS;
    }
    if !settings.is("take_any", "none") {
        size += TAKE_ANY_CAVES;
    }
    size
}

/// Locations already claimed by items that are always in the pool.
pub fn mandatory_pool_size(settings: &SettingsDocument) -> u32 {
    let mut size = INVENTORY + MAPS_AND_COMPASSES + BIG_KEYS + SMALL_KEYS + BOSS_HEARTS;
    if settings.is_on("shopsanity") {
        size += SHOP_UPGRADES;
    }
    if settings.is_on("dropshuffle") {
        size += KEY_DROPS;
    }
    if !settings.is("take_any", "none") {
        size += TAKE_ANY_CAVES;
    }
    if settings.is_any("bow_mode", &["retro", "retro_silvers"]) {
        size += RETRO_ARROWS;
    }
    if !settings.is_any("pottery", &["none", "cave"]) {
        size += POT_KEYS;
    }
    size
}

/// How many locations a player clears per minute. Larger pools are mostly
/// pots and shops, which go quicker; entrance and door shuffle slow things
/// down.
pub fn checks_per_minute(total: u32, settings: &SettingsDocument) -> f64 {
    let mut cpm = match total {
        0..=299 => 1.67,
        300..=499 => 3.33,
        500..=999 => 4.0,
        _ => 5.33,
    };
    if !settings.is("shuffle", "vanilla") {
        cpm *= 0.85;
    }
    if !settings.is("door_shuffle", "vanilla") {
        cpm *= 0.8;
    }
    cpm
}

/// Summary of simulated completion times, in minutes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Timing {
    pub mean: f64,
    pub std_dev: f64,
}

impl Timing {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let var = samples.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std_dev: var.sqrt(),
        }
    }

    pub fn length_points(&self) -> f64 {
        ((self.mean - 100.0) / 10.0).trunc() - 2.0
    }

    pub fn variance_points(&self) -> f64 {
        ((self.std_dev - 3.0) * 2.0).trunc() + 1.0
    }
}

/// Number of checks until `goal` tokens have been found.
fn scan(bag: &[bool], goal: usize) -> usize {
    if goal == 0 {
        return 0;
    }
    let mut found = 0;
    for (i, &is_piece) in bag.iter().enumerate() {
        if is_piece {
            found += 1;
            if found == goal {
                return i + 1;
            }
        }
    }
    bag.len()
}

/// Monte Carlo estimate of how long collecting `goal` of `pool` pieces
/// scattered over `total` locations takes.
pub fn simulate<R: Rng + ?Sized>(
    goal: usize,
    pool: usize,
    total: usize,
    checks_per_minute: f64,
    trials: usize,
    rng: &mut R,
) -> Timing {
    let mut bag = vec![true; pool.min(total)];
    bag.resize(total, false);

    let mut times = Vec::with_capacity(trials);
    for _ in 0..trials {
        bag.shuffle(rng);
        times.push(scan(&bag, goal) as f64 / checks_per_minute);
    }
    Timing::from_samples(&times)
}

/// A feasible goal/pool pair together with the score it would add.
#[derive(Clone, Debug, PartialEq)]
pub struct HuntCandidate {
    pub goal: u32,
    pub pool: u32,
    pub points: Score,
}

impl HuntCandidate {
    /// Hunt length replaces most of the running length rather than adding to
    /// it; the other axes add up as usual.
    pub fn apply_to(&self, base: Score) -> Score {
        Score {
            length: ((self.points.length * 3.0 + base.length) / 4.0).trunc(),
            execution: base.execution + self.points.execution,
            familiarity: base.familiarity + self.points.familiarity,
            variance: base.variance + self.points.variance,
        }
    }

    pub fn extra_pool_percent(&self) -> f64 {
        if self.goal == 0 {
            return 0.0;
        }
        let pct = 100.0 * (f64::from(self.pool) / f64::from(self.goal) - 1.0);
        (pct * 10.0).round() / 10.0
    }
}

fn feasible(goal: i64, pool: i64, space: i64) -> bool {
    if pool <= goal {
        return false;
    }
    if space - pool < MIN_SPARE_LOCATIONS {
        return false;
    }
    pool as f64 / space as f64 <= MAX_POOL_SHARE
}

/// Enumerate and simulate the hunt configurations available this attempt.
///
/// Each `tfh_goal` fraction is left out with probability equal to its weight;
/// each `tfh_extra_pool` delta is kept with probability equal to its weight.
/// An empty result means no hunt is possible and the attempt should be
/// retried.
pub fn hunt_candidates<R: Rng + ?Sized>(
    settings: &SettingsDocument,
    weights: &WeightTable,
    trials: usize,
    rng: &mut R,
) -> Vec<HuntCandidate> {
    let total = pool_size(settings);
    let space = i64::from(total) - i64::from(mandatory_pool_size(settings));
    let base = f64::from(total) / GOAL_BASE_POOL;
    let cpm = checks_per_minute(total, settings);

    let pool_deltas = weights.numeric_options("tfh_extra_pool");
    let mut candidates = Vec::new();

    for (fraction, goal_entry) in weights.numeric_options("tfh_goal") {
        if rng.gen::<f64>() < goal_entry.weight {
            continue;
        }
        let jitter = rng.gen_range(0.85..1.15);
        let goal = (fraction as f64 * base * jitter).trunc() as i64;
        if goal < 0 {
            continue;
        }

        for (delta, pool_entry) in &pool_deltas {
            let pool = (goal as f64 * (1.0 + *delta as f64 / 100.0) + 1.0).trunc() as i64;
            if !feasible(goal, pool, space) {
                continue;
            }
            if rng.gen::<f64>() > pool_entry.weight {
                continue;
            }

            let timing = simulate(
                goal as usize,
                pool as usize,
                total as usize,
                cpm,
                trials,
                rng,
            );
            tracing::trace!(goal, pool, total, ?timing, "simulated hunt");
            candidates.push(HuntCandidate {
                goal: goal as u32,
                pool: pool as u32,
                points: Score {
                    length: timing.length_points(),
                    execution: pool_entry.points.execution,
                    familiarity: pool_entry.points.familiarity,
                    variance: timing.variance_points(),
                },
            });
        }
    }

    candidates
}

/// Pick the first candidate (in random order) that lands the score within
/// bounds, or the last one tried if none does.
pub fn select_hunt<R: Rng + ?Sized>(
    mut candidates: Vec<HuntCandidate>,
    base: Score,
    bounds: &Bounds,
    rng: &mut R,
) -> Option<(HuntCandidate, Score)> {
    candidates.shuffle(rng);
    let mut last = None;
    for candidate in candidates {
        let score = candidate.apply_to(base);
        if bounds.within_limits(&score) {
            return Some((candidate, score));
        }
        last = Some((candidate, score));
    }
    last
}
