#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat resolution between the player and a guardian.
//!
//! The logic branch is a deterministic comparison of the player's score with
//! the guardian's difficulty. The luck branch draws from a [`RandomSource`]
//! supplied by the caller, so replays stay deterministic under a fixed seed.

use maze_escape_core::{CombatOutcome, FightKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Source of uniformly distributed rolls in `[0, 1)`.
pub trait RandomSource {
    /// Draws the next roll.
    fn next_unit(&mut self) -> f64;
}

/// Deterministic random source backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    inner: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a random source whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Random source that returns the same roll forever.
///
/// Rolls at or above `1.0` lose every luck contest; a roll of `0.0` wins
/// every contest whose win probability is positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedRoll(f64);

impl FixedRoll {
    /// Creates a source returning `value` on every draw.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Source that wins every luck contest.
    #[must_use]
    pub const fn always_win() -> Self {
        Self(0.0)
    }

    /// Source that loses every luck contest.
    #[must_use]
    pub const fn always_lose() -> Self {
        Self(1.0)
    }
}

impl RandomSource for FixedRoll {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

/// Tuning knobs for both fight styles.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Score required per point of guardian difficulty to win a logic contest.
    pub logic_points_per_difficulty: u32,
    /// Luck win probability against a difficulty-zero guardian.
    pub luck_base: f64,
    /// Probability removed per point of guardian difficulty.
    pub luck_step: f64,
    /// Lowest luck win probability regardless of difficulty.
    pub luck_floor: f64,
    /// Highest luck win probability regardless of difficulty.
    pub luck_ceiling: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            logic_points_per_difficulty: 10,
            luck_base: 0.7,
            luck_step: 0.1,
            luck_floor: 0.1,
            luck_ceiling: 0.9,
        }
    }
}

impl CombatTuning {
    /// Minimum score that wins a logic contest against `difficulty`.
    #[must_use]
    pub fn logic_threshold(&self, difficulty: u32) -> u32 {
        difficulty.saturating_mul(self.logic_points_per_difficulty)
    }

    /// Probability of winning a luck contest against `difficulty`.
    ///
    /// The result always lies within `[0, 1]`, even when the configured floor
    /// and ceiling do not.
    #[must_use]
    pub fn luck_win_probability(&self, difficulty: u32) -> f64 {
        let floor = self.luck_floor.clamp(0.0, 1.0);
        let ceiling = self.luck_ceiling.clamp(floor, 1.0);
        let raw = self.luck_base - self.luck_step * f64::from(difficulty);
        raw.clamp(floor, ceiling)
    }
}

/// Inputs describing a single encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contest {
    /// Fight style picked by the player.
    pub kind: FightKind,
    /// Player score when the fight starts.
    pub player_score: u32,
    /// Effective difficulty of the engaged guardian.
    pub guardian_difficulty: u32,
}

/// Combat system that resolves contests according to its tuning.
#[derive(Clone, Debug, Default)]
pub struct Combat {
    tuning: CombatTuning,
}

impl Combat {
    /// Creates a combat system with the provided tuning.
    #[must_use]
    pub fn new(tuning: CombatTuning) -> Self {
        Self { tuning }
    }

    /// Tuning the system resolves contests with.
    #[must_use]
    pub fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    /// Resolves a contest. Only the luck style draws from `random`.
    pub fn resolve(&self, contest: Contest, random: &mut dyn RandomSource) -> CombatOutcome {
        let won = match contest.kind {
            FightKind::Logic => {
                contest.player_score >= self.tuning.logic_threshold(contest.guardian_difficulty)
            }
            FightKind::Luck => {
                random.next_unit() < self.tuning.luck_win_probability(contest.guardian_difficulty)
            }
        };

        if won {
            CombatOutcome::Victory
        } else {
            CombatOutcome::Defeat
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingRoll {
        draws: u32,
    }

    impl RandomSource for CountingRoll {
        fn next_unit(&mut self) -> f64 {
            self.draws += 1;
            0.5
        }
    }

    fn contest(kind: FightKind, player_score: u32, guardian_difficulty: u32) -> Contest {
        Contest {
            kind,
            player_score,
            guardian_difficulty,
        }
    }

    #[test]
    fn logic_compares_score_against_difficulty() {
        let combat = Combat::default();
        let mut random = FixedRoll::always_lose();

        assert_eq!(
            combat.resolve(contest(FightKind::Logic, 20, 2), &mut random),
            CombatOutcome::Victory
        );
        assert_eq!(
            combat.resolve(contest(FightKind::Logic, 19, 2), &mut random),
            CombatOutcome::Defeat
        );
        assert_eq!(
            combat.resolve(contest(FightKind::Logic, 0, 0), &mut random),
            CombatOutcome::Victory
        );
    }

    #[test]
    fn logic_never_draws_randomness() {
        let combat = Combat::default();
        let mut random = CountingRoll { draws: 0 };

        let _ = combat.resolve(contest(FightKind::Logic, 5, 3), &mut random);

        assert_eq!(random.draws, 0);
    }

    #[test]
    fn custom_tuning_drives_resolution() {
        let combat = Combat::new(CombatTuning {
            logic_points_per_difficulty: 5,
            ..CombatTuning::default()
        });

        assert_eq!(combat.tuning().logic_threshold(3), 15);
        assert_eq!(
            combat.resolve(contest(FightKind::Logic, 15, 3), &mut FixedRoll::always_lose()),
            CombatOutcome::Victory
        );
        assert_eq!(
            combat.resolve(contest(FightKind::Logic, 14, 3), &mut FixedRoll::always_lose()),
            CombatOutcome::Defeat
        );
    }

    #[test]
    fn luck_follows_the_injected_roll() {
        let combat = Combat::default();

        assert_eq!(
            combat.resolve(contest(FightKind::Luck, 0, 1), &mut FixedRoll::always_win()),
            CombatOutcome::Victory
        );
        assert_eq!(
            combat.resolve(contest(FightKind::Luck, 1_000, 0), &mut FixedRoll::always_lose()),
            CombatOutcome::Defeat
        );
    }

    #[test]
    fn luck_probability_shrinks_with_difficulty_within_bounds() {
        let tuning = CombatTuning::default();

        assert!((tuning.luck_win_probability(0) - 0.7).abs() < 1e-9);
        assert!((tuning.luck_win_probability(3) - 0.4).abs() < 1e-9);
        assert!((tuning.luck_win_probability(50) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn luck_probability_respects_ceiling() {
        let tuning = CombatTuning {
            luck_base: 3.0,
            ..CombatTuning::default()
        };

        assert!((tuning.luck_win_probability(0) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let mut first = SeededRandom::new(7);
        let mut second = SeededRandom::new(7);

        for _ in 0..16 {
            let roll = first.next_unit();
            assert!((0.0..1.0).contains(&roll));
            assert_eq!(roll.to_bits(), second.next_unit().to_bits());
        }
    }
}
