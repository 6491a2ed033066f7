//! Engine tuning, deserializable with per-field defaults.

use maze_escape_core::Difficulty;
use maze_escape_system_combat::CombatTuning;
use serde::Deserialize;

/// Score and lives removed when a puzzle is answered incorrectly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Penalty {
    /// Points removed from the score, saturating at zero.
    pub score: u32,
    /// Lives removed.
    pub lives: u32,
}

impl Penalty {
    /// Reports whether the penalty changes nothing.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.score == 0 && self.lives == 0
    }
}

/// Aggregated knobs controlling scoring, lives, and combat.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lives the player starts with. Values below one are raised to one.
    pub starting_lives: u32,
    /// Score awarded for a correct puzzle answer.
    pub puzzle_bonus: u32,
    /// Score awarded for defeating a guardian.
    pub combat_bonus: u32,
    /// Cost of a wrong puzzle answer. Free by default.
    pub wrong_answer_penalty: Penalty,
    /// Added to every guardian's authored difficulty.
    pub guardian_difficulty_offset: u32,
    /// Fight resolution tuning.
    pub combat: CombatTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            puzzle_bonus: 10,
            combat_bonus: 20,
            wrong_answer_penalty: Penalty::default(),
            guardian_difficulty_offset: 0,
            combat: CombatTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Applies a difficulty preset on top of this configuration.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.starting_lives = difficulty.starting_lives();
        self.guardian_difficulty_offset = difficulty.guardian_offset();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            puzzle_bonus = 25

            [wrong_answer_penalty]
            lives = 1
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.puzzle_bonus, 25);
        assert_eq!(config.starting_lives, 3);
        assert_eq!(
            config.wrong_answer_penalty,
            Penalty { score: 0, lives: 1 }
        );
        assert_eq!(config.combat, CombatTuning::default());
    }

    #[test]
    fn default_penalty_is_free() {
        assert!(EngineConfig::default().wrong_answer_penalty.is_none());
    }

    #[test]
    fn hard_preset_leaves_one_life() {
        let config = EngineConfig::default().with_difficulty(Difficulty::Hard);
        assert_eq!(config.starting_lives, 1);
        assert_eq!(config.guardian_difficulty_offset, 1);
        assert_eq!(config.puzzle_bonus, EngineConfig::default().puzzle_bonus);
    }
}
