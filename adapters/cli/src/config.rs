//! Optional TOML configuration file.
//!
//! ```toml
//! [engine]
//! starting_lives = 3
//! puzzle_bonus = 10
//! combat_bonus = 20
//!
//! [engine.wrong_answer_penalty]
//! score = 0
//! lives = 0
//!
//! [engine.combat]
//! logic_points_per_difficulty = 10
//! luck_base = 0.7
//!
//! [presenter]
//! announce_rejections = true
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use maze_escape_system_presenter::PresenterConfig;
use maze_escape_world::EngineConfig;
use serde::Deserialize;

/// Settings read from `--config`; every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// Engine tuning.
    pub(crate) engine: EngineConfig,
    /// Presentation tuning.
    pub(crate) presenter: PresenterConfig,
}

impl CliConfig {
    /// Parses configuration text.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Loads the file at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in config file {}", path.display()))
    }
}
