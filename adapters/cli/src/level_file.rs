//! TOML level files.
//!
//! `rows` uses the layout legend of [`LevelBuilder::from_rows`]. Puzzles are
//! attached to door coordinates; `[[guardians]]` entries place guardians in
//! addition to those drawn with `G`.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use maze_escape_core::CellCoord;
use maze_escape_world::{Level, LevelBuilder, Puzzle, DEFAULT_GUARDIAN_DIFFICULTY};
use serde::Deserialize;

/// Level played when no `--level` is given.
pub(crate) const DEFAULT_LEVEL: &str = r##"
rows = [
    "P.#....",
    ".##.##.",
    "...G...",
    "#D###.#",
    "..#....",
    ".##G##D",
    "......E",
]

[[puzzles]]
column = 1
row = 3
question = "What has keys but can't open locks?"
answer = "piano"

[[puzzles]]
column = 6
row = 5
question = "What gets wetter the more it dries?"
answer = "towel"

[[guardians]]
column = 5
row = 4
difficulty = 2
"##;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelFile {
    rows: Vec<String>,
    #[serde(default)]
    puzzles: Vec<PuzzleEntry>,
    #[serde(default)]
    guardians: Vec<GuardianEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PuzzleEntry {
    column: u32,
    row: u32,
    question: String,
    answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GuardianEntry {
    column: u32,
    row: u32,
    #[serde(default = "default_difficulty")]
    difficulty: u32,
}

const fn default_difficulty() -> u32 {
    DEFAULT_GUARDIAN_DIFFICULTY
}

/// Parses and validates level text.
pub(crate) fn parse(text: &str) -> Result<Level> {
    let file: LevelFile = toml::from_str(text).context("invalid level file")?;
    let mut builder = LevelBuilder::from_rows(&file.rows).context("invalid level layout")?;

    for entry in file.puzzles {
        builder = builder.puzzle(
            CellCoord::new(entry.column, entry.row),
            Puzzle::new(entry.question, entry.answer),
        );
    }
    for entry in file.guardians {
        builder = builder.guardian(CellCoord::new(entry.column, entry.row), entry.difficulty);
    }

    builder.build().context("level failed validation")
}

/// Loads the level at `path`, or the built-in level when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Level> {
    let Some(path) = path else {
        return parse(DEFAULT_LEVEL).context("built-in level");
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    parse(&text).with_context(|| format!("in level file {}", path.display()))
}
