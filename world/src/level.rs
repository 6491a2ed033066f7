//! Level construction: maze layout, player start, guardians, and door puzzles.
//!
//! Layouts may be written as text rows using the legend below; every row must
//! be as long as there are rows.
//!
//! | Glyph | Cell |
//! |---|---|
//! | `.` | floor |
//! | `#` | wall |
//! | `D` | locked door |
//! | `d` | unlocked door |
//! | `E` | exit |
//! | `P` | player start on floor |
//! | `G` | guardian on floor |

use maze_escape_core::{Cell, CellCoord, DoorLock, GridError};
use thiserror::Error;

use crate::{Maze, Puzzle, PuzzleBook};

/// Difficulty given to guardians placed with the `G` glyph.
pub const DEFAULT_GUARDIAN_DIFFICULTY: u32 = 1;

/// Errors raised while assembling a level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The layout has no rows.
    #[error("level layout is empty")]
    Empty,
    /// A row's length differs from the number of rows.
    #[error("row {row} has {actual} cells; a square layout needs {expected}")]
    NotSquare {
        /// Zero-based index of the offending row.
        row: u32,
        /// Required row length.
        expected: usize,
        /// Observed row length.
        actual: usize,
    },
    /// The cell vector does not cover the grid exactly.
    #[error("maze needs {expected} cells but {actual} were supplied")]
    CellCountMismatch {
        /// Required number of cells.
        expected: usize,
        /// Supplied number of cells.
        actual: usize,
    },
    /// The layout contains an unknown glyph.
    #[error("unknown glyph {glyph:?} at ({}, {})", .coord.column(), .coord.row())]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Where it was found.
        coord: CellCoord,
    },
    /// No player start was provided.
    #[error("level has no player start")]
    MissingPlayer,
    /// More than one player start was provided.
    #[error("second player start at ({}, {})", .coord.column(), .coord.row())]
    DuplicatePlayer {
        /// Location of the extra start.
        coord: CellCoord,
    },
    /// The player would start on a cell that cannot be occupied.
    #[error("player cannot start on blocked cell ({}, {})", .coord.column(), .coord.row())]
    PlayerOnBlockedCell {
        /// Start location.
        coord: CellCoord,
    },
    /// A guardian would stand on a cell that cannot be occupied.
    #[error("guardian cannot stand on blocked cell ({}, {})", .coord.column(), .coord.row())]
    GuardianOnBlockedCell {
        /// Guardian location.
        coord: CellCoord,
    },
    /// The layout has more rows than coordinates can address.
    #[error("layout has {rows} rows; at most {} are supported", u32::MAX)]
    TooLarge {
        /// Number of rows supplied.
        rows: usize,
    },
    /// More guardians were placed than identifiers can number.
    #[error("{count} guardians exceed the supported maximum")]
    TooManyGuardians {
        /// Number of guardians placed.
        count: usize,
    },
    /// A locked door has no puzzle, so it could never open.
    #[error("locked door at ({}, {}) has no puzzle", .door.column(), .door.row())]
    MissingPuzzle {
        /// Door lacking a puzzle.
        door: CellCoord,
    },
    /// A puzzle was attached to a cell that is not a door.
    #[error("puzzle attached to ({}, {}) which is not a door", .coord.column(), .coord.row())]
    PuzzleWithoutDoor {
        /// Cell the puzzle was attached to.
        coord: CellCoord,
    },
    /// An entity was placed outside the maze.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Guardian placement before the engine assigns identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardianSpec {
    /// Cell the guardian starts on.
    pub position: CellCoord,
    /// Authored combat difficulty.
    pub difficulty: u32,
}

/// Validated level ready to seed a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    maze: Maze,
    player_start: CellCoord,
    guardians: Vec<GuardianSpec>,
    puzzles: PuzzleBook,
}

impl Level {
    /// Maze topology.
    #[must_use]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Cell the player starts on.
    #[must_use]
    pub const fn player_start(&self) -> CellCoord {
        self.player_start
    }

    /// Guardians in placement order.
    #[must_use]
    pub fn guardians(&self) -> &[GuardianSpec] {
        &self.guardians
    }

    /// Door puzzles.
    #[must_use]
    pub fn puzzles(&self) -> &PuzzleBook {
        &self.puzzles
    }

    pub(crate) fn into_parts(self) -> (Maze, CellCoord, Vec<GuardianSpec>, PuzzleBook) {
        (self.maze, self.player_start, self.guardians, self.puzzles)
    }
}

/// Incrementally assembles a [`Level`].
#[derive(Clone, Debug)]
pub struct LevelBuilder {
    maze: Maze,
    player_start: Option<CellCoord>,
    guardians: Vec<GuardianSpec>,
    puzzles: PuzzleBook,
}

impl LevelBuilder {
    /// Starts a level around an existing maze.
    #[must_use]
    pub fn new(maze: Maze) -> Self {
        Self {
            maze,
            player_start: None,
            guardians: Vec::new(),
            puzzles: PuzzleBook::new(),
        }
    }

    /// Parses text rows using the module-level legend.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        if rows.is_empty() {
            return Err(LevelError::Empty);
        }

        let size = rows.len();
        let side = u32::try_from(size).map_err(|_| LevelError::TooLarge { rows: size })?;
        let mut cells = Vec::with_capacity(size.saturating_mul(size));
        let mut player_start = None;
        let mut guardians = Vec::new();

        for (row_index, row) in (0..side).zip(rows) {
            let glyphs: Vec<char> = row.as_ref().chars().collect();
            if glyphs.len() != size {
                return Err(LevelError::NotSquare {
                    row: row_index,
                    expected: size,
                    actual: glyphs.len(),
                });
            }

            for (column_index, glyph) in (0..side).zip(glyphs) {
                let coord = CellCoord::new(column_index, row_index);
                let cell = match glyph {
                    '.' => Cell::Floor,
                    '#' => Cell::Wall,
                    'D' => Cell::Door(DoorLock::Locked),
                    'd' => Cell::Door(DoorLock::Unlocked),
                    'E' => Cell::Exit,
                    'P' => {
                        if player_start.replace(coord).is_some() {
                            return Err(LevelError::DuplicatePlayer { coord });
                        }
                        Cell::Floor
                    }
                    'G' => {
                        guardians.push(GuardianSpec {
                            position: coord,
                            difficulty: DEFAULT_GUARDIAN_DIFFICULTY,
                        });
                        Cell::Floor
                    }
                    _ => return Err(LevelError::UnknownGlyph { glyph, coord }),
                };
                cells.push(cell);
            }
        }

        let maze = Maze::new(side, cells)?;
        Ok(Self {
            maze,
            player_start,
            guardians,
            puzzles: PuzzleBook::new(),
        })
    }

    /// Sets the player start, replacing any start parsed from text.
    #[must_use]
    pub fn player_start(mut self, at: CellCoord) -> Self {
        self.player_start = Some(at);
        self
    }

    /// Places a guardian after those already placed.
    #[must_use]
    pub fn guardian(mut self, at: CellCoord, difficulty: u32) -> Self {
        self.guardians.push(GuardianSpec {
            position: at,
            difficulty,
        });
        self
    }

    /// Attaches a puzzle to the door at `door`, replacing any previous one.
    #[must_use]
    pub fn puzzle(mut self, door: CellCoord, puzzle: Puzzle) -> Self {
        let _ = self.puzzles.attach(door, puzzle);
        self
    }

    /// Validates the level.
    pub fn build(self) -> Result<Level, LevelError> {
        let player_start = self.player_start.ok_or(LevelError::MissingPlayer)?;
        if !self.maze.cell(player_start)?.is_walkable() {
            return Err(LevelError::PlayerOnBlockedCell {
                coord: player_start,
            });
        }

        if u32::try_from(self.guardians.len()).is_err() {
            return Err(LevelError::TooManyGuardians {
                count: self.guardians.len(),
            });
        }
        for guardian in &self.guardians {
            if !self.maze.cell(guardian.position)?.is_walkable() {
                return Err(LevelError::GuardianOnBlockedCell {
                    coord: guardian.position,
                });
            }
        }

        for door in self.puzzles.doors() {
            if !self.maze.cell(door)?.is_door() {
                return Err(LevelError::PuzzleWithoutDoor { coord: door });
            }
        }

        if let Some((door, _)) = self
            .maze
            .iter()
            .find(|(coord, cell)| cell.is_locked_door() && self.puzzles.get(*coord).is_none())
        {
            return Err(LevelError::MissingPuzzle { door });
        }

        Ok(Level {
            maze: self.maze,
            player_start,
            guardians: self.guardians,
            puzzles: self.puzzles,
        })
    }
}
