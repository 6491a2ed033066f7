//! Player and guardian records. Mutation is reserved to the world.

use maze_escape_core::{CellCoord, GuardianId, GuardianSnapshot, PlayerSnapshot};

/// The escaping player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    position: CellCoord,
    score: u32,
    lives: u32,
}

impl Player {
    /// Creates a player at `position` with a zero score.
    #[must_use]
    pub const fn new(position: CellCoord, lives: u32) -> Self {
        Self {
            position,
            score: 0,
            lives,
        }
    }

    /// Cell occupied by the player.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Captures an owned copy for presentation.
    #[must_use]
    pub const fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            score: self.score,
            lives: self.lives,
        }
    }

    pub(crate) fn move_to(&mut self, position: CellCoord) {
        self.position = position;
    }

    pub(crate) fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub(crate) fn deduct(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }

    /// Removes up to `count` lives and returns the lives left.
    pub(crate) fn lose_lives(&mut self, count: u32) -> u32 {
        self.lives = self.lives.saturating_sub(count);
        self.lives
    }
}

/// Guardian standing in the maze until defeated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guardian {
    id: GuardianId,
    position: CellCoord,
    difficulty: u32,
}

impl Guardian {
    /// Creates a guardian with the provided encounter difficulty.
    #[must_use]
    pub const fn new(id: GuardianId, position: CellCoord, difficulty: u32) -> Self {
        Self {
            id,
            position,
            difficulty,
        }
    }

    /// Identifier assigned at construction.
    #[must_use]
    pub const fn id(&self) -> GuardianId {
        self.id
    }

    /// Cell occupied by the guardian.
    #[must_use]
    pub const fn position(&self) -> CellCoord {
        self.position
    }

    /// Effective combat difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Captures an owned copy for presentation.
    #[must_use]
    pub const fn snapshot(&self) -> GuardianSnapshot {
        GuardianSnapshot {
            id: self.id,
            position: self.position,
            difficulty: self.difficulty,
        }
    }

    pub(crate) fn reposition(&mut self, position: CellCoord) {
        self.position = position;
    }
}
