//! Puzzles gating locked doors.

use std::collections::BTreeMap;

use maze_escape_core::{normalize_response, CellCoord};

/// Question with a single accepted answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    question: String,
    answer: String,
}

impl Puzzle {
    /// Creates a puzzle. The answer is compared trimmed and case-insensitively.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: normalize_response(&answer.into()),
        }
    }

    /// Question shown to the player.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Reports whether `attempt` matches the accepted answer.
    #[must_use]
    pub fn is_correct(&self, attempt: &str) -> bool {
        normalize_response(attempt) == self.answer
    }
}

/// Puzzles keyed by the door they guard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PuzzleBook {
    by_door: BTreeMap<CellCoord, Puzzle>,
}

impl PuzzleBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `puzzle` to `door`, returning the puzzle it replaced.
    pub fn attach(&mut self, door: CellCoord, puzzle: Puzzle) -> Option<Puzzle> {
        self.by_door.insert(door, puzzle)
    }

    /// Puzzle guarding `door`, if any.
    #[must_use]
    pub fn get(&self, door: CellCoord) -> Option<&Puzzle> {
        self.by_door.get(&door)
    }

    /// Doors that still carry a puzzle, in coordinate order.
    pub fn doors(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.by_door.keys().copied()
    }

    /// Number of unsolved puzzles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_door.len()
    }

    /// Reports whether every puzzle has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_door.is_empty()
    }

    /// Removes the puzzle guarding `door`; solved puzzles are never reused.
    pub(crate) fn consume(&mut self, door: CellCoord) -> Option<Puzzle> {
        self.by_door.remove(&door)
    }
}
