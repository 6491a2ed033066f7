//! Square grid of typed cells defining the walkable topology.

use maze_escape_core::{Cell, CellCoord, DoorLock, GridError};

use crate::LevelError;

/// Immutable maze topology. Only door lock states change after construction.
///
/// The maze knows nothing about the player or the guardians.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    size: u32,
    cells: Vec<Cell>,
}

impl Maze {
    /// Creates a maze of side `size` from row-major `cells`.
    pub fn new(size: u32, cells: Vec<Cell>) -> Result<Self, LevelError> {
        let expected = cell_capacity(size);
        if cells.len() != expected {
            return Err(LevelError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self { size, cells })
    }

    /// Creates a maze of side `size` whose cells are produced by `cell_at`.
    #[must_use]
    pub fn from_fn<F>(size: u32, mut cell_at: F) -> Self
    where
        F: FnMut(CellCoord) -> Cell,
    {
        let mut cells = Vec::with_capacity(cell_capacity(size));
        cells.extend(CellCoord::row_major(size).map(&mut cell_at));
        Self { size, cells }
    }

    /// Side length of the maze.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        coord.column() < self.size && coord.row() < self.size
    }

    /// Returns the cell at `coord`.
    pub fn cell(&self, coord: CellCoord) -> Result<Cell, GridError> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(GridError::OutOfBounds {
                coord,
                size: self.size,
            })
    }

    /// True iff the cell is floor, exit, or an unlocked door. False outside the grid.
    #[must_use]
    pub fn is_walkable(&self, coord: CellCoord) -> bool {
        self.cell(coord).map_or(false, Cell::is_walkable)
    }

    /// True iff the cell is the exit.
    #[must_use]
    pub fn is_exit(&self, coord: CellCoord) -> bool {
        self.cell(coord).map_or(false, Cell::is_exit)
    }

    /// True iff the coordinates are exactly one orthogonal step apart.
    #[must_use]
    pub fn is_adjacent(&self, a: CellCoord, b: CellCoord) -> bool {
        a.is_adjacent_to(b)
    }

    /// Unlocks the door at `coord`. Unlocking an open door does nothing.
    pub fn unlock_door(&mut self, coord: CellCoord) -> Result<(), GridError> {
        let size = self.size;
        let slot = self
            .index(coord)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(GridError::OutOfBounds { coord, size })?;

        match slot {
            Cell::Door(lock) => {
                *lock = DoorLock::Unlocked;
                Ok(())
            }
            _ => Err(GridError::NotADoor { coord }),
        }
    }

    /// Row-major view of every cell.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates every cell in row-major order alongside its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        CellCoord::row_major(self.size).zip(self.cells.iter().copied())
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if self.contains(coord) {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn cell_capacity(size: u32) -> usize {
    let capacity = u64::from(size) * u64::from(size);
    usize::try_from(capacity).unwrap_or(0)
}
