#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Clicks travel over the interaction
//! channel as [`ClickEvent`] values, the wiring layer turns them into
//! [`Command`] values, the world executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values. Systems consume event
//! streams and drive the [`PresentationSurface`], which only ever observes the
//! world through owned [`GameSnapshot`] copies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Maze Escape.";

/// Location of a single maze cell expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether `other` is exactly one orthogonal step away.
    ///
    /// A cell is never adjacent to itself and the relation is symmetric.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Every coordinate of a `size` by `size` grid in row-major order.
    pub fn row_major(size: u32) -> impl Iterator<Item = CellCoord> {
        (0..size).flat_map(move |row| (0..size).map(move |column| CellCoord::new(column, row)))
    }
}

/// Lock state carried by door cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorLock {
    /// The door blocks movement until its puzzle is solved.
    Locked,
    /// The door behaves like floor.
    Unlocked,
}

/// Type of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Open ground the player may occupy.
    Floor,
    /// Solid cell that can never be entered.
    Wall,
    /// Puzzle-gated door.
    Door(DoorLock),
    /// Escape cell; stepping onto it wins the game.
    Exit,
}

impl Cell {
    /// Reports whether the player may legally occupy the cell.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Floor | Self::Exit | Self::Door(DoorLock::Unlocked))
    }

    /// Reports whether the cell is the maze exit.
    #[must_use]
    pub const fn is_exit(self) -> bool {
        matches!(self, Self::Exit)
    }

    /// Reports whether the cell is a door, regardless of its lock state.
    #[must_use]
    pub const fn is_door(self) -> bool {
        matches!(self, Self::Door(_))
    }

    /// Reports whether the cell is a door that is still locked.
    #[must_use]
    pub const fn is_locked_door(self) -> bool {
        matches!(self, Self::Door(DoorLock::Locked))
    }
}

/// Unique identifier assigned to a guardian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardianId(u32);

impl GuardianId {
    /// Creates a new guardian identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifies one outstanding decision request issued by the world.
///
/// Responses must quote the ticket of the request they answer; responses with
/// any other ticket are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecisionTicket(u64);

impl DecisionTicket {
    /// Creates a ticket wrapping the provided sequence number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the sequence number of the ticket.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Normalizes a raw user response: surrounding whitespace removed, lowercase.
#[must_use]
pub fn normalize_response(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Fight styles the player may pick when engaging a guardian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FightKind {
    /// Deterministic contest of score against guardian difficulty.
    Logic,
    /// Randomized contest weighted by guardian difficulty.
    Luck,
}

impl FightKind {
    /// Parses a raw response, returning `None` for anything but "logic" or "luck".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_response(raw).as_str() {
            "logic" => Some(Self::Logic),
            "luck" => Some(Self::Luck),
            _ => None,
        }
    }

    /// Canonical lowercase label of the fight kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Logic => "logic",
            Self::Luck => "luck",
        }
    }
}

/// Choices offered by the end-of-game menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndGameChoice {
    /// Construct a fresh world and play again.
    Restart,
    /// Leave the game.
    Exit,
}

impl EndGameChoice {
    /// Parses a raw response, returning `None` for anything but "restart" or "exit".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_response(raw).as_str() {
            "restart" => Some(Self::Restart),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Difficulty presets offered before a session starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Extra lives.
    Easy,
    /// Default preset.
    #[default]
    Normal,
    /// A single life and tougher guardians.
    Hard,
}

impl Difficulty {
    /// Parses "easy", "normal" or "hard" (case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_response(raw).as_str() {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    /// Number of lives the player starts with under this preset.
    #[must_use]
    pub const fn starting_lives(self) -> u32 {
        match self {
            Self::Easy => 5,
            Self::Normal => 3,
            Self::Hard => 1,
        }
    }

    /// Amount added to every guardian's authored difficulty.
    #[must_use]
    pub const fn guardian_offset(self) -> u32 {
        match self {
            Self::Easy | Self::Normal => 0,
            Self::Hard => 1,
        }
    }
}

/// Engine-level states of a single play-through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Moves are accepted.
    Running,
    /// A puzzle request is outstanding.
    AwaitingPuzzleAnswer,
    /// A fight-choice request is outstanding.
    AwaitingFightChoice,
    /// The player reached the exit. Terminal.
    Won,
    /// The player ran out of lives. Terminal.
    Lost,
}

impl EngineState {
    /// Reports whether the state accepts no further moves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the player act on the provided cell.
    AttemptMove {
        /// Cell the player clicked.
        target: CellCoord,
    },
    /// Delivers the answer to an outstanding puzzle request.
    AnswerPuzzle {
        /// Ticket of the request being answered.
        ticket: DecisionTicket,
        /// Raw answer as typed by the player.
        answer: String,
    },
    /// Delivers the fight style picked for an outstanding fight-choice request.
    ChooseFight {
        /// Ticket of the request being answered.
        ticket: DecisionTicket,
        /// Raw choice as returned by the presentation surface.
        choice: String,
    },
    /// Moves a guardian between turns on behalf of an external driver.
    RepositionGuardian {
        /// Guardian to move.
        guardian: GuardianId,
        /// Walkable cell the guardian should occupy.
        to: CellCoord,
    },
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveRejection {
    /// The world is not accepting moves in its current state.
    NotRunning(EngineState),
    /// The target lies outside the maze.
    OutOfBounds,
    /// The target is not exactly one orthogonal step from the player.
    NotAdjacent,
    /// The target is a wall or otherwise impassable.
    Blocked,
}

/// Result of a single combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatOutcome {
    /// The player defeated the guardian.
    Victory,
    /// The guardian defeated the player.
    Defeat,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Reports that a move request was rejected without changing state.
    MoveRejected {
        /// Cell the player attempted to act on.
        target: CellCoord,
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Announces that the engine transitioned between states.
    StateChanged {
        /// State before the transition.
        from: EngineState,
        /// State after the transition.
        to: EngineState,
    },
    /// Asks the player to answer the puzzle guarding a locked door.
    PuzzlePosed {
        /// Ticket the answer must quote.
        ticket: DecisionTicket,
        /// Door guarded by the puzzle.
        door: CellCoord,
        /// Question to present.
        question: String,
    },
    /// Confirms that a puzzle was answered correctly and its door unlocked.
    PuzzleSolved {
        /// Door that became walkable.
        door: CellCoord,
        /// Score awarded for the answer.
        bonus: u32,
    },
    /// Reports that a puzzle answer was wrong; the door stays locked.
    PuzzleFailed {
        /// Door that remains locked.
        door: CellCoord,
    },
    /// Asks the player to pick a fight style against a guardian.
    FightChoiceRequested {
        /// Ticket the choice must quote.
        ticket: DecisionTicket,
        /// Guardian being engaged.
        guardian: GuardianId,
        /// Cell the guardian occupies.
        at: CellCoord,
    },
    /// Reports that the fight choice was not a recognised style and the encounter was called off.
    FightCancelled {
        /// Guardian that was engaged.
        guardian: GuardianId,
    },
    /// Confirms the outcome of a combat.
    CombatResolved {
        /// Guardian that was fought.
        guardian: GuardianId,
        /// Fight style used.
        kind: FightKind,
        /// Outcome of the fight.
        outcome: CombatOutcome,
    },
    /// Confirms that a guardian was removed from the maze.
    GuardianDefeated {
        /// Guardian that was removed.
        guardian: GuardianId,
        /// Cell the guardian occupied.
        at: CellCoord,
    },
    /// Confirms that a guardian was moved by an external driver.
    GuardianRepositioned {
        /// Guardian that moved.
        guardian: GuardianId,
        /// Cell the guardian occupied before moving.
        from: CellCoord,
        /// Cell the guardian occupies after moving.
        to: CellCoord,
    },
    /// Reports that the player lost a life.
    LifeLost {
        /// Lives left after the loss.
        remaining: u32,
    },
    /// Reports a new score total.
    ScoreChanged {
        /// Score after the change.
        score: u32,
    },
    /// Reports that a decision response was ignored because it did not match the pending request.
    DecisionIgnored {
        /// Ticket quoted by the ignored response.
        ticket: DecisionTicket,
    },
    /// The player reached the exit.
    GameWon,
    /// The player ran out of lives.
    GameLost,
}

/// Position click raised by a presentation surface.
///
/// This is the only event kind carried by the interaction channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Cell that was clicked.
    pub target: CellCoord,
}

impl ClickEvent {
    /// Creates a click on the provided cell.
    #[must_use]
    pub const fn at(column: u32, row: u32) -> Self {
        Self {
            target: CellCoord::new(column, row),
        }
    }
}

/// Errors raised by maze grid operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Coordinates fall outside `[0, size)` on either axis.
    #[error("cell ({}, {}) is outside the {size}x{size} maze", .coord.column(), .coord.row())]
    OutOfBounds {
        /// Offending coordinate.
        coord: CellCoord,
        /// Side length of the maze.
        size: u32,
    },
    /// An unlock was attempted on a cell that is not a door.
    #[error("cell ({}, {}) is not a door", .coord.column(), .coord.row())]
    NotADoor {
        /// Offending coordinate.
        coord: CellCoord,
    },
}

/// Errors raised when a command does not fit the current engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The command requires a different engine state.
    #[error("cannot apply command while {state:?}; expected {expected:?}")]
    InvalidTransition {
        /// State the engine was in.
        state: EngineState,
        /// State the command requires.
        expected: EngineState,
    },
    /// The response quotes a ticket that is not the pending one.
    #[error("decision ticket {} does not match the pending request", .ticket.get())]
    StaleTicket {
        /// Ticket quoted by the response.
        ticket: DecisionTicket,
    },
}

/// Immutable copy of the player's state used for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Cell occupied by the player.
    pub position: CellCoord,
    /// Current score.
    pub score: u32,
    /// Remaining lives.
    pub lives: u32,
}

/// Immutable copy of a single guardian's state used for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardianSnapshot {
    /// Unique identifier assigned to the guardian.
    pub id: GuardianId,
    /// Cell occupied by the guardian.
    pub position: CellCoord,
    /// Effective combat difficulty of the guardian.
    pub difficulty: u32,
}

/// Owned snapshot of everything a presentation surface needs to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    size: u32,
    cells: Vec<Cell>,
    player: PlayerSnapshot,
    guardians: Vec<GuardianSnapshot>,
    state: EngineState,
}

impl GameSnapshot {
    /// Captures a snapshot from its parts. `cells` are stored row-major.
    #[must_use]
    pub fn new(
        size: u32,
        cells: Vec<Cell>,
        player: PlayerSnapshot,
        mut guardians: Vec<GuardianSnapshot>,
        state: EngineState,
    ) -> Self {
        guardians.sort_by_key(|guardian| guardian.id);
        Self {
            size,
            cells,
            player,
            guardians,
            state,
        }
    }

    /// Side length of the maze.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Player state at capture time.
    #[must_use]
    pub const fn player(&self) -> PlayerSnapshot {
        self.player
    }

    /// Engine state at capture time.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Guardians still in the maze, ordered by identifier.
    #[must_use]
    pub fn guardians(&self) -> &[GuardianSnapshot] {
        &self.guardians
    }

    /// Returns the cell at the provided coordinate, if inside the maze.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Returns the first guardian standing on the provided cell, if any.
    #[must_use]
    pub fn guardian_at(&self, coord: CellCoord) -> Option<&GuardianSnapshot> {
        self.guardians
            .iter()
            .find(|guardian| guardian.position == coord)
    }

    /// Iterates every cell in row-major order alongside its coordinate.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        CellCoord::row_major(self.size).zip(self.cells.iter().copied())
    }

    /// Reports whether clicking the cell would be acted upon by the world.
    ///
    /// Mirrors the world's move validation so surfaces can disable the cells
    /// a click would be rejected on.
    #[must_use]
    pub fn is_clickable(&self, coord: CellCoord) -> bool {
        if self.state != EngineState::Running || !self.player.position.is_adjacent_to(coord) {
            return false;
        }

        let Some(cell) = self.cell(coord) else {
            return false;
        };

        self.guardian_at(coord).is_some() || cell.is_door() || cell.is_walkable()
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if coord.column() < self.size && coord.row() < self.size {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Puzzle question handed to a presentation surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PuzzleRequest {
    /// Ticket the answer must quote.
    pub ticket: DecisionTicket,
    /// Door guarded by the puzzle.
    pub door: CellCoord,
    /// Question to present.
    pub question: String,
}

/// Fight-choice prompt handed to a presentation surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FightChoiceRequest {
    /// Ticket the choice must quote.
    pub ticket: DecisionTicket,
    /// Guardian being engaged.
    pub guardian: GuardianId,
    /// Cell the guardian occupies.
    pub at: CellCoord,
}

/// Presentation layer consumed by the engine wiring.
///
/// Implementations render state and collect user decisions. Every request is
/// a deferred single-shot contract: the surface may take as long as it likes,
/// but should deliver exactly one response per request through the wiring
/// component, quoting the request's ticket. Responses for stale tickets are
/// ignored by the world.
pub trait PresentationSurface {
    /// Shows a fire-and-forget notification.
    fn show_message(&mut self, text: &str);

    /// Poses a puzzle question; the answer is a raw string.
    fn show_puzzle(&mut self, request: PuzzleRequest);

    /// Asks for a fight style; the response should be "logic" or "luck".
    fn show_fight_choice(&mut self, request: FightChoiceRequest);

    /// Shows the end-of-game menu; the response should be "restart" or "exit".
    fn show_end_game_menu(&mut self, victory: bool);

    /// Re-renders from the authoritative snapshot.
    fn refresh(&mut self, snapshot: &GameSnapshot);
}
