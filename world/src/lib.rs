#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Escape.
//!
//! The world owns the maze, the player, the guardians, and the door puzzles.
//! All mutation flows through [`apply`]; everything else reads through the
//! [`query`] module, which only hands out owned snapshots or shared borrows.

mod config;
mod entities;
mod level;
mod maze;
mod puzzle;

use std::fmt;

use maze_escape_core::{
    CellCoord, CombatOutcome, Command, DecisionTicket, EngineState, Event, FightKind, GuardianId,
    MoveRejection, TransitionError,
};
use maze_escape_system_combat::{Combat, Contest};
use tracing::{debug, warn};

pub use config::{EngineConfig, Penalty};
pub use entities::{Guardian, Player};
pub use level::{GuardianSpec, Level, LevelBuilder, LevelError, DEFAULT_GUARDIAN_DIFFICULTY};
pub use maze::Maze;
pub use maze_escape_system_combat::{CombatTuning, FixedRoll, RandomSource, SeededRandom};
pub use puzzle::{Puzzle, PuzzleBook};

/// Engine phase. Pending decisions live inside the awaiting variants, so at
/// most one can exist at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Running,
    AwaitingPuzzle {
        ticket: DecisionTicket,
        door: CellCoord,
    },
    AwaitingFight {
        ticket: DecisionTicket,
        guardian: GuardianId,
    },
    Won,
    Lost,
}

impl Phase {
    const fn state(self) -> EngineState {
        match self {
            Self::Running => EngineState::Running,
            Self::AwaitingPuzzle { .. } => EngineState::AwaitingPuzzleAnswer,
            Self::AwaitingFight { .. } => EngineState::AwaitingFightChoice,
            Self::Won => EngineState::Won,
            Self::Lost => EngineState::Lost,
        }
    }
}

/// Represents the authoritative Maze Escape world state.
pub struct World {
    maze: Maze,
    player: Player,
    guardians: Vec<Guardian>,
    puzzles: PuzzleBook,
    config: EngineConfig,
    combat: Combat,
    random: Box<dyn RandomSource>,
    phase: Phase,
    last_ticket: u64,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("maze", &self.maze)
            .field("player", &self.player)
            .field("guardians", &self.guardians)
            .field("puzzles", &self.puzzles)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Creates a world from a validated level.
    ///
    /// Luck fights draw from `random`; inject a [`FixedRoll`] or a
    /// [`SeededRandom`] to make them reproducible.
    #[must_use]
    pub fn new(level: Level, config: EngineConfig, random: Box<dyn RandomSource>) -> Self {
        let (maze, player_start, guardian_specs, puzzles) = level.into_parts();

        let lives = if config.starting_lives == 0 {
            warn!("starting_lives of zero raised to one");
            1
        } else {
            config.starting_lives
        };

        let guardians = (0_u32..)
            .zip(guardian_specs)
            .map(|(index, spec)| {
                Guardian::new(
                    GuardianId::new(index),
                    spec.position,
                    spec.difficulty
                        .saturating_add(config.guardian_difficulty_offset),
                )
            })
            .collect();

        Self {
            maze,
            player: Player::new(player_start, lives),
            guardians,
            puzzles,
            combat: Combat::new(config.combat.clone()),
            config,
            random,
            phase: Phase::Running,
            last_ticket: 0,
        }
    }

    /// Creates a world whose luck fights follow a ChaCha8 stream seeded with `seed`.
    #[must_use]
    pub fn with_seed(level: Level, config: EngineConfig, seed: u64) -> Self {
        Self::new(level, config, Box::new(SeededRandom::new(seed)))
    }

    fn state(&self) -> EngineState {
        self.phase.state()
    }

    fn issue_ticket(&mut self) -> DecisionTicket {
        self.last_ticket = self.last_ticket.wrapping_add(1);
        DecisionTicket::new(self.last_ticket)
    }

    fn guardian_index(&self, guardian: GuardianId) -> Option<usize> {
        self.guardians.iter().position(|candidate| candidate.id() == guardian)
    }

    fn guardian_at(&self, cell: CellCoord) -> Option<&Guardian> {
        self.guardians
            .iter()
            .find(|guardian| guardian.position() == cell)
    }

    fn reject_move(&self, target: CellCoord, reason: MoveRejection, out_events: &mut Vec<Event>) {
        debug!(cell = ?target, ?reason, "move rejected");
        out_events.push(Event::MoveRejected { target, reason });
    }

    fn attempt_move(&mut self, target: CellCoord, out_events: &mut Vec<Event>) {
        if self.phase != Phase::Running {
            let error = TransitionError::InvalidTransition {
                state: self.state(),
                expected: EngineState::Running,
            };
            debug!(%error, "click ignored");
            self.reject_move(target, MoveRejection::NotRunning(self.state()), out_events);
            return;
        }

        let cell = match self.maze.cell(target) {
            Ok(cell) => cell,
            Err(error) => {
                warn!(%error, "click outside the maze");
                self.reject_move(target, MoveRejection::OutOfBounds, out_events);
                return;
            }
        };

        let from = self.player.position();
        if !self.maze.is_adjacent(from, target) {
            self.reject_move(target, MoveRejection::NotAdjacent, out_events);
            return;
        }

        if let Some(guardian) = self.guardian_at(target).map(Guardian::id) {
            let ticket = self.issue_ticket();
            self.phase = Phase::AwaitingFight { ticket, guardian };
            debug!(?guardian, ticket = ticket.get(), "guardian engaged");
            out_events.push(Event::FightChoiceRequested {
                ticket,
                guardian,
                at: target,
            });
            return;
        }

        if cell.is_locked_door() {
            let Some(question) = self.puzzles.get(target).map(|puzzle| puzzle.question().to_owned())
            else {
                warn!(cell = ?target, "locked door has no puzzle");
                self.reject_move(target, MoveRejection::Blocked, out_events);
                return;
            };

            let ticket = self.issue_ticket();
            self.phase = Phase::AwaitingPuzzle {
                ticket,
                door: target,
            };
            debug!(door = ?target, ticket = ticket.get(), "puzzle posed");
            out_events.push(Event::PuzzlePosed {
                ticket,
                door: target,
                question,
            });
            return;
        }

        if !cell.is_walkable() {
            self.reject_move(target, MoveRejection::Blocked, out_events);
            return;
        }

        self.player.move_to(target);
        out_events.push(Event::PlayerMoved { from, to: target });

        if cell.is_exit() {
            self.phase = Phase::Won;
            debug!(cell = ?target, "exit reached");
            out_events.push(Event::GameWon);
        }
    }

    fn answer_puzzle(
        &mut self,
        ticket: DecisionTicket,
        answer: &str,
        out_events: &mut Vec<Event>,
    ) -> Result<(), TransitionError> {
        let Phase::AwaitingPuzzle {
            ticket: pending,
            door,
        } = self.phase
        else {
            return Err(TransitionError::InvalidTransition {
                state: self.state(),
                expected: EngineState::AwaitingPuzzleAnswer,
            });
        };
        if pending != ticket {
            return Err(TransitionError::StaleTicket { ticket });
        }

        self.phase = Phase::Running;

        let correct = self
            .puzzles
            .get(door)
            .map_or(false, |puzzle| puzzle.is_correct(answer));

        if correct {
            match self.maze.unlock_door(door) {
                Ok(()) => {
                    let _ = self.puzzles.consume(door);
                    let bonus = self.config.puzzle_bonus;
                    self.player.award(bonus);
                    debug!(?door, "door unlocked");
                    out_events.push(Event::PuzzleSolved { door, bonus });
                    out_events.push(Event::ScoreChanged {
                        score: self.player.score(),
                    });
                    return Ok(());
                }
                Err(error) => warn!(%error, "puzzle solved but door could not be unlocked"),
            }
        }

        debug!(?door, "wrong puzzle answer");
        out_events.push(Event::PuzzleFailed { door });
        self.apply_penalty(self.config.wrong_answer_penalty, out_events);
        Ok(())
    }

    fn apply_penalty(&mut self, penalty: Penalty, out_events: &mut Vec<Event>) {
        if penalty.is_none() {
            return;
        }

        if penalty.score > 0 {
            self.player.deduct(penalty.score);
            out_events.push(Event::ScoreChanged {
                score: self.player.score(),
            });
        }

        if penalty.lives > 0 {
            self.lose_lives(penalty.lives, out_events);
        }
    }

    fn lose_lives(&mut self, count: u32, out_events: &mut Vec<Event>) {
        let remaining = self.player.lose_lives(count);
        out_events.push(Event::LifeLost { remaining });

        if remaining == 0 && self.phase != Phase::Lost {
            self.phase = Phase::Lost;
            debug!("out of lives");
            out_events.push(Event::GameLost);
        }
    }

    fn choose_fight(
        &mut self,
        ticket: DecisionTicket,
        choice: &str,
        out_events: &mut Vec<Event>,
    ) -> Result<(), TransitionError> {
        let Phase::AwaitingFight {
            ticket: pending,
            guardian,
        } = self.phase
        else {
            return Err(TransitionError::InvalidTransition {
                state: self.state(),
                expected: EngineState::AwaitingFightChoice,
            });
        };
        if pending != ticket {
            return Err(TransitionError::StaleTicket { ticket });
        }

        self.phase = Phase::Running;

        let Some(kind) = FightKind::parse(choice) else {
            debug!(?guardian, choice, "fight cancelled");
            out_events.push(Event::FightCancelled { guardian });
            return Ok(());
        };

        let Some(index) = self.guardian_index(guardian) else {
            warn!(?guardian, "engaged guardian vanished before the fight");
            out_events.push(Event::FightCancelled { guardian });
            return Ok(());
        };

        let contest = Contest {
            kind,
            player_score: self.player.score(),
            guardian_difficulty: self.guardians[index].difficulty(),
        };
        let logic_threshold = self
            .combat
            .tuning()
            .logic_threshold(contest.guardian_difficulty);
        let outcome = self.combat.resolve(contest, self.random.as_mut());
        debug!(
            ?guardian,
            kind = kind.label(),
            logic_threshold,
            ?outcome,
            "combat resolved"
        );
        out_events.push(Event::CombatResolved {
            guardian,
            kind,
            outcome,
        });

        match outcome {
            CombatOutcome::Victory => {
                let defeated = self.guardians.remove(index);
                self.player.award(self.config.combat_bonus);
                out_events.push(Event::GuardianDefeated {
                    guardian,
                    at: defeated.position(),
                });
                out_events.push(Event::ScoreChanged {
                    score: self.player.score(),
                });
            }
            CombatOutcome::Defeat => self.lose_lives(1, out_events),
        }

        Ok(())
    }

    fn reposition_guardian(
        &mut self,
        guardian: GuardianId,
        to: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != Phase::Running {
            warn!(?guardian, state = ?self.state(), "guardian reposition outside a running turn");
            return;
        }
        if !self.maze.is_walkable(to) || to == self.player.position() {
            warn!(?guardian, ?to, "guardian cannot stand there");
            return;
        }
        let Some(index) = self.guardian_index(guardian) else {
            warn!(?guardian, "unknown guardian");
            return;
        };

        let from = self.guardians[index].position();
        self.guardians[index].reposition(to);
        out_events.push(Event::GuardianRepositioned { guardian, from, to });
    }

    fn invariants_hold(&self) -> bool {
        let position_ok = self.maze.is_walkable(self.player.position());
        let lives_ok = self.player.lives() > 0 || self.phase == Phase::Lost;
        let pending_ok = match self.phase {
            Phase::AwaitingPuzzle { door, .. } => self
                .maze
                .cell(door)
                .map_or(false, |cell| cell.is_locked_door()),
            Phase::AwaitingFight { guardian, .. } => self.guardian_index(guardian).is_some(),
            Phase::Running | Phase::Won | Phase::Lost => true,
        };
        position_ok && lives_ok && pending_ok
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that do not fit the current state never change it; they surface
/// as [`Event::MoveRejected`] or [`Event::DecisionIgnored`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    debug_assert!(world.invariants_hold(), "world invariants broken before apply");
    let before = world.state();

    match command {
        Command::AttemptMove { target } => world.attempt_move(target, out_events),
        Command::AnswerPuzzle { ticket, answer } => {
            if let Err(error) = world.answer_puzzle(ticket, &answer, out_events) {
                warn!(%error, "puzzle answer ignored");
                out_events.push(Event::DecisionIgnored { ticket });
            }
        }
        Command::ChooseFight { ticket, choice } => {
            if let Err(error) = world.choose_fight(ticket, &choice, out_events) {
                warn!(%error, "fight choice ignored");
                out_events.push(Event::DecisionIgnored { ticket });
            }
        }
        Command::RepositionGuardian { guardian, to } => {
            world.reposition_guardian(guardian, to, out_events);
        }
    }

    let after = world.state();
    if before != after {
        out_events.push(Event::StateChanged {
            from: before,
            to: after,
        });
    }
    debug_assert!(world.invariants_hold(), "world invariants broken after apply");
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_escape_core::{
        CellCoord, DecisionTicket, EngineState, GameSnapshot, GuardianSnapshot, PlayerSnapshot,
    };

    use super::{EngineConfig, Maze, Phase, World};

    /// Current engine state.
    #[must_use]
    pub fn state(world: &World) -> EngineState {
        world.state()
    }

    /// Owned copy of the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Owned copies of the guardians still in the maze, in construction order.
    #[must_use]
    pub fn guardians(world: &World) -> Vec<GuardianSnapshot> {
        world.guardians.iter().map(|guardian| guardian.snapshot()).collect()
    }

    /// First guardian standing on `cell`, if any.
    #[must_use]
    pub fn guardian_at(world: &World, cell: CellCoord) -> Option<GuardianSnapshot> {
        world.guardian_at(cell).map(|guardian| guardian.snapshot())
    }

    /// Ticket of the outstanding decision request, if any.
    #[must_use]
    pub fn pending_ticket(world: &World) -> Option<DecisionTicket> {
        match world.phase {
            Phase::AwaitingPuzzle { ticket, .. } | Phase::AwaitingFight { ticket, .. } => {
                Some(ticket)
            }
            Phase::Running | Phase::Won | Phase::Lost => None,
        }
    }

    /// Provides read-only access to the maze topology.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// Provides read-only access to the engine configuration.
    #[must_use]
    pub fn config(world: &World) -> &EngineConfig {
        &world.config
    }

    /// Captures an owned snapshot of everything a surface needs to render.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot::new(
            world.maze.size(),
            world.maze.cells().to_vec(),
            player(world),
            guardians(world),
            world.state(),
        )
    }

    /// Cells a click would currently be acted upon for, in row-major order.
    #[must_use]
    pub fn legal_targets(world: &World) -> Vec<CellCoord> {
        let snapshot = snapshot(world);
        neighbours(world.player.position())
            .into_iter()
            .flatten()
            .filter(|cell| snapshot.is_clickable(*cell))
            .collect()
    }

    /// Reports whether every world invariant currently holds.
    #[must_use]
    pub fn invariants_hold(world: &World) -> bool {
        world.invariants_hold()
    }

    fn neighbours(cell: CellCoord) -> [Option<CellCoord>; 4] {
        let (column, row) = (cell.column(), cell.row());
        [
            row.checked_sub(1).map(|up| CellCoord::new(column, up)),
            column.checked_sub(1).map(|left| CellCoord::new(left, row)),
            column.checked_add(1).map(|right| CellCoord::new(right, row)),
            row.checked_add(1).map(|down| CellCoord::new(column, down)),
        ]
    }
}
