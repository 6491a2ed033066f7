//! Text presentation surface writing to any [`Write`] sink.

use std::{collections::VecDeque, io::Write};

use maze_escape_core::{
    Cell, CellCoord, DoorLock, FightChoiceRequest, GameSnapshot, PresentationSurface,
    PuzzleRequest,
};
use tracing::warn;

/// Decision the player still owes the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Prompt {
    /// A puzzle question waiting for an answer.
    Puzzle(PuzzleRequest),
    /// A guardian encounter waiting for a fight style.
    Fight(FightChoiceRequest),
    /// The end-of-game menu.
    EndGame {
        /// Whether the game was won.
        victory: bool,
    },
}

/// Surface that prints the maze as text and queues decision prompts.
#[derive(Debug)]
pub(crate) struct TerminalSurface<W: Write> {
    out: W,
    prompts: VecDeque<Prompt>,
}

impl<W: Write> TerminalSurface<W> {
    /// Creates a surface printing to `out`.
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            prompts: VecDeque::new(),
        }
    }

    /// Removes the oldest prompt still awaiting a response.
    pub(crate) fn take_prompt(&mut self) -> Option<Prompt> {
        self.prompts.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(error) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            warn!(%error, "failed to write to the terminal");
        }
    }
}

/// Glyph drawn for a cell; entities take precedence over terrain.
fn glyph(snapshot: &GameSnapshot, coord: CellCoord, cell: Cell) -> char {
    if snapshot.player().position == coord {
        return '@';
    }
    if snapshot.guardian_at(coord).is_some() {
        return 'G';
    }
    match cell {
        Cell::Floor => '.',
        Cell::Wall => '#',
        Cell::Door(DoorLock::Locked) => 'D',
        Cell::Door(DoorLock::Unlocked) => 'd',
        Cell::Exit => 'E',
    }
}

/// Renders the grid followed by the status line.
pub(crate) fn render(snapshot: &GameSnapshot) -> String {
    let size = snapshot.size() as usize;
    let mut text = String::with_capacity((size + 1) * (size + 1) + 32);

    for (coord, cell) in snapshot.iter_cells() {
        text.push(glyph(snapshot, coord, cell));
        if coord.column() as usize + 1 == size {
            text.push('\n');
        }
    }

    let player = snapshot.player();
    text.push_str(&format!("Score: {} | Lives: {}", player.score, player.lives));
    text
}

impl<W: Write> PresentationSurface for TerminalSurface<W> {
    fn show_message(&mut self, text: &str) {
        self.emit(&format!("* {text}"));
    }

    fn show_puzzle(&mut self, request: PuzzleRequest) {
        self.prompts.push_back(Prompt::Puzzle(request));
    }

    fn show_fight_choice(&mut self, request: FightChoiceRequest) {
        self.prompts.push_back(Prompt::Fight(request));
    }

    fn show_end_game_menu(&mut self, victory: bool) {
        self.emit(if victory { "You Win!" } else { "Game Over!" });
        self.prompts.push_back(Prompt::EndGame { victory });
    }

    fn refresh(&mut self, snapshot: &GameSnapshot) {
        let frame = render(snapshot);
        self.emit(&frame);
    }
}
