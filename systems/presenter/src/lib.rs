#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation system translating world events into surface calls.

use maze_escape_core::{
    CellCoord, CombatOutcome, Event, FightChoiceRequest, PresentationSurface, PuzzleRequest,
};
use serde::Deserialize;

/// Message shown for a rejected click.
pub const INVALID_MOVE_MESSAGE: &str = "Invalid move";
/// Message shown before the end-game menu after a win.
pub const VICTORY_MESSAGE: &str = "Congratulations, you escaped";
/// Message shown before the end-game menu after a loss.
pub const DEFEAT_MESSAGE: &str = "You failed to escape";

/// Configuration parameters required to construct the presenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Shows [`INVALID_MOVE_MESSAGE`] whenever a click is rejected.
    pub announce_rejections: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            announce_rejections: true,
        }
    }
}

/// Pure system that forwards requests and notifications to a surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct Presenter {
    config: PresenterConfig,
}

impl Presenter {
    /// Creates a presenter using the supplied configuration.
    #[must_use]
    pub const fn new(config: PresenterConfig) -> Self {
        Self { config }
    }

    /// Consumes a batch of world events in order.
    pub fn handle(&mut self, events: &[Event], surface: &mut dyn PresentationSurface) {
        for event in events {
            self.present(event, surface);
        }
    }

    fn present(&self, event: &Event, surface: &mut dyn PresentationSurface) {
        match event {
            Event::MoveRejected { .. } => {
                if self.config.announce_rejections {
                    surface.show_message(INVALID_MOVE_MESSAGE);
                }
            }
            Event::PuzzlePosed {
                ticket,
                door,
                question,
            } => surface.show_puzzle(PuzzleRequest {
                ticket: *ticket,
                door: *door,
                question: question.clone(),
            }),
            Event::PuzzleSolved { door, bonus } => surface.show_message(&format!(
                "The door at {} opens. +{bonus} points",
                describe(*door)
            )),
            Event::PuzzleFailed { .. } => {
                surface.show_message("Wrong answer. The door stays locked.");
            }
            Event::FightChoiceRequested {
                ticket,
                guardian,
                at,
            } => surface.show_fight_choice(FightChoiceRequest {
                ticket: *ticket,
                guardian: *guardian,
                at: *at,
            }),
            Event::FightCancelled { .. } => {
                surface.show_message("You back away from the guardian.");
            }
            Event::CombatResolved {
                kind,
                outcome: CombatOutcome::Defeat,
                ..
            } => surface.show_message(&format!("The guardian wins the {} duel.", kind.label())),
            Event::GuardianDefeated { at, .. } => {
                surface.show_message(&format!("Guardian at {} defeated!", describe(*at)));
            }
            Event::LifeLost { remaining } => {
                surface.show_message(&format!("You lost a life. Lives left: {remaining}"));
            }
            Event::GameWon => {
                surface.show_message(VICTORY_MESSAGE);
                surface.show_end_game_menu(true);
            }
            Event::GameLost => {
                surface.show_message(DEFEAT_MESSAGE);
                surface.show_end_game_menu(false);
            }
            Event::PlayerMoved { .. }
            | Event::StateChanged { .. }
            | Event::CombatResolved { .. }
            | Event::GuardianRepositioned { .. }
            | Event::ScoreChanged { .. }
            | Event::DecisionIgnored { .. } => {}
        }
    }
}

fn describe(cell: CellCoord) -> String {
    format!("({}, {})", cell.column(), cell.row())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announcements_default_to_on() {
        assert!(PresenterConfig::default().announce_rejections);
        let config: PresenterConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(config, PresenterConfig::default());
    }

    #[test]
    fn cells_are_described_as_column_then_row() {
        assert_eq!(describe(CellCoord::new(3, 1)), "(3, 1)");
    }
}
