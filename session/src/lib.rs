#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wiring of one world, one interaction channel and one presentation surface.
//!
//! A [`Session`] covers a single play-through. Clicks published on its channel
//! become move attempts; decisions requested from the surface come back
//! through [`Session::answer_puzzle`] and [`Session::choose_fight`]. After
//! every command the presenter runs and the surface is refreshed from a fresh
//! snapshot.

use std::{cell::RefCell, fmt, rc::Rc};

use maze_escape_channel::{InteractionChannel, SubscriptionId};
use maze_escape_core::{
    ClickEvent, Command, DecisionTicket, EngineState, Event, GameSnapshot, PresentationSurface,
};
use maze_escape_system_presenter::Presenter;
use maze_escape_world::{self as world, query, World};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by session operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session was re-entered while it was already dispatching a command.
    #[error("session is already dispatching a command")]
    Busy,
}

struct Wiring<S> {
    world: World,
    presenter: Presenter,
    surface: S,
}

impl<S: PresentationSurface> Wiring<S> {
    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.presenter.handle(&events, &mut self.surface);
        self.refresh();
        events
    }

    fn refresh(&mut self) {
        let snapshot = query::snapshot(&self.world);
        self.surface.refresh(&snapshot);
    }
}

/// One play-through wired to a presentation surface.
pub struct Session<S: PresentationSurface + 'static> {
    channel: Rc<InteractionChannel<ClickEvent>>,
    wiring: Rc<RefCell<Wiring<S>>>,
    subscription: SubscriptionId,
}

impl<S: PresentationSurface + 'static> Session<S> {
    /// Creates a session with a channel of its own.
    #[must_use]
    pub fn new(world: World, presenter: Presenter, surface: S) -> Self {
        Self::with_channel(Rc::new(InteractionChannel::new()), world, presenter, surface)
    }

    /// Creates a session listening on an existing channel.
    ///
    /// The click handler is removed again when the session is dropped, so a
    /// channel can outlive any number of restarted sessions.
    #[must_use]
    pub fn with_channel(
        channel: Rc<InteractionChannel<ClickEvent>>,
        world: World,
        presenter: Presenter,
        surface: S,
    ) -> Self {
        let wiring = Rc::new(RefCell::new(Wiring {
            world,
            presenter,
            surface,
        }));

        let handler_wiring = Rc::downgrade(&wiring);
        let subscription = channel.subscribe(move |click: &ClickEvent| {
            let Some(wiring) = handler_wiring.upgrade() else {
                return;
            };
            let Ok(mut wiring) = wiring.try_borrow_mut() else {
                warn!(cell = ?click.target, "click dropped while a command is in flight");
                return;
            };
            debug!(cell = ?click.target, "click received");
            let _ = wiring.dispatch(Command::AttemptMove {
                target: click.target,
            });
        });

        wiring.borrow_mut().refresh();

        Self {
            channel,
            wiring,
            subscription,
        }
    }

    /// Channel carrying clicks into this session.
    #[must_use]
    pub fn channel(&self) -> &Rc<InteractionChannel<ClickEvent>> {
        &self.channel
    }

    /// Delivers the answer to the outstanding puzzle request.
    pub fn answer_puzzle(
        &self,
        ticket: DecisionTicket,
        answer: &str,
    ) -> Result<Vec<Event>, SessionError> {
        self.dispatch(Command::AnswerPuzzle {
            ticket,
            answer: answer.to_owned(),
        })
    }

    /// Delivers the fight style chosen for the outstanding fight request.
    pub fn choose_fight(
        &self,
        ticket: DecisionTicket,
        choice: &str,
    ) -> Result<Vec<Event>, SessionError> {
        self.dispatch(Command::ChooseFight {
            ticket,
            choice: choice.to_owned(),
        })
    }

    /// Current engine state.
    pub fn state(&self) -> Result<EngineState, SessionError> {
        self.read(|wiring| query::state(&wiring.world))
    }

    /// Ticket of the outstanding decision request, if any.
    pub fn pending_ticket(&self) -> Result<Option<DecisionTicket>, SessionError> {
        self.read(|wiring| query::pending_ticket(&wiring.world))
    }

    /// Owned snapshot of the world.
    pub fn snapshot(&self) -> Result<GameSnapshot, SessionError> {
        self.read(|wiring| query::snapshot(&wiring.world))
    }

    /// Runs `f` against the surface, e.g. to collect queued prompts.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R, SessionError> {
        let mut wiring = self
            .wiring
            .try_borrow_mut()
            .map_err(|_| SessionError::Busy)?;
        Ok(f(&mut wiring.surface))
    }

    fn dispatch(&self, command: Command) -> Result<Vec<Event>, SessionError> {
        let mut wiring = self
            .wiring
            .try_borrow_mut()
            .map_err(|_| SessionError::Busy)?;
        Ok(wiring.dispatch(command))
    }

    fn read<R>(&self, f: impl FnOnce(&Wiring<S>) -> R) -> Result<R, SessionError> {
        let wiring = self.wiring.try_borrow().map_err(|_| SessionError::Busy)?;
        Ok(f(&wiring))
    }
}

impl<S: PresentationSurface + 'static> Drop for Session<S> {
    fn drop(&mut self) {
        let _ = self.channel.unsubscribe(self.subscription);
    }
}

impl<S: PresentationSurface + 'static> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("channel", &self.channel)
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}
