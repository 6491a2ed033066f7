#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Maze Escape in a terminal.

mod config;
mod level_file;
mod terminal;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    rc::Rc,
};

use anyhow::{Context, Result};
use clap::Parser;
use maze_escape_channel::InteractionChannel;
use maze_escape_core::{ClickEvent, Difficulty, EndGameChoice, WELCOME_BANNER};
use maze_escape_session::Session;
use maze_escape_system_presenter::Presenter;
use maze_escape_world::World;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    config::CliConfig,
    terminal::{Prompt, TerminalSurface},
};

/// Escape the maze by clicking (typing) adjacent cells.
#[derive(Debug, Parser)]
#[command(name = "maze-escape", version)]
struct Args {
    /// Level file in TOML; the built-in level is used when omitted.
    #[arg(long, value_name = "TOML")]
    level: Option<PathBuf>,

    /// Configuration file in TOML.
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Seed for luck fights; a random seed is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Difficulty preset: easy, normal or hard. Asked for when omitted.
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, String> {
    Difficulty::parse(raw).ok_or_else(|| format!("unknown difficulty {raw:?}"))
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = CliConfig::load(args.config.as_deref())?;
    let level = level_file::load(args.level.as_deref())?;

    println!("{WELCOME_BANNER}");

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let difficulty = match args.difficulty {
        Some(difficulty) => Some(difficulty),
        None => choose_difficulty(&mut input)?,
    };
    let engine_config = match difficulty {
        Some(difficulty) => config.engine.clone().with_difficulty(difficulty),
        None => config.engine.clone(),
    };
    info!(?difficulty, lives = engine_config.starting_lives, "engine configured");

    println!("Type a cell as \"column row\" to move; \"quit\" leaves.");

    let channel = Rc::new(InteractionChannel::new());

    for round in 0_u64.. {
        let seed = args
            .seed
            .map_or_else(rand::random, |seed| seed.wrapping_add(round));
        info!(round, seed, "starting play-through");

        let world = World::with_seed(level.clone(), engine_config.clone(), seed);
        let session = Session::with_channel(
            Rc::clone(&channel),
            world,
            Presenter::new(config.presenter),
            TerminalSurface::new(io::stdout()),
        );

        match play(&session, &mut input)? {
            EndGameChoice::Restart => debug!("restarting"),
            EndGameChoice::Exit => break,
        }
    }

    Ok(())
}

/// Drives one session until the player picks an end-game option.
fn play<W: Write + 'static>(
    session: &Session<TerminalSurface<W>>,
    input: &mut impl BufRead,
) -> Result<EndGameChoice> {
    loop {
        let prompt = session.with_surface(TerminalSurface::take_prompt)?;

        match prompt {
            Some(Prompt::Puzzle(request)) => {
                let Some(answer) = ask(input, &format!("Puzzle: {}", request.question))? else {
                    return Ok(EndGameChoice::Exit);
                };
                let _ = session.answer_puzzle(request.ticket, &answer)?;
            }
            Some(Prompt::Fight(request)) => {
                let Some(choice) = ask(input, "A guardian blocks the way. Fight with logic or luck?")?
                else {
                    return Ok(EndGameChoice::Exit);
                };
                let _ = session.choose_fight(request.ticket, &choice)?;
            }
            Some(Prompt::EndGame { victory }) => {
                debug!(victory, "end-game menu");
                return end_game_menu(input);
            }
            None => {
                let Some(line) = ask(input, "Move")? else {
                    return Ok(EndGameChoice::Exit);
                };
                if line.trim().eq_ignore_ascii_case("quit") {
                    return Ok(EndGameChoice::Exit);
                }
                match parse_click(&line) {
                    Some(click) => session.channel().publish(&click),
                    None => println!("Enter a cell as \"column row\", e.g. \"1 0\"."),
                }
            }
        }
    }
}

fn end_game_menu(input: &mut impl BufRead) -> Result<EndGameChoice> {
    loop {
        let Some(line) = ask(input, "restart or exit?")? else {
            return Ok(EndGameChoice::Exit);
        };
        match EndGameChoice::parse(&line) {
            Some(choice) => return Ok(choice),
            None => println!("Please answer \"restart\" or \"exit\"."),
        }
    }
}

const DIFFICULTY_QUESTION: &str = "Difficulty: easy, normal or hard? (blank keeps the config)";

/// Asks for a difficulty preset. A blank answer or end of input keeps the
/// configured lives and guardian offset.
fn choose_difficulty(input: &mut impl BufRead) -> Result<Option<Difficulty>> {
    loop {
        let Some(line) = ask(input, DIFFICULTY_QUESTION)? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            return Ok(None);
        }
        match Difficulty::parse(&line) {
            Some(difficulty) => return Ok(Some(difficulty)),
            None => println!("Please answer \"easy\", \"normal\" or \"hard\"."),
        }
    }
}

/// Prints `question` and reads one line. `None` signals end of input.
fn ask(input: &mut impl BufRead, question: &str) -> Result<Option<String>> {
    print!("{question} > ");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok((read > 0).then(|| line.trim_end_matches(['\r', '\n']).to_owned()))
}

/// Parses "column row" (space or comma separated) into a click.
fn parse_click(line: &str) -> Option<ClickEvent> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty());
    let column = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(ClickEvent::at(column, row))
}
