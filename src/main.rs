mod config;
mod game;
mod grid;
mod input;
mod snake;
mod term;

use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use clap::Parser;

use crate::config::GameConfig;
use crate::game::{EndReason, Game, TickOutcome};
use crate::term::{TermEvent, TermManager};

pub type Coord = i16;
pub type Cell = (Coord, Coord);

#[derive(Parser)]
#[command(name = "serpent", version, about = "Terminal snake on a walled grid")]
struct Cli {
    /// Grid width, walls included
    #[arg(long, default_value_t = 40)]
    width: Coord,

    /// Grid height, walls included
    #[arg(long, default_value_t = 30)]
    height: Coord,

    /// Number of food cells kept on the board
    #[arg(long = "food", default_value_t = 12)]
    food_count: usize,

    /// Milliseconds between game steps
    #[arg(long = "tick", default_value_t = 500)]
    tick_ms: u64,

    /// Minimum drag distance before a swipe steers the snake
    #[arg(long, default_value_t = 20)]
    swipe_threshold: i32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = GameConfig {
        grid_width: cli.width,
        grid_height: cli.height,
        food_count: cli.food_count,
        tick_ms: cli.tick_ms,
        swipe_threshold: cli.swipe_threshold,
    };
    config.validate()?;

    let mut term = TermManager::new().context("initializing terminal")?;
    let (cols, rows) = term.size();
    ensure!(
        cols >= config.grid_width as u16 && rows >= config.grid_height as u16,
        "terminal is {}x{} but a {}x{} grid was requested",
        cols,
        rows,
        config.grid_width,
        config.grid_height,
    );

    term.setup()?;
    let result = run(&mut term, &config);
    // Leave the terminal usable before reporting any error
    term.restore()?;
    result
}

fn run(term: &mut TermManager, config: &GameConfig) -> Result<()> {
    term.announce(&[
        "Arrow keys or WASD to move,",
        "or drag with the mouse to swipe.",
        "Esc or q to quit",
        "",
        "Press any key to begin",
    ])?;

    if !term.wait_for_key()? {
        return Ok(());
    }

    loop {
        if !play_round(term, config)? {
            return Ok(());
        }
    }
}

/// One full game, from a fresh board to a terminal state. Returns false
/// when the player quit instead of asking for another round.
fn play_round(term: &mut TermManager, config: &GameConfig) -> Result<bool> {
    let mut game = Game::new(config);

    term.clear()?;
    term.draw_walls(&game.grid())?;
    term.redraw(&game)?;

    let tick = Duration::from_millis(config.tick_ms);
    let mut next_tick = Instant::now() + tick;

    loop {
        let wait = next_tick.saturating_duration_since(Instant::now());
        for event in term.poll_events(wait)? {
            match event {
                TermEvent::Quit => return Ok(false),
                TermEvent::Input(input) => game.handle_input(input),
            }
        }

        if Instant::now() < next_tick {
            continue;
        }
        next_tick += tick;

        match game.advance() {
            TickOutcome::Moved => term.redraw(&game)?,
            TickOutcome::Ended(reason) => {
                if reason == EndReason::Won {
                    term.redraw(&game)?;
                }
                term.announce(&[
                    reason.message(),
                    "",
                    "Press any key to play again,",
                    "or q to quit.",
                ])?;
                return term.wait_for_key();
            }
            TickOutcome::Idle => {}
        }
    }
}
