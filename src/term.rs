use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseEvent,
};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::game::Game;
use crate::grid::Grid;
use crate::input::InputEvent;
use crate::Cell;

/// What a cell is drawn as.
#[derive(Debug, Clone, Copy)]
pub enum CellTag {
    Wall,
    Snake,
    Food,
}

/// A translated terminal event: either steering input for the game, or a
/// request to leave the session.
pub enum TermEvent {
    Input(InputEvent),
    Quit,
}

pub struct TermManager {
    stdout: Stdout,
    width: u16,
    height: u16,
    // Origin of the mouse drag currently acting as a swipe gesture
    swipe_origin: Option<(i32, i32)>,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("reading terminal size")?;
        Ok(TermManager {
            stdout: stdout(),
            width,
            height,
            swipe_origin: None,
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("entering alternate screen")?;
        terminal::enable_raw_mode().context("enabling raw mode")?;
        execute!(self.stdout, cursor::Hide).context("hiding cursor")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("disabling raw mode")?;
        execute!(
            self.stdout,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("leaving alternate screen")?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("clearing screen")
    }

    pub fn draw_walls(&mut self, grid: &Grid) -> Result<()> {
        for x in 0..grid.width {
            self.fill_cell((x, 0), CellTag::Wall)?;
            self.fill_cell((x, grid.height - 1), CellTag::Wall)?;
        }
        for y in 1..grid.height - 1 {
            self.fill_cell((0, y), CellTag::Wall)?;
            self.fill_cell((grid.width - 1, y), CellTag::Wall)?;
        }
        self.flush()
    }

    /// Full repaint of the playable region: clear, then the snake, then the
    /// food, so food never hides under stale snake cells.
    pub fn redraw(&mut self, game: &Game) -> Result<()> {
        let grid = game.grid();
        self.clear_playable(&grid)?;
        for cell in game.snake_cells() {
            self.fill_cell(cell, CellTag::Snake)?;
        }
        for &cell in game.food_cells() {
            self.fill_cell(cell, CellTag::Food)?;
        }
        queue!(self.stdout, style::ResetColor).context("resetting colors")?;
        self.flush()
    }

    pub fn fill_cell(&mut self, cell: Cell, tag: CellTag) -> Result<()> {
        let (glyph, color) = match tag {
            CellTag::Wall => ('█', Color::DarkGrey),
            CellTag::Snake => ('█', Color::Magenta),
            CellTag::Food => ('O', Color::Cyan),
        };
        queue!(
            self.stdout,
            cursor::MoveTo(cell.0 as u16, cell.1 as u16),
            style::SetForegroundColor(color),
            style::Print(glyph)
        )
        .context("drawing cell")
    }

    /// Centered message box over whatever is on screen.
    pub fn announce(&mut self, lines: &[&str]) -> Result<()> {
        let box_width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 2;
        let box_height = lines.len() + 2;
        let left = (self.width as usize).saturating_sub(box_width) / 2;
        let top = (self.height as usize).saturating_sub(box_height) / 2;

        queue!(self.stdout, style::ResetColor).context("resetting colors")?;
        for row in 0..box_height {
            let text = if row == 0 || row == box_height - 1 {
                " ".repeat(box_width)
            } else {
                format!("{: ^width$}", lines[row - 1], width = box_width)
            };
            queue!(
                self.stdout,
                cursor::MoveTo(left as u16, (top + row) as u16),
                style::Print(text)
            )
            .context("drawing message")?;
        }
        self.flush()
    }

    /// Collect whatever input arrives within `wait`, translated for the
    /// game. Returns early once something is read.
    pub fn poll_events(&mut self, wait: Duration) -> Result<Vec<TermEvent>> {
        let mut events = Vec::new();
        let mut timeout = wait;

        while poll(timeout).context("polling input")? {
            if let Some(event) = self.translate(read().context("reading input")?) {
                events.push(event);
            }
            // Drain anything else already queued
            timeout = Duration::from_millis(0);
        }
        Ok(events)
    }

    /// Block until a key arrives. False means the player wants out.
    pub fn wait_for_key(&mut self) -> Result<bool> {
        loop {
            if let Event::Key(key) = read().context("reading input")? {
                return Ok(!is_quit(&key));
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn translate(&mut self, event: Event) -> Option<TermEvent> {
        match event {
            Event::Key(key) if is_quit(&key) => Some(TermEvent::Quit),
            Event::Key(KeyEvent { code, .. }) => Some(TermEvent::Input(InputEvent::Key(code))),
            Event::Mouse(MouseEvent::Down(_, x, y, _)) => {
                self.swipe_origin = Some((x as i32, y as i32));
                Some(TermEvent::Input(InputEvent::SwipeStart {
                    x: x as i32,
                    y: y as i32,
                }))
            }
            Event::Mouse(MouseEvent::Drag(_, x, y, _)) => {
                let (ox, oy) = self.swipe_origin?;
                Some(TermEvent::Input(InputEvent::SwipeMove {
                    dx: x as i32 - ox,
                    dy: y as i32 - oy,
                }))
            }
            Event::Mouse(MouseEvent::Up(..)) => {
                self.swipe_origin = None;
                None
            }
            _ => None,
        }
    }

    fn clear_playable(&mut self, grid: &Grid) -> Result<()> {
        let blank = " ".repeat(grid.width as usize - 2);
        for y in 1..grid.height - 1 {
            queue!(self.stdout, cursor::MoveTo(1, y as u16), style::Print(&blank))
                .context("clearing play area")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("flushing terminal output")
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(
        key,
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL
        }
    ) || matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
}
