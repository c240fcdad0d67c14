use crossterm::event::KeyCode;

use crate::snake::Direction::{self, *};

/// A raw steering event from the input source. Swipe events report the
/// cumulative displacement of the gesture, measured from where it began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyCode),
    SwipeStart { x: i32, y: i32 },
    SwipeMove { dx: i32, dy: i32 },
}

/// Latches the direction the snake will take on its next step. A candidate
/// pointing straight back into the neck is rejected; anything else
/// overwrites the latch, last writer wins.
pub struct Controls {
    current: Direction,
    next: Direction,
    min_swipe: i32,
}

impl Controls {
    pub fn new(initial: Direction, min_swipe: i32) -> Self {
        Controls {
            current: initial,
            next: initial,
            min_swipe,
        }
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(code) => {
                if let Some(dir) = direction_for_key(code) {
                    self.set_direction(dir);
                }
            }
            // Gesture bookkeeping lives at the event source
            InputEvent::SwipeStart { .. } => {}
            InputEvent::SwipeMove { dx, dy } => {
                if let Some(dir) = swipe_direction(dx, dy, self.min_swipe) {
                    self.set_direction(dir);
                }
            }
        }
    }

    pub fn set_direction(&mut self, candidate: Direction) {
        if candidate != self.current.opposite() {
            self.next = candidate;
        }
    }

    /// Promote the latched direction at the start of a step.
    pub fn commit(&mut self) -> Direction {
        self.current = self.next;
        self.current
    }
}

#[cfg(test)]
impl Controls {
    pub fn current(&self) -> Direction {
        self.current
    }
}

fn direction_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Up),
        KeyCode::Down => Some(Down),
        KeyCode::Left => Some(Left),
        KeyCode::Right => Some(Right),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(Up),
            's' => Some(Down),
            'a' => Some(Left),
            'd' => Some(Right),
            _ => None,
        },
        _ => None,
    }
}

/// Resolve a swipe along its dominant axis; horizontal wins ties. Nothing
/// is accepted until the dominant displacement reaches the threshold.
fn swipe_direction(dx: i32, dy: i32, min: i32) -> Option<Direction> {
    if dx.abs() >= dy.abs() {
        if dx.abs() < min {
            return None;
        }
        Some(if dx < 0 { Left } else { Right })
    } else {
        if dy.abs() < min {
            return None;
        }
        Some(if dy < 0 { Up } else { Down })
    }
}
