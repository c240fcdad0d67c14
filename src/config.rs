use anyhow::{ensure, Result};

use crate::Coord;

/// Everything fixed at startup. Runtime never mutates these.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub grid_width: Coord,
    pub grid_height: Coord,
    pub food_count: usize,
    pub tick_ms: u64,
    pub swipe_threshold: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_width: 40,
            grid_height: 30,
            food_count: 12,
            tick_ms: 500,
            swipe_threshold: 20,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width >= 5 && self.grid_height >= 5,
            "grid must be at least 5x5, got {}x{}",
            self.grid_width,
            self.grid_height,
        );
        ensure!(self.tick_ms > 0, "tick period must be positive");
        ensure!(self.food_count > 0, "at least one food cell is required");

        let area = (self.grid_width as usize - 2) * (self.grid_height as usize - 2);
        ensure!(
            self.food_count + 1 < area,
            "{} food cells leave no room to move on a {}x{} grid",
            self.food_count,
            self.grid_width,
            self.grid_height,
        );
        Ok(())
    }

    #[cfg(test)]
    pub fn small() -> Self {
        GameConfig {
            grid_width: 10,
            grid_height: 10,
            ..Default::default()
        }
    }
}
