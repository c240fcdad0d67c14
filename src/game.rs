use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::grid::Grid;
use crate::input::{Controls, InputEvent};
use crate::snake::{Direction, Snake};
use crate::Cell;

const START_CELL: Cell = (3, 3);
const START_DIRECTION: Direction = Direction::Right;
const SAMPLE_ATTEMPTS: u32 = 1_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndReason {
    Died,
    Won,
}

impl EndReason {
    pub fn message(self) -> &'static str {
        match self {
            EndReason::Died => "GG! You died!",
            EndReason::Won => "Nice! You won!",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Running,
    Over(EndReason),
}

/// What a single step did, so the caller can repaint or announce.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The game was already over; nothing happened.
    Idle,
    Moved,
    Ended(EndReason),
}

/// The whole game state: body, food, latched direction and status.
/// Mutated only through `handle_input` and `advance`.
pub struct Game {
    grid: Grid,
    snake: Snake,
    food: Vec<Cell>,
    controls: Controls,
    status: Status,
}

impl Game {
    pub fn new(config: &GameConfig) -> Self {
        let grid = Grid::new(config.grid_width, config.grid_height);
        let mut game = Game {
            grid,
            snake: Snake::new(START_CELL, 1, START_DIRECTION),
            food: Vec::with_capacity(config.food_count),
            controls: Controls::new(START_DIRECTION, config.swipe_threshold),
            status: Status::Running,
        };

        while game.food.len() < config.food_count {
            match game.sample_free_cell() {
                Some(cell) => game.food.push(cell),
                None => break,
            }
        }
        game
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.controls.handle(event);
    }

    /// One step of the simulation. A no-op once the game is over.
    pub fn advance(&mut self) -> TickOutcome {
        if matches!(self.status, Status::Over(_)) {
            return TickOutcome::Idle;
        }

        let (dx, dy) = self.controls.commit().delta();
        let (hx, hy) = self.snake.head();
        let candidate = (hx + dx, hy + dy);

        // The tail still counts here: it has not been vacated yet when the
        // head arrives.
        if !self.grid.is_playable(candidate) || self.snake.contains(candidate) {
            self.status = Status::Over(EndReason::Died);
            return TickOutcome::Ended(EndReason::Died);
        }

        let eaten = self.food.iter().position(|&f| f == candidate);
        self.snake.advance(candidate, eaten.is_some());

        if let Some(i) = eaten {
            self.food.swap_remove(i);
            if let Some(cell) = self.sample_free_cell() {
                self.food.push(cell);
            }
        }

        if self.snake.len() >= self.grid.playable_area() {
            self.status = Status::Over(EndReason::Won);
            return TickOutcome::Ended(EndReason::Won);
        }
        TickOutcome::Moved
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn snake_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.snake.cells()
    }

    pub fn food_cells(&self) -> &[Cell] {
        &self.food
    }

    ///////////////////////////////////////////////////////////////////////////

    /// A uniformly random free playable cell. Rejection-samples up to a
    /// fixed number of attempts, then falls back to picking from the cells
    /// that are actually left. None only when the board is packed.
    fn sample_free_cell(&self) -> Option<Cell> {
        let mut rng = rand::thread_rng();

        for _ in 0..SAMPLE_ATTEMPTS {
            let cell = (
                rng.gen_range(1..self.grid.width - 1),
                rng.gen_range(1..self.grid.height - 1),
            );
            if self.is_free(cell) {
                return Some(cell);
            }
        }

        let free: Vec<Cell> = self
            .grid
            .playable_cells()
            .filter(|&c| self.is_free(c))
            .collect();
        free.choose(&mut rng).copied()
    }

    fn is_free(&self, cell: Cell) -> bool {
        !self.snake.contains(cell) && !self.food.contains(&cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::Direction::*;

    fn fixture(grid: Grid, snake: Snake, food: Vec<Cell>, direction: Direction) -> Game {
        Game {
            grid,
            snake,
            food,
            controls: Controls::new(direction, 20),
            status: Status::Running,
        }
    }

    #[test]
    fn new_game_seeds_a_full_food_set() {
        let config = GameConfig::small();
        let game = Game::new(&config);

        assert_eq!(game.status, Status::Running);
        assert_eq!(game.snake.head(), (3, 3));
        assert_eq!(game.snake.len(), 1);
        assert_eq!(game.food.len(), config.food_count);

        for (i, &cell) in game.food.iter().enumerate() {
            assert!(game.grid.is_playable(cell));
            assert!(!game.snake.contains(cell));
            assert!(!game.food[i + 1..].contains(&cell), "duplicate food cell");
        }
    }

    #[test]
    fn running_into_a_wall_ends_the_game_without_moving() {
        let mut game = fixture(
            Grid::new(10, 10),
            Snake::new((1, 5), 1, Left),
            vec![(8, 8)],
            Left,
        );

        assert_eq!(game.advance(), TickOutcome::Ended(EndReason::Died));
        assert_eq!(game.status, Status::Over(EndReason::Died));
        let body: Vec<Cell> = game.snake.cells().collect();
        assert_eq!(body, vec![(1, 5)], "body untouched by the fatal step");
        assert_eq!(game.food, vec![(8, 8)]);
    }

    #[test]
    fn running_into_the_body_ends_the_game() {
        // Head at (5,6), neck at (5,5); forcing the direction straight into
        // the neck bypasses the latch and must still be fatal.
        let snake = Snake::from_cells(vec![(5, 6), (5, 5), (4, 5), (3, 5)]);
        let mut game = fixture(Grid::new(10, 10), snake, vec![(8, 8)], Up);

        assert_eq!(game.advance(), TickOutcome::Ended(EndReason::Died));
        assert_eq!(game.snake.len(), 4);
    }

    #[test]
    fn self_collision_after_a_legal_loop() {
        let snake = Snake::new((5, 5), 4, Right);
        let mut game = fixture(Grid::new(10, 10), snake, vec![(8, 8)], Right);

        game.controls.set_direction(Down);
        assert_eq!(game.advance(), TickOutcome::Moved);
        game.controls.set_direction(Left);
        assert_eq!(game.advance(), TickOutcome::Moved);
        game.controls.set_direction(Up);
        assert_eq!(game.advance(), TickOutcome::Ended(EndReason::Died));
    }

    #[test]
    fn moving_into_the_departing_tail_is_fatal() {
        // A 2x2 block; the head would swap into the cell the tail is about
        // to leave. The strict rule counts that as a collision.
        let snake = Snake::from_cells(vec![(2, 1), (2, 2), (1, 2), (1, 1)]);
        let mut game = fixture(Grid::new(5, 5), snake, vec![(3, 3)], Left);

        assert_eq!(game.advance(), TickOutcome::Ended(EndReason::Died));
    }

    #[test]
    fn eating_grows_and_replenishes_the_food_set() {
        let snake = Snake::new((5, 5), 3, Right);
        let mut game = fixture(Grid::new(10, 10), snake, vec![(6, 5), (8, 8)], Right);

        assert_eq!(game.advance(), TickOutcome::Moved);
        assert_eq!(game.snake.len(), 4);
        assert_eq!(game.snake.head(), (6, 5));
        assert!(game.snake.contains((3, 5)), "tail retained on a growing move");

        assert_eq!(game.food.len(), 2);
        assert!(!game.food.contains(&(6, 5)), "consumed cell is gone");
        assert!(game.food.contains(&(8, 8)));
        let replacement = *game.food.iter().find(|&&f| f != (8, 8)).unwrap();
        assert!(game.grid.is_playable(replacement));
        assert!(!game.snake.contains(replacement));
    }

    #[test]
    fn a_plain_move_keeps_the_length() {
        let snake = Snake::new((5, 5), 3, Right);
        let mut game = fixture(Grid::new(10, 10), snake, vec![(8, 8)], Right);

        assert_eq!(game.advance(), TickOutcome::Moved);
        assert_eq!(game.snake.len(), 3);
        assert_eq!(game.snake.head(), (6, 5));
        assert!(!game.snake.contains((3, 5)), "tail vacated");
    }

    #[test]
    fn replenishment_lands_on_the_only_free_cell() {
        // 3x3 playable region, 7 body cells, food on one of the two free
        // cells. After eating, the single remaining free cell must receive
        // the replacement, through the sampling fallback if need be.
        let snake = Snake::from_cells(vec![
            (2, 1),
            (1, 1),
            (1, 2),
            (1, 3),
            (2, 3),
            (3, 3),
            (3, 2),
        ]);
        let mut game = fixture(Grid::new(5, 5), snake, vec![(3, 1)], Right);

        assert_eq!(game.advance(), TickOutcome::Moved);
        assert_eq!(game.snake.len(), 8);
        assert_eq!(game.food, vec![(2, 2)]);
    }

    #[test]
    fn filling_the_board_wins() {
        // 8 of 9 playable cells occupied; the last one holds food.
        let snake = Snake::from_cells(vec![
            (2, 1),
            (2, 2),
            (3, 2),
            (3, 3),
            (2, 3),
            (1, 3),
            (1, 2),
            (1, 1),
        ]);
        let mut game = fixture(Grid::new(5, 5), snake, vec![(3, 1)], Right);

        assert_eq!(game.advance(), TickOutcome::Ended(EndReason::Won));
        assert_eq!(game.status, Status::Over(EndReason::Won));
        assert_eq!(game.snake.len(), game.grid.playable_area());
        assert!(game.food.is_empty(), "no free cell left to hold food");
    }

    #[test]
    fn a_finished_game_never_advances_again() {
        let mut game = fixture(
            Grid::new(10, 10),
            Snake::new((1, 5), 1, Left),
            vec![(8, 8)],
            Left,
        );
        assert_eq!(game.advance(), TickOutcome::Ended(EndReason::Died));

        for _ in 0..3 {
            assert_eq!(game.advance(), TickOutcome::Idle);
        }
        assert_eq!(game.snake.len(), 1);
        assert_eq!(game.food, vec![(8, 8)]);
        assert_eq!(game.status, Status::Over(EndReason::Died));
    }

    #[test]
    fn direction_changes_apply_at_the_next_step() {
        let snake = Snake::new((5, 5), 1, Right);
        let mut game = fixture(Grid::new(10, 10), snake, vec![(8, 8)], Right);

        game.handle_input(InputEvent::Key(crossterm::event::KeyCode::Down));
        assert_eq!(game.advance(), TickOutcome::Moved);
        assert_eq!(game.snake.head(), (5, 6));
    }

    #[test]
    fn invariants_hold_while_wandering() {
        let config = GameConfig::small();
        let mut game = Game::new(&config);

        for _ in 0..200 {
            // Steer toward any survivable neighbor so the walk lasts a while.
            let head = game.snake.head();
            for dir in [Up, Down, Left, Right] {
                if dir == game.controls.current().opposite() {
                    continue;
                }
                let (dx, dy) = dir.delta();
                let cand = (head.0 + dx, head.1 + dy);
                if game.grid.is_playable(cand) && !game.snake.contains(cand) {
                    game.controls.set_direction(dir);
                    break;
                }
            }

            let len_before = game.snake.len();
            let food_before = game.food.clone();

            match game.advance() {
                TickOutcome::Moved => {
                    let ate = food_before.contains(&game.snake.head());
                    let expected = if ate { len_before + 1 } else { len_before };
                    assert_eq!(game.snake.len(), expected);
                    assert_eq!(game.food.len(), config.food_count);
                    for &f in &game.food {
                        assert!(game.grid.is_playable(f));
                        assert!(!game.snake.contains(f));
                    }
                    for c in game.snake.cells() {
                        assert!(game.grid.is_playable(c));
                    }
                }
                TickOutcome::Ended(_) => break,
                TickOutcome::Idle => unreachable!("game was running"),
            }
        }
    }
}
