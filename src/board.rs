use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::GridSize;
use crate::input::Direction;
use crate::level::{CellKind, Grid, Level, LevelError};
use crate::pickup::spawn_position;
use crate::snake::{Position, Snake, Tile, spawn_trail};

/// Errors raised by board construction and stepping.
///
/// Crashing into a wall, obstacle or the snake itself is not an error; it is
/// reported as [`StepOutcome::Crashed`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum BoardError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("level has no empty cell to place the pickup on")]
    EmptyGridHasNoRoomForPickup,
    #[error("board is fully occupied, no empty cell is left")]
    NoEmptyTileAvailable,
    #[error("snake must have at least one segment")]
    ZeroLengthSnake,
    #[error("snake spawn cell ({}, {}) lies outside the level", .0.x, .0.y)]
    SnakeOutOfBoundsAtSpawn(Position),
    #[error("snake spawn cell ({}, {}) overlaps an obstacle", .0.x, .0.y)]
    SnakeOverlapsObstacleAtSpawn(Position),
    #[error("no snake has been placed on the board")]
    SnakeNotPlaced,
    #[error("cell ({}, {}) cannot hold the pickup", .0.x, .0.y)]
    PickupCellUnavailable(Position),
}

/// Result of one board step.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StepOutcome {
    /// The snake advanced one cell without eating.
    Moved,
    /// The snake advanced onto the pickup and grew by one segment.
    PickedUp,
    /// The step would have left the grid or hit an obstacle or the snake.
    /// Nothing on the board changed.
    Crashed,
}

/// Receives board notifications. Each fires at most once per step, and never
/// both in the same step.
pub trait BoardListener {
    fn on_snake_crashed(&mut self) {}

    fn on_item_picked_up(&mut self) {}
}

/// Grid, snake and pickup state advanced one step at a time.
pub struct Board {
    grid: Grid,
    obstacles: Vec<Tile>,
    snake: Option<Snake>,
    pickup: Option<Position>,
    rng: StdRng,
    listeners: Vec<Box<dyn BoardListener>>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.grid.size())
            .field("obstacles", &self.obstacles.len())
            .field("snake", &self.snake)
            .field("pickup", &self.pickup)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Builds a board from raw level rows and places the first pickup.
    pub fn construct_level(
        raw_rows: &[Vec<i32>],
        length: usize,
        width: usize,
        rng: StdRng,
    ) -> Result<Self, BoardError> {
        let level = Level::build(raw_rows, length, width)?;
        Self::from_level(level, rng)
    }

    /// Creates a deterministic board for tests and reproducible simulations.
    pub fn construct_level_with_seed(
        raw_rows: &[Vec<i32>],
        length: usize,
        width: usize,
        seed: u64,
    ) -> Result<Self, BoardError> {
        Self::construct_level(raw_rows, length, width, StdRng::seed_from_u64(seed))
    }

    /// Builds a board from an already parsed level.
    pub fn from_level(level: Level, mut rng: StdRng) -> Result<Self, BoardError> {
        let Level { mut grid, obstacles } = level;
        let pickup =
            spawn_position(&mut rng, &grid).ok_or(BoardError::EmptyGridHasNoRoomForPickup)?;
        grid.set(pickup, CellKind::Pickup);

        info!(
            width = grid.size().width,
            length = grid.size().length,
            obstacles = obstacles.len(),
            "level constructed"
        );

        Ok(Self {
            grid,
            obstacles,
            snake: None,
            pickup: Some(pickup),
            rng,
            listeners: Vec::new(),
        })
    }

    /// Replaces the level in place, dropping the snake and obstacles of the
    /// previous one. Listeners and the random source are kept.
    ///
    /// On error the board is left untouched.
    pub fn reset_level(
        &mut self,
        raw_rows: &[Vec<i32>],
        length: usize,
        width: usize,
    ) -> Result<(), BoardError> {
        let Level { mut grid, obstacles } = Level::build(raw_rows, length, width)?;
        let pickup =
            spawn_position(&mut self.rng, &grid).ok_or(BoardError::EmptyGridHasNoRoomForPickup)?;
        grid.set(pickup, CellKind::Pickup);

        self.grid = grid;
        self.obstacles = obstacles;
        self.snake = None;
        self.pickup = Some(pickup);
        Ok(())
    }

    /// Registers a listener for crash and pickup notifications.
    pub fn subscribe(&mut self, listener: Box<dyn BoardListener>) {
        self.listeners.push(listener);
    }

    /// Places the snake with its head on the center cell, trailing
    /// `initial_length - 1` cells behind it, opposite to `initial_direction`.
    ///
    /// The whole footprint is validated before anything is written: every cell
    /// must be on the grid and free of obstacles. A previous snake is removed.
    /// If the footprint covers the pickup, the pickup moves elsewhere.
    pub fn add_snake(
        &mut self,
        initial_direction: Direction,
        initial_length: usize,
    ) -> Result<(), BoardError> {
        if initial_length == 0 {
            return Err(BoardError::ZeroLengthSnake);
        }

        let size = self.grid.size();
        let head = Position::new(
            i32::try_from(size.width / 2).unwrap_or(i32::MAX),
            i32::try_from(size.length / 2).unwrap_or(i32::MAX),
        );

        // The trail is a straight line, so it leaves the grid after at most
        // one grid dimension of cells.
        for tile in spawn_trail(head, initial_direction).take(initial_length) {
            match self.grid.kind_at(tile.position) {
                None => return Err(BoardError::SnakeOutOfBoundsAtSpawn(tile.position)),
                Some(CellKind::Obstacle) => {
                    return Err(BoardError::SnakeOverlapsObstacleAtSpawn(tile.position));
                }
                Some(_) => {}
            }
        }
        let footprint: Vec<Tile> = spawn_trail(head, initial_direction)
            .take(initial_length)
            .collect();

        if let Some(previous) = self.snake.take() {
            for tile in previous.tiles() {
                self.grid.set(tile.position, CellKind::Empty);
            }
        }

        let covers_pickup = footprint
            .iter()
            .any(|tile| Some(tile.position) == self.pickup);
        for tile in &footprint {
            self.grid.set(tile.position, CellKind::Snake);
        }
        self.snake = Snake::from_tiles(footprint);

        if covers_pickup {
            self.pickup = None;
            self.generate_pickup()?;
        }

        debug!(?head, ?initial_direction, initial_length, "snake placed");
        Ok(())
    }

    /// Advances the snake one cell towards `direction`.
    ///
    /// The cell the tail is leaving counts as free, so the head may follow
    /// directly into it. A crash leaves the board exactly as it was and fires
    /// only the crash notification. Eating the pickup grows the snake by its
    /// old tail, relocates the pickup and then fires the pickup notification.
    pub fn update_board(&mut self, direction: Direction) -> Result<StepOutcome, BoardError> {
        let Some(snake) = self.snake.as_mut() else {
            return Err(BoardError::SnakeNotPlaced);
        };
        let tail = snake.tail();
        let destination = snake.head().position.stepped(direction);

        let crashed = match self.grid.kind_at(destination) {
            None | Some(CellKind::Obstacle) => true,
            Some(CellKind::Snake) => destination != tail.position,
            Some(CellKind::Empty | CellKind::Pickup) => false,
        };

        if crashed {
            debug!(?destination, ?direction, "snake crashed");
            self.notify(StepOutcome::Crashed);
            return Ok(StepOutcome::Crashed);
        }

        let picking_up = self.pickup == Some(destination);

        self.grid.set(tail.position, CellKind::Empty);
        let vacated = snake.advance(Tile::new(destination, direction));
        self.grid.set(destination, CellKind::Snake);

        if !picking_up {
            return Ok(StepOutcome::Moved);
        }

        self.grid.set(vacated.position, CellKind::Snake);
        snake.grow(vacated);
        let length = snake.len();
        self.pickup = None;
        self.generate_pickup()?;

        debug!(head = ?destination, length, pickup = ?self.pickup, "pickup eaten");
        self.notify(StepOutcome::PickedUp);
        Ok(StepOutcome::PickedUp)
    }

    /// Picks a uniformly random empty cell.
    pub fn random_empty_tile(&mut self) -> Result<Position, BoardError> {
        spawn_position(&mut self.rng, &self.grid).ok_or(BoardError::NoEmptyTileAvailable)
    }

    /// Moves the pickup to `position`, which must be empty (or already the pickup).
    ///
    /// Also restores a pickup after a full board left none in play.
    pub fn place_pickup(&mut self, position: Position) -> Result<(), BoardError> {
        match self.grid.kind_at(position) {
            Some(CellKind::Empty | CellKind::Pickup) => {}
            _ => return Err(BoardError::PickupCellUnavailable(position)),
        }

        if let Some(previous) = self.pickup.take() {
            self.grid.set(previous, CellKind::Empty);
        }
        self.grid.set(position, CellKind::Pickup);
        self.pickup = Some(position);
        Ok(())
    }

    /// Relocates the eaten or covered pickup. On a full board no pickup is
    /// left in play.
    fn generate_pickup(&mut self) -> Result<(), BoardError> {
        let position = self.random_empty_tile()?;
        self.grid.set(position, CellKind::Pickup);
        self.pickup = Some(position);
        Ok(())
    }

    fn notify(&mut self, outcome: StepOutcome) {
        for listener in &mut self.listeners {
            match outcome {
                StepOutcome::Crashed => listener.on_snake_crashed(),
                StepOutcome::PickedUp => listener.on_item_picked_up(),
                StepOutcome::Moved => {}
            }
        }
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    /// Cell kind at `position`, or `None` off the grid.
    #[must_use]
    pub fn cell_kind(&self, position: Position) -> Option<CellKind> {
        self.grid.kind_at(position)
    }

    /// Number of grid cells of the given kind.
    #[must_use]
    pub fn count_cells(&self, kind: CellKind) -> usize {
        self.grid.count(kind)
    }

    /// Current pickup cell; `None` once a full board left no room for one.
    #[must_use]
    pub fn pickup_position(&self) -> Option<Position> {
        self.pickup
    }

    #[must_use]
    pub fn obstacle_tiles(&self) -> &[Tile] {
        &self.obstacles
    }

    /// Snake tiles head first; empty before [`Board::add_snake`].
    #[must_use]
    pub fn snake_tiles(&self) -> Vec<Tile> {
        self.snake
            .as_ref()
            .map(|snake| snake.tiles().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn snake_len(&self) -> usize {
        self.snake.as_ref().map_or(0, Snake::len)
    }
}
