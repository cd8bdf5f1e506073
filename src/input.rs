use std::collections::VecDeque;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// All directions in declaration order.
    pub const ALL: [Self; 4] = [Self::Right, Self::Down, Self::Left, Self::Up];

    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Unit vector on the (column, depth) world axes.
    ///
    /// Depth grows "up" the board while grid rows grow downwards, so callers
    /// that move through row space must negate the second component. See
    /// [`Direction::grid_step`].
    #[must_use]
    pub fn world_vector(self) -> (i32, i32) {
        match self {
            Self::Right => (1, 0),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Up => (0, 1),
        }
    }

    /// Unit step in (column, row) grid space: Up decreases the row, Down increases it.
    #[must_use]
    pub fn grid_step(self) -> (i32, i32) {
        let (dx, dz) = self.world_vector();
        (dx, -dz)
    }

    /// Picks one of the four directions uniformly.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Error returned when a direction token is not recognised.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("unknown direction `{0}`")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "r" | "right" => Ok(Self::Right),
            "d" | "down" => Ok(Self::Down),
            "l" | "left" => Ok(Self::Left),
            "u" | "up" => Ok(Self::Up),
            _ => Err(ParseDirectionError(raw.to_owned())),
        }
    }
}

/// High-level input events consumed by a game session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    Pause,
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Buffers turn commands between ticks and resolves the direction of the next step.
///
/// Every command is checked against both the committed direction and the most
/// recently queued one, so a burst of key presses between two ticks can never
/// fold the head back onto the neck.
#[derive(Debug, Clone)]
pub struct DirectionQueue {
    committed: Direction,
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    /// Creates an empty queue whose committed direction is `initial`.
    #[must_use]
    pub fn new(initial: Direction) -> Self {
        Self {
            committed: initial,
            pending: VecDeque::new(),
        }
    }

    /// Queues `direction` unless it reverses the committed or last queued direction.
    ///
    /// Returns `true` when the command was accepted.
    pub fn submit(&mut self, direction: Direction) -> bool {
        let last_queued = self.pending.back().copied().unwrap_or(self.committed);

        if !direction_change_is_valid(self.committed, direction)
            || !direction_change_is_valid(last_queued, direction)
        {
            return false;
        }

        self.pending.push_back(direction);
        true
    }

    /// Consumes the next queued direction, or repeats the committed one.
    pub fn next_direction(&mut self) -> Direction {
        if let Some(next) = self.pending.pop_front() {
            self.committed = next;
        }
        self.committed
    }

    /// Direction applied by the most recent step.
    #[must_use]
    pub fn committed(&self) -> Direction {
        self.committed
    }

    /// Iterates over queued directions, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Direction> {
        self.pending.iter()
    }

    /// Drops all queued directions and commits `direction`.
    pub fn reset(&mut self, direction: Direction) {
        self.pending.clear();
        self.committed = direction;
    }
}
