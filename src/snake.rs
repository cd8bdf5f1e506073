use std::collections::VecDeque;

use serde::Serialize;

use crate::config::GridSize;
use crate::input::Direction;

/// Grid position in (column, row) cell coordinates.
///
/// Coordinates are signed so a head candidate that has left the board can
/// still be represented and rejected.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        usize::try_from(self.x).is_ok_and(|x| x < bounds.width)
            && usize::try_from(self.y).is_ok_and(|y| y < bounds.length)
    }

    /// Returns the neighbouring position one grid step towards `direction`.
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.grid_step();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// One occupied cell: a position and the way it faces.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Tile {
    pub position: Position,
    pub direction: Direction,
}

impl Tile {
    #[must_use]
    pub fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }
}

/// Lays out the initial body: `head` first, then `length - 1` cells trailing
/// away from `direction`, all facing `direction`.
#[must_use]
pub fn spawn_footprint(head: Position, direction: Direction, length: usize) -> Vec<Tile> {
    spawn_trail(head, direction).take(length).collect()
}

/// Unbounded version of [`spawn_footprint`], for callers that stop at the
/// first unusable cell.
///
/// The trailing offset is the world vector with its column component negated,
/// which lands on the grid opposite of where the head will step.
pub fn spawn_trail(head: Position, direction: Direction) -> impl Iterator<Item = Tile> {
    let (dx, dz) = direction.world_vector();
    let (trail_x, trail_y) = (-dx, dz);

    std::iter::successors(Some(head), move |position| {
        Some(Position::new(
            position.x.saturating_add(trail_x),
            position.y.saturating_add(trail_y),
        ))
    })
    .map(move |position| Tile::new(position, direction))
}

/// Ordered snake body, head first and tail last.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Tile>,
}

impl Snake {
    /// Creates a snake from explicit tiles (front is head).
    ///
    /// Returns `None` for an empty tile list.
    #[must_use]
    pub fn from_tiles(tiles: Vec<Tile>) -> Option<Self> {
        if tiles.is_empty() {
            return None;
        }

        Some(Self {
            body: VecDeque::from(tiles),
        })
    }

    /// Moves one cell: every segment takes the place of the one ahead of it,
    /// the head becomes `new_head`, and the vacated tail tile is returned.
    pub fn advance(&mut self, new_head: Tile) -> Tile {
        self.body.push_front(new_head);
        self.body.pop_back().unwrap_or(new_head)
    }

    /// Re-attaches a previously vacated tail tile.
    pub fn grow(&mut self, tail: Tile) {
        self.body.push_back(tail);
    }

    /// Returns the current head tile.
    #[must_use]
    pub fn head(&self) -> Tile {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns the current tail tile.
    #[must_use]
    pub fn tail(&self) -> Tile {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.iter().any(|tile| tile.position == position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Iterates over body tiles from head to tail.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.body.iter()
    }
}
