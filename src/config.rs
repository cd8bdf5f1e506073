use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::Direction;

/// Logical grid dimensions passed through the game as a named type.
///
/// `length` is the row count and `width` the column count.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct GridSize {
    pub width: usize,
    pub length: usize,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        self.width * self.length
    }
}

/// Snake length at the start of every game.
pub const DEFAULT_INITIAL_SNAKE_LENGTH: usize = 3;

/// Difficulty multiplier applied to pickup score and speed bonus.
pub const DEFAULT_GAME_LEVEL: u32 = 1;

/// Snake speed in steps per second at the start of a game.
pub const BASE_SNAKE_SPEED: f32 = 1.0;

/// Score granted per pickup before the game level multiplier.
pub const PICKUP_ITEM_SCORE: u32 = 5;

/// Speed increase per pickup before the game level multiplier.
pub const PICKUP_SPEED_BONUS: f32 = 0.75;

/// Level files must contain at least this many data rows.
pub const MIN_LEVEL_ROWS: usize = 10;

/// File name prefix for numbered level files (`Level_1.txt`, `Level_2.txt`, ...).
pub const LEVEL_FILE_PREFIX: &str = "Level_";

/// File extension for level files.
pub const LEVEL_FILE_EXTENSION: &str = "txt";

/// Tunables for one game session.
///
/// Every field has a default, so a config file only needs to name the values
/// it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub initial_snake_length: usize,
    /// Starting direction; `None` picks one at random when the game starts.
    pub initial_direction: Option<Direction>,
    pub game_level: u32,
    pub base_speed: f32,
    pub item_score: u32,
    pub speed_bonus: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_snake_length: DEFAULT_INITIAL_SNAKE_LENGTH,
            initial_direction: None,
            game_level: DEFAULT_GAME_LEVEL,
            base_speed: BASE_SNAKE_SPEED,
            item_score: PICKUP_ITEM_SCORE,
            speed_bonus: PICKUP_SPEED_BONUS,
        }
    }
}

impl SessionConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(raw: &str) -> io::Result<Self> {
        serde_json::from_str(raw).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    }

    /// Loads a JSON config file from disk.
    pub fn load(path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
