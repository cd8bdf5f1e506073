use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{Board, BoardError, StepOutcome};
use crate::config::{GridSize, SessionConfig};
use crate::input::{Direction, DirectionQueue, GameInput};
use crate::loader::RawLevel;
use crate::pickup::PickupReward;
use crate::snake::{Position, Tile};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum GameStatus {
    Playing,
    Paused,
    GameOver,
}

/// Complete mutable state for one game: the board, pending commands, score
/// and speed. Replaces any process-wide score or pause flags; [`GameSession::restart`]
/// is the single reset point.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    steering: DirectionQueue,
    level: RawLevel,
    config: SessionConfig,
    reward: PickupReward,
    pub score: u32,
    pub snake_speed: f32,
    pub tick_count: u64,
    pub status: GameStatus,
    rng: StdRng,
}

impl GameSession {
    /// Starts a game with a random seed.
    pub fn new(level: RawLevel, config: SessionConfig) -> Result<Self, BoardError> {
        Self::new_with_seed(level, config, rand::thread_rng().next_u64())
    }

    /// Creates a deterministic session for tests and reproducible simulations.
    pub fn new_with_seed(
        level: RawLevel,
        config: SessionConfig,
        seed: u64,
    ) -> Result<Self, BoardError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (board, direction) = start_board(&level, &config, &mut rng)?;
        let reward = PickupReward {
            item_score: config.item_score,
            speed_bonus: config.speed_bonus,
        };

        info!(?direction, game_level = config.game_level, "game started");

        Ok(Self {
            board,
            steering: DirectionQueue::new(direction),
            level,
            snake_speed: config.base_speed,
            config,
            reward,
            score: 0,
            tick_count: 0,
            status: GameStatus::Playing,
            rng,
        })
    }

    /// Rebuilds the board from the same level and resets score, speed and commands.
    pub fn restart(&mut self) -> Result<(), BoardError> {
        let (board, direction) = start_board(&self.level, &self.config, &mut self.rng)?;

        self.board = board;
        self.steering.reset(direction);
        self.score = 0;
        self.snake_speed = self.config.base_speed;
        self.tick_count = 0;
        self.status = GameStatus::Playing;

        info!(?direction, "game restarted");
        Ok(())
    }

    /// Advances the simulation by one gameplay tick.
    ///
    /// Does nothing unless the game is playing. A board error ends the game.
    pub fn tick(&mut self) -> Result<Option<StepOutcome>, BoardError> {
        if self.status != GameStatus::Playing {
            return Ok(None);
        }

        self.tick_count += 1;
        let direction = self.steering.next_direction();
        let outcome = match self.board.update_board(direction) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.status = GameStatus::GameOver;
                warn!(%error, ticks = self.tick_count, "game stopped by board error");
                return Err(error);
            }
        };

        match outcome {
            StepOutcome::Crashed => {
                self.status = GameStatus::GameOver;
                info!(score = self.score, ticks = self.tick_count, "game over");
            }
            StepOutcome::PickedUp => {
                self.score = self
                    .score
                    .saturating_add(self.reward.points(self.config.game_level));
                self.snake_speed += self.reward.speedup(self.config.game_level);
                debug!(score = self.score, speed = self.snake_speed, "score updated");
            }
            StepOutcome::Moved => {}
        }

        Ok(Some(outcome))
    }

    /// Applies one external input event.
    pub fn apply_input(&mut self, input: GameInput) {
        match input {
            GameInput::Direction(direction) => {
                if self.status == GameStatus::Playing {
                    self.steering.submit(direction);
                }
            }
            GameInput::Pause => {
                self.status = match self.status {
                    GameStatus::Playing => GameStatus::Paused,
                    GameStatus::Paused => GameStatus::Playing,
                    other => other,
                };
            }
        }
    }

    /// Time between two ticks at the current snake speed.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.snake_speed.max(f32::EPSILON))
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for drivers that subscribe listeners or place the pickup.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.steering.committed()
    }

    #[must_use]
    pub fn game_level(&self) -> u32 {
        self.config.game_level
    }

    /// Serializable view of everything a presentation layer draws.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            size: self.board.size(),
            snake: self.board.snake_tiles(),
            obstacles: self.board.obstacle_tiles().to_vec(),
            pickup: self.board.pickup_position(),
            score: self.score,
            snake_speed: self.snake_speed,
            tick_count: self.tick_count,
            status: self.status,
        }
    }
}

fn start_board(
    level: &RawLevel,
    config: &SessionConfig,
    rng: &mut StdRng,
) -> Result<(Board, Direction), BoardError> {
    let direction = config
        .initial_direction
        .unwrap_or_else(|| Direction::random(rng));
    let board_rng = StdRng::seed_from_u64(rng.next_u64());

    let mut board = Board::construct_level(&level.rows, level.length, level.width, board_rng)?;
    board.add_snake(direction, config.initial_snake_length)?;
    Ok((board, direction))
}

/// Point-in-time copy of the session for rendering or reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub size: GridSize,
    pub snake: Vec<Tile>,
    pub obstacles: Vec<Tile>,
    pub pickup: Option<Position>,
    pub score: u32,
    pub snake_speed: f32,
    pub tick_count: u64,
    pub status: GameStatus,
}
