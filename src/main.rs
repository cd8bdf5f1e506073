use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use snake_board::board::{BoardError, BoardListener};
use snake_board::config::SessionConfig;
use snake_board::game::{GameSession, GameStatus, Snapshot};
use snake_board::input::{Direction, GameInput, ParseDirectionError};
use snake_board::level::CellKind;
use snake_board::loader::{self, FallbackPolicy, LevelSource, LoadError};
use snake_board::snake::Position;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Replays a scripted run of direction commands on a snake level.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Level file to play.
    #[arg(long, conflicts_with = "levels_dir")]
    level: Option<PathBuf>,

    /// Directory holding numbered level files (`Level_<n>.txt`).
    #[arg(long)]
    levels_dir: Option<PathBuf>,

    /// Difficulty level; also selects the level file inside `--levels-dir`.
    #[arg(long)]
    game_level: Option<u32>,

    /// JSON session config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the pickup placement and random start direction.
    #[arg(long)]
    seed: Option<u64>,

    /// Direction commands, one per tick: R, D, L, U. `.` repeats the current direction.
    #[arg(long, default_value = "")]
    moves: String,

    /// Fail instead of playing the built-in default level when the level file is unusable.
    #[arg(long)]
    strict: bool,

    /// Print the final state as JSON instead of a grid.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read config: {0}")]
    Config(#[source] io::Error),
    #[error(transparent)]
    Level(#[from] LoadError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("invalid move {0}")]
    Move(#[from] ParseDirectionError),
    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

struct EventLog;

impl BoardListener for EventLog {
    fn on_snake_crashed(&mut self) {
        info!("snake crashed");
    }

    fn on_item_picked_up(&mut self) {
        info!("item picked up");
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "run failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "snake_board=info".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path).map_err(CliError::Config)?,
        None => SessionConfig::default(),
    };
    if let Some(game_level) = cli.game_level {
        config.game_level = game_level;
    }

    let level_path = match (&cli.level, &cli.levels_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(loader::level_file_path(dir, config.game_level)),
        (None, None) => None,
    };
    let (level, source) = match &level_path {
        Some(path) => {
            let policy = if cli.strict {
                FallbackPolicy::Strict
            } else {
                FallbackPolicy::UseBuiltinDefaultLevel
            };
            loader::load_level(path, policy)?
        }
        None => (loader::builtin_default_level(), LevelSource::BuiltinDefault),
    };
    info!(?source, width = level.width, length = level.length, "level loaded");

    let moves = parse_moves(&cli.moves)?;
    let mut session = match cli.seed {
        Some(seed) => GameSession::new_with_seed(level, config, seed)?,
        None => GameSession::new(level, config)?,
    };
    session.board_mut().subscribe(Box::new(EventLog));

    for command in moves {
        if let Some(direction) = command {
            session.apply_input(GameInput::Direction(direction));
        }
        session.tick()?;
        if session.status == GameStatus::GameOver {
            break;
        }
    }

    let snapshot = session.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_text(&session, &snapshot));
    }

    Ok(())
}

/// One entry per tick; `None` keeps the current direction.
fn parse_moves(raw: &str) -> Result<Vec<Option<Direction>>, ParseDirectionError> {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '.' => Ok(None),
            other => other.to_string().parse().map(Some),
        })
        .collect()
}

fn render_text(session: &GameSession, snapshot: &Snapshot) -> String {
    let board = session.board();
    let head = snapshot.snake.first().map(|tile| tile.position);
    let mut out = String::new();

    for y in 0..snapshot.size.length {
        for x in 0..snapshot.size.width {
            let position = Position::new(
                i32::try_from(x).unwrap_or(i32::MAX),
                i32::try_from(y).unwrap_or(i32::MAX),
            );
            let glyph = match board.cell_kind(position) {
                Some(CellKind::Snake) if Some(position) == head => '@',
                Some(CellKind::Snake) => 'o',
                Some(CellKind::Obstacle) => '#',
                Some(CellKind::Pickup) => '*',
                Some(CellKind::Empty) | None => '.',
            };
            out.push(glyph);
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "status: {:?}  score: {:04}  length: {}  speed: {:.2}  ticks: {}\n",
        snapshot.status,
        snapshot.score,
        snapshot.snake.len(),
        snapshot.snake_speed,
        snapshot.tick_count,
    ));
    out
}

#[cfg(test)]
mod tests {
    use snake_board::input::Direction;

    use super::parse_moves;

    #[test]
    fn moves_parse_letters_and_repeats() {
        let moves = parse_moves("R, d .u").expect("moves should parse");

        assert_eq!(
            moves,
            vec![
                Some(Direction::Right),
                Some(Direction::Down),
                None,
                Some(Direction::Up)
            ]
        );
    }

    #[test]
    fn unknown_move_is_rejected() {
        assert!(parse_moves("RX").is_err());
    }
}
