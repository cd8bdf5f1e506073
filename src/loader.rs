use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::config::{LEVEL_FILE_EXTENSION, LEVEL_FILE_PREFIX, MIN_LEVEL_ROWS};

const DEFAULT_LEVEL_SIZE: usize = 20;

/// Level rows as read from a level file, before cell values are interpreted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawLevel {
    pub length: usize,
    pub width: usize,
    pub rows: Vec<Vec<i32>>,
}

/// What to do when a level file cannot be loaded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum FallbackPolicy {
    /// Surface the load error to the caller.
    #[default]
    Strict,
    /// Log the error and play the built-in default level instead.
    UseBuiltinDefaultLevel,
}

/// Where a loaded level came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LevelSource {
    File,
    BuiltinDefault,
}

/// Errors raised while reading or parsing a level file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read level file: {0}")]
    Io(#[from] io::Error),
    #[error("level file needs a length line and a width line")]
    MissingHeader,
    #[error("invalid level {name} `{value}`")]
    InvalidHeader { name: &'static str, value: String },
    #[error("level file has {found} rows, at least {} are required", MIN_LEVEL_ROWS)]
    TooFewRows { found: usize },
    #[error("level declares {expected} rows but the file has {found}")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("row {row} has {found} values but the level width is {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid tile value `{value}` at row {row}, column {column}")]
    InvalidTileValue {
        value: String,
        row: usize,
        column: usize,
    },
}

/// Parses the level text format.
///
/// The first two non-blank lines hold the row count and the column count,
/// followed by one line per row of space-separated non-negative integers.
/// Whether a value is a legal cell kind is left to the level grid.
pub fn parse_level(text: &str) -> Result<RawLevel, LoadError> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let length = parse_header(lines.next(), "length")?;
    let width = parse_header(lines.next(), "width")?;
    let row_lines: Vec<&str> = lines.collect();

    if row_lines.len() < MIN_LEVEL_ROWS {
        return Err(LoadError::TooFewRows {
            found: row_lines.len(),
        });
    }
    if row_lines.len() != length {
        return Err(LoadError::RowCountMismatch {
            expected: length,
            found: row_lines.len(),
        });
    }

    let rows = row_lines
        .iter()
        .enumerate()
        .map(|(row, line)| parse_row(row, line, width))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawLevel {
        length,
        width,
        rows,
    })
}

fn parse_header(line: Option<&str>, name: &'static str) -> Result<usize, LoadError> {
    let value = line.ok_or(LoadError::MissingHeader)?;
    value.parse().map_err(|_| LoadError::InvalidHeader {
        name,
        value: value.to_owned(),
    })
}

fn parse_row(row: usize, line: &str, width: usize) -> Result<Vec<i32>, LoadError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != width {
        return Err(LoadError::RowWidthMismatch {
            row,
            expected: width,
            found: tokens.len(),
        });
    }

    tokens
        .iter()
        .enumerate()
        .map(|(column, token)| match token.parse::<i32>() {
            Ok(value) if value >= 0 => Ok(value),
            _ => Err(LoadError::InvalidTileValue {
                value: (*token).to_owned(),
                row,
                column,
            }),
        })
        .collect()
}

/// Loads a level file from disk and applies `policy` on failure.
pub fn load_level(
    path: &Path,
    policy: FallbackPolicy,
) -> Result<(RawLevel, LevelSource), LoadError> {
    let result = fs::read_to_string(path)
        .map_err(LoadError::from)
        .and_then(|text| parse_level(&text));

    match (result, policy) {
        (Ok(level), _) => Ok((level, LevelSource::File)),
        (Err(error), FallbackPolicy::UseBuiltinDefaultLevel) => {
            warn!(path = %path.display(), %error, "failed to load level file, loading default map");
            Ok((builtin_default_level(), LevelSource::BuiltinDefault))
        }
        (Err(error), FallbackPolicy::Strict) => Err(error),
    }
}

/// Returns the path of numbered level `game_level` inside `levels_dir`.
#[must_use]
pub fn level_file_path(levels_dir: &Path, game_level: u32) -> PathBuf {
    levels_dir.join(format!(
        "{LEVEL_FILE_PREFIX}{game_level}.{LEVEL_FILE_EXTENSION}"
    ))
}

/// The built-in 20x20 map: walls down the first and last columns, plus a
/// two-cell pillar in the middle of the top row and of row 15.
#[must_use]
pub fn builtin_default_level() -> RawLevel {
    let rows = (0..DEFAULT_LEVEL_SIZE)
        .map(|row| {
            (0..DEFAULT_LEVEL_SIZE)
                .map(|column| {
                    let wall = column == 0 || column == DEFAULT_LEVEL_SIZE - 1;
                    let pillar = (row == 0 || row == 15) && (column == 9 || column == 10);
                    i32::from(wall || pillar)
                })
                .collect()
        })
        .collect();

    RawLevel {
        length: DEFAULT_LEVEL_SIZE,
        width: DEFAULT_LEVEL_SIZE,
        rows,
    }
}
