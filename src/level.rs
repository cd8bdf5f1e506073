use serde::Serialize;
use thiserror::Error;

use crate::config::GridSize;
use crate::input::Direction;
use crate::snake::{Position, Tile};

/// Raw level value for an empty cell.
pub const RAW_EMPTY: i32 = 0;

/// Raw level value for an obstacle cell.
pub const RAW_OBSTACLE: i32 = 1;

/// What occupies a single grid cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum CellKind {
    Empty,
    Obstacle,
    Snake,
    Pickup,
}

/// Errors raised while turning raw level rows into a grid.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LevelError {
    #[error("level declares {expected} rows but {found} were provided")]
    RowCountMismatch { expected: usize, found: usize },
    #[error("row {row} has {found} cells but the level width is {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid cell value {value} at row {row}, column {column}")]
    InvalidCellValue { value: i32, row: usize, column: usize },
}

/// Rectangular cell-kind map stored row-major.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Grid {
    size: GridSize,
    cells: Vec<CellKind>,
}

impl Grid {
    /// Creates an all-empty grid.
    #[must_use]
    pub fn empty(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![CellKind::Empty; size.total_cells()],
        }
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the cell kind at `position`, or `None` when it is off the grid.
    #[must_use]
    pub fn kind_at(&self, position: Position) -> Option<CellKind> {
        self.index_of(position).map(|index| self.cells[index])
    }

    /// Overwrites the cell at `position`. Off-grid positions are ignored.
    pub fn set(&mut self, position: Position, kind: CellKind) {
        if let Some(index) = self.index_of(position) {
            self.cells[index] = kind;
        }
    }

    /// Number of cells of the given kind.
    #[must_use]
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }

    /// Iterates over every cell with its position, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (Position, CellKind)> + '_ {
        let width = self.size.width.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            (
                Position::new(to_coordinate(index % width), to_coordinate(index / width)),
                *kind,
            )
        })
    }

    fn index_of(&self, position: Position) -> Option<usize> {
        if !position.is_within_bounds(self.size) {
            return None;
        }
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        Some(y * self.size.width + x)
    }
}

fn to_coordinate(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// A parsed level: the static grid plus the list of obstacle tiles.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Level {
    pub grid: Grid,
    pub obstacles: Vec<Tile>,
}

impl Level {
    /// Builds the grid from raw integer rows (`0` empty, `1` obstacle).
    ///
    /// Obstacles are recorded as (column, row) tiles with a placeholder
    /// `Right` facing.
    pub fn build(raw_rows: &[Vec<i32>], length: usize, width: usize) -> Result<Self, LevelError> {
        if raw_rows.len() != length {
            return Err(LevelError::RowCountMismatch {
                expected: length,
                found: raw_rows.len(),
            });
        }

        let mut grid = Grid::empty(GridSize { width, length });
        let mut obstacles = Vec::new();

        for (row, values) in raw_rows.iter().enumerate() {
            if values.len() != width {
                return Err(LevelError::DimensionMismatch {
                    row,
                    expected: width,
                    found: values.len(),
                });
            }

            for (column, value) in values.iter().copied().enumerate() {
                match value {
                    RAW_EMPTY => {}
                    RAW_OBSTACLE => {
                        let position = Position::new(to_coordinate(column), to_coordinate(row));
                        grid.set(position, CellKind::Obstacle);
                        obstacles.push(Tile::new(position, Direction::Right));
                    }
                    _ => return Err(LevelError::InvalidCellValue { value, row, column }),
                }
            }
        }

        Ok(Self { grid, obstacles })
    }
}

#[cfg(test)]
mod tests {
    use crate::input::Direction;
    use crate::snake::{Position, Tile};

    use super::{CellKind, Level, LevelError};

    #[test]
    fn build_marks_obstacles_and_records_tiles() {
        let rows = vec![vec![1, 0, 0], vec![0, 0, 1]];

        let level = Level::build(&rows, 2, 3).expect("level should build");

        assert_eq!(level.grid.kind_at(Position::new(0, 0)), Some(CellKind::Obstacle));
        assert_eq!(level.grid.kind_at(Position::new(2, 1)), Some(CellKind::Obstacle));
        assert_eq!(level.grid.kind_at(Position::new(1, 0)), Some(CellKind::Empty));
        assert_eq!(level.grid.count(CellKind::Empty), 4);
        assert_eq!(
            level.obstacles,
            vec![
                Tile::new(Position::new(0, 0), Direction::Right),
                Tile::new(Position::new(2, 1), Direction::Right),
            ]
        );
    }

    #[test]
    fn non_square_levels_keep_column_row_order() {
        let rows = vec![vec![0, 0, 0, 0, 1], vec![0, 0, 0, 0, 0]];

        let level = Level::build(&rows, 2, 5).expect("level should build");

        assert_eq!(level.grid.size().width, 5);
        assert_eq!(level.grid.size().length, 2);
        assert_eq!(level.obstacles[0].position, Position::new(4, 0));
        assert_eq!(level.grid.kind_at(Position::new(0, 4)), None);
    }

    #[test]
    fn short_row_is_a_dimension_mismatch() {
        let rows = vec![vec![0, 0, 0], vec![0, 0]];

        assert_eq!(
            Level::build(&rows, 2, 3),
            Err(LevelError::DimensionMismatch {
                row: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn missing_rows_are_rejected() {
        let rows = vec![vec![0, 0]];

        assert_eq!(
            Level::build(&rows, 2, 2),
            Err(LevelError::RowCountMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn unknown_cell_value_is_rejected() {
        let rows = vec![vec![0, 2], vec![0, 0]];

        assert_eq!(
            Level::build(&rows, 2, 2),
            Err(LevelError::InvalidCellValue {
                value: 2,
                row: 0,
                column: 1
            })
        );
    }

    #[test]
    fn cells_iterate_row_by_row() {
        let rows = vec![vec![0, 1], vec![0, 0]];
        let level = Level::build(&rows, 2, 2).expect("level should build");

        let obstacle_cells: Vec<_> = level
            .grid
            .cells()
            .filter(|(_, kind)| *kind == CellKind::Obstacle)
            .map(|(position, _)| position)
            .collect();

        assert_eq!(obstacle_cells, vec![Position::new(1, 0)]);
        assert_eq!(level.grid.cells().count(), 4);
    }
}
