//! Board coordinates.

use crate::{Board, MoveError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A cell coordinate: `x` is the row, `y` the column, both in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: usize,
    y: usize,
}

impl Position {
    /// All nine positions in row-major order.
    pub const ALL: [Position; 9] = [
        Position::at(0, 0),
        Position::at(0, 1),
        Position::at(0, 2),
        Position::at(1, 0),
        Position::at(1, 1),
        Position::at(1, 2),
        Position::at(2, 0),
        Position::at(2, 1),
        Position::at(2, 2),
    ];

    /// Creates a position, rejecting coordinates outside the board.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfBounds`] if either coordinate is 3 or more.
    #[instrument]
    pub fn new(x: usize, y: usize) -> Result<Self, MoveError> {
        if x < 3 && y < 3 {
            Ok(Self::at(x, y))
        } else {
            Err(MoveError::OutOfBounds { x, y })
        }
    }

    /// Unchecked constructor for in-range literals.
    pub(crate) const fn at(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Row index.
    pub fn x(self) -> usize {
        self.x
    }

    /// Column index.
    pub fn y(self) -> usize {
        self.y
    }

    /// Returns the positions that are still empty on `board`.
    #[instrument(skip(board))]
    pub fn valid_moves(board: &Board) -> Vec<Position> {
        Self::ALL
            .iter()
            .copied()
            .filter(|pos| board.is_empty(*pos))
            .collect()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Mark};

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(Position::new(3, 0), Err(MoveError::OutOfBounds { x: 3, y: 0 }));
        assert_eq!(Position::new(0, 7), Err(MoveError::OutOfBounds { x: 0, y: 7 }));
        assert!(Position::new(2, 2).is_ok());
    }

    #[test]
    fn test_valid_moves_filters_occupied() {
        let mut board = Board::new();
        board.set(Position::at(0, 0), Cell::Nought);
        board.set(Position::at(1, 1), Mark::Cross.into());

        let valid = Position::valid_moves(&board);
        assert_eq!(valid.len(), 7);
        assert!(!valid.contains(&Position::at(0, 0)));
        assert!(!valid.contains(&Position::at(1, 1)));
        assert!(valid.contains(&Position::at(2, 2)));
    }
}
