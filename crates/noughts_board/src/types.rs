//! Core domain types for noughts and crosses.

use crate::Position;
use serde::{Deserialize, Serialize};

/// A player's symbol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mark {
    /// Noughts, held by the first player to join. Moves first.
    #[default]
    Nought,
    /// Crosses, held by the second player to join.
    Cross,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::Nought => Mark::Cross,
            Mark::Cross => Mark::Nought,
        }
    }

    /// Single-character symbol used when rendering boards.
    pub fn symbol(self) -> char {
        match self {
            Mark::Nought => 'O',
            Mark::Cross => 'X',
        }
    }
}

/// One square of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Occupied by noughts.
    Nought,
    /// Occupied by crosses.
    Cross,
}

impl Cell {
    /// The mark occupying this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Nought => Some(Mark::Nought),
            Cell::Cross => Some(Mark::Cross),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Nought => Cell::Nought,
            Mark::Cross => Cell::Cross,
        }
    }
}

/// 3×3 board, indexed `[x][y]` with `x` the row and `y` the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; 3]; 3],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell at `pos`.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.x()][pos.y()]
    }

    /// Overwrites the cell at `pos`.
    ///
    /// No rule checking happens here; [`crate::TurnEngine`] is the only
    /// caller that enforces legality.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.x()][pos.y()] = cell;
    }

    /// Checks if the cell at `pos` is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.mark().map_or('.', Mark::symbol).to_string())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n-+-+-\n")
    }
}

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Three in a row for the given mark.
    #[display("won by {}", _0)]
    Won(Mark),
    /// Full board, no line.
    #[display("drawn")]
    Drawn,
}

impl Outcome {
    /// The winning mark, if the game was not drawn.
    pub fn winner(self) -> Option<Mark> {
        match self {
            Outcome::Won(mark) => Some(mark),
            Outcome::Drawn => None,
        }
    }
}
