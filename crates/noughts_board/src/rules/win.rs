//! Win detection logic.

use crate::{Board, Mark, Position};
use tracing::instrument;

/// The eight winning lines: three rows, three columns, two diagonals.
pub(crate) const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::at(0, 0), Position::at(0, 1), Position::at(0, 2)],
    [Position::at(1, 0), Position::at(1, 1), Position::at(1, 2)],
    [Position::at(2, 0), Position::at(2, 1), Position::at(2, 2)],
    // Columns
    [Position::at(0, 0), Position::at(1, 0), Position::at(2, 0)],
    [Position::at(0, 1), Position::at(1, 1), Position::at(2, 1)],
    [Position::at(0, 2), Position::at(1, 2), Position::at(2, 2)],
    // Diagonals
    [Position::at(0, 0), Position::at(1, 1), Position::at(2, 2)],
    [Position::at(0, 2), Position::at(1, 1), Position::at(2, 0)],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(mark)` if `mark` holds three in a row on any line.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|[a, b, c]| {
        let mark = board.get(*a).mark()?;
        (board.get(*b).mark() == Some(mark) && board.get(*c).mark() == Some(mark)).then_some(mark)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(check_winner(&Board::new()), None);
    }

    #[test]
    fn test_every_line_wins() {
        for line in LINES {
            for mark in [Mark::Nought, Mark::Cross] {
                let mut board = Board::new();
                for pos in line {
                    board.set(pos, mark.into());
                }
                assert_eq!(check_winner(&board), Some(mark), "line {:?}", line);
            }
        }
    }

    #[test]
    fn test_mixed_line_is_not_a_win() {
        let mut board = Board::new();
        board.set(Position::at(0, 0), Cell::Nought);
        board.set(Position::at(0, 1), Cell::Cross);
        board.set(Position::at(0, 2), Cell::Nought);
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_no_winner_incomplete() {
        let mut board = Board::new();
        board.set(Position::at(1, 1), Cell::Cross);
        board.set(Position::at(2, 2), Cell::Cross);
        assert_eq!(check_winner(&board), None);
    }
}
