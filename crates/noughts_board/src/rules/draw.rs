//! Draw detection logic.

use crate::{Board, Position};
use tracing::instrument;

/// Checks if every cell is occupied.
///
/// A full board with no winner is a draw.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    Position::ALL.iter().all(|pos| !board.is_empty(*pos))
}

#[cfg(test)]
mod tests {
    use super::super::win::check_winner;
    use super::*;
    use crate::Cell;

    fn is_draw(board: &Board) -> bool {
        is_full(board) && check_winner(board).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&Board::new()));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.set(Position::at(1, 1), Cell::Nought);
        assert!(!is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        // O X O / O X X / X O O
        let layout = [
            [Cell::Nought, Cell::Cross, Cell::Nought],
            [Cell::Nought, Cell::Cross, Cell::Cross],
            [Cell::Cross, Cell::Nought, Cell::Nought],
        ];
        let mut board = Board::new();
        for (x, row) in layout.iter().enumerate() {
            for (y, cell) in row.iter().enumerate() {
                board.set(Position::at(x, y), *cell);
            }
        }
        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut board = Board::new();
        for pos in Position::ALL {
            board.set(pos, Cell::Cross);
        }
        assert!(is_full(&board));
        assert!(!is_draw(&board));
    }
}
