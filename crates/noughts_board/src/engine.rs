//! Turn engine: move legality, turn alternation and end-of-game detection.

use crate::rules::{check_winner, is_full};
use crate::{Board, Mark, Outcome, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// What an accepted placement did to the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// The match continues; the given mark moves next.
    Continue(Mark),
    /// The placing mark completed a line.
    Won(Mark),
    /// The board filled up without a line.
    Drawn,
}

impl Placement {
    /// The outcome, if this placement ended the match.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Placement::Continue(_) => None,
            Placement::Won(mark) => Some(Outcome::Won(mark)),
            Placement::Drawn => Some(Outcome::Drawn),
        }
    }
}

/// Reasons a placement is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The mover is not the mark whose turn it is.
    #[display("it is {}'s turn, not {}'s", expected, got)]
    WrongTurn {
        /// Mark to move.
        expected: Mark,
        /// Mark that tried to move.
        got: Mark,
    },

    /// The target cell already holds a mark.
    #[display("cell {} is already occupied", _0)]
    Occupied(Position),

    /// Coordinates outside the 3×3 grid.
    #[display("({}, {}) is off the board", x, y)]
    OutOfBounds {
        /// Requested row.
        x: usize,
        /// Requested column.
        y: usize,
    },

    /// The match already ended.
    #[display("game is already over ({})", _0)]
    GameOver(Outcome),
}

impl std::error::Error for MoveError {}

/// State machine for a single match.
///
/// Nought always moves first. A refused placement leaves the engine untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnEngine {
    board: Board,
    to_move: Mark,
    outcome: Option<Outcome>,
    history: Vec<(Mark, Position)>,
}

impl TurnEngine {
    /// Creates a fresh match with Nought to move.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The mark to move, or `None` once the match has ended.
    pub fn to_move(&self) -> Option<Mark> {
        self.outcome.is_none().then_some(self.to_move)
    }

    /// How the match ended, if it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Accepted placements in order.
    pub fn history(&self) -> &[(Mark, Position)] {
        &self.history
    }

    /// Places `mark` at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameOver`] after the match ended,
    /// [`MoveError::WrongTurn`] if it is not `mark`'s turn and
    /// [`MoveError::Occupied`] if the cell is taken.
    #[instrument(skip(self), fields(position = %pos, mark = %mark))]
    pub fn place(&mut self, pos: Position, mark: Mark) -> Result<Placement, MoveError> {
        if let Some(outcome) = self.outcome {
            return Err(MoveError::GameOver(outcome));
        }
        if mark != self.to_move {
            return Err(MoveError::WrongTurn {
                expected: self.to_move,
                got: mark,
            });
        }
        if !self.board.is_empty(pos) {
            return Err(MoveError::Occupied(pos));
        }

        self.board.set(pos, mark.into());
        self.history.push((mark, pos));

        let placement = if check_winner(&self.board) == Some(mark) {
            Placement::Won(mark)
        } else if is_full(&self.board) {
            Placement::Drawn
        } else {
            self.to_move = mark.opponent();
            Placement::Continue(self.to_move)
        };
        self.outcome = placement.outcome();

        debug!(?placement, moves = self.history.len(), "Placement accepted");
        Ok(placement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn test_nought_moves_first_and_turns_alternate() {
        let mut engine = TurnEngine::new();
        assert_eq!(engine.to_move(), Some(Mark::Nought));
        assert_eq!(engine.place(pos(1, 1), Mark::Nought), Ok(Placement::Continue(Mark::Cross)));
        assert_eq!(engine.place(pos(0, 0), Mark::Cross), Ok(Placement::Continue(Mark::Nought)));
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn test_refusals_leave_engine_untouched() {
        let mut engine = TurnEngine::new();
        engine.place(pos(1, 1), Mark::Nought).unwrap();
        let before = engine.clone();

        assert_eq!(
            engine.place(pos(0, 0), Mark::Nought),
            Err(MoveError::WrongTurn { expected: Mark::Cross, got: Mark::Nought })
        );
        assert_eq!(engine.place(pos(1, 1), Mark::Cross), Err(MoveError::Occupied(pos(1, 1))));
        assert_eq!(engine, before);
    }

    #[test]
    fn test_win_ends_match() {
        let mut engine = TurnEngine::new();
        for (x, y, mark) in [
            (0, 0, Mark::Nought),
            (1, 0, Mark::Cross),
            (0, 1, Mark::Nought),
            (1, 1, Mark::Cross),
        ] {
            engine.place(pos(x, y), mark).unwrap();
        }
        assert_eq!(engine.place(pos(0, 2), Mark::Nought), Ok(Placement::Won(Mark::Nought)));
        assert_eq!(engine.outcome(), Some(Outcome::Won(Mark::Nought)));
        assert_eq!(engine.to_move(), None);
        assert_eq!(
            engine.place(pos(2, 2), Mark::Cross),
            Err(MoveError::GameOver(Outcome::Won(Mark::Nought)))
        );
    }

    #[test]
    fn test_full_board_without_line_is_drawn() {
        // O X O / O X X / X O O
        let moves = [
            (0, 0, Mark::Nought),
            (0, 1, Mark::Cross),
            (0, 2, Mark::Nought),
            (1, 1, Mark::Cross),
            (1, 0, Mark::Nought),
            (2, 0, Mark::Cross),
            (2, 1, Mark::Nought),
            (1, 2, Mark::Cross),
        ];
        let mut engine = TurnEngine::new();
        for (x, y, mark) in moves {
            assert!(matches!(engine.place(pos(x, y), mark), Ok(Placement::Continue(_))));
        }
        assert_eq!(engine.place(pos(2, 2), Mark::Nought), Ok(Placement::Drawn));
        assert_eq!(engine.outcome(), Some(Outcome::Drawn));
    }

    #[test]
    fn test_board_serializes_cells() {
        let mut engine = TurnEngine::new();
        engine.place(pos(0, 0), Mark::Nought).unwrap();
        let json = serde_json::to_value(engine.board()).unwrap();
        assert_eq!(json["cells"][0][0], "nought");
        assert_eq!(json["cells"][2][2], "empty");
    }
}
