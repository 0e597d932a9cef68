//! Pure noughts-and-crosses rules.
//!
//! This crate knows nothing about sessions, players or networking. It owns
//! the 3×3 [`Board`], the [`TurnEngine`] that enforces turn alternation and
//! detects the end of a match, and the win/draw rules the engine consults.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod position;
mod rules;
mod types;

pub use engine::{MoveError, Placement, TurnEngine};
pub use position::Position;
pub use rules::{check_winner, is_full};
pub use types::{Board, Cell, Mark, Outcome};
