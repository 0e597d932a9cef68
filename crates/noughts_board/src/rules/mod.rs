//! Game rules for noughts and crosses.
//!
//! Each rule lives in its own submodule with its own tests.

mod draw;
mod win;

pub use draw::is_full;
pub use win::check_winner;
