//! Engine abstraction layer.
//!
//! Defines the single entry point callers use to request a move, so
//! different playing strategies can be assigned per color behind one
//! trait interface. An engine may be handed the opening-book entry for
//! the current position; whether it plays from the book or searches is
//! the engine's own choice.

use crate::book::book_entry::BookEntry;
use crate::game_state::game_state::GameState;
use crate::moves::chess_move::Move;

pub trait Engine: Send {
    fn name(&self) -> &str;

    /// Reset per-game state (cached tables, previous best move).
    fn new_game(&mut self) {}

    /// Choose a move for the side to move, or `None` on checkmate or
    /// stalemate. The state is borrowed mutably for in-place search but
    /// is restored before returning.
    fn find_move(&mut self, state: &mut GameState, book_entry: Option<&BookEntry>) -> Option<Move>;
}
