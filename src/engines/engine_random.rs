//! Uniform random-move engine.
//!
//! Selects uniformly from the legal moves; used for diagnostics, engine
//! matches, and as the weakest rung of the strength ladder. Ignores the
//! opening book on purpose.

use rand::prelude::IndexedRandom;

use crate::book::book_entry::BookEntry;
use crate::engines::engine_trait::Engine;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::chess_move::Move;

#[derive(Debug, Default)]
pub struct RandomEngine;

impl RandomEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "Quince Random"
    }

    fn find_move(&mut self, state: &mut GameState, _book_entry: Option<&BookEntry>) -> Option<Move> {
        let moves = legal_moves(state);
        let mut rng = rand::rng();
        moves.as_slice().choose(&mut rng).copied()
    }
}
