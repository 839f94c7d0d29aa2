//! Plain fixed-depth negamax engine over raw material.
//!
//! No pruning and no transposition table: a deliberately simple baseline
//! for strength comparisons. Root moves that tie for the best score are
//! chosen among at random so repeated games vary. Ignores the opening
//! book.

use rand::prelude::IndexedRandom;

use crate::book::book_entry::BookEntry;
use crate::engines::engine_trait::Engine;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::chess_move::Move;
use crate::search::alpha_beta::{DRAW_SCORE, MATE_SCORE};
use crate::search::board_scoring::{BoardScorer, MaterialScorer};

#[derive(Debug)]
pub struct MaterialEngine {
    depth: u8,
}

impl MaterialEngine {
    pub fn new() -> Self {
        Self { depth: 3 }
    }

    pub fn with_depth(depth: u8) -> Self {
        Self {
            depth: depth.max(1),
        }
    }

    fn negamax(&self, state: &mut GameState, depth: u8) -> i32 {
        if depth == 0 {
            return MaterialScorer.score(state);
        }

        let moves = legal_moves(state);
        if moves.is_empty() {
            return if state.in_check(state.side_to_move) {
                -MATE_SCORE
            } else {
                DRAW_SCORE
            };
        }

        let mut best = i32::MIN;
        for mv in moves {
            let undo = mv.make(state);
            let score = -self.negamax(state, depth - 1);
            mv.unmake(state, undo);
            best = best.max(score);
        }

        best
    }
}

impl Default for MaterialEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MaterialEngine {
    fn name(&self) -> &str {
        "Quince Material"
    }

    fn find_move(&mut self, state: &mut GameState, _book_entry: Option<&BookEntry>) -> Option<Move> {
        let mut best_score = i32::MIN;
        let mut best_moves: Vec<Move> = Vec::new();

        for mv in legal_moves(state) {
            let undo = mv.make(state);
            let score = -self.negamax(state, self.depth - 1);
            mv.unmake(state, undo);

            if score > best_score {
                best_score = score;
                best_moves.clear();
                best_moves.push(mv);
            } else if score == best_score {
                best_moves.push(mv);
            }
        }

        let mut rng = rand::rng();
        best_moves.as_slice().choose(&mut rng).copied()
    }
}
