//! Perft node counting for move-generator validation.
//!
//! Counts leaf nodes of the full legal move tree to a fixed depth and
//! compares against published reference totals. Any divergence points at
//! a generation or make/unmake defect, so the tests here are the primary
//! regression net for the whole move pipeline.

use crate::game_state::chess_types::GameState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::chess_move::Move;

/// Count leaf nodes of the legal move tree below `state`.
pub fn perft(state: &mut GameState, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(state);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves {
        let undo = mv.make(state);
        nodes += perft(state, depth - 1);
        mv.unmake(state, undo);
    }

    nodes
}

/// Per-root-move node counts, the classic tool for narrowing down which
/// subtree disagrees with a reference engine.
pub fn perft_divide(state: &mut GameState, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    let mut results = Vec::new();
    for mv in legal_moves(state) {
        let undo = mv.make(state);
        let nodes = perft(state, depth - 1);
        mv.unmake(state, undo);
        results.push((mv, nodes));
    }

    results
}
