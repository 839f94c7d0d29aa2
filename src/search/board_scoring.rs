//! Pluggable board evaluation interfaces and baseline implementations.
//!
//! Search stays modular by delegating static position scoring to a trait,
//! so alternate heuristics can be swapped without touching search code.
//! Scores are centipawns, always from the perspective of the side to
//! move: higher is better for whoever moves next.

use crate::game_state::chess_types::*;
use crate::moves::bit_utils::pop_count;
use crate::search::piece_square_tables::piece_square_value;

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of the side to move.
    fn score(&self, game_state: &GameState) -> i32;
}

/// Conventional centipawn value of a piece kind.
#[inline]
pub const fn piece_value(piece: PieceKind) -> i32 {
    match piece {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 20_000,
    }
}

fn material_balance_light_minus_dark(game_state: &GameState) -> i32 {
    let mut score = 0i32;

    for piece in ALL_PIECE_KINDS {
        let value = piece_value(piece);
        let light = pop_count(game_state.pieces(Color::Light, piece)) as i32;
        let dark = pop_count(game_state.pieces(Color::Dark, piece)) as i32;
        score += (light - dark) * value;
    }

    score
}

#[inline]
fn from_mover_perspective(game_state: &GameState, light_minus_dark: i32) -> i32 {
    match game_state.side_to_move {
        Color::Light => light_minus_dark,
        Color::Dark => -light_minus_dark,
    }
}

/// Pure material count.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialScorer;

impl BoardScorer for MaterialScorer {
    fn score(&self, game_state: &GameState) -> i32 {
        from_mover_perspective(game_state, material_balance_light_minus_dark(game_state))
    }
}

/// Material plus piece-square placement and minor pair adjustments; the
/// default evaluator of the alpha-beta engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PieceSquareScorer;

impl PieceSquareScorer {
    const BISHOP_PAIR_VALUE: i32 = 50;
    const ROOK_PAIR_VALUE: i32 = -10;
    const KNIGHT_PAIR_VALUE: i32 = -10;

    fn placement_balance(game_state: &GameState) -> i32 {
        let mut score = 0i32;

        for color in [Color::Light, Color::Dark] {
            let sign = match color {
                Color::Light => 1,
                Color::Dark => -1,
            };
            for piece in ALL_PIECE_KINDS {
                let mut bb = game_state.pieces(color, piece);
                while bb != 0 {
                    let sq = bb.trailing_zeros() as Square;
                    score += sign * piece_square_value(color, piece, sq);
                    bb &= bb - 1;
                }
            }
        }

        score
    }

    fn pair_balance(game_state: &GameState) -> i32 {
        let mut score = 0i32;

        for (color, sign) in [(Color::Light, 1), (Color::Dark, -1)] {
            if pop_count(game_state.pieces(color, PieceKind::Bishop)) >= 2 {
                score += sign * Self::BISHOP_PAIR_VALUE;
            }
            if pop_count(game_state.pieces(color, PieceKind::Rook)) >= 2 {
                score += sign * Self::ROOK_PAIR_VALUE;
            }
            if pop_count(game_state.pieces(color, PieceKind::Knight)) >= 2 {
                score += sign * Self::KNIGHT_PAIR_VALUE;
            }
        }

        score
    }
}

impl BoardScorer for PieceSquareScorer {
    fn score(&self, game_state: &GameState) -> i32 {
        let balance = material_balance_light_minus_dark(game_state)
            + Self::placement_balance(game_state)
            + Self::pair_balance(game_state);
        from_mover_perspective(game_state, balance)
    }
}
