use crate::game_state::chess_types::{CastlingRights, Square};

/// Single undo record captured by `Move::make` and consumed by
/// `Move::unmake`. Holds exactly the state a move cannot reconstruct on
/// its own; unmake restores these fields verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub prev_castling_rights: CastlingRights,
    pub prev_en_passant_square: Option<Square>,
    pub prev_halfmove_clock: u8,
    pub prev_zobrist_key: u64,
}
