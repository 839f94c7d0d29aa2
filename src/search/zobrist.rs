//! Zobrist hashing support for fast position identity and opening-book
//! lookups.
//!
//! The key tables are generated from a fixed seed with an xorshift-star
//! generator, so hashes are deterministic across runs; that determinism is
//! what makes `.book` files portable between sessions. Every term is its
//! own inverse under XOR, which lets make and unmake apply the identical
//! update sequence.

use std::sync::OnceLock;

use crate::game_state::chess_types::*;
use crate::moves::bit_utils::reset_ls1b;

const ZOBRIST_SEED: u64 = 1_070_372;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    /// Slot 0 is an intentionally unused null entry so the four real
    /// castling rights index 1..=4.
    castling: [u64; 5],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut state = ZOBRIST_SEED;

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for piece in color {
            for sq in piece {
                *sq = next_random_u64(&mut state);
            }
        }
    }

    let side_to_move = next_random_u64(&mut state);

    let mut castling = [0u64; 5];
    for key in castling.iter_mut().skip(1) {
        *key = next_random_u64(&mut state);
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = next_random_u64(&mut state);
    }

    ZobristTables {
        piece_square,
        side_to_move,
        castling,
        en_passant_file,
    }
}

/// Xorshift-star step: shift-xor scramble, then a spreading multiply.
#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    *state ^= *state >> 12;
    *state ^= *state << 25;
    *state ^= *state >> 27;
    state.wrapping_mul(0x2545_f491_4f6c_dd1d)
}

/// Key for a `(color, piece, square)` occupancy term.
#[inline]
pub fn piece_square_key(color: Color, piece: PieceKind, square: Square) -> u64 {
    tables().piece_square[color.index()][piece.index()][square as usize]
}

/// Key for one castling-right bit position (`0..4`).
#[inline]
pub fn castling_right_key(right: usize) -> u64 {
    tables().castling[right + 1]
}

/// Combined key for every set bit of a castling-rights mask.
#[inline]
pub fn castling_rights_key(rights: CastlingRights) -> u64 {
    let mut key = 0u64;
    for right in 0..4 {
        if rights & (1 << right) != 0 {
            key ^= castling_right_key(right);
        }
    }
    key
}

/// Key for a valid en-passant file (`0..8`).
#[inline]
pub fn en_passant_file_key(file: u8) -> u64 {
    tables().en_passant_file[file as usize]
}

/// Side-to-move toggle key (xor in when dark is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}

/// Compute the full position key from scratch.
///
/// The incremental key on `GameState` must always equal this value; the
/// make/unmake tests enforce it.
pub fn compute_zobrist_key(game_state: &GameState) -> u64 {
    let mut key = 0u64;

    for color in [Color::Light, Color::Dark] {
        for piece in ALL_PIECE_KINDS {
            let mut bb = game_state.pieces(color, piece);
            while bb != 0 {
                let sq = bb.trailing_zeros() as Square;
                key ^= piece_square_key(color, piece, sq);
                bb = reset_ls1b(bb);
            }
        }
    }

    if game_state.side_to_move == Color::Dark {
        key ^= side_to_move_key();
    }

    key ^= castling_rights_key(game_state.castling_rights);

    if let Some(ep_square) = game_state.en_passant_square {
        key ^= en_passant_file_key(file_of(ep_square));
    }

    key
}

#[cfg(test)]
mod tests {
    use super::{castling_rights_key, compute_zobrist_key, next_random_u64, ZOBRIST_SEED};
    use crate::game_state::chess_types::CASTLE_ALL;
    use crate::game_state::game_state::GameState;

    #[test]
    fn generator_is_deterministic_and_nontrivial() {
        let mut a = ZOBRIST_SEED;
        let mut b = ZOBRIST_SEED;
        let first = next_random_u64(&mut a);
        assert_eq!(first, next_random_u64(&mut b));
        assert_ne!(first, next_random_u64(&mut a));
    }

    #[test]
    fn starting_position_hash_is_deterministic() {
        let a = GameState::new_game();
        let b = GameState::new_game();
        assert_eq!(a.zobrist_key, b.zobrist_key);
        assert_ne!(a.zobrist_key, 0);
    }

    #[test]
    fn side_to_move_changes_hash() {
        let w = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let b = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").expect("FEN should parse");
        assert_ne!(w.zobrist_key, b.zobrist_key);
    }

    #[test]
    fn castling_rights_change_hash() {
        let with_rights =
            GameState::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("FEN should parse");
        let without_rights =
            GameState::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").expect("FEN should parse");
        assert_ne!(with_rights.zobrist_key, without_rights.zobrist_key);
    }

    #[test]
    fn each_castling_right_contributes_independently() {
        let combined = castling_rights_key(CASTLE_ALL);
        let individual = (0..4).fold(0u64, |acc, i| acc ^ super::castling_right_key(i));
        assert_eq!(combined, individual);
    }

    #[test]
    fn en_passant_file_changes_hash() {
        let no_ep =
            GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").expect("FEN should parse");
        let ep = GameState::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - e3 0 1").expect("FEN should parse");
        assert_ne!(no_ep.zobrist_key, ep.zobrist_key);
    }

    #[test]
    fn imported_state_matches_recomputation() {
        let game = GameState::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .expect("FEN should parse");
        assert_eq!(game.zobrist_key, compute_zobrist_key(&game));
    }
}
