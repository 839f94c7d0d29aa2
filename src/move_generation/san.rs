//! Standard Algebraic Notation rendering and resolution.
//!
//! Rendering needs the full legal move list of the position so it can add
//! the minimal disambiguation: file first, then rank, then the full
//! square, only when same-kind moves share the destination. Resolution is
//! the inverse used by the opening-book builder: match a corpus token
//! (check suffixes stripped) against the rendered legal moves.

use crate::game_state::chess_types::{file_of, rank_of, PieceKind};
use crate::moves::chess_move::{Move, MoveFlag};
use crate::utils::algebraic::{file_char, rank_char, square_to_algebraic};

/// Render a move in SAN, given every legal move of the same position.
pub fn to_san(mv: &Move, legal: &[Move]) -> String {
    match mv.flag {
        MoveFlag::KingCastle => return "O-O".to_owned(),
        MoveFlag::QueenCastle => return "O-O-O".to_owned(),
        _ => {}
    }

    let piece_symbol = piece_letter(mv.moved);
    let capture = if mv.flag.is_capture() { "x" } else { "" };
    let destination = square_to_algebraic(mv.to).expect("move squares are on the board");
    let promotion = match mv.flag.promotion_kind() {
        Some(kind) => format!("={}", piece_letter(kind)),
        None => String::new(),
    };

    let origin = if mv.moved == PieceKind::Pawn {
        if mv.flag.is_capture() {
            file_char(mv.from).to_string()
        } else {
            String::new()
        }
    } else {
        disambiguation(mv, legal)
    };

    format!("{piece_symbol}{origin}{capture}{destination}{promotion}")
}

/// Resolve a SAN token against the legal moves of a position. Trailing
/// check and mate marks are ignored; the match is otherwise exact.
pub fn resolve_san(token: &str, legal: &[Move]) -> Option<Move> {
    let cleaned: String = token.chars().filter(|&c| c != '+' && c != '#').collect();
    legal
        .iter()
        .copied()
        .find(|mv| to_san(mv, legal) == cleaned)
}

/// Minimal origin disambiguation among same-kind moves to the same target.
fn disambiguation(mv: &Move, legal: &[Move]) -> String {
    let rivals: Vec<&Move> = legal
        .iter()
        .filter(|other| other.moved == mv.moved && other.to == mv.to && other.from != mv.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals
        .iter()
        .any(|other| file_of(other.from) == file_of(mv.from));
    let shares_rank = rivals
        .iter()
        .any(|other| rank_of(other.from) == rank_of(mv.from));

    if !shares_file {
        file_char(mv.from).to_string()
    } else if !shares_rank {
        rank_char(mv.from).to_string()
    } else {
        square_to_algebraic(mv.from).expect("move squares are on the board")
    }
}

fn piece_letter(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::Pawn => "",
        PieceKind::Knight => "N",
        PieceKind::Bishop => "B",
        PieceKind::Rook => "R",
        PieceKind::Queen => "Q",
        PieceKind::King => "K",
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_san, to_san};
    use crate::game_state::chess_types::GameState;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::moves::chess_move::MoveFlag;

    fn san_for(state: &GameState, text: &str) -> Option<String> {
        let legal = legal_moves(state);
        resolve_san(text, &legal).map(|mv| to_san(&mv, &legal))
    }

    #[test]
    fn simple_moves_have_no_disambiguation() {
        let game = GameState::new_game();
        let legal = legal_moves(&game);

        let knight = resolve_san("Nf3", &legal).expect("Nf3 should resolve");
        assert_eq!(knight.from, 6);
        assert_eq!(knight.to, 21);
        assert_eq!(to_san(&knight, &legal), "Nf3");

        let pawn = resolve_san("e4", &legal).expect("e4 should resolve");
        assert_eq!(pawn.flag, MoveFlag::DoublePawnPush);
        assert_eq!(to_san(&pawn, &legal), "e4");
    }

    #[test]
    fn two_knights_on_one_target_need_a_file() {
        // Knights b1 and f1 both reach d2.
        let game =
            GameState::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").expect("fen should parse");
        assert_eq!(san_for(&game, "Nbd2").as_deref(), Some("Nbd2"));
        assert_eq!(san_for(&game, "Nfd2").as_deref(), Some("Nfd2"));
        assert_eq!(san_for(&game, "Nd2"), None);
    }

    #[test]
    fn same_file_knights_fall_back_to_rank() {
        // Knights b1 and b5 both reach c3 from the b-file.
        let game =
            GameState::from_fen("4k3/8/8/1N6/8/8/8/1N2K3 w - - 0 1").expect("fen should parse");
        assert_eq!(san_for(&game, "N1c3").as_deref(), Some("N1c3"));
        assert_eq!(san_for(&game, "N5c3").as_deref(), Some("N5c3"));
    }

    #[test]
    fn three_way_ambiguity_uses_the_full_square() {
        // Knights b1, b5, and d5 all reach c3; b5 shares a file with one
        // rival and a rank with the other, so only it needs the full
        // square.
        let game =
            GameState::from_fen("4k3/8/8/1N1N4/8/8/8/1N2K3 w - - 0 1").expect("fen should parse");
        assert_eq!(san_for(&game, "Nb5c3").as_deref(), Some("Nb5c3"));
        assert_eq!(san_for(&game, "Ndc3").as_deref(), Some("Ndc3"));
    }

    #[test]
    fn pawn_captures_carry_the_origin_file() {
        let game = GameState::from_fen(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
        )
        .expect("fen should parse");
        let legal = legal_moves(&game);
        let capture = resolve_san("exd5", &legal).expect("exd5 should resolve");
        assert_eq!(capture.flag, MoveFlag::Capture);
        assert_eq!(to_san(&capture, &legal), "exd5");
    }

    #[test]
    fn castles_render_with_letter_o() {
        let game = GameState::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1")
            .expect("fen should parse");
        let legal = legal_moves(&game);
        assert!(resolve_san("O-O", &legal).is_some());
        assert!(resolve_san("O-O-O", &legal).is_some());
    }

    #[test]
    fn promotions_render_with_equals_suffix() {
        let game =
            GameState::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").expect("fen should parse");
        let legal = legal_moves(&game);
        let queen = resolve_san("e8=Q", &legal).expect("e8=Q should resolve");
        assert_eq!(queen.flag, MoveFlag::QueenPromotion);
        let knight = resolve_san("e8=N+", &legal).expect("check suffix should be ignored");
        assert_eq!(knight.flag, MoveFlag::KnightPromotion);
    }

    #[test]
    fn check_and_mate_suffixes_are_ignored_when_resolving() {
        let game = GameState::from_fen(
            "rnb1kbnr/pppp1ppp/8/4P3/7q/8/PPPPP1PP/RNBQKBNR b KQkq - 0 2",
        )
        .expect("fen should parse");
        let legal = legal_moves(&game);
        let check = resolve_san("Qxe4+", &legal);
        // The h4 queen has no capture on e4 here; resolution fails cleanly.
        assert!(check.is_none());
        assert!(resolve_san("Qe4+", &legal).is_some());
    }
}
