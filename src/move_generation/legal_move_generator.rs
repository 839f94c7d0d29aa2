//! Full legal move generation pipeline.
//!
//! Pseudo-legal moves come straight off the attack tables; legality is
//! then settled the simple way: play each candidate on a scratch board,
//! reject it when the mover's own king ends up attacked, and take it
//! back. Castling additionally checks emptiness and the no-through-check
//! squares before it is ever emitted.

use crate::game_state::chess_rules::*;
use crate::game_state::chess_types::*;
use crate::moves::bit_utils::pop_lsb;
use crate::moves::chess_move::{Move, MoveFlag};
use crate::moves::king_moves::king_attacks;
use crate::moves::knight_moves::knight_attacks;
use crate::moves::pawn_moves::pawn_attacks;
use crate::moves::slider_attacks::{bishop_attacks, queen_attacks, rook_attacks};

/// All strictly legal moves for the side to move. An empty result means
/// checkmate or stalemate; callers branch on `in_check` to tell them
/// apart.
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    let mover = state.side_to_move;

    let mut pseudo = Vec::with_capacity(64);
    generate_castling_moves(state, mover, &mut pseudo);
    generate_pawn_moves(state, mover, &mut pseudo);
    generate_knight_moves(state, mover, &mut pseudo);
    generate_slider_moves(state, mover, &mut pseudo);
    generate_king_moves(state, mover, &mut pseudo);

    let mut scratch = state.clone();
    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let undo = mv.make(&mut scratch);
        if !scratch.in_check(mover) {
            legal.push(mv);
        }
        mv.unmake(&mut scratch, undo);
    }

    legal
}

fn generate_castling_moves(state: &GameState, mover: Color, out: &mut Vec<Move>) {
    let enemy = mover.opposite();
    let c = mover.index();
    let occupied = state.occupied();

    if state.castling_rights & castle_kingside_right(mover) != 0
        && KING_SIDE_EMPTY[c]
            .iter()
            .all(|&sq| occupied & (1u64 << sq) == 0)
        && KING_SIDE_SAFE[c].iter().all(|&sq| !state.attacked(sq, enemy))
    {
        out.push(Move::new(
            KING_START[c],
            KING_SIDE_KING_TO[c],
            MoveFlag::KingCastle,
            PieceKind::King,
            None,
        ));
    }

    if state.castling_rights & castle_queenside_right(mover) != 0
        && QUEEN_SIDE_EMPTY[c]
            .iter()
            .all(|&sq| occupied & (1u64 << sq) == 0)
        && QUEEN_SIDE_SAFE[c]
            .iter()
            .all(|&sq| !state.attacked(sq, enemy))
    {
        out.push(Move::new(
            KING_START[c],
            QUEEN_SIDE_KING_TO[c],
            MoveFlag::QueenCastle,
            PieceKind::King,
            None,
        ));
    }
}

#[inline]
fn castle_kingside_right(color: Color) -> CastlingRights {
    match color {
        Color::Light => CASTLE_LIGHT_KINGSIDE,
        Color::Dark => CASTLE_DARK_KINGSIDE,
    }
}

#[inline]
fn castle_queenside_right(color: Color) -> CastlingRights {
    match color {
        Color::Light => CASTLE_LIGHT_QUEENSIDE,
        Color::Dark => CASTLE_DARK_QUEENSIDE,
    }
}

fn generate_pawn_moves(state: &GameState, mover: Color, out: &mut Vec<Move>) {
    let enemy = mover.opposite();
    let occupied = state.occupied();
    let enemy_occupancy = state.by_color[enemy.index()];
    let push: i8 = match mover {
        Color::Light => 8,
        Color::Dark => -8,
    };
    let home_rank = PAWN_HOME_RANK[mover.index()];
    let promotion_rank = PROMOTION_RANK[mover.index()];

    let mut pawns = state.pieces(mover, PieceKind::Pawn);
    while pawns != 0 {
        let from = pop_lsb(&mut pawns);

        // Pawns never stand on their own back rank, so a single push stays
        // on the board.
        let push_to = (from as i8 + push) as Square;
        if occupied & (1u64 << push_to) == 0 {
            push_pawn_move(out, from, push_to, None, promotion_rank);

            if rank_of(from) == home_rank {
                let double_to = (from as i8 + 2 * push) as Square;
                if occupied & (1u64 << double_to) == 0 {
                    out.push(Move::new(
                        from,
                        double_to,
                        MoveFlag::DoublePawnPush,
                        PieceKind::Pawn,
                        None,
                    ));
                }
            }
        }

        let mut targets = pawn_attacks(mover, from);
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            if enemy_occupancy & (1u64 << to) != 0 {
                let captured = state.kind_on(to).expect("enemy occupancy bit set");
                push_pawn_move(out, from, to, Some(captured), promotion_rank);
            } else if state.en_passant_square == Some(to) {
                out.push(Move::new(
                    from,
                    to,
                    MoveFlag::EnPassantCapture,
                    PieceKind::Pawn,
                    Some(PieceKind::Pawn),
                ));
            }
        }
    }
}

/// Emit one pawn push/capture, expanding into the four promotion moves on
/// the back rank.
fn push_pawn_move(
    out: &mut Vec<Move>,
    from: Square,
    to: Square,
    captured: Option<PieceKind>,
    promotion_rank: u8,
) {
    if rank_of(to) == promotion_rank {
        for kind in PROMOTION_KINDS {
            out.push(Move::new(
                from,
                to,
                MoveFlag::promotion_to(kind, captured.is_some()),
                PieceKind::Pawn,
                captured,
            ));
        }
    } else if captured.is_some() {
        out.push(Move::new(
            from,
            to,
            MoveFlag::Capture,
            PieceKind::Pawn,
            captured,
        ));
    } else {
        out.push(Move::new(from, to, MoveFlag::Quiet, PieceKind::Pawn, None));
    }
}

fn generate_knight_moves(state: &GameState, mover: Color, out: &mut Vec<Move>) {
    let mut knights = state.pieces(mover, PieceKind::Knight);
    while knights != 0 {
        let from = pop_lsb(&mut knights);
        emit_targets(
            state,
            mover,
            from,
            PieceKind::Knight,
            knight_attacks(from),
            out,
        );
    }
}

fn generate_king_moves(state: &GameState, mover: Color, out: &mut Vec<Move>) {
    let from = state.king_square(mover);
    emit_targets(state, mover, from, PieceKind::King, king_attacks(from), out);
}

fn generate_slider_moves(state: &GameState, mover: Color, out: &mut Vec<Move>) {
    let occupied = state.occupied();

    for kind in [PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen] {
        let mut sliders = state.pieces(mover, kind);
        while sliders != 0 {
            let from = pop_lsb(&mut sliders);
            let attacks = match kind {
                PieceKind::Bishop => bishop_attacks(from, occupied),
                PieceKind::Rook => rook_attacks(from, occupied),
                _ => queen_attacks(from, occupied),
            };
            emit_targets(state, mover, from, kind, attacks, out);
        }
    }
}

/// Split an attack set into quiet moves and captures, skipping friendly
/// squares.
fn emit_targets(
    state: &GameState,
    mover: Color,
    from: Square,
    kind: PieceKind,
    attacks: u64,
    out: &mut Vec<Move>,
) {
    let enemy_occupancy = state.by_color[mover.opposite().index()];
    let mut targets = attacks & !state.by_color[mover.index()];

    while targets != 0 {
        let to = pop_lsb(&mut targets);
        if enemy_occupancy & (1u64 << to) != 0 {
            let captured = state.kind_on(to).expect("enemy occupancy bit set");
            out.push(Move::new(from, to, MoveFlag::Capture, kind, Some(captured)));
        } else {
            out.push(Move::new(from, to, MoveFlag::Quiet, kind, None));
        }
    }
}
