//! Move encoding and the reversible make/unmake state machine.
//!
//! A `Move` is an immutable value: origin, destination, a flag naming the
//! move category, the moved kind, and the captured kind if any. `make`
//! mutates a `GameState` in place and returns the `UndoState` that
//! `unmake` needs to restore the prior state bit for bit. Make/unmake
//! pairs must nest strictly (LIFO) on the same state.

use std::fmt;

use crate::game_state::chess_rules::{KING_SIDE_ROOK, QUEEN_SIDE_ROOK};
use crate::game_state::chess_types::*;
use crate::search::zobrist;

/// Move category. The eight promotion variants encode the promoted kind
/// and whether the promotion also captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFlag {
    Quiet,
    DoublePawnPush,
    KingCastle,
    QueenCastle,
    Capture,
    EnPassantCapture,
    KnightPromotion,
    BishopPromotion,
    RookPromotion,
    QueenPromotion,
    KnightPromotionCapture,
    BishopPromotionCapture,
    RookPromotionCapture,
    QueenPromotionCapture,
}

impl MoveFlag {
    #[inline]
    pub const fn is_capture(self) -> bool {
        matches!(
            self,
            MoveFlag::Capture
                | MoveFlag::EnPassantCapture
                | MoveFlag::KnightPromotionCapture
                | MoveFlag::BishopPromotionCapture
                | MoveFlag::RookPromotionCapture
                | MoveFlag::QueenPromotionCapture
        )
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion_kind().is_some()
    }

    #[inline]
    pub const fn is_castle(self) -> bool {
        matches!(self, MoveFlag::KingCastle | MoveFlag::QueenCastle)
    }

    #[inline]
    pub const fn promotion_kind(self) -> Option<PieceKind> {
        match self {
            MoveFlag::KnightPromotion | MoveFlag::KnightPromotionCapture => Some(PieceKind::Knight),
            MoveFlag::BishopPromotion | MoveFlag::BishopPromotionCapture => Some(PieceKind::Bishop),
            MoveFlag::RookPromotion | MoveFlag::RookPromotionCapture => Some(PieceKind::Rook),
            MoveFlag::QueenPromotion | MoveFlag::QueenPromotionCapture => Some(PieceKind::Queen),
            _ => None,
        }
    }

    /// The promotion flag for a promoted kind, capturing or not.
    pub fn promotion_to(kind: PieceKind, capture: bool) -> MoveFlag {
        match (kind, capture) {
            (PieceKind::Knight, false) => MoveFlag::KnightPromotion,
            (PieceKind::Bishop, false) => MoveFlag::BishopPromotion,
            (PieceKind::Rook, false) => MoveFlag::RookPromotion,
            (PieceKind::Queen, false) => MoveFlag::QueenPromotion,
            (PieceKind::Knight, true) => MoveFlag::KnightPromotionCapture,
            (PieceKind::Bishop, true) => MoveFlag::BishopPromotionCapture,
            (PieceKind::Rook, true) => MoveFlag::RookPromotionCapture,
            (PieceKind::Queen, true) => MoveFlag::QueenPromotionCapture,
            (kind, _) => panic!("{kind:?} is not a promotion kind"),
        }
    }
}

/// (from, to) identity used by the opening book, where promotions are not
/// disambiguated. Distinct from full `Move` equality on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveKey {
    pub from: Square,
    pub to: Square,
}

/// A single chess move. Equality compares the full encoding; use
/// [`Move::key`] for the (from, to)-only notion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub flag: MoveFlag,
    pub moved: PieceKind,
    pub captured: Option<PieceKind>,
}

impl Move {
    pub fn new(
        from: Square,
        to: Square,
        flag: MoveFlag,
        moved: PieceKind,
        captured: Option<PieceKind>,
    ) -> Self {
        debug_assert_eq!(flag.is_capture(), captured.is_some());
        Self {
            from,
            to,
            flag,
            moved,
            captured,
        }
    }

    #[inline]
    pub fn key(&self) -> MoveKey {
        MoveKey {
            from: self.from,
            to: self.to,
        }
    }

    /// Square the captured piece actually stands on; differs from `to`
    /// only for en-passant captures.
    #[inline]
    fn capture_square(&self, mover: Color) -> Square {
        if self.flag == MoveFlag::EnPassantCapture {
            match mover {
                Color::Light => self.to - 8,
                Color::Dark => self.to + 8,
            }
        } else {
            self.to
        }
    }

    #[inline]
    fn castle_rook_squares(&self, mover: Color) -> Option<(Square, Square)> {
        match self.flag {
            MoveFlag::KingCastle => Some(KING_SIDE_ROOK[mover.index()]),
            MoveFlag::QueenCastle => Some(QUEEN_SIDE_ROOK[mover.index()]),
            _ => None,
        }
    }

    /// Castling rights this move can revoke: both rights of a moving king,
    /// plus the right tied to any corner square the move leaves or lands
    /// on (which also catches rooks captured at home).
    fn revoked_rights(&self, mover: Color) -> CastlingRights {
        let mut revoked = 0;
        if self.moved == PieceKind::King {
            revoked |= CASTLE_RIGHTS_OF[mover.index()];
        }
        for square in [self.from, self.to] {
            revoked |= match square {
                0 => CASTLE_LIGHT_QUEENSIDE,
                7 => CASTLE_LIGHT_KINGSIDE,
                56 => CASTLE_DARK_QUEENSIDE,
                63 => CASTLE_DARK_KINGSIDE,
                _ => 0,
            };
        }
        revoked
    }

    /// Apply the piece-placement effect of this move. Every effect is an
    /// XOR toggle, so the identical call also reverts it.
    fn toggle_placement(&self, state: &mut GameState, mover: Color, enemy: Color) {
        let from_mask = 1u64 << self.from;
        let to_mask = 1u64 << self.to;

        if let Some(promoted) = self.flag.promotion_kind() {
            if let Some(captured) = self.captured {
                state.xor_piece(enemy, captured, to_mask);
            }
            state.xor_piece(mover, PieceKind::Pawn, from_mask);
            state.xor_piece(mover, promoted, to_mask);
            return;
        }

        state.xor_piece(mover, self.moved, from_mask | to_mask);

        match self.flag {
            MoveFlag::Capture => {
                let captured = self.captured.expect("capture move must name its victim");
                state.xor_piece(enemy, captured, to_mask);
            }
            MoveFlag::EnPassantCapture => {
                let capture_mask = 1u64 << self.capture_square(mover);
                state.xor_piece(enemy, PieceKind::Pawn, capture_mask);
            }
            MoveFlag::KingCastle | MoveFlag::QueenCastle => {
                let (rook_from, rook_to) = self
                    .castle_rook_squares(mover)
                    .expect("castle flag has rook squares");
                state.xor_piece(mover, PieceKind::Rook, (1u64 << rook_from) | (1u64 << rook_to));
            }
            _ => {}
        }
    }

    /// Play this move on `state` and return the undo record for
    /// [`Move::unmake`].
    pub fn make(&self, state: &mut GameState) -> UndoState {
        let undo = UndoState {
            prev_castling_rights: state.castling_rights,
            prev_en_passant_square: state.en_passant_square,
            prev_halfmove_clock: state.halfmove_clock,
            prev_zobrist_key: state.zobrist_key,
        };

        let mover = state.side_to_move;
        let enemy = mover.opposite();

        // An en-passant target is only live for one reply.
        state.en_passant_square = None;
        if self.flag == MoveFlag::DoublePawnPush {
            state.en_passant_square = Some((self.from + self.to) / 2);
        }

        self.toggle_placement(state, mover, enemy);

        let revoked = self.revoked_rights(mover) & state.castling_rights;
        state.castling_rights &= !revoked;

        if mover == Color::Dark {
            state.fullmove_number += 1;
        }
        state.side_to_move = enemy;

        if self.moved == PieceKind::Pawn || self.flag.is_capture() {
            state.halfmove_clock = 0;
        } else {
            state.halfmove_clock = state.halfmove_clock.saturating_add(1);
        }

        self.update_hash(state, mover, enemy, &undo, revoked);
        undo
    }

    /// Revert this move. Must be called with the `UndoState` returned by
    /// the matching `make`, with no unpaired make in between.
    pub fn unmake(&self, state: &mut GameState, undo: UndoState) {
        state.side_to_move = state.side_to_move.opposite();
        let mover = state.side_to_move;
        let enemy = mover.opposite();

        self.toggle_placement(state, mover, enemy);

        state.castling_rights = undo.prev_castling_rights;
        state.en_passant_square = undo.prev_en_passant_square;
        state.halfmove_clock = undo.prev_halfmove_clock;
        if mover == Color::Dark {
            state.fullmove_number -= 1;
        }
        state.zobrist_key = undo.prev_zobrist_key;
    }

    /// Incremental hash update; every term is self-inverse under XOR.
    fn update_hash(
        &self,
        state: &mut GameState,
        mover: Color,
        enemy: Color,
        undo: &UndoState,
        revoked: CastlingRights,
    ) {
        let mut key = state.zobrist_key;

        key ^= zobrist::piece_square_key(mover, self.moved, self.from);
        let landed = self.flag.promotion_kind().unwrap_or(self.moved);
        key ^= zobrist::piece_square_key(mover, landed, self.to);

        if let Some(captured) = self.captured {
            key ^= zobrist::piece_square_key(enemy, captured, self.capture_square(mover));
        }

        if let Some((rook_from, rook_to)) = self.castle_rook_squares(mover) {
            key ^= zobrist::piece_square_key(mover, PieceKind::Rook, rook_from);
            key ^= zobrist::piece_square_key(mover, PieceKind::Rook, rook_to);
        }

        key ^= zobrist::castling_rights_key(revoked);

        if let Some(prev_ep) = undo.prev_en_passant_square {
            key ^= zobrist::en_passant_file_key(file_of(prev_ep));
        }
        if let Some(new_ep) = state.en_passant_square {
            key ^= zobrist::en_passant_file_key(file_of(new_ep));
        }

        key ^= zobrist::side_to_move_key();
        state.zobrist_key = key;
    }
}

impl fmt::Display for Move {
    /// Long-algebraic rendering, e.g. `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let square = |sq: Square| {
            format!(
                "{}{}",
                char::from(b'a' + file_of(sq)),
                char::from(b'1' + rank_of(sq))
            )
        };
        write!(f, "{}{}", square(self.from), square(self.to))?;
        if let Some(kind) = self.flag.promotion_kind() {
            let suffix = match kind {
                PieceKind::Knight => 'n',
                PieceKind::Bishop => 'b',
                PieceKind::Rook => 'r',
                _ => 'q',
            };
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}
