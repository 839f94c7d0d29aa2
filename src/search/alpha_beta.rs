//! Fixed-depth negamax alpha-beta search over the legal move list.
//!
//! The child's score is always negated into the parent because evaluation
//! is defined from the mover's perspective. The transposition table may
//! short-circuit a subtree only when its cached depth covers the depth
//! still to be searched; shallower entries are ignored and the subtree is
//! searched in full. Cached scores are served as-is without bound
//! tracking, matching the table's documented trade-offs.
//!
//! Move ordering is a heuristic only: captures ordered by victim value
//! minus attacker rank, with the caller's previous best move pulled to
//! the front at the root.

use crate::game_state::chess_types::GameState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::chess_move::Move;
use crate::search::board_scoring::{piece_value, BoardScorer};
use crate::search::transposition_table::{NodeKind, TranspositionEntry, TranspositionTable};

/// Sentinel magnitude for checkmate at a searched node.
pub const MATE_SCORE: i32 = 30_000;
/// Score returned for stalemate.
pub const DRAW_SCORE: i32 = 0;

const SCORE_INFINITY: i32 = 1_000_000;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Total plies searched below the root position; clamped to at least 1.
    pub depth: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { depth: 4 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    pub score: i32,
    pub nodes: u64,
    pub depth: u8,
}

/// Search the position to a fixed depth and report the best move.
///
/// `previous_best`, when given, is ordered to the front of the root move
/// list to improve cutoff rates. `best_move` is `None` only on checkmate
/// or stalemate.
pub fn search_root<S: BoardScorer>(
    state: &mut GameState,
    scorer: &S,
    tt: &mut TranspositionTable,
    config: SearchConfig,
    previous_best: Option<Move>,
) -> SearchReport {
    let depth = config.depth.max(1);
    let mut nodes = 0u64;

    let mut moves = legal_moves(state);
    if moves.is_empty() {
        let score = if state.in_check(state.side_to_move) {
            -MATE_SCORE
        } else {
            DRAW_SCORE
        };
        return SearchReport {
            best_move: None,
            score,
            nodes: 1,
            depth,
        };
    }

    order_moves(&mut moves, previous_best);

    let root_key = state.zobrist_key;
    let mut alpha = -SCORE_INFINITY;
    let beta = SCORE_INFINITY;
    let mut best_move = None;

    for mv in moves {
        let undo = mv.make(state);
        let score = -alpha_beta(state, scorer, tt, -beta, -alpha, depth - 1, &mut nodes);
        mv.unmake(state, undo);

        if score > alpha {
            alpha = score;
            best_move = Some(mv);
        }
    }

    tt.set(
        root_key,
        TranspositionEntry {
            best_move,
            depth,
            score: alpha,
            node_kind: NodeKind::Pv,
        },
    );

    SearchReport {
        best_move,
        score: alpha,
        nodes,
        depth,
    }
}

fn alpha_beta<S: BoardScorer>(
    state: &mut GameState,
    scorer: &S,
    tt: &mut TranspositionTable,
    mut alpha: i32,
    beta: i32,
    depth_left: u8,
    nodes: &mut u64,
) -> i32 {
    *nodes += 1;

    if depth_left == 0 {
        return scorer.score(state);
    }

    let key = state.zobrist_key;
    let mut hint = None;
    if let Some(cached) = tt.get(key) {
        if cached.depth >= depth_left {
            return cached.score;
        }
        hint = cached.best_move;
    }

    let mut moves = legal_moves(state);
    if moves.is_empty() {
        return if state.in_check(state.side_to_move) {
            -MATE_SCORE
        } else {
            DRAW_SCORE
        };
    }

    order_moves(&mut moves, hint);

    let mut best_move = None;
    for mv in moves {
        let undo = mv.make(state);
        let score = -alpha_beta(state, scorer, tt, -beta, -alpha, depth_left - 1, nodes);
        mv.unmake(state, undo);

        if score >= beta {
            tt.set(
                key,
                TranspositionEntry {
                    best_move: Some(mv),
                    depth: depth_left,
                    score: beta,
                    node_kind: NodeKind::All,
                },
            );
            return beta;
        }
        if score > alpha {
            alpha = score;
            best_move = Some(mv);
        }
    }

    tt.set(
        key,
        TranspositionEntry {
            best_move,
            depth: depth_left,
            score: alpha,
            node_kind: if best_move.is_some() {
                NodeKind::Pv
            } else {
                NodeKind::All
            },
        },
    );

    alpha
}

/// Captured-piece value minus the mover's kind rank; quiet moves score 0.
#[inline]
pub fn capture_score(mv: &Move) -> i32 {
    match mv.captured {
        Some(captured) => piece_value(captured) - mv.moved.index() as i32,
        None => 0,
    }
}

fn order_moves(moves: &mut [Move], front: Option<Move>) {
    moves.sort_by_key(|mv| {
        let score = if Some(*mv) == front {
            i32::MAX
        } else {
            capture_score(mv)
        };
        std::cmp::Reverse(score)
    });
}

#[cfg(test)]
mod tests {
    use super::{capture_score, order_moves, search_root, SearchConfig, MATE_SCORE};
    use crate::game_state::chess_types::{GameState, PieceKind};
    use crate::moves::chess_move::{Move, MoveFlag};
    use crate::search::board_scoring::{MaterialScorer, PieceSquareScorer};
    use crate::search::transposition_table::TranspositionTable;

    fn search(fen: &str, depth: u8) -> super::SearchReport {
        let mut state = GameState::from_fen(fen).expect("fen should parse");
        let mut tt = TranspositionTable::new_with_mb(4);
        search_root(
            &mut state,
            &MaterialScorer,
            &mut tt,
            SearchConfig { depth },
            None,
        )
    }

    #[test]
    fn depth_one_search_grabs_a_hanging_queen() {
        let report = search("k7/8/8/3q4/4P3/8/8/K7 w - - 0 1", 1);
        let best = report.best_move.expect("a move must be found");
        assert_eq!(best.from, 28);
        assert_eq!(best.to, 35);
        assert_eq!(best.flag, MoveFlag::Capture);
    }

    #[test]
    fn mate_in_one_is_found_and_scored_as_mate() {
        // Back-rank mate with Ra8.
        let report = search("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 2);
        let best = report.best_move.expect("a move must be found");
        assert_eq!(best.to_string(), "a1a8");
        assert_eq!(report.score, MATE_SCORE);
    }

    #[test]
    fn checkmated_root_reports_no_move_and_mate_score() {
        let report = search("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1", 3);
        assert!(report.best_move.is_none());
        assert_eq!(report.score, -MATE_SCORE);
    }

    #[test]
    fn stalemated_root_reports_no_move_and_draw_score() {
        let report = search("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 3);
        assert!(report.best_move.is_none());
        assert_eq!(report.score, 0);
    }

    #[test]
    fn search_leaves_the_state_untouched() {
        let mut state = GameState::new_game();
        let before = state.clone();
        let mut tt = TranspositionTable::new_with_mb(4);
        let report = search_root(
            &mut state,
            &PieceSquareScorer,
            &mut tt,
            SearchConfig { depth: 3 },
            None,
        );
        assert!(report.best_move.is_some());
        assert_eq!(state, before);
    }

    #[test]
    fn repeat_search_with_a_warm_table_agrees_on_the_move() {
        let mut state = GameState::from_fen("k7/8/8/3q4/4P3/8/8/K7 w - - 0 1")
            .expect("fen should parse");
        let mut tt = TranspositionTable::new_with_mb(4);
        let config = SearchConfig { depth: 3 };

        let cold = search_root(&mut state, &MaterialScorer, &mut tt, config, None);
        let warm = search_root(&mut state, &MaterialScorer, &mut tt, config, cold.best_move);
        assert_eq!(cold.best_move, warm.best_move);
    }

    #[test]
    fn capture_ordering_prefers_big_victims_and_cheap_attackers() {
        let pawn_takes_queen = Move::new(
            28,
            35,
            MoveFlag::Capture,
            PieceKind::Pawn,
            Some(PieceKind::Queen),
        );
        let queen_takes_pawn = Move::new(
            3,
            35,
            MoveFlag::Capture,
            PieceKind::Queen,
            Some(PieceKind::Pawn),
        );
        let quiet = Move::new(1, 18, MoveFlag::Quiet, PieceKind::Knight, None);

        assert!(capture_score(&pawn_takes_queen) > capture_score(&queen_takes_pawn));
        assert!(capture_score(&queen_takes_pawn) > capture_score(&quiet));

        let mut moves = vec![quiet, queen_takes_pawn, pawn_takes_queen];
        order_moves(&mut moves, Some(quiet));
        assert_eq!(moves[0], quiet, "the hinted move sorts to the front");
        assert_eq!(moves[1], pawn_takes_queen);
    }
}
