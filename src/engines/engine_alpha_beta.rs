//! The main playing engine: alpha-beta search with a transposition table
//! and a pluggable scorer, preceded by an optional opening-book probe.
//!
//! When the caller supplies a book entry for the current position the
//! engine plays a weighted book reply and skips the search entirely; the
//! book is a pre-search shortcut, not part of the search itself.

use crate::book::book_entry::BookEntry;
use crate::engines::engine_trait::Engine;
use crate::game_state::game_state::GameState;
use crate::moves::chess_move::Move;
use crate::search::alpha_beta::{search_root, SearchConfig, SearchReport};
use crate::search::board_scoring::{BoardScorer, PieceSquareScorer};
use crate::search::transposition_table::TranspositionTable;

pub struct AlphaBetaEngine<S: BoardScorer> {
    scorer: S,
    tt: TranspositionTable,
    config: SearchConfig,
    previous_best: Option<Move>,
    last_report: SearchReport,
}

impl Default for AlphaBetaEngine<PieceSquareScorer> {
    fn default() -> Self {
        Self::new(PieceSquareScorer)
    }
}

impl<S: BoardScorer> AlphaBetaEngine<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            tt: TranspositionTable::new_with_mb(16),
            config: SearchConfig::default(),
            previous_best: None,
            last_report: SearchReport::default(),
        }
    }

    pub fn with_config(scorer: S, config: SearchConfig) -> Self {
        let mut engine = Self::new(scorer);
        engine.config = config;
        engine
    }

    /// Fixed-depth search entry point. Returns `None` only on checkmate
    /// or stalemate.
    pub fn find_best_move(&mut self, state: &mut GameState, depth: u8) -> Option<Move> {
        self.config.depth = depth.max(1);
        self.search(state)
    }

    /// Nodes, score and depth of the most recent search.
    pub fn last_report(&self) -> SearchReport {
        self.last_report
    }

    fn search(&mut self, state: &mut GameState) -> Option<Move> {
        let report = search_root(
            state,
            &self.scorer,
            &mut self.tt,
            self.config,
            self.previous_best,
        );
        self.previous_best = report.best_move;
        self.last_report = report;
        report.best_move
    }
}

impl<S: BoardScorer> Engine for AlphaBetaEngine<S> {
    fn name(&self) -> &str {
        "Quince AlphaBeta"
    }

    fn new_game(&mut self) {
        self.tt.clear();
        self.previous_best = None;
        self.last_report = SearchReport::default();
    }

    fn find_move(&mut self, state: &mut GameState, book_entry: Option<&BookEntry>) -> Option<Move> {
        if let Some(entry) = book_entry {
            let mut rng = rand::rng();
            if let Some(book_move) = entry.sample_move(state, &mut rng) {
                return Some(book_move);
            }
        }

        self.search(state)
    }
}
