//! Crate root module declarations for the Quince Chess engine core.
//!
//! This file exposes all top-level subsystems (game state, attack tables and
//! move encoding, move generation, search, opening book, engines, and utility
//! helpers) so tests, benches, and external tooling can import stable module
//! paths.

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod undo_state;
}

pub mod moves {
    pub mod bit_utils;
    pub mod chess_move;
    pub mod king_moves;
    pub mod knight_moves;
    pub mod pawn_moves;
    pub mod ray_attacks;
    pub mod slider_attacks;
}

pub mod move_generation {
    pub mod legal_move_generator;
    pub mod perft;
    pub mod san;
}

pub mod search {
    pub mod alpha_beta;
    pub mod board_scoring;
    pub mod piece_square_tables;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod book {
    pub mod book_builder;
    pub mod book_entry;
    pub mod opening_book;
}

pub mod engines {
    pub mod engine_alpha_beta;
    pub mod engine_material;
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod render_game_state;
}
