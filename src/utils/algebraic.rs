//! Square conversions for algebraic coordinates.
//!
//! Converts between human-readable coordinates (e.g., `e4`) and internal
//! square indices, reused by the FEN codec, SAN rendering, and display
//! helpers.

use crate::game_state::chess_types::{file_of, rank_of, Square};

/// Convert an algebraic coordinate (for example "e4") to a square index.
#[inline]
pub fn algebraic_to_square(square: &str) -> Result<Square, String> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return Err(format!("Invalid algebraic square: {square}"));
    }

    let file = bytes[0];
    let rank = bytes[1];

    if !(b'a'..=b'h').contains(&file) {
        return Err(format!("Invalid algebraic file: {}", file as char));
    }
    if !(b'1'..=b'8').contains(&rank) {
        return Err(format!("Invalid algebraic rank: {}", rank as char));
    }

    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Convert a square index (`0..=63`) to an algebraic coordinate.
#[inline]
pub fn square_to_algebraic(square: Square) -> Result<String, String> {
    if square > 63 {
        return Err(format!("Square index out of bounds: {square}"));
    }

    Ok(format!("{}{}", file_char(square), rank_char(square)))
}

/// The `a`..`h` file letter of a square.
#[inline]
pub fn file_char(square: Square) -> char {
    char::from(b'a' + file_of(square))
}

/// The `1`..`8` rank digit of a square.
#[inline]
pub fn rank_char(square: Square) -> char {
    char::from(b'1' + rank_of(square))
}
