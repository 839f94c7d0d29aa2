//! Precomputed ray and leaper attack tables.
//!
//! For every square and every one of the eight compass directions, the ray
//! table holds the squares reachable by sliding to the board edge. All
//! tables are built at compile time with `const fn` walks.

use crate::game_state::chess_types::Square;

/// One of the eight sliding directions.
///
/// A direction is *positive* when stepping it increases the square index
/// (N +8, NE +9, E +1, NW +7) and *negative* otherwise. The sign decides
/// which bit scan finds the nearest blocker on the ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    NorthWest,
    South,
    SouthWest,
    West,
    SouthEast,
}

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::NorthWest,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::SouthEast,
];

impl Direction {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::NorthWest => 3,
            Direction::South => 4,
            Direction::SouthWest => 5,
            Direction::West => 6,
            Direction::SouthEast => 7,
        }
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::NorthEast | Direction::East | Direction::NorthWest
        )
    }

    const fn file_step(self) -> i32 {
        match self {
            Direction::North | Direction::South => 0,
            Direction::NorthEast | Direction::East | Direction::SouthEast => 1,
            Direction::NorthWest | Direction::West | Direction::SouthWest => -1,
        }
    }

    const fn rank_step(self) -> i32 {
        match self {
            Direction::East | Direction::West => 0,
            Direction::North | Direction::NorthEast | Direction::NorthWest => 1,
            Direction::South | Direction::SouthEast | Direction::SouthWest => -1,
        }
    }
}

/// Ray attack table, `[Direction::index()][square]`.
pub const RAY_ATTACKS: [[u64; 64]; 8] = generate_ray_attacks();

#[inline]
pub const fn ray(direction: Direction, square: Square) -> u64 {
    RAY_ATTACKS[direction.index()][square as usize]
}

const fn generate_ray_attacks() -> [[u64; 64]; 8] {
    let mut table = [[0u64; 64]; 8];
    let mut dir_idx = 0usize;

    while dir_idx < 8 {
        let direction = ALL_DIRECTIONS[dir_idx];
        let mut sq = 0usize;

        while sq < 64 {
            table[dir_idx][sq] =
                trace_ray_const(sq as i32, direction.file_step(), direction.rank_step());
            sq += 1;
        }

        dir_idx += 1;
    }

    table
}

const fn trace_ray_const(square: i32, file_step: i32, rank_step: i32) -> u64 {
    let mut file = (square % 8) + file_step;
    let mut rank = (square / 8) + rank_step;
    let mut attacks = 0u64;

    while file >= 0 && file < 8 && rank >= 0 && rank < 8 {
        attacks |= 1u64 << (rank * 8 + file);
        file += file_step;
        rank += rank_step;
    }

    attacks
}
