//! One opening-book position: a hash plus its weighted reply list.
//!
//! The binary layout per entry is 8 bytes of little-endian position hash,
//! one count byte, then three bytes per move packing `{from:6, to:6,
//! count:12}`. Counts are rescaled to `round(count * 2048 / total)` when
//! serialized, so stored weights sum to roughly 2048 per entry and
//! relative frequencies below about 1/2048 are lost by design.

use std::error::Error;
use std::fmt;
use std::io;

use rand::Rng;
use rand::RngExt;

use crate::game_state::chess_types::GameState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::chess_move::{Move, MoveFlag, MoveKey};

/// Hard cap on distinct replies per position; the single count byte of
/// the binary format cannot address more.
pub const MAX_BOOK_MOVES: usize = 128;

/// Bytes of a serialized move record.
const MOVE_RECORD_LEN: usize = 3;
/// Bytes of hash plus move-count header.
const ENTRY_HEADER_LEN: usize = 9;
/// Serialized counts are rescaled to sum to this per entry.
const COUNT_SCALE: u64 = 2048;

#[derive(Debug)]
pub enum BookError {
    Io(io::Error),
    /// The byte stream ended inside an entry.
    Truncated { offset: usize },
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::Io(err) => write!(f, "book i/o failed: {err}"),
            BookError::Truncated { offset } => {
                write!(f, "book data truncated at byte offset {offset}")
            }
        }
    }
}

impl Error for BookError {}

impl From<io::Error> for BookError {
    fn from(err: io::Error) -> Self {
        BookError::Io(err)
    }
}

/// One reply with its occurrence count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookMove {
    pub key: MoveKey,
    pub count: u32,
}

/// Insertion-ordered reply list for one position hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    pub hash: u64,
    moves: Vec<BookMove>,
}

impl BookEntry {
    pub fn new(hash: u64) -> Self {
        Self {
            hash,
            moves: Vec::new(),
        }
    }

    #[inline]
    pub fn moves(&self) -> &[BookMove] {
        &self.moves
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.moves.iter().map(|m| u64::from(m.count)).sum()
    }

    /// Record one more occurrence of a reply, appending it if new. Replies
    /// beyond the format's 128-move cap are dropped.
    pub fn insert(&mut self, key: MoveKey) {
        self.add_count(key, 1);
    }

    fn add_count(&mut self, key: MoveKey, count: u32) {
        if let Some(existing) = self.moves.iter_mut().find(|m| m.key == key) {
            existing.count += count;
        } else if self.moves.len() < MAX_BOOK_MOVES {
            self.moves.push(BookMove { key, count });
        }
    }

    /// Drop replies seen fewer than `min_count` times. Returns true when
    /// the whole entry should be dropped because the surviving total is
    /// still below the threshold.
    pub fn filter(&mut self, min_count: u32) -> bool {
        self.moves.retain(|m| m.count >= min_count);
        self.total_count() < u64::from(min_count)
    }

    /// Multiply every count by a merge weight.
    pub fn scale(&mut self, weight: u32) {
        for m in &mut self.moves {
            m.count *= weight;
        }
    }

    /// Merge two entries for the same position, weighting each side.
    /// Replies present in both sum their weighted counts; replies unique
    /// to `b` are appended after `a`'s.
    pub fn merge(a: &BookEntry, b: &BookEntry, weight_a: u32, weight_b: u32) -> BookEntry {
        assert_eq!(a.hash, b.hash, "merged entries must share a position");

        let mut merged = BookEntry::new(a.hash);
        for m in &a.moves {
            merged.add_count(m.key, m.count * weight_a);
        }
        for m in &b.moves {
            merged.add_count(m.key, m.count * weight_b);
        }
        merged
    }

    /// Append the binary form of this entry.
    pub fn serialize_into(&self, out: &mut Vec<u8>) {
        let total = self.total_count().max(1);

        out.extend_from_slice(&self.hash.to_le_bytes());
        out.push(self.moves.len() as u8);

        for m in &self.moves {
            let scaled = ((u64::from(m.count) * COUNT_SCALE + total / 2) / total) as u16;
            let from = m.key.from as u16;
            let to = m.key.to as u16;

            out.push(((from << 2) | (to >> 4)) as u8);
            out.push((((to & 0xf) << 4) | (scaled >> 8)) as u8);
            out.push((scaled & 0xff) as u8);
        }
    }

    /// Read one entry starting at `pos`; returns it with the offset of
    /// the next entry.
    pub fn deserialize(bytes: &[u8], pos: usize) -> Result<(BookEntry, usize), BookError> {
        if pos + ENTRY_HEADER_LEN > bytes.len() {
            return Err(BookError::Truncated { offset: pos });
        }

        let hash = u64::from_le_bytes(
            bytes[pos..pos + 8]
                .try_into()
                .expect("slice length is eight"),
        );
        let move_count = bytes[pos + 8] as usize;

        let end = pos + ENTRY_HEADER_LEN + move_count * MOVE_RECORD_LEN;
        if end > bytes.len() {
            return Err(BookError::Truncated { offset: pos });
        }

        let mut entry = BookEntry::new(hash);
        for i in 0..move_count {
            let at = pos + ENTRY_HEADER_LEN + i * MOVE_RECORD_LEN;
            let (b0, b1, b2) = (bytes[at], bytes[at + 1], bytes[at + 2]);

            let from = b0 >> 2;
            let to = ((b0 & 0x3) << 4) | (b1 >> 4);
            let count = (u32::from(b1 & 0xf) << 8) | u32::from(b2);

            entry.moves.push(BookMove {
                key: MoveKey { from, to },
                count,
            });
        }

        Ok((entry, end))
    }

    /// Roulette-select a reply key weighted by occurrence counts.
    pub fn sample_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MoveKey> {
        let total = self.total_count();
        if total == 0 {
            return self.moves.first().map(|m| m.key);
        }

        let mut pick = rng.random_range(0..total);
        for m in &self.moves {
            let weight = u64::from(m.count);
            if pick < weight {
                return Some(m.key);
            }
            pick -= weight;
        }

        self.moves.first().map(|m| m.key)
    }

    /// Sample a reply and resolve it against the position's legal moves.
    /// The compact format stores only (from, to), so a promotion resolves
    /// to the queen-promotion variant.
    pub fn sample_move<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        rng: &mut R,
    ) -> Option<Move> {
        let key = self.sample_key(rng)?;
        let legal = legal_moves(state);
        let mut matches = legal.iter().filter(|mv| mv.key() == key);

        let first = matches.next()?;
        if first.flag.promotion_kind().is_none() {
            return Some(*first);
        }

        std::iter::once(first)
            .chain(matches)
            .find(|mv| {
                matches!(
                    mv.flag,
                    MoveFlag::QueenPromotion | MoveFlag::QueenPromotionCapture
                )
            })
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{BookEntry, BookError};
    use crate::game_state::chess_types::GameState;
    use crate::moves::chess_move::{MoveFlag, MoveKey};

    fn key(from: u8, to: u8) -> MoveKey {
        MoveKey { from, to }
    }

    fn entry_with_counts(hash: u64, counts: &[(u8, u8, u32)]) -> BookEntry {
        let mut entry = BookEntry::new(hash);
        for &(from, to, count) in counts {
            for _ in 0..count {
                entry.insert(key(from, to));
            }
        }
        entry
    }

    #[test]
    fn insert_accumulates_in_insertion_order() {
        let entry = entry_with_counts(1, &[(12, 28, 3), (11, 27, 2), (12, 28, 1)]);
        // (12,28) was re-inserted but keeps its first slot.
        assert_eq!(entry.moves()[0].key, key(12, 28));
        assert_eq!(entry.moves()[0].count, 4);
        assert_eq!(entry.moves()[1].count, 2);
        assert_eq!(entry.total_count(), 6);
    }

    #[test]
    fn serialize_deserialize_round_trip_preserves_keys_and_scaled_counts() {
        let entry = entry_with_counts(0xfeed_beef_cafe_d00d, &[(12, 28, 700), (11, 27, 200), (6, 21, 124)]);
        let total = entry.total_count();

        let mut bytes = Vec::new();
        entry.serialize_into(&mut bytes);
        assert_eq!(bytes.len(), 9 + 3 * entry.len());

        let (recovered, next) = BookEntry::deserialize(&bytes, 0).expect("entry should parse");
        assert_eq!(next, bytes.len());
        assert_eq!(recovered.hash, entry.hash);
        assert_eq!(recovered.len(), entry.len());

        for (original, restored) in entry.moves().iter().zip(recovered.moves()) {
            assert_eq!(original.key, restored.key);
            let expected = (u64::from(original.count) * 2048 + total / 2) / total;
            assert_eq!(u64::from(restored.count), expected);
        }

        // Scaled counts sum to roughly the scale constant.
        let sum: u64 = recovered.moves().iter().map(|m| u64::from(m.count)).sum();
        assert!((2046..=2050).contains(&sum), "scaled sum was {sum}");
    }

    #[test]
    fn deserialize_rejects_truncated_data() {
        let entry = entry_with_counts(7, &[(12, 28, 5)]);
        let mut bytes = Vec::new();
        entry.serialize_into(&mut bytes);

        for cut in [1, 8, bytes.len() - 1] {
            match BookEntry::deserialize(&bytes[..cut], 0) {
                Err(BookError::Truncated { .. }) => {}
                other => panic!("expected truncation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn filter_drops_rare_moves_then_rare_entries() {
        let mut entry = entry_with_counts(3, &[(12, 28, 10), (11, 27, 2)]);
        assert!(!entry.filter(5));
        assert_eq!(entry.len(), 1);
        assert_eq!(entry.moves()[0].key, key(12, 28));

        // Once everything is rare the entry itself reports droppable.
        let mut sparse = entry_with_counts(4, &[(12, 28, 2), (11, 27, 2)]);
        assert!(sparse.filter(5));
    }

    #[test]
    fn merging_an_entry_with_itself_doubles_every_count() {
        let entry = entry_with_counts(9, &[(12, 28, 7), (11, 27, 3), (6, 21, 1)]);
        let merged = BookEntry::merge(&entry, &entry, 1, 1);

        assert_eq!(merged.len(), entry.len());
        for (original, doubled) in entry.moves().iter().zip(merged.moves()) {
            assert_eq!(original.key, doubled.key);
            assert_eq!(doubled.count, original.count * 2);
        }
    }

    #[test]
    fn merge_applies_weights_and_appends_unique_moves() {
        let a = entry_with_counts(5, &[(12, 28, 4)]);
        let b = entry_with_counts(5, &[(12, 28, 1), (11, 27, 2)]);
        let merged = BookEntry::merge(&a, &b, 10, 1);

        assert_eq!(merged.moves()[0].key, key(12, 28));
        assert_eq!(merged.moves()[0].count, 41);
        assert_eq!(merged.moves()[1].key, key(11, 27));
        assert_eq!(merged.moves()[1].count, 2);
    }

    #[test]
    fn sampling_respects_weights_and_resolves_against_legal_moves() {
        let state = GameState::new_game();
        let mut entry = BookEntry::new(state.zobrist_key);
        // e2e4 heavily favored over a2a3.
        for _ in 0..1000 {
            entry.insert(key(12, 28));
        }
        entry.insert(key(8, 16));

        let mut rng = StdRng::seed_from_u64(11);
        let mut saw_push = 0;
        for _ in 0..50 {
            let mv = entry
                .sample_move(&state, &mut rng)
                .expect("a legal book move exists");
            assert!(mv.key() == key(12, 28) || mv.key() == key(8, 16));
            if mv.key() == key(12, 28) {
                saw_push += 1;
            }
        }
        assert!(saw_push >= 45, "weighted sampling should favor e2e4");
    }

    #[test]
    fn sampled_promotions_resolve_to_the_queen_variant() {
        let state =
            GameState::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").expect("fen should parse");
        let mut entry = BookEntry::new(state.zobrist_key);
        entry.insert(key(52, 60));

        let mut rng = StdRng::seed_from_u64(3);
        let mv = entry
            .sample_move(&state, &mut rng)
            .expect("promotion should resolve");
        assert_eq!(mv.flag, MoveFlag::QueenPromotion);
    }

    #[test]
    fn unresolvable_book_moves_sample_to_none() {
        let state = GameState::new_game();
        let mut entry = BookEntry::new(state.zobrist_key);
        entry.insert(key(0, 63)); // no such legal move

        let mut rng = StdRng::seed_from_u64(5);
        assert!(entry.sample_move(&state, &mut rng).is_none());
    }
}
