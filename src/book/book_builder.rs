//! Opening-book construction and merging from game-record corpora.
//!
//! The corpus format is one game per line, space-separated SAN tokens
//! with move numbers and results already stripped by an upstream
//! extraction pass. Each game is replayed from the starting position up
//! to a ply limit; every visited (position, reply) pair feeds the book.
//! When a token does not resolve against the legal moves, the board is
//! reset and the token is retried as the first move of a fresh game
//! (lines sometimes hold concatenated games); a second failure skips the
//! rest of the line. Build and merge are batch, single-pass operations
//! with periodic console progress, timestamped reports, and no silent
//! retries on I/O errors.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::Local;

use crate::book::book_entry::{BookEntry, BookError};
use crate::game_state::chess_types::GameState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::move_generation::san::resolve_san;

/// Progress lines are printed every this many processed items.
const PROGRESS_INTERVAL: u64 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct BookConfig {
    /// Minimum occurrences for a move, and for a position's surviving
    /// total, to stay in the book.
    pub min_occurrences: u32,
    /// Replay depth limit per game, in plies.
    pub max_ply: u32,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 5,
            max_ply: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BookReport {
    pub games: u64,
    pub skipped_games: u64,
    pub entries: usize,
}

/// Build a book file from a corpus file.
pub fn build_book(
    corpus_path: &Path,
    out_path: &Path,
    config: &BookConfig,
) -> Result<BookReport, BookError> {
    println!(
        "[{}] building book from {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        corpus_path.display()
    );

    let reader = BufReader::new(fs::File::open(corpus_path)?);
    let (mut entries, games, skipped_games) = insert_games(reader, config)?;
    println!("{games} games, {} entries.", entries.len());

    println!("Filtering entries...");
    filter_entries(&mut entries, config.min_occurrences);
    println!("{} entries left...", entries.len());

    println!("Saving entries...");
    save_entries(&entries, out_path)?;

    println!(
        "[{}] done: {} games ({} skipped), {} entries written",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        games,
        skipped_games,
        entries.len()
    );

    Ok(BookReport {
        games,
        skipped_games,
        entries: entries.len(),
    })
}

/// Merge two book files entry-by-entry in ascending hash order. Entries
/// present in only one input pass through with that book's weight
/// applied; entries present in both sum their weighted counts.
pub fn merge_books(
    in_a: &Path,
    in_b: &Path,
    out_path: &Path,
    weight_a: u32,
    weight_b: u32,
) -> Result<BookReport, BookError> {
    println!("Opening entries...");
    let a = read_book_file(in_a)?;
    let b = read_book_file(in_b)?;
    println!("Merging {} entries...", a.len() + b.len());

    let mut merged = BTreeMap::new();
    let mut iter_a = a.into_iter().peekable();
    let mut iter_b = b.into_iter().peekable();
    let mut processed = 0u64;

    loop {
        let take_from = match (iter_a.peek(), iter_b.peek()) {
            (Some((ha, _)), Some((hb, _))) => {
                if ha < hb {
                    0
                } else if hb < ha {
                    1
                } else {
                    2
                }
            }
            (Some(_), None) => 0,
            (None, Some(_)) => 1,
            (None, None) => break,
        };

        match take_from {
            0 => {
                let (hash, mut entry) = iter_a.next().expect("peeked entry exists");
                entry.scale(weight_a);
                merged.insert(hash, entry);
            }
            1 => {
                let (hash, mut entry) = iter_b.next().expect("peeked entry exists");
                entry.scale(weight_b);
                merged.insert(hash, entry);
            }
            _ => {
                let (hash, entry_a) = iter_a.next().expect("peeked entry exists");
                let (_, entry_b) = iter_b.next().expect("peeked entry exists");
                merged.insert(hash, BookEntry::merge(&entry_a, &entry_b, weight_a, weight_b));
            }
        }

        processed += 1;
        if processed % PROGRESS_INTERVAL == 0 {
            println!("{processed} entries merged...");
        }
    }

    println!("Saving entries...");
    save_entries(&merged, out_path)?;
    println!(
        "[{}] merge done: {} entries written",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        merged.len()
    );

    Ok(BookReport {
        games: 0,
        skipped_games: 0,
        entries: merged.len(),
    })
}

/// Read a book file into a hash-ordered map. Duplicate hashes keep the
/// first occurrence.
pub fn read_book_file(path: &Path) -> Result<BTreeMap<u64, BookEntry>, BookError> {
    let bytes = fs::read(path)?;
    read_book_bytes(&bytes)
}

pub(crate) fn read_book_bytes(bytes: &[u8]) -> Result<BTreeMap<u64, BookEntry>, BookError> {
    let mut entries = BTreeMap::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let (entry, next) = BookEntry::deserialize(bytes, pos)?;
        entries.entry(entry.hash).or_insert(entry);
        pos = next;

        if entries.len() as u64 % PROGRESS_INTERVAL == 0 {
            println!("{} entries...", entries.len());
        }
    }

    Ok(entries)
}

/// Replay every game in the corpus, recording visited (position, reply)
/// pairs. Returns the entry map plus game and skip counts.
fn insert_games<R: BufRead>(
    reader: R,
    config: &BookConfig,
) -> Result<(BTreeMap<u64, BookEntry>, u64, u64), BookError> {
    let mut entries: BTreeMap<u64, BookEntry> = BTreeMap::new();
    let mut games = 0u64;
    let mut skipped_games = 0u64;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        games += 1;
        if !replay_game(&tokens, line_number + 1, config, &mut entries) {
            skipped_games += 1;
        }

        if games % PROGRESS_INTERVAL == 0 {
            println!("{games} games...");
        }
    }

    Ok((entries, games, skipped_games))
}

/// Replay one corpus line. On an unresolvable token the board restarts
/// from the game's start state and the token gets one retry; a second
/// failure abandons the line. Returns false when the line was abandoned.
fn replay_game(
    tokens: &[&str],
    line_number: usize,
    config: &BookConfig,
    entries: &mut BTreeMap<u64, BookEntry>,
) -> bool {
    let mut state = GameState::new_game();
    let mut ply = 0u32;

    for (column, token) in tokens.iter().enumerate() {
        if ply >= config.max_ply {
            break;
        }

        let legal = legal_moves(&state);
        let mv = match resolve_san(token, &legal) {
            Some(mv) => mv,
            None => {
                // Possibly the first move of a concatenated game.
                state = GameState::new_game();
                ply = 0;
                let fresh_legal = legal_moves(&state);
                match resolve_san(token, &fresh_legal) {
                    Some(mv) => mv,
                    None => {
                        println!("game {line_number}, move {column}: unresolved token '{token}'");
                        return false;
                    }
                }
            }
        };

        entries
            .entry(state.zobrist_key)
            .or_insert_with(|| BookEntry::new(state.zobrist_key))
            .insert(mv.key());

        mv.make(&mut state);
        ply += 1;
    }

    true
}

fn filter_entries(entries: &mut BTreeMap<u64, BookEntry>, min_occurrences: u32) {
    let mut processed = 0u64;
    entries.retain(|_, entry| {
        processed += 1;
        if processed % (10 * PROGRESS_INTERVAL) == 0 {
            println!("{processed} entries filtered...");
        }
        !entry.filter(min_occurrences)
    });
}

/// Serialize every entry in ascending hash order and write the file.
fn save_entries(entries: &BTreeMap<u64, BookEntry>, path: &Path) -> Result<(), BookError> {
    let mut bytes = Vec::new();
    let mut serialized = 0u64;

    for entry in entries.values() {
        entry.serialize_into(&mut bytes);
        serialized += 1;
        if serialized % PROGRESS_INTERVAL == 0 {
            println!("{serialized} entries serialized...");
        }
    }

    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{build_book, insert_games, merge_books, read_book_file, BookConfig};
    use crate::game_state::chess_types::GameState;
    use crate::moves::chess_move::MoveKey;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("quince_book_{}_{name}", std::process::id()));
        path
    }

    fn insert(corpus: &str, config: &BookConfig) -> super::BTreeMap<u64, super::BookEntry> {
        let (entries, _, _) =
            insert_games(Cursor::new(corpus.to_owned()), config).expect("corpus should read");
        entries
    }

    #[test]
    fn corpus_games_land_under_the_starting_hash() {
        let corpus = "e4 e5 Nf3\nd4 d5\ne4 c5\n";
        let entries = insert(corpus, &BookConfig {
            min_occurrences: 1,
            max_ply: 8,
        });

        let start = GameState::new_game();
        let entry = entries
            .get(&start.zobrist_key)
            .expect("start position must be booked");
        assert_eq!(entry.len(), 2); // e4 twice, d4 once
        assert_eq!(entry.total_count(), 3);
        let e4 = entry
            .moves()
            .iter()
            .find(|m| m.key == MoveKey { from: 12, to: 28 })
            .expect("e4 should be recorded");
        assert_eq!(e4.count, 2);
    }

    #[test]
    fn max_ply_limits_recorded_positions() {
        let corpus = "e4 e5 Nf3 Nc6 Bb5 a6\n";
        let shallow = insert(corpus, &BookConfig {
            min_occurrences: 1,
            max_ply: 2,
        });
        // Ply limit 2 records replies from exactly two positions.
        assert_eq!(shallow.len(), 2);
    }

    #[test]
    fn unresolvable_tokens_restart_as_a_fresh_game_then_skip() {
        // Second token is illegal mid-game but legal from the start:
        // treated as a concatenated game boundary.
        let concatenated = "e4 d4 d5\n";
        let entries = insert(concatenated, &BookConfig {
            min_occurrences: 1,
            max_ply: 8,
        });
        let start = GameState::new_game();
        let entry = entries
            .get(&start.zobrist_key)
            .expect("start entry expected");
        assert_eq!(entry.total_count(), 2); // e4 and d4 both from the start

        // A token illegal even from the start abandons the line.
        let garbage = "e4 Qh7 d4\n";
        let entries = insert(garbage, &BookConfig {
            min_occurrences: 1,
            max_ply: 8,
        });
        let entry = entries
            .get(&start.zobrist_key)
            .expect("start entry expected");
        assert_eq!(entry.total_count(), 1); // only the e4 before the failure
    }

    #[test]
    fn build_filter_and_reopen_round_trip() {
        let corpus_path = temp_path("corpus.extract");
        let book_path = temp_path("out.book");
        std::fs::write(&corpus_path, "e4 e5\ne4 e6\ne4 e5\nd4 d5\n").expect("corpus write");

        let report = build_book(
            &corpus_path,
            &book_path,
            &BookConfig {
                min_occurrences: 2,
                max_ply: 4,
            },
        )
        .expect("build should succeed");
        assert_eq!(report.games, 4);
        assert_eq!(report.skipped_games, 0);

        let entries = read_book_file(&book_path).expect("book should reopen");
        let start = GameState::new_game();
        let entry = entries
            .get(&start.zobrist_key)
            .expect("start entry survives the filter");
        // d4 (seen once) is filtered out; e4 (three times) survives.
        assert_eq!(entry.len(), 1);
        assert_eq!(entry.moves()[0].key, MoveKey { from: 12, to: 28 });

        std::fs::remove_file(&corpus_path).ok();
        std::fs::remove_file(&book_path).ok();
    }

    #[test]
    fn merging_a_book_with_itself_doubles_counts() {
        let corpus_path = temp_path("merge_corpus.extract");
        let book_path = temp_path("merge_in.book");
        let merged_path = temp_path("merge_out.book");
        std::fs::write(&corpus_path, "e4 e5 Nf3\nd4 d5 c4\n").expect("corpus write");

        build_book(
            &corpus_path,
            &book_path,
            &BookConfig {
                min_occurrences: 1,
                max_ply: 6,
            },
        )
        .expect("build should succeed");

        merge_books(&book_path, &book_path, &merged_path, 1, 1).expect("merge should succeed");

        let single = read_book_file(&book_path).expect("input should reopen");
        let merged = read_book_file(&merged_path).expect("merged should reopen");
        assert_eq!(single.len(), merged.len());

        // Counts are rescaled per entry on save, and doubling every raw
        // count leaves the rescaled weights unchanged.
        for (hash, entry) in &single {
            let merged_entry = merged.get(hash).expect("entry survives the merge");
            assert_eq!(entry.moves(), merged_entry.moves());
        }

        std::fs::remove_file(&corpus_path).ok();
        std::fs::remove_file(&book_path).ok();
        std::fs::remove_file(&merged_path).ok();
    }

    #[test]
    fn missing_corpus_surfaces_an_io_error() {
        let missing = temp_path("does_not_exist.extract");
        let out = temp_path("never_written.book");
        assert!(build_book(&missing, &out, &BookConfig::default()).is_err());
    }
}
