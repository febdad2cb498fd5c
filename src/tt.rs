//! Transposition table and static-evaluation cache.
//!
//! The transposition table caches search results keyed by Zobrist hash so
//! transposing move orders (the same Shogi position reached by different
//! move sequences, which is far more common here than in chess because
//! dropped pieces can re-enter play along many paths) skip redundant
//! search. The evaluation hash is a second, smaller cache for static
//! evaluations, since the same position recurs inside quiescence search
//! more often than a full search result is reusable there.

use std::mem;

use crate::board::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed low - score <= alpha)
    UpperBound, // Score is at most this value (failed high - score >= beta)
}

/// One slot in a transposition table bucket. Only the upper 32 bits of the
/// Zobrist hash are kept for verification; the index already pins down the
/// low bits, so a `key` collision within a bucket is rare enough not to be
/// worth the extra 4 bytes per entry.
#[derive(Clone, Debug)]
pub(crate) struct TTEntry {
    key: u32,
    depth: u32,
    score: i32,
    bound_type: BoundType,
    best_move: Option<Move>,
    generation: u16,
}

impl TTEntry {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }
}

#[inline]
fn verification_key(hash: u64) -> u32 {
    (hash >> 32) as u32
}

pub struct TranspositionTable {
    table: Vec<[Option<TTEntry>; 4]>,
    mask: usize, // To wrap index around using bitwise AND (table size must be power of 2)
    occupied: usize,
}

impl TranspositionTable {
    // size_mb: Desired size in Megabytes
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<[Option<TTEntry>; 4]>();
        let mut num_entries = (size_mb * 1024 * 1024) / entry_size;

        // Ensure num_entries is a power of 2 for efficient indexing
        num_entries = num_entries.next_power_of_two() / 2;
        if num_entries == 0 {
            num_entries = 1024;
        } // Minimum size fallback

        TranspositionTable {
            table: vec![[None, None, None, None]; num_entries],
            mask: num_entries - 1, // e.g., if size is 1024, mask is 1023 (0b1111111111)
            occupied: 0,
        }
    }

    // Calculate index using the hash and mask
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    // Probe the table for a given hash
    pub(crate) fn probe(&self, hash: u64) -> Option<&TTEntry> {
        let index = self.index(hash);
        let key = verification_key(hash);
        let bucket = &self.table[index];
        bucket.iter().flatten().find(|entry| entry.key == key)
    }

    // Store an entry in the table
    pub(crate) fn store(
        &mut self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
        generation: u16,
    ) {
        let index = self.index(hash);
        let key = verification_key(hash);
        let bucket = &mut self.table[index];

        for slot in bucket.iter_mut() {
            if let Some(existing) = slot {
                if existing.key == key {
                    *slot = Some(TTEntry { key, depth, score, bound_type, best_move, generation });
                    return;
                }
            }
        }

        for slot in bucket.iter_mut() {
            if slot.is_none() {
                *slot = Some(TTEntry { key, depth, score, bound_type, best_move, generation });
                self.occupied += 1;
                return;
            }
        }

        let mut replace_idx = 0;
        let mut worst_priority = i32::MAX;

        for (idx, slot) in bucket.iter().enumerate() {
            if let Some(entry) = slot {
                let age = generation.wrapping_sub(entry.generation);
                let priority = entry.depth.saturating_mul(2) as i32 - age as i32;
                if idx == 0 || priority < worst_priority {
                    replace_idx = idx;
                    worst_priority = priority;
                }
            }
        }

        bucket[replace_idx] = Some(TTEntry { key, depth, score, bound_type, best_move, generation });
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let total_slots = self.table.len().saturating_mul(4);
        if total_slots == 0 {
            return 0;
        }
        ((self.occupied as u64 * 1000) / total_slots as u64) as u32
    }
}

/// Number of slots in the evaluation hash. Fixed rather than scaled with
/// the main table's `setoption Hash` size: it only needs to absorb
/// quiescence-search repeats within a single move's search, not the whole
/// game tree.
const EVAL_HASH_ENTRIES: usize = 1 << 16;

#[derive(Clone, Copy, Default)]
struct EvalHashEntry {
    key: u32,
    score: i32,
    occupied: bool,
}

/// Caches static evaluations by position hash (which already folds in both
/// hands, so it doubles as the position-key-plus-black-hand key called for
/// at the protocol level) to skip repeated NNUE forward passes for
/// transposed quiescence nodes. Single-slot per index: a miss just costs a
/// recompute, so there is no replacement policy to get wrong.
pub struct EvalHashTable {
    entries: Box<[EvalHashEntry]>,
    mask: usize,
}

impl EvalHashTable {
    #[must_use]
    pub fn new() -> Self {
        EvalHashTable {
            entries: vec![EvalHashEntry::default(); EVAL_HASH_ENTRIES].into_boxed_slice(),
            mask: EVAL_HASH_ENTRIES - 1,
        }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<i32> {
        let entry = &self.entries[self.index(hash)];
        let key = verification_key(hash);
        (entry.occupied && entry.key == key).then_some(entry.score)
    }

    pub fn store(&mut self, hash: u64, score: i32) {
        let index = self.index(hash);
        self.entries[index] = EvalHashEntry { key: verification_key(hash), score, occupied: true };
    }

    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = EvalHashEntry::default();
        }
    }
}

impl Default for EvalHashTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_hash_round_trips() {
        let mut cache = EvalHashTable::new();
        assert_eq!(cache.probe(0xABCD_1234_EF01_5678), None);
        cache.store(0xABCD_1234_EF01_5678, -42);
        assert_eq!(cache.probe(0xABCD_1234_EF01_5678), Some(-42));
    }

    #[test]
    fn eval_hash_miss_on_key_collision_within_same_slot() {
        let mut cache = EvalHashTable::new();
        let hash_a = 0x0000_0000_0000_0001u64;
        // Same index (low bits), different verification key (high bits).
        let hash_b = 0x0000_0001_0000_0001u64;
        cache.store(hash_a, 7);
        assert_eq!(cache.probe(hash_b), None);
    }

    #[test]
    fn eval_hash_clear_drops_entries() {
        let mut cache = EvalHashTable::new();
        cache.store(0x42, 100);
        cache.clear();
        assert_eq!(cache.probe(0x42), None);
    }
}
