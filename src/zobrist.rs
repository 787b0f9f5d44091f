//! Zobrist random tables for position hashing.
//!
//! Built once from a fixed seed on first use and read-only afterwards, so
//! every thread shares the same keys.

use std::sync::OnceLock;

use crate::constants::{MAX_PASSES, MAX_SQ, ZOBRIST_SEED};

/// Random keys for every hashed feature of a position.
pub struct ZobristTables {
    /// One key per (square kind, vertex), indexed by `Square as usize`.
    pub squares: [[u64; MAX_SQ]; 4],
    /// One key per (colour, prisoner count).
    pub prisoners: [[u64; 2 * MAX_SQ]; 2],
    /// One key per consecutive-pass count.
    pub passes: [u64; MAX_PASSES + 1],
}

static ZOBRIST: OnceLock<Box<ZobristTables>> = OnceLock::new();

/// Shared Zobrist keys.
#[inline]
pub fn zobrist() -> &'static ZobristTables {
    ZOBRIST.get_or_init(|| ZobristTables::new(ZOBRIST_SEED))
}

impl ZobristTables {
    fn new(seed: u64) -> Box<Self> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut tables = Box::new(ZobristTables {
            squares: [[0; MAX_SQ]; 4],
            prisoners: [[0; 2 * MAX_SQ]; 2],
            passes: [0; MAX_PASSES + 1],
        });
        for row in tables.squares.iter_mut() {
            row.iter_mut().for_each(|k| *k = rng.u64(..));
        }
        for row in tables.prisoners.iter_mut() {
            row.iter_mut().for_each(|k| *k = rng.u64(..));
        }
        tables.passes.iter_mut().for_each(|k| *k = rng.u64(..));
        tables
    }

    /// Key for a prisoner count, saturating at the table end.
    #[inline]
    pub fn prisoner_key(&self, color: usize, count: usize) -> u64 {
        self.prisoners[color][count.min(2 * MAX_SQ - 1)]
    }

    /// Hash contribution of the pass counter.
    #[inline]
    pub fn pass_term(&self, passes: usize) -> u64 {
        self.passes[0] ^ self.passes[passes.min(MAX_PASSES)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_deterministic() {
        let a = ZobristTables::new(ZOBRIST_SEED);
        let b = ZobristTables::new(ZOBRIST_SEED);
        assert_eq!(a.squares[1][50], b.squares[1][50]);
        assert_eq!(a.passes, b.passes);
    }

    #[test]
    fn test_pass_term_is_zero_without_passes() {
        assert_eq!(zobrist().pass_term(0), 0);
        assert_ne!(zobrist().pass_term(1), 0);
        assert_eq!(zobrist().pass_term(MAX_PASSES), zobrist().pass_term(MAX_PASSES + 3));
    }
}
