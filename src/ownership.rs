//! Monte-Carlo ownership statistics.
//!
//! Before each search a batch of playouts records who ends up owning every
//! point. Playouts then avoid spending moves inside areas that are almost
//! always owned by one side. Points neither side owns (dame, contested
//! ground) count for nobody.

use parking_lot::Mutex;

use crate::board::{BoardState, Color};
use crate::constants::{MAX_SQ, OWNERSHIP_PRIMED};

struct OwnershipStats {
    /// Playouts each colour ended up owning a vertex, by colour index
    owned: [Vec<u32>; 2],
    playouts: u32,
    black_wins: f64,
}

/// Shared ownership counters behind one coarse lock.
pub struct OwnershipTable {
    inner: Mutex<OwnershipStats>,
}

impl Default for OwnershipTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OwnershipTable {
    pub fn new() -> Self {
        OwnershipTable {
            inner: Mutex::new(OwnershipStats {
                owned: [vec![0; MAX_SQ], vec![0; MAX_SQ]],
                playouts: 0,
                black_wins: 0.0,
            }),
        }
    }

    pub fn clear(&self) {
        let mut stats = self.inner.lock();
        for owned in stats.owned.iter_mut() {
            owned.fill(0);
        }
        stats.playouts = 0;
        stats.black_wins = 0.0;
    }

    /// Record the final board of one playout and its value for Black.
    pub fn record(&self, board: &BoardState, black_value: f32) {
        let mut stats = self.inner.lock();
        for v in board.points() {
            if let Some(owner) = board.area_owner(v) {
                stats.owned[owner.index()][v] += 1;
            }
        }
        stats.playouts += 1;
        stats.black_wins += black_value as f64;
    }

    pub fn playouts(&self) -> u32 {
        self.inner.lock().playouts
    }

    /// Enough playouts recorded to trust the shares.
    pub fn is_primed(&self) -> bool {
        self.playouts() >= OWNERSHIP_PRIMED
    }

    /// Fraction of recorded playouts in which `color` owned `v`.
    pub fn share(&self, color: Color, v: usize) -> f32 {
        let stats = self.inner.lock();
        if stats.playouts == 0 {
            return 0.5;
        }
        stats.owned[color.index()][v] as f32 / stats.playouts as f32
    }

    /// Black's win rate over the recorded playouts.
    pub fn black_winrate(&self) -> f32 {
        let stats = self.inner.lock();
        if stats.playouts == 0 {
            return 0.5;
        }
        (stats.black_wins / stats.playouts as f64) as f32
    }

    /// Black and White shares of every vertex, or `None` until primed.
    pub fn snapshot(&self) -> Option<Vec<[f32; 2]>> {
        let stats = self.inner.lock();
        if stats.playouts < OWNERSHIP_PRIMED {
            return None;
        }
        let n = stats.playouts as f32;
        let [black, white] = &stats.owned;
        Some(
            black
                .iter()
                .zip(white)
                .map(|(&b, &w)| [b as f32 / n, w as f32 / n])
                .collect(),
        )
    }
}
