//! Constants for board geometry, search parameters, and playout heuristics.
//!
//! The board is a 1D array over a `(size + 2)²` grid whose outer ring is a
//! border of invalid points, so neighbour lookups never need bounds checks.
//! The array capacity is fixed for the largest supported board; smaller
//! boards use a prefix of it.
//!
//! Runtime knobs (threads, seeds, limits) live in
//! [`SearchConfig`](crate::search::SearchConfig); its defaults come from here.

// =============================================================================
// Board Geometry
// =============================================================================

/// Largest supported board size.
pub const MAX_BOARD_SIZE: usize = 19;

/// Smallest supported board size.
pub const MIN_BOARD_SIZE: usize = 2;

/// Default board size.
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Default komi.
pub const DEFAULT_KOMI: f32 = 7.5;

/// Padded width of the largest board.
pub const MAX_WIDTH: usize = MAX_BOARD_SIZE + 2;

/// Capacity of every per-vertex array.
pub const MAX_SQ: usize = MAX_WIDTH * MAX_WIDTH;

// =============================================================================
// Special Move Values
// =============================================================================

/// A point on the padded board.
pub type Vertex = usize;

/// Pass move marker (index 0 is border, so it never names a real point).
pub const PASS_MOVE: Vertex = 0;

/// Resign move marker.
pub const RESIGN_MOVE: Vertex = usize::MAX;

/// The pass counter stops growing here.
pub const MAX_PASSES: usize = 4;

// =============================================================================
// Neighbour Counters
// =============================================================================

/// Bit width of one colour field in the packed neighbour counter.
pub const NBR_SHIFT: u32 = 4;

/// Mask for one field of the packed neighbour counter.
pub const NBR_MASK: u16 = (1 << NBR_SHIFT) - 1;

// =============================================================================
// Hashing
// =============================================================================

/// Seed for the Zobrist tables.
pub const ZOBRIST_SEED: u64 = 5489;

/// Starting value of every position hash.
pub const HASH_BASE: u64 = 0x1234_5678_8765_4321;

/// Hash term present while Black is to move.
pub const HASH_BLACK_TO_MOVE: u64 = 0xABCD_ABCD_ABCD_ABCD;

// =============================================================================
// MCTS (Monte Carlo Tree Search) Parameters
// =============================================================================

/// Visits a node needs before its children are created.
pub const MATURE_THRESHOLD: u32 = 15;

/// Most children linked under one node.
pub const MAX_CHILDREN: usize = 35;

/// Node budget of a single tree.
pub const MAX_TREE_SIZE: usize = 5_000_000;

/// RAVE equivalence parameter - controls RAVE vs UCT balance.
pub const RAVE_EQUIV: f32 = 3500.0;

/// Exploration constant of the UCT term.
pub const UCT_C: f32 = 0.2;

/// UCT value given to unvisited children (first play urgency).
pub const FPU_VALUE: f32 = 1.1;

/// Synthetic visit weight given to a two-pass terminal node.
pub const TERMINAL_VISITS: u32 = 10_000;

/// Buckets in the transposition cache.
pub const TT_SIZE: usize = 500_000;

/// Playouts used to prime the ownership table before a search.
pub const PRIMING_PLAYOUTS: usize = 64;

/// Progress report period in centiseconds.
pub const REPORT_PERIOD_CENTIS: u64 = 250;

/// Winrate threshold below which the engine resigns.
pub const RESIGN_THRES: f32 = 0.1;

/// Root visits required before resigning is considered.
pub const RESIGN_MIN_VISITS: u32 = 500;

/// A winning pass must reach this winrate to be preferred.
pub const PASS_MIN_WINRATE: f32 = 0.85;

/// ...and be within this margin of the best move.
pub const PASS_WINRATE_MARGIN: f32 = 0.05;

// =============================================================================
// Playout Parameters
// =============================================================================

/// Random candidates drawn from the empty-point walk per playout move.
pub const RANDOM_CANDIDATES: usize = 4;

/// Tactical candidates below this score are ignored.
pub const MIN_TACTICAL_SCORE: f32 = 1.5;

/// Weight multiplier for self-atari candidates.
pub const SELF_ATARI_FACTOR: f32 = 0.05;

/// Weight multiplier for moves into points the ownership table calls settled.
pub const SETTLED_FACTOR: f32 = 0.25;

/// Ownership share at which a point counts as settled.
pub const SETTLED_OWNERSHIP: f32 = 0.9;

/// Playouts the ownership table needs before it is trusted.
pub const OWNERSHIP_PRIMED: u32 = 32;

/// Playouts used to decide which stones are dead.
pub const MARKING_RUNS: usize = 256;

// =============================================================================
// Prior Values (move scorer)
// =============================================================================

/// Base score for every legal move.
pub const PRIOR_EVEN: f32 = 1.0;

/// Score multiplier for self-atari moves.
pub const PRIOR_SELFATARI: f32 = 0.1;

/// Bonus for capturing a single stone.
pub const PRIOR_CAPTURE_ONE: f32 = 3.0;

/// Bonus for capturing multiple stones.
pub const PRIOR_CAPTURE_MANY: f32 = 6.0;

/// Bonus for rescuing a string in atari.
pub const PRIOR_SAVING: f32 = 4.0;

/// Bonus for moves matching 3x3 patterns.
pub const PRIOR_PAT3: f32 = 2.0;

/// Bonus by distance from last move (Manhattan distance 1, 2, 3).
pub const PRIOR_NEAR_LAST: [f32; 3] = [1.2, 1.0, 0.4];

/// Score multiplier for first/second line moves in empty areas.
pub const PRIOR_EMPTYAREA: f32 = 0.5;
