//! 3x3 patterns and the default move scorer.
//!
//! ## 3x3 Patterns (`pat3`)
//! The eight neighbours of a point are packed into a 16-bit code (env8)
//! and looked up in an 8192-byte bitfield with one bit per code. The table
//! is built once from a handful of source patterns, expanded over
//! rotations, reflections, colour swaps and wildcards.
//!
//! ## PatternScorer
//! Combines captures, atari escapes, pattern matches and proximity to the
//! last move into a prior, and penalises self-atari and lonely first/second
//! line moves.

use std::sync::OnceLock;

use crate::board::{BoardState, Color, Square};
use crate::constants::{
    PASS_MOVE, PRIOR_CAPTURE_MANY, PRIOR_CAPTURE_ONE, PRIOR_EMPTYAREA, PRIOR_EVEN,
    PRIOR_NEAR_LAST, PRIOR_PAT3, PRIOR_SAVING, PRIOR_SELFATARI, Vertex,
};
use crate::position::Position;
use crate::scorer::MoveScorer;

/// Source patterns, one 3x3 grid per string (row by row, north first):
/// - X: one colour, O: the other
/// - .: empty
/// - x: not X (O, . or #)
/// - o: not O (X, . or #)
/// - ?: anything
/// - #: off the board
const PAT3_SRC: &[&str] = &[
    // hane: enclosing hane
    "XOX...???",
    // hane: non-cutting hane
    "XO....?.?",
    // hane: magari
    "XO?X..x.?",
    // katatsuke or diagonal attachment
    ".O.X.....",
    // cut: unprotected
    "XO?O.o?o?",
    // cut: peeped
    "XO?O.X???",
    // cut: de
    "?X?O.Oooo",
    // cut: keima
    "OX?o.O???",
    // side: chase
    "X.?O.?##?",
    // side: block side cut
    "OX?X.O###",
    // side: block side connection
    "?X?x.O###",
    // side: sagari
    "?XOx.x###",
    // side: cut
    "?OXX.O###",
];

type Pat3Set = [u8; 8192];

static PAT3SET: OnceLock<Pat3Set> = OnceLock::new();

/// Does the neighbourhood of `v` match any 3x3 pattern?
#[inline]
pub fn pat3_match(board: &BoardState, v: Vertex) -> bool {
    let set = PAT3SET.get_or_init(make_pat3set);
    let env8 = env8(board, v);
    set[(env8 >> 3) as usize] & (1 << (env8 & 7)) != 0
}

/// Pattern code of a square kind (O = 0, X = 1, . = 2, # = 3), with the two
/// bits stored at `p` and `p + 4`.
#[inline]
fn code(kind: u16, p: u32) -> u16 {
    (((kind >> 1) & 1) << 4 | (kind & 1)) << p
}

#[inline]
fn square_kind(sq: Square) -> u16 {
    match sq {
        Square::White => 0,
        Square::Black => 1,
        Square::Empty => 2,
        Square::Invalid => 3,
    }
}

/// env8 code of the neighbourhood of an on-board point: orthogonal
/// neighbours (N, E, S, W) in the low byte, diagonals (NE, SE, SW, NW) in
/// the high byte.
fn env8(board: &BoardState, v: Vertex) -> u16 {
    let mut env = 0;
    for (p, ai) in board.orthogonal(v).into_iter().enumerate() {
        env |= code(square_kind(board.square(ai)), p as u32);
    }
    for (p, di) in board.diagonal(v).into_iter().enumerate() {
        env |= code(square_kind(board.square(di)), p as u32) << 8;
    }
    env
}

fn make_pat3set() -> Pat3Set {
    let mut set = [0u8; 8192];
    for src in PAT3_SRC {
        let mut grid = [0u8; 9];
        grid.copy_from_slice(&src.as_bytes()[..9]);
        for variant in symmetries(grid) {
            expand_wildcards(variant, 0, &mut set);
        }
    }
    set
}

/// The 16 rotations, reflections and colour swaps of a grid (with repeats).
fn symmetries(grid: [u8; 9]) -> Vec<[u8; 9]> {
    let mut out = Vec::with_capacity(16);
    let mut g = grid;
    for _ in 0..2 {
        for _ in 0..2 {
            for _ in 0..2 {
                out.push(g);
                out.push(swap_colors(g));
                g = flip_rows(g);
            }
            g = flip_columns(g);
        }
        g = rotate(g);
    }
    out
}

fn expand_wildcards(grid: [u8; 9], i: usize, set: &mut Pat3Set) {
    if i == 9 {
        let env8 = grid_code(&grid);
        set[(env8 >> 3) as usize] |= 1 << (env8 & 7);
        return;
    }
    let choices: &[u8] = match grid[i] {
        b'?' => b"XO.#",
        b'x' => b"O.#",
        b'o' => b"X.#",
        _ => {
            expand_wildcards(grid, i + 1, set);
            return;
        }
    };
    for &c in choices {
        let mut next = grid;
        next[i] = c;
        expand_wildcards(next, i + 1, set);
    }
}

/// env8 code of a concrete grid.
///
/// ```text
/// 0 1 2        NW N NE
/// 3 4 5   ->   W  .  E
/// 6 7 8        SW S SE
/// ```
fn grid_code(grid: &[u8; 9]) -> u16 {
    let kind = |c: u8| -> u16 {
        match c {
            b'O' => 0,
            b'X' => 1,
            b'.' => 2,
            _ => 3,
        }
    };
    let orth = [grid[1], grid[5], grid[7], grid[3]];
    let diag = [grid[2], grid[8], grid[6], grid[0]];
    let mut env = 0;
    for p in 0..4 {
        env |= code(kind(orth[p]), p as u32);
        env |= code(kind(diag[p]), p as u32) << 8;
    }
    env
}

fn swap_colors(mut g: [u8; 9]) -> [u8; 9] {
    for c in g.iter_mut() {
        *c = match *c {
            b'X' => b'O',
            b'O' => b'X',
            b'x' => b'o',
            b'o' => b'x',
            other => other,
        };
    }
    g
}

fn flip_rows(mut g: [u8; 9]) -> [u8; 9] {
    for i in 0..3 {
        g.swap(i, i + 6);
    }
    g
}

fn flip_columns(mut g: [u8; 9]) -> [u8; 9] {
    for row in 0..3 {
        g.swap(row * 3, row * 3 + 2);
    }
    g
}

fn rotate(g: [u8; 9]) -> [u8; 9] {
    [g[2], g[5], g[8], g[1], g[4], g[7], g[0], g[3], g[6]]
}

/// No stones within Manhattan distance `dist` of `v`.
fn empty_area(board: &BoardState, v: Vertex, dist: usize) -> bool {
    let (x, y) = board.xy(v);
    let size = board.size() as isize;
    let d = dist as isize;
    for dy in -d..=d {
        for dx in -(d - dy.abs())..=(d - dy.abs()) {
            let (nx, ny) = (x as isize + dx, y as isize + dy);
            if nx < 0 || ny < 0 || nx >= size || ny >= size {
                continue;
            }
            if board.square(board.vertex(nx as usize, ny as usize)).is_stone() {
                return false;
            }
        }
    }
    true
}

/// Manhattan distance between two on-board points.
fn distance(board: &BoardState, a: Vertex, b: Vertex) -> usize {
    let (ax, ay) = board.xy(a);
    let (bx, by) = board.xy(b);
    ax.abs_diff(bx) + ay.abs_diff(by)
}

/// Default scorer: tactics, 3x3 patterns and locality.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternScorer;

impl MoveScorer for PatternScorer {
    fn score(&self, pos: &Position, color: Color, v: Vertex) -> f32 {
        let board = &pos.board;
        let mut score = PRIOR_EVEN;

        match board.capture_size(color, v) {
            0 => {}
            1 => score += PRIOR_CAPTURE_ONE,
            _ => score += PRIOR_CAPTURE_MANY,
        }
        if board.saving_size(color, v) > 0 {
            score += PRIOR_SAVING;
        }
        if pat3_match(board, v) {
            score += PRIOR_PAT3;
        }
        if let Some(last) = pos.last_move().filter(|&m| m != PASS_MOVE) {
            let d = distance(board, v, last);
            if (1..=PRIOR_NEAR_LAST.len()).contains(&d) {
                score += PRIOR_NEAR_LAST[d - 1];
            }
        }

        if board.is_self_atari(color, v) {
            score *= PRIOR_SELFATARI;
        }
        if board.line_height(v) <= 1 && empty_area(board, v, 3) {
            score *= PRIOR_EMPTYAREA;
        }
        score
    }
}
