//! Move scoring contract used by tree expansion and playouts.
//!
//! The search never looks at patterns or tactics directly; it asks a
//! [`MoveScorer`] how desirable a point is and which points deserve an
//! immediate answer after the last move. The default implementation lives
//! in [`crate::patterns::PatternScorer`].

use crate::board::{Color, Square};
use crate::constants::{PASS_MOVE, Vertex};
use crate::position::Position;

/// Static move evaluation shared by every search thread.
pub trait MoveScorer: Send + Sync {
    /// Relative desirability (≥ 0) of `color` playing the empty point `v`.
    fn score(&self, pos: &Position, color: Color, v: Vertex) -> f32;

    /// Points worth answering right after the last move, appended to `out`
    /// without duplicates.
    ///
    /// The default collects the liberty of every string in atari next to
    /// the last move (captures and escapes) and the empty points around it.
    fn tactical_candidates(&self, pos: &Position, _color: Color, out: &mut Vec<Vertex>) {
        let Some(last) = pos.last_move() else {
            return;
        };
        if last == PASS_MOVE {
            return;
        }
        let board = &pos.board;
        let orth = board.orthogonal(last);

        for v in std::iter::once(last).chain(orth) {
            if board.square(v).is_stone() {
                if let Some(lib) = board.in_atari(v) {
                    push_unique(out, lib);
                }
            }
        }
        for v in orth.into_iter().chain(board.diagonal(last)) {
            if board.square(v) == Square::Empty {
                push_unique(out, v);
            }
        }
    }
}

#[inline]
fn push_unique(out: &mut Vec<Vertex>, v: Vertex) {
    if !out.contains(&v) {
        out.push(v);
    }
}

/// Every point scores the same; playouts become uniformly random.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformScorer;

impl MoveScorer for UniformScorer {
    fn score(&self, _pos: &Position, _color: Color, _v: Vertex) -> f32 {
        1.0
    }

    fn tactical_candidates(&self, _pos: &Position, _color: Color, _out: &mut Vec<Vertex>) {}
}
