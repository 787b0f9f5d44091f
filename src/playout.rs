//! Monte Carlo playouts (random game simulation).
//!
//! A playout plays fast, lightly guided moves until both sides pass, then
//! counts the board. Move choice per ply:
//! 1. answer the last move tactically when the scorer sees a strong reply
//! 2. otherwise draw a few points from a randomized walk of the empty list
//!    and pick one in proportion to its weight
//!
//! Built on the same machinery:
//! - ownership priming before a search
//! - dead-stone marking and final scoring of finished games
//! - a playout benchmark

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::Color;
use crate::constants::{
    MARKING_RUNS, MAX_SQ, MIN_TACTICAL_SCORE, PASS_MOVE, RANDOM_CANDIDATES, SELF_ATARI_FACTOR,
    SETTLED_FACTOR, SETTLED_OWNERSHIP, Vertex,
};
use crate::ownership::OwnershipTable;
use crate::position::Position;
use crate::scorer::MoveScorer;

/// First colour to play each vertex: +1 Black, -1 White, 0 untouched.
pub type AmafMap = [i8; MAX_SQ];

#[inline]
pub fn amaf_sign(color: Color) -> i8 {
    match color {
        Color::Black => 1,
        Color::White => -1,
    }
}

/// Mark `v` for `color` unless another move got there first.
#[inline]
pub fn amaf_mark(amaf: &mut AmafMap, color: Color, v: Vertex) {
    if v != PASS_MOVE && amaf[v] == 0 {
        amaf[v] = amaf_sign(color);
    }
}

/// Outcome of one playout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayoutResult {
    /// Area score divided by the board area; positive favours Black
    pub score: f32,
    /// Moves played
    pub plies: usize,
}

impl PlayoutResult {
    /// 1 for a Black win, 0 for a White win, ½ for a draw.
    pub fn black_value(&self) -> f32 {
        black_value(self.score)
    }
}

/// Result value for Black of a final score.
#[inline]
pub fn black_value(score: f32) -> f32 {
    if score > 0.0 {
        1.0
    } else if score < 0.0 {
        0.0
    } else {
        0.5
    }
}

/// Playout statistics gathered by [`PlayoutEngine::benchmark`].
#[derive(Clone, Debug)]
pub struct BenchmarkReport {
    pub games: usize,
    pub black_wins: f32,
    pub total_plies: usize,
    pub elapsed: Duration,
}

impl BenchmarkReport {
    pub fn playouts_per_second(&self) -> f64 {
        self.games as f64 / self.elapsed.as_secs_f64().max(1e-9)
    }

    pub fn mean_length(&self) -> f64 {
        self.total_plies as f64 / self.games.max(1) as f64
    }
}

/// Runs playouts with a move scorer and the shared ownership table.
pub struct PlayoutEngine {
    scorer: Arc<dyn MoveScorer>,
    ownership: Arc<OwnershipTable>,
    /// Ownership shares by colour index, frozen at the last refresh once
    /// primed
    settled: Option<Vec<[f32; 2]>>,
}

impl PlayoutEngine {
    pub fn new(scorer: Arc<dyn MoveScorer>, ownership: Arc<OwnershipTable>) -> Self {
        PlayoutEngine {
            scorer,
            ownership,
            settled: None,
        }
    }

    pub fn scorer(&self) -> &dyn MoveScorer {
        self.scorer.as_ref()
    }

    pub fn ownership(&self) -> &OwnershipTable {
        &self.ownership
    }

    /// Freeze the current ownership shares for use by playouts.
    pub fn refresh_ownership(&mut self) {
        self.settled = self.ownership.snapshot();
    }

    /// Play out `pos` to the end (or a cutoff) and score it.
    ///
    /// With `resigning` the game is abandoned once the stone difference
    /// exceeds a third of the board. Every move is marked in `amaf`.
    pub fn run(
        &self,
        pos: &mut Position,
        rng: &mut fastrand::Rng,
        resigning: bool,
        mut amaf: Option<&mut AmafMap>,
    ) -> PlayoutResult {
        let size = pos.size();
        let area = (size * size) as f32;
        let max_plies = 2 * size * size;
        let mut candidates = Vec::with_capacity(16);
        let mut tactical = Vec::with_capacity(16);
        let mut plies = 0;

        while pos.passes() < 2 && plies < max_plies {
            if resigning && pos.estimate_score().abs() >= area / 3.0 {
                break;
            }
            let color = pos.to_move();
            let v = self.choose_move(pos, color, rng, &mut candidates, &mut tactical);
            if let Some(map) = amaf.as_deref_mut() {
                amaf_mark(map, color, v);
            }
            pos.play_move_fast(v);
            plies += 1;
        }

        PlayoutResult {
            score: pos.mc_score() / area,
            plies,
        }
    }

    /// Pick one playout move for `color`, or `PASS_MOVE`.
    fn choose_move(
        &self,
        pos: &Position,
        color: Color,
        rng: &mut fastrand::Rng,
        candidates: &mut Vec<(Vertex, f32)>,
        tactical: &mut Vec<Vertex>,
    ) -> Vertex {
        candidates.clear();

        if pos.last_move().is_some_and(|m| m != PASS_MOVE) {
            tactical.clear();
            self.scorer.tactical_candidates(pos, color, tactical);
            for &v in tactical.iter() {
                if !pos.try_move(color, v) {
                    continue;
                }
                let score = self.scorer.score(pos, color, v);
                if score >= MIN_TACTICAL_SCORE {
                    candidates.push((v, score));
                }
            }
        }

        if candidates.is_empty() {
            for _ in 0..RANDOM_CANDIDATES {
                let v = pos.walk_empty_list(color, rng);
                if v == PASS_MOVE {
                    break;
                }
                if candidates.iter().any(|&(c, _)| c == v) {
                    continue;
                }
                let mut weight = self.scorer.score(pos, color, v).max(0.0);
                if pos.board.is_self_atari(color, v) {
                    weight *= SELF_ATARI_FACTOR;
                }
                weight *= self.settled_factor(v);
                candidates.push((v, weight));
            }
        }

        pick_weighted(candidates, rng)
    }

    /// Weight multiplier for points one side nearly always owns.
    #[inline]
    fn settled_factor(&self, v: Vertex) -> f32 {
        match &self.settled {
            Some(shares) if shares[v].iter().any(|&s| s >= SETTLED_OWNERSHIP) => SETTLED_FACTOR,
            _ => 1.0,
        }
    }

    /// Fill the ownership table from `iterations` playouts of `pos`.
    ///
    /// Returns Black's win rate and the mean score (in points).
    pub fn prime_ownership(
        &self,
        pos: &Position,
        iterations: usize,
        rng: &mut fastrand::Rng,
    ) -> (f32, f32) {
        if iterations == 0 {
            return (0.5, 0.0);
        }
        let area = (pos.size() * pos.size()) as f32;
        let mut wins = 0.0;
        let mut total_score = 0.0;
        for _ in 0..iterations {
            let mut scratch = pos.clone();
            let result = self.run(&mut scratch, rng, false, None);
            self.ownership.record(&scratch.board, result.black_value());
            wins += result.black_value();
            total_score += result.score * area;
        }
        let n = iterations as f32;
        (wins / n, total_score / n)
    }

    /// Stones that die in most playouts from `pos`.
    pub fn mark_dead_groups(&self, pos: &Position, rng: &mut fastrand::Rng) -> Vec<Vertex> {
        let mut survived = [0u32; MAX_SQ];
        for _ in 0..MARKING_RUNS {
            let mut scratch = pos.clone();
            self.run(&mut scratch, rng, false, None);
            for v in pos.board.points() {
                let sq = pos.board.square(v);
                if sq.is_stone() && scratch.board.square(v) == sq {
                    survived[v] += 1;
                }
            }
        }
        pos.board
            .points()
            .filter(|&v| {
                pos.board.square(v).is_stone() && (survived[v] as usize) < MARKING_RUNS / 2
            })
            .collect()
    }

    /// Area score after removing dead stones; positive favours Black.
    pub fn final_score(&self, pos: &Position, rng: &mut fastrand::Rng) -> f32 {
        let dead = self.mark_dead_groups(pos, rng);
        let mut board = pos.board.clone();
        for v in dead {
            board.clear_point(v);
        }
        board.score_area(pos.effective_komi())
    }

    /// Run `games` playouts from `pos` and time them.
    pub fn benchmark(
        &self,
        pos: &Position,
        games: usize,
        rng: &mut fastrand::Rng,
    ) -> BenchmarkReport {
        let start = Instant::now();
        let mut black_wins = 0.0;
        let mut total_plies = 0;
        for _ in 0..games {
            let mut scratch = pos.clone();
            let result = self.run(&mut scratch, rng, false, None);
            black_wins += result.black_value();
            total_plies += result.plies;
        }
        BenchmarkReport {
            games,
            black_wins,
            total_plies,
            elapsed: start.elapsed(),
        }
    }
}

/// Choose a candidate with probability proportional to its weight.
fn pick_weighted(candidates: &[(Vertex, f32)], rng: &mut fastrand::Rng) -> Vertex {
    let Some(&(first, _)) = candidates.first() else {
        return PASS_MOVE;
    };
    let total: f32 = candidates.iter().map(|&(_, w)| w).sum();
    if total <= 0.0 {
        return candidates[rng.usize(..candidates.len())].0;
    }
    let mut r = rng.f32() * total;
    for &(v, w) in candidates {
        if r < w {
            return v;
        }
        r -= w;
    }
    candidates.last().map_or(first, |&(v, _)| v)
}
