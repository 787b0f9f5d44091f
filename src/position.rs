//! Game position: a board plus the move-level rules around it.
//!
//! [`Position`] wraps a [`BoardState`] with komi, the pass counter, the ko
//! point, the last moves and the positional-superko history. It is cheap
//! to clone, so the search copies one per simulation and plays into it.
//!
//! Two move paths exist:
//! - [`Position::play_move`] keeps hashes and history exact (game and tree)
//! - [`Position::play_move_fast`] skips all hashing (playouts)

use std::fmt;

use crate::board::{BoardState, Color, Square};
use crate::constants::{MAX_PASSES, PASS_MOVE, RESIGN_MOVE, Vertex};
use crate::error::{GoError, MoveError};
use crate::zobrist::zobrist;

/// A Go position with its move history hashes.
#[derive(Clone)]
pub struct Position {
    pub board: BoardState,
    komi: f32,
    handicap: usize,
    /// Consecutive passes, capped at `MAX_PASSES`
    passes: usize,
    /// Point the side to move may not retake
    ko_move: Option<Vertex>,
    move_num: usize,
    last_move: Option<Vertex>,
    prev_last_move: Option<Vertex>,
    /// Full hash after every move, oldest first
    hash_history: Vec<u64>,
    /// Stones-only hash after every move, for superko
    ko_hash_history: Vec<u64>,
}

impl Position {
    pub fn new(size: usize, komi: f32) -> Self {
        let board = BoardState::new(size);
        let hash = board.hash();
        let ko_hash = board.ko_hash();
        Position {
            board,
            komi,
            handicap: 0,
            passes: 0,
            ko_move: None,
            move_num: 0,
            last_move: None,
            prev_last_move: None,
            hash_history: vec![hash],
            ko_hash_history: vec![ko_hash],
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn size(&self) -> usize {
        self.board.size()
    }

    #[inline]
    pub fn komi(&self) -> f32 {
        self.komi
    }

    pub fn set_komi(&mut self, komi: f32) {
        self.komi = komi;
    }

    #[inline]
    pub fn handicap(&self) -> usize {
        self.handicap
    }

    pub(crate) fn set_handicap(&mut self, stones: usize) {
        self.handicap = stones;
    }

    /// Komi plus one point per handicap stone.
    #[inline]
    pub fn effective_komi(&self) -> f32 {
        self.komi + self.handicap as f32
    }

    #[inline]
    pub fn passes(&self) -> usize {
        self.passes
    }

    #[inline]
    pub fn ko_move(&self) -> Option<Vertex> {
        self.ko_move
    }

    #[inline]
    pub fn move_num(&self) -> usize {
        self.move_num
    }

    /// The last move played (`PASS_MOVE` for a pass), if any.
    #[inline]
    pub fn last_move(&self) -> Option<Vertex> {
        self.last_move
    }

    #[inline]
    pub fn prev_last_move(&self) -> Option<Vertex> {
        self.prev_last_move
    }

    #[inline]
    pub fn to_move(&self) -> Color {
        self.board.to_move()
    }

    pub fn set_to_move(&mut self, color: Color) {
        self.board.set_to_move(color);
    }

    pub fn hash_history(&self) -> &[u64] {
        &self.hash_history
    }

    // -------------------------------------------------------------------------
    // Move execution
    // -------------------------------------------------------------------------

    /// Replace the pass counter, keeping its hash term in step.
    fn set_passes(&mut self, passes: usize) {
        let passes = passes.min(MAX_PASSES);
        if passes != self.passes {
            let z = zobrist();
            self.board
                .xor_hash(z.pass_term(self.passes) ^ z.pass_term(passes));
            self.passes = passes;
        }
    }

    /// Play a stone or a pass for `color`, maintaining hashes and history.
    ///
    /// The move must already be legal apart from superko, which is
    /// detected afterwards with [`Position::is_superko`]. A pass clears the
    /// ko point.
    pub fn play_move(&mut self, color: Color, v: Vertex) {
        self.board.set_to_move(color);
        if v == PASS_MOVE {
            self.set_passes(self.passes + 1);
            self.ko_move = None;
        } else {
            self.ko_move = self.board.play_stone(color, v);
            self.set_passes(0);
        }
        self.prev_last_move = self.last_move;
        self.last_move = Some(v);
        self.move_num += 1;
        self.board.set_to_move(color.opponent());

        self.hash_history.push(self.board.hash());
        self.ko_hash_history.push(self.board.ko_hash());
    }

    /// Play for the side to move without hashing or history.
    pub fn play_move_fast(&mut self, v: Vertex) {
        let color = self.board.to_move();
        if v == PASS_MOVE {
            self.passes = (self.passes + 1).min(MAX_PASSES);
            self.ko_move = None;
        } else {
            self.ko_move = self.board.play_stone_fast(color, v);
            self.passes = 0;
        }
        self.prev_last_move = self.last_move;
        self.last_move = Some(v);
        self.move_num += 1;
        self.board.set_to_move(color.opponent());
    }

    /// Drop a handicap stone without counting it as a move.
    pub(crate) fn place_stone(&mut self, color: Color, v: Vertex) {
        self.board.play_stone(color, v);
    }

    /// Make the current position the start of the history.
    pub(crate) fn anchor(&mut self) {
        self.hash_history = vec![self.board.hash()];
        self.ko_hash_history = vec![self.board.ko_hash()];
        self.last_move = None;
        self.prev_last_move = None;
        self.ko_move = None;
    }

    // -------------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------------

    /// Does the current stone arrangement repeat an earlier one?
    ///
    /// Only meaningful right after a stone move.
    pub fn is_superko(&self) -> bool {
        let current = self.board.ko_hash();
        match self.ko_hash_history.split_last() {
            Some((_, earlier)) => earlier.contains(&current),
            None => false,
        }
    }

    /// Would `color` at `v` recreate an earlier stone arrangement?
    ///
    /// Plays on a scratch copy of the board, leaving `self` untouched.
    pub fn creates_superko(&self, color: Color, v: Vertex) -> bool {
        if v == PASS_MOVE {
            return false;
        }
        let mut board = self.board.clone();
        board.play_stone(color, v);
        self.ko_hash_history.contains(&board.ko_hash())
    }

    /// Check a move against every rule, superko included.
    pub fn check_move(&self, color: Color, v: Vertex) -> Result<(), MoveError> {
        if v == PASS_MOVE {
            return Ok(());
        }
        if v == RESIGN_MOVE || !self.board.is_on_board(v) {
            return Err(MoveError::OffBoard(v));
        }
        if self.board.square(v) != Square::Empty {
            return Err(MoveError::Occupied);
        }
        if self.ko_move == Some(v) {
            return Err(MoveError::Ko);
        }
        if self.board.is_suicide(v, color) {
            return Err(MoveError::Suicide);
        }
        if self.creates_superko(color, v) {
            return Err(MoveError::Superko);
        }
        Ok(())
    }

    /// Legal under the simple ko rule (superko is left to the caller).
    pub fn is_legal(&self, color: Color, v: Vertex) -> bool {
        v == PASS_MOVE
            || (self.board.is_on_board(v)
                && self.board.square(v) == Square::Empty
                && self.ko_move != Some(v)
                && !self.board.is_suicide(v, color))
    }

    /// Every legal move for `color` under the simple ko rule, pass last.
    pub fn generate_moves(&self, color: Color) -> Vec<Vertex> {
        let mut moves: Vec<Vertex> = self
            .board
            .empty_points()
            .filter(|&v| self.is_legal(color, v))
            .collect();
        moves.push(PASS_MOVE);
        moves
    }

    /// Acceptable playout move: legal and not filling one of our own eyes.
    #[inline]
    pub fn try_move(&self, color: Color, v: Vertex) -> bool {
        self.ko_move != Some(v)
            && !self.board.is_eye_fill(v, color)
            && !self.board.is_suicide(v, color)
    }

    /// Walk the empty list from a random start in a random direction and
    /// return the first acceptable playout move, or `PASS_MOVE`.
    pub fn walk_empty_list(&self, color: Color, rng: &mut fastrand::Rng) -> Vertex {
        let n = self.board.empty_count();
        if n == 0 {
            return PASS_MOVE;
        }
        let start = rng.usize(..n);
        let step = if rng.bool() { 1 } else { n - 1 };
        let mut i = start;
        loop {
            let v = self.board.empty_at(i);
            if self.try_move(color, v) {
                return v;
            }
            i = (i + step) % n;
            if i == start {
                return PASS_MOVE;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Scoring and hashing
    // -------------------------------------------------------------------------

    /// Full hash recomputed from scratch.
    pub fn calc_hash(&self) -> u64 {
        self.board.calc_hash(self.passes)
    }

    /// Playout score with the effective komi.
    pub fn mc_score(&self) -> f32 {
        self.board.mc_score(self.effective_komi())
    }

    /// Stone difference minus the effective komi.
    pub fn estimate_score(&self) -> f32 {
        self.board.estimate_score(self.effective_komi())
    }

    /// Area score of the board as it stands.
    pub fn score_area(&self) -> f32 {
        self.board.score_area(self.effective_komi())
    }

    /// Coordinate text for a move on this board.
    pub fn move_to_text(&self, v: Vertex) -> String {
        str_coord(v, &self.board)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Move: {}  Komi: {:.1}  To move: {}  Captures B: {} W: {}",
            self.move_num,
            self.effective_komi(),
            self.to_move(),
            self.board.prisoners(Color::Black),
            self.board.prisoners(Color::White),
        )?;
        write!(f, "{}", self.board)
    }
}

/// Parse a coordinate like "D4" or "pass" (case-insensitive).
///
/// Columns skip 'I'; row 1 is the bottom row.
pub fn parse_coord(s: &str, board: &BoardState) -> Result<Vertex, GoError> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("pass") {
        return Ok(PASS_MOVE);
    }
    if s.eq_ignore_ascii_case("resign") {
        return Ok(RESIGN_MOVE);
    }
    let bad = || GoError::Coordinate(s.to_string());

    let mut chars = s.chars();
    let col_char = chars.next().ok_or_else(bad)?.to_ascii_uppercase();
    if !col_char.is_ascii_uppercase() || col_char == 'I' {
        return Err(bad());
    }
    let mut col = (col_char as u8 - b'A') as usize;
    // 'I' is skipped to avoid confusion with 'J'
    if col_char > 'I' {
        col -= 1;
    }
    let row: usize = chars.as_str().parse().map_err(|_| bad())?;

    let size = board.size();
    if col >= size || row == 0 || row > size {
        return Err(bad());
    }
    Ok(board.vertex(col, row - 1))
}

/// Coordinate text of a vertex ("pass" and "resign" for the markers).
pub fn str_coord(v: Vertex, board: &BoardState) -> String {
    match v {
        PASS_MOVE => "pass".into(),
        RESIGN_MOVE => "resign".into(),
        _ => {
            let (x, y) = board.xy(v);
            let mut c = b'A' + x as u8;
            if c >= b'I' {
                c += 1;
            }
            format!("{}{}", c as char, y + 1)
        }
    }
}
