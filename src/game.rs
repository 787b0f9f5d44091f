//! Game record: the current position, its snapshots and the clock.

use crate::board::{Color, Square};
use crate::clock::Clock;
use crate::constants::{MAX_BOARD_SIZE, MIN_BOARD_SIZE, Vertex};
use crate::error::{GoError, MoveError};
use crate::position::Position;

/// Can `stones` fixed handicap stones be placed on a `size` board?
pub fn valid_handicap(size: usize, stones: usize) -> bool {
    if !(2..=9).contains(&stones) || size < 7 {
        return false;
    }
    !((size % 2 == 0 || size == 7) && stones > 4)
}

/// A game in progress with undo/redo over per-move snapshots.
pub struct GameRecord {
    state: Position,
    /// `snapshots[i]` is the position after `i` moves since the anchor
    snapshots: Vec<Position>,
    cursor: usize,
    clock: Clock,
}

impl GameRecord {
    pub fn new(size: usize, komi: f32) -> Result<Self, GoError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(GoError::BoardSize(size));
        }
        let state = Position::new(size, komi);
        let mut clock = Clock::default();
        clock.set_boardsize(size);
        Ok(GameRecord {
            snapshots: vec![state.clone()],
            state,
            cursor: 0,
            clock,
        })
    }

    /// Back to an empty board, keeping size, komi and time settings.
    pub fn reset(&mut self) {
        self.state = Position::new(self.state.size(), self.state.komi());
        self.snapshots = vec![self.state.clone()];
        self.cursor = 0;
        self.clock.reset_clocks();
    }

    #[inline]
    pub fn state(&self) -> &Position {
        &self.state
    }

    #[inline]
    pub fn to_move(&self) -> Color {
        self.state.to_move()
    }

    pub fn set_to_move(&mut self, color: Color) {
        self.state.set_to_move(color);
    }

    pub fn set_komi(&mut self, komi: f32) {
        self.state.set_komi(komi);
        for snapshot in &mut self.snapshots {
            snapshot.set_komi(komi);
        }
    }

    /// Two consecutive passes end the game.
    pub fn is_over(&self) -> bool {
        self.state.passes() >= 2
    }

    /// Play a move after checking it against every rule.
    ///
    /// Discards any moves that had been undone.
    pub fn play_move(&mut self, color: Color, v: Vertex) -> Result<(), MoveError> {
        self.state.check_move(color, v)?;
        self.state.play_move(color, v);
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(self.state.clone());
        self.cursor += 1;
        Ok(())
    }

    /// Take back the last move.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.state = self.snapshots[self.cursor].clone();
        true
    }

    /// Replay a move that was taken back.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.snapshots.len() {
            return false;
        }
        self.cursor += 1;
        self.state = self.snapshots[self.cursor].clone();
        true
    }

    /// Go back to the start, keeping the moves for `forward`.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.state = self.snapshots[0].clone();
    }

    /// Number of moves that can be replayed with `forward`.
    pub fn redo_len(&self) -> usize {
        self.snapshots.len() - 1 - self.cursor
    }

    /// Place `stones` handicap stones on the standard points.
    ///
    /// The board must be empty. Afterwards White is to move and the
    /// history starts from the handicap position.
    pub fn set_fixed_handicap(&mut self, stones: usize) -> Result<(), GoError> {
        let size = self.state.size();
        if !valid_handicap(size, stones) {
            return Err(GoError::Handicap { stones, size });
        }
        let board = &self.state.board;
        if self.state.move_num() > 0 || board.points().any(|v| board.square(v) != Square::Empty)
        {
            return Err(GoError::BoardNotEmpty);
        }

        let high = if size >= 13 { 3 } else { 2 };
        let mid = size / 2;
        let low = size - 1 - high;

        let mut points = vec![(low, low), (high, high)];
        if stones >= 3 {
            points.push((high, low));
        }
        if stones >= 4 {
            points.push((low, high));
        }
        if stones >= 5 && stones % 2 == 1 {
            points.push((mid, mid));
        }
        if stones >= 6 {
            points.extend([(low, mid), (high, mid)]);
        }
        if stones >= 8 {
            points.extend([(mid, low), (mid, high)]);
        }

        for (x, y) in points {
            let v = self.state.board.vertex(x, y);
            self.state.place_stone(Color::Black, v);
        }
        self.state.set_to_move(Color::White);
        self.state.set_handicap(stones);
        self.state.anchor();
        self.snapshots = vec![self.state.clone()];
        self.cursor = 0;
        log::debug!("placed {stones} handicap stones");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    pub fn set_time_control(
        &mut self,
        main_time: i32,
        byo_time: i32,
        byo_stones: i32,
        byo_periods: i32,
    ) {
        self.clock = Clock::new(main_time, byo_time, byo_stones, byo_periods);
        self.clock.set_boardsize(self.state.size());
    }

    pub fn adjust_time(&mut self, color: Color, time: i32, stones: i32) {
        self.clock.adjust_time(color, time, stones);
    }

    pub fn start_clock(&mut self, color: Color) {
        self.clock.start(color);
    }

    pub fn stop_clock(&mut self, color: Color) {
        self.clock.stop(color);
    }

    pub fn time_control(&self) -> &Clock {
        &self.clock
    }
}
