//! Game clock with main time and byoyomi.
//!
//! All times are in centiseconds. Byoyomi comes in two flavours:
//! - Canadian: `byo_stones` moves must be played within each `byo_time`
//! - Japanese: `byo_stones == 0`, `byo_periods` periods of `byo_time` each
//!
//! With `byo_time == 0` the main time is absolute and running out of it
//! forfeits the game.

use std::fmt;
use std::time::Instant;

use crate::board::Color;
use crate::constants::DEFAULT_BOARD_SIZE;

/// Safety margin kept back from every budget, in centiseconds.
const LAG_BUFFER_CENTIS: i32 = 100;

/// Budget handed out when byoyomi time is unlimited (one month).
const UNLIMITED_CENTIS: i32 = 31 * 24 * 60 * 60 * 100;

#[derive(Clone, Debug)]
pub struct Clock {
    main_time: i32,
    byo_time: i32,
    byo_stones: i32,
    byo_periods: i32,
    moves_expected: i32,

    remaining: [i32; 2],
    stones_left: [i32; 2],
    periods_left: [i32; 2],
    in_byo: [bool; 2],
    started: [Option<Instant>; 2],
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new(30 * 60 * 100, 0, 25, 0)
    }
}

impl Clock {
    pub fn new(main_time: i32, byo_time: i32, byo_stones: i32, byo_periods: i32) -> Self {
        let mut clock = Clock {
            main_time,
            byo_time,
            byo_stones,
            byo_periods,
            moves_expected: 0,
            remaining: [0; 2],
            stones_left: [0; 2],
            periods_left: [0; 2],
            in_byo: [false; 2],
            started: [None; 2],
        };
        clock.set_boardsize(DEFAULT_BOARD_SIZE);
        clock.reset_clocks();
        clock
    }

    /// Restore both players to the full main time.
    pub fn reset_clocks(&mut self) {
        self.remaining = [self.main_time; 2];
        self.stones_left = [self.byo_stones; 2];
        self.periods_left = [self.byo_periods; 2];
        self.in_byo = [false; 2];
        self.started = [None; 2];
    }

    /// Scale the expected game length to the board.
    pub fn set_boardsize(&mut self, size: usize) {
        self.moves_expected = ((size * size) / 5).max(1) as i32;
    }

    pub fn start(&mut self, color: Color) {
        self.started[color.index()] = Some(Instant::now());
    }

    /// Stop the stopwatch of `color` and charge the elapsed time.
    ///
    /// Does nothing if the stopwatch was not running.
    pub fn stop(&mut self, color: Color) {
        if let Some(start) = self.started[color.index()].take() {
            let elapsed = (start.elapsed().as_millis() / 10).min(i32::MAX as u128) as i32;
            self.charge(color, elapsed);
        }
    }

    /// Apply one move's worth of elapsed time.
    fn charge(&mut self, color: Color, elapsed: i32) {
        let c = color.index();
        self.remaining[c] -= elapsed;

        if !self.in_byo[c] {
            if self.remaining[c] < 0 && self.byo_time > 0 {
                self.in_byo[c] = true;
                self.remaining[c] = self.byo_time;
                self.stones_left[c] = self.byo_stones;
                self.periods_left[c] = self.byo_periods;
            }
            return;
        }

        if self.byo_stones > 0 {
            self.stones_left[c] -= 1;
            if self.stones_left[c] <= 0 && self.remaining[c] >= 0 {
                self.remaining[c] = self.byo_time;
                self.stones_left[c] = self.byo_stones;
            }
        } else if self.byo_periods > 0 {
            if self.remaining[c] >= 0 {
                self.remaining[c] = self.byo_time;
            } else if self.periods_left[c] > 1 {
                self.periods_left[c] -= 1;
                self.remaining[c] = self.byo_time;
            }
        }
    }

    /// Set the remaining time of a player as announced by a referee. A
    /// nonzero stone count means the player is in Canadian byoyomi.
    pub fn adjust_time(&mut self, color: Color, time: i32, stones: i32) {
        let c = color.index();
        self.remaining[c] = time;
        if stones > 0 {
            self.in_byo[c] = true;
            self.stones_left[c] = stones;
        }
    }

    pub fn remaining(&self, color: Color) -> i32 {
        self.remaining[color.index()]
    }

    pub fn stones_left(&self, color: Color) -> i32 {
        self.stones_left[color.index()]
    }

    pub fn periods_left(&self, color: Color) -> i32 {
        self.periods_left[color.index()]
    }

    pub fn in_byoyomi(&self, color: Color) -> bool {
        self.in_byo[color.index()]
    }

    /// Has `color` run out of time?
    pub fn time_forfeit(&self, color: Color) -> bool {
        self.remaining[color.index()] < 0
    }

    /// Thinking time for the next move of `color`, in centiseconds.
    pub fn max_time_for_move(&self, color: Color) -> i32 {
        let c = color.index();
        let mut time_remaining = self.remaining[c];
        let mut moves_remaining = self.moves_expected;
        let mut extra_per_move = 0;

        if self.byo_time != 0 {
            if self.byo_stones == 0 && self.byo_periods == 0 {
                return UNLIMITED_CENTIS;
            }
            if !self.in_byo[c] {
                // Main time, with byoyomi to come after it.
                extra_per_move = if self.byo_stones > 0 {
                    self.byo_time / self.byo_stones
                } else {
                    self.byo_time
                };
            } else if self.byo_stones > 0 {
                moves_remaining = self.stones_left[c];
            } else {
                // Japanese periods: each move gets one period.
                time_remaining = 0;
                extra_per_move = self.byo_time;
            }
        }

        let base = (time_remaining - LAG_BUFFER_CENTIS).max(0) / moves_remaining.max(1);
        let inc = (extra_per_move - LAG_BUFFER_CENTIS).max(0);
        base + inc
    }
}

/// Format centiseconds as `HH:MM:SS`.
fn hms(centis: i32) -> String {
    let secs = centis.max(0) / 100;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, color) in [Color::Black, Color::White].into_iter().enumerate() {
            let c = color.index();
            write!(f, "{} time: {}", color, hms(self.remaining[c]))?;
            if self.in_byo[c] {
                if self.byo_stones > 0 {
                    write!(f, ", {} stones left", self.stones_left[c])?;
                } else {
                    write!(f, ", {} periods left", self.periods_left[c])?;
                }
            }
            if i == 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_time_forfeits() {
        let mut clock = Clock::new(1000, 0, 0, 0);
        clock.charge(Color::Black, 600);
        assert!(!clock.time_forfeit(Color::Black));
        clock.charge(Color::Black, 600);
        assert!(clock.time_forfeit(Color::Black));
        assert!(!clock.in_byoyomi(Color::Black));
        assert!(!clock.time_forfeit(Color::White));
    }

    #[test]
    fn test_canadian_byoyomi_cycle() {
        let mut clock = Clock::new(1000, 500, 5, 0);
        clock.charge(Color::Black, 1200);
        assert!(clock.in_byoyomi(Color::Black));
        assert_eq!(clock.remaining(Color::Black), 500);
        assert_eq!(clock.stones_left(Color::Black), 5);

        clock.charge(Color::Black, 100);
        assert_eq!(clock.stones_left(Color::Black), 4);
        assert_eq!(clock.remaining(Color::Black), 400);
        for _ in 0..4 {
            clock.charge(Color::Black, 50);
        }
        // Period completed in time: fresh allotment.
        assert_eq!(clock.stones_left(Color::Black), 5);
        assert_eq!(clock.remaining(Color::Black), 500);

        clock.charge(Color::Black, 600);
        assert!(clock.time_forfeit(Color::Black));
    }

    #[test]
    fn test_japanese_periods() {
        let mut clock = Clock::new(0, 300, 0, 3);
        clock.charge(Color::White, 10);
        assert!(clock.in_byoyomi(Color::White));
        assert_eq!(clock.periods_left(Color::White), 3);

        clock.charge(Color::White, 200);
        assert_eq!(clock.remaining(Color::White), 300);
        assert_eq!(clock.periods_left(Color::White), 3);

        clock.charge(Color::White, 400);
        assert_eq!(clock.periods_left(Color::White), 2);
        assert!(!clock.time_forfeit(Color::White));
        clock.charge(Color::White, 400);
        clock.charge(Color::White, 400);
        assert!(clock.time_forfeit(Color::White));
    }

    #[test]
    fn test_max_time_for_move() {
        let mut clock = Clock::new(3000, 0, 0, 0);
        clock.set_boardsize(9);
        // 81 / 5 = 16 moves expected.
        assert_eq!(clock.max_time_for_move(Color::Black), (3000 - 100) / 16);

        let unlimited = Clock::new(0, 500, 0, 0);
        assert_eq!(unlimited.max_time_for_move(Color::Black), UNLIMITED_CENTIS);

        let mut canadian = Clock::new(0, 1000, 10, 0);
        canadian.set_boardsize(9);
        // Before byoyomi: nothing from main time plus a share of a period.
        assert_eq!(canadian.max_time_for_move(Color::Black), 0);
        canadian.charge(Color::Black, 1);
        assert!(canadian.in_byoyomi(Color::Black));
        assert_eq!(canadian.max_time_for_move(Color::Black), (1000 - 100) / 10);

        let mut japanese = Clock::new(0, 500, 0, 5);
        assert_eq!(japanese.max_time_for_move(Color::White), 400);
        japanese.charge(Color::White, 1);
        assert_eq!(japanese.max_time_for_move(Color::White), 400);
    }

    #[test]
    fn test_budget_never_negative() {
        let mut clock = Clock::new(50, 0, 0, 0);
        assert_eq!(clock.max_time_for_move(Color::Black), 0);
        clock.charge(Color::Black, 500);
        assert_eq!(clock.max_time_for_move(Color::Black), 0);
    }

    #[test]
    fn test_display() {
        let mut clock = Clock::new(3_600 * 100, 3000, 25, 0);
        clock.charge(Color::White, 3_600 * 100 + 1);
        let text = clock.to_string();
        assert!(text.contains("Black time: 01:00:00"));
        assert!(text.contains("White time: 00:00:30, 25 stones left"));
    }
}
