//! Sente: a UCT+RAVE Monte Carlo Go engine.
//!
//! The crate combines an incremental board with a shared Monte Carlo search
//! tree explored by several worker threads.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, move sentinels and search tunables
//! - [`board`] - Incremental board: strings, liberties, hashing, tactics
//! - [`position`] - Game position with ko, passes and superko history
//! - [`game`] - Game record with undo/redo, handicap and clock
//! - [`clock`] - Main time and byoyomi bookkeeping
//! - [`scorer`] - Move scoring contract used by search and playouts
//! - [`patterns`] - 3x3 patterns and the default move scorer
//! - [`playout`] - Random game simulation and dead-stone marking
//! - [`ownership`] - Monte Carlo ownership statistics
//! - [`tt`] - Lossy transposition cache
//! - [`mcts`] - Arena search tree with UCT+RAVE selection
//! - [`search`] - Search controller: think, ponder, move selection
//!
//! ## Example
//!
//! ```
//! use sente::board::Color;
//! use sente::game::GameRecord;
//! use sente::position::parse_coord;
//! use sente::search::{PassPolicy, SearchConfig, SearchController};
//!
//! let mut game = GameRecord::new(9, 7.5).unwrap();
//! let d4 = parse_coord("D4", &game.state().board).unwrap();
//! game.play_move(Color::Black, d4).unwrap();
//!
//! let config = SearchConfig {
//!     threads: 1,
//!     playout_limit: Some(200),
//!     ..SearchConfig::default()
//! };
//! let mut search = SearchController::with_default_scorer(config);
//! let reply = search.think(&mut game, Color::White, PassPolicy::Allowed);
//! println!("White plays {}", game.state().move_to_text(reply));
//! ```

pub mod board;
pub mod clock;
pub mod constants;
pub mod error;
pub mod game;
pub mod mcts;
pub mod ownership;
pub mod patterns;
pub mod playout;
pub mod position;
pub mod scorer;
pub mod search;
pub mod tt;
pub mod zobrist;
