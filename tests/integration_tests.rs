//! Integration tests for sente
//!
//! Whole-game flows through the public API: playing and undoing moves,
//! the ko and superko rules, handicap games and searches on small boards.

use sente::board::{Color, Square};
use sente::constants::{PASS_MOVE, RESIGN_MOVE, Vertex};
use sente::error::MoveError;
use sente::game::GameRecord;
use sente::position::{Position, parse_coord};
use sente::search::{PassPolicy, SearchConfig, SearchController};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn at(game: &GameRecord, s: &str) -> Vertex {
    parse_coord(s, &game.state().board).unwrap()
}

/// Play a sequence of moves alternating from Black. "pass" passes.
fn setup_game(size: usize, moves: &[&str]) -> GameRecord {
    let mut game = GameRecord::new(size, 7.5).unwrap();
    let mut color = Color::Black;
    for s in moves {
        let v = at(&game, s);
        game.play_move(color, v)
            .unwrap_or_else(|e| panic!("illegal setup move {s}: {e}"));
        color = color.opponent();
    }
    game
}

fn search_config(playouts: usize) -> SearchConfig {
    SearchConfig {
        threads: 1,
        seed: 2024,
        playout_limit: Some(playouts),
        early_exit: false,
        allow_resign: false,
        ..SearchConfig::default()
    }
}

fn assert_hash_consistent(pos: &Position) {
    assert_eq!(pos.board.hash(), pos.calc_hash());
    assert_eq!(pos.board.ko_hash(), pos.board.calc_ko_hash());
}

// =============================================================================
// Rules
// =============================================================================

#[test]
fn test_corner_capture_on_nine_by_nine() {
    // Black B1 next to the corner, White surrounds it with A1, C1, B2.
    let game = setup_game(9, &["B1", "A1", "pass", "C1", "pass", "B2"]);
    let state = game.state();
    let b1 = at(&game, "B1");

    assert_eq!(state.board.square(b1), Square::Empty);
    assert_eq!(state.board.prisoners(Color::White), 1);
    assert_eq!(state.board.prisoners(Color::Black), 0);
    assert_eq!(state.board.neighbour_count(b1, Square::Empty), 0);
    assert_eq!(state.board.neighbour_count(b1, Square::White), 3 + 1);
    assert_hash_consistent(state);
}

#[test]
fn test_ko_capture_and_immediate_retake() {
    let mut game = setup_game(
        9,
        &["D5", "E5", "C4", "F4", "D3", "E3", "A9", "D4", "E4"],
    );
    let d4 = at(&game, "D4");
    let e4 = at(&game, "E4");
    assert_eq!(game.state().ko_move(), Some(d4));
    assert_eq!(game.state().board.prisoners(Color::Black), 1);

    assert_eq!(game.play_move(Color::White, d4), Err(MoveError::Ko));

    // Ko threats elsewhere lift the ban.
    game.play_move(Color::White, at(&game, "H8")).unwrap();
    game.play_move(Color::Black, at(&game, "H7")).unwrap();
    game.play_move(Color::White, d4).unwrap();
    assert_eq!(game.state().board.square(e4), Square::Empty);
    assert_eq!(game.state().ko_move(), Some(e4));
    assert_hash_consistent(game.state());
}

#[test]
fn test_superko_rejected_by_game() {
    let mut game = setup_game(5, &["pass", "A1", "A2", "C1", "pass", "B2", "B1", "pass", "pass"]);
    let a1 = at(&game, "A1");
    assert_eq!(game.state().ko_move(), None);
    assert_eq!(game.play_move(Color::White, a1), Err(MoveError::Superko));
    assert!(game.state().is_legal(Color::White, a1));
}

#[test]
fn test_suicide_and_occupied_rejected() {
    let mut game = setup_game(9, &["A2", "pass", "B1"]);
    assert_eq!(game.play_move(Color::White, at(&game, "A1")), Err(MoveError::Suicide));
    assert_eq!(game.play_move(Color::White, at(&game, "B1")), Err(MoveError::Occupied));
    assert_eq!(game.play_move(Color::White, RESIGN_MOVE), Err(MoveError::OffBoard(RESIGN_MOVE)));
    assert_eq!(game.state().move_num(), 3);
}

#[test]
fn test_undo_restores_capture() {
    let mut game = setup_game(9, &["B1", "A1", "pass", "C1", "pass"]);
    let before = game.state().clone();
    game.play_move(Color::White, at(&game, "B2")).unwrap();
    assert_eq!(game.state().board.prisoners(Color::White), 1);

    assert!(game.undo());
    let after = game.state();
    assert_eq!(after.board.hash(), before.board.hash());
    assert_eq!(after.ko_move(), before.ko_move());
    assert_eq!(after.board.prisoners(Color::White), 0);
    for v in after.board.points() {
        assert_eq!(after.board.square(v), before.board.square(v));
    }

    assert!(game.forward());
    assert_eq!(game.state().board.prisoners(Color::White), 1);
}

#[test]
fn test_random_games_keep_hashes_consistent() {
    let mut rng = fastrand::Rng::with_seed(17);
    for size in [5, 9, 13, 19] {
        let mut game = GameRecord::new(size, 6.5).unwrap();
        for _ in 0..size * size {
            let color = game.to_move();
            let moves = game.state().generate_moves(color);
            let v = moves[rng.usize(..moves.len())];
            if game.play_move(color, v).is_err() {
                // Superko: pass instead.
                game.play_move(color, PASS_MOVE).unwrap();
            }
            if game.is_over() {
                break;
            }
        }
        assert_hash_consistent(game.state());
    }
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_five_by_five_search_is_deterministic() {
    let think = || {
        let mut game = GameRecord::new(5, 0.5).unwrap();
        let mut search = SearchController::with_default_scorer(search_config(5000));
        let mv = search.think(&mut game, Color::Black, PassPolicy::Allowed);

        let tree = search.tree();
        let root = tree.root();
        let child_visits: u32 = tree.children_stats(root).iter().map(|(_, d)| d.visits).sum();
        assert_eq!(tree.visits(root), 5000);
        assert_eq!(child_visits, tree.visits(root));
        mv
    };
    let first = think();
    assert_ne!(first, RESIGN_MOVE);
    assert_eq!(first, think());
}

#[test]
fn test_handicap_game_search() {
    let mut game = GameRecord::new(9, 0.5).unwrap();
    game.set_fixed_handicap(4).unwrap();
    assert_eq!(game.to_move(), Color::White);

    let mut search = SearchController::with_default_scorer(search_config(800));
    let mv = search.think(&mut game, Color::White, PassPolicy::Forbidden);
    assert_ne!(mv, PASS_MOVE);
    game.play_move(Color::White, mv).unwrap();
    assert_eq!(game.state().effective_komi(), 4.5);
}

#[test]
fn test_short_selfplay_plays_legal_moves() {
    let mut game = GameRecord::new(5, 0.5).unwrap();
    let mut search = SearchController::with_default_scorer(search_config(300));
    for _ in 0..20 {
        if game.is_over() {
            break;
        }
        let color = game.to_move();
        let mv = search.think(&mut game, color, PassPolicy::Allowed);
        assert_ne!(mv, RESIGN_MOVE);
        game.play_move(color, mv).unwrap();
        assert_hash_consistent(game.state());
    }
    assert!(game.state().move_num() > 0);
}

#[test]
fn test_multithreaded_search_returns_legal_move() {
    let mut game = setup_game(9, &["E5", "E4"]);
    let mut search = SearchController::with_default_scorer(SearchConfig {
        threads: 4,
        ..search_config(2000)
    });
    let mv = search.think(&mut game, Color::Black, PassPolicy::Forbidden);
    assert!(game.state().is_legal(Color::Black, mv));
    assert!(search.last_stats().playouts >= 2000);
    let tree = search.tree();
    assert!(tree.visits(tree.root()) >= 2000);
}
