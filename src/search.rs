//! Search controller: turns a game position into a move.
//!
//! One call to [`SearchController::think`]:
//! - roots the tree at the current position (reusing the matching subtree
//!   of the previous search when the game moved on through it)
//! - primes the ownership table and expands the root
//! - runs simulations on all worker threads until the time budget, the
//!   playout limit or early exit stops them
//! - picks the move from the root statistics
//!
//! A simulation clones the root position, descends the tree with UCT+RAVE,
//! finishes with a playout and backs the result up along the visited path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::board::Color;
use crate::constants::{
    MATURE_THRESHOLD, MAX_CHILDREN, MAX_SQ, MAX_TREE_SIZE, PASS_MIN_WINRATE, PASS_MOVE,
    PASS_WINRATE_MARGIN, PRIMING_PLAYOUTS, REPORT_PERIOD_CENTIS, RESIGN_MIN_VISITS, RESIGN_MOVE,
    RESIGN_THRES, TT_SIZE, Vertex,
};
use crate::game::GameRecord;
use crate::mcts::{NodeData, NodeRef, SearchTree};
use crate::ownership::OwnershipTable;
use crate::patterns::PatternScorer;
use crate::playout::{AmafMap, PlayoutEngine, amaf_mark, black_value};
use crate::position::Position;
use crate::scorer::MoveScorer;
use crate::tt::TranspositionCache;

/// Whether the chosen move may be a pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PassPolicy {
    #[default]
    Allowed,
    /// Play the best non-pass move whenever one exists
    Forbidden,
}

/// Runtime search settings.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Worker threads, the calling thread included
    pub threads: usize,
    pub seed: u64,
    /// Stop after this many simulations even if time remains
    pub playout_limit: Option<usize>,
    pub max_tree_size: usize,
    pub mature_threshold: u32,
    pub max_children: usize,
    pub tt_size: usize,
    pub use_transposition: bool,
    pub reuse_tree: bool,
    pub allow_resign: bool,
    /// Stop once the best move can no longer be overtaken in time
    pub early_exit: bool,
    pub priming_playouts: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: thread::available_parallelism().map_or(1, |n| n.get()),
            seed: 1,
            playout_limit: None,
            max_tree_size: MAX_TREE_SIZE,
            mature_threshold: MATURE_THRESHOLD,
            max_children: MAX_CHILDREN,
            tt_size: TT_SIZE,
            use_transposition: true,
            reuse_tree: true,
            allow_resign: true,
            early_exit: true,
            priming_playouts: PRIMING_PLAYOUTS,
        }
    }
}

/// Summary of the last search.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub playouts: usize,
    pub elapsed: Duration,
    pub root_visits: u32,
    /// Win rate of the chosen move for the side that played it
    pub winrate: f32,
    pub nodes: usize,
    pub reused_tree: bool,
}

impl SearchStats {
    pub fn playouts_per_second(&self) -> f64 {
        self.playouts as f64 / self.elapsed.as_secs_f64().max(1e-9)
    }
}

/// When a search loop has to stop.
struct Limits<'a> {
    deadline: Option<Duration>,
    playouts: Option<usize>,
    stop: Option<&'a AtomicBool>,
}

/// Per-worker scratch space reused across simulations.
struct Scratch {
    amaf: AmafMap,
    /// Node, its hash and the side to move there
    path: Vec<(NodeRef, u64, Color)>,
}

impl Scratch {
    fn new() -> Self {
        Scratch {
            amaf: [0; MAX_SQ],
            path: Vec::with_capacity(64),
        }
    }
}

pub struct SearchController {
    config: SearchConfig,
    engine: PlayoutEngine,
    cache: TranspositionCache,
    tree: SearchTree,
    /// Position the current tree is rooted at
    root_state: Option<Position>,
    rng: fastrand::Rng,
    last_stats: SearchStats,
}

impl SearchController {
    pub fn new(config: SearchConfig, scorer: Arc<dyn MoveScorer>) -> Self {
        let engine = PlayoutEngine::new(scorer, Arc::new(OwnershipTable::new()));
        SearchController {
            cache: TranspositionCache::new(config.tt_size),
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            engine,
            tree: SearchTree::new(),
            root_state: None,
            last_stats: SearchStats::default(),
        }
    }

    /// A controller using the pattern scorer.
    pub fn with_default_scorer(config: SearchConfig) -> Self {
        Self::new(config, Arc::new(PatternScorer))
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn engine(&self) -> &PlayoutEngine {
        &self.engine
    }

    pub fn last_stats(&self) -> &SearchStats {
        &self.last_stats
    }

    /// Forget the tree and the cache.
    pub fn clear(&mut self) {
        self.tree = SearchTree::new();
        self.root_state = None;
        self.cache.clear();
    }

    // -------------------------------------------------------------------------
    // Entry points
    // -------------------------------------------------------------------------

    /// Search the game position for `color` and return the chosen move,
    /// `PASS_MOVE` or `RESIGN_MOVE`.
    ///
    /// The game itself is not changed apart from the side to move and the
    /// clock.
    pub fn think(&mut self, game: &mut GameRecord, color: Color, policy: PassPolicy) -> Vertex {
        game.set_to_move(color);
        game.start_clock(color);
        let start = Instant::now();
        let centis = game.time_control().max_time_for_move(color).max(0) as u64;
        let budget = Duration::from_millis(centis * 10);
        log::debug!("thinking for {color} with a budget of {:.2}s", budget.as_secs_f64());

        let root = game.state().clone();
        self.prepare_root(&root);
        let playouts = self.run_search(
            &root,
            Limits {
                deadline: Some(budget),
                playouts: self.config.playout_limit,
                stop: None,
            },
        );

        let mv = self.best_move(&root, policy);
        game.stop_clock(color);

        self.finish_stats(&root, mv, playouts, start.elapsed());
        self.dump_stats(&root);
        mv
    }

    /// Search the game position until `stop` is set.
    ///
    /// The tree is kept, so a following [`think`](Self::think) on the same
    /// position or on one reached through it starts from these statistics.
    pub fn ponder(&mut self, game: &GameRecord, stop: &AtomicBool) {
        let start = Instant::now();
        let root = game.state().clone();
        self.prepare_root(&root);
        let playouts = self.run_search(
            &root,
            Limits {
                deadline: None,
                playouts: None,
                stop: Some(stop),
            },
        );
        log::debug!(
            "pondered {playouts} playouts in {:.2}s",
            start.elapsed().as_secs_f64()
        );
    }

    /// Area score of a finished game after dead-stone removal.
    pub fn final_score(&mut self, state: &Position) -> f32 {
        self.engine.final_score(state, &mut self.rng)
    }

    // -------------------------------------------------------------------------
    // Root preparation
    // -------------------------------------------------------------------------

    fn prepare_root(&mut self, root: &Position) {
        let seed = self.config.seed.wrapping_add((root.move_num() as u64) << 32);
        self.rng = fastrand::Rng::with_seed(seed);

        let reused = self.reuse_tree(root);
        self.last_stats.reused_tree = reused;
        if !reused {
            self.tree = SearchTree::new();
        }
        self.root_state = Some(root.clone());

        self.engine.ownership().clear();
        let (winrate, score) =
            self.engine
                .prime_ownership(root, self.config.priming_playouts, &mut self.rng);
        self.engine.refresh_ownership();
        log::debug!(
            "priming: black winrate {:.1}%, mean score {score:+.1}",
            winrate * 100.0
        );

        self.tree.expand(
            self.tree.node_ref(self.tree.root()),
            root,
            self.engine.scorer(),
            self.config.max_children,
            self.config.max_tree_size,
        );
        self.prune_superko(root);
    }

    /// Move the tree to the subtree matching `root`.
    ///
    /// Succeeds when `root` is the previous root or follows it by one or two
    /// moves that the tree has children for.
    fn reuse_tree(&mut self, root: &Position) -> bool {
        if !self.config.reuse_tree {
            return false;
        }
        let Some(old) = self.root_state.as_ref() else {
            return false;
        };

        let moves = match root.move_num().checked_sub(old.move_num()) {
            Some(0) => vec![],
            Some(1) => vec![root.last_move()],
            Some(2) => vec![root.prev_last_move(), root.last_move()],
            _ => return false,
        };

        let mut replay = old.clone();
        let mut node = self.tree.root();
        for mv in moves {
            let Some(mv) = mv else {
                return false;
            };
            let Some(child) = self.tree.find_child(node, mv) else {
                return false;
            };
            replay.play_move(replay.to_move(), mv);
            node = child;
        }
        let same = replay.board.hash() == root.board.hash()
            && replay.board.ko_hash() == root.board.ko_hash();
        if !same {
            return false;
        }

        if node != self.tree.root() {
            self.tree = self.tree.extract_subtree(node);
        }
        log::debug!(
            "reusing {} nodes, {} visits",
            self.tree.node_count(),
            self.tree.visits(self.tree.root())
        );
        true
    }

    /// Remove root children that would repeat an earlier position.
    fn prune_superko(&self, root: &Position) {
        let color = root.to_move();
        let root_ref = self.tree.node_ref(self.tree.root());
        for (child, data) in self.tree.children_stats(root_ref.id) {
            if data.mv != PASS_MOVE && root.creates_superko(color, data.mv) {
                log::debug!("pruning superko move {}", root.move_to_text(data.mv));
                self.tree.delete_child(root_ref, self.tree.node_ref(child));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Search loop
    // -------------------------------------------------------------------------

    /// Run simulations on all workers until `limits` say stop.
    ///
    /// The calling thread is worker 0 and the only one checking the limits.
    fn run_search(&self, root: &Position, limits: Limits) -> usize {
        let running = AtomicBool::new(true);
        let playouts = AtomicUsize::new(0);
        let start = Instant::now();
        let report_period = Duration::from_millis(REPORT_PERIOD_CENTIS * 10);
        let base_seed = self.rng.clone().u64(..);

        thread::scope(|s| {
            for worker in 1..self.config.threads.max(1) {
                let running = &running;
                let playouts = &playouts;
                s.spawn(move || {
                    let mut rng = fastrand::Rng::with_seed(base_seed.wrapping_add(worker as u64));
                    let mut scratch = Scratch::new();
                    while running.load(Ordering::Relaxed) {
                        self.play_simulation(root, &mut rng, &mut scratch);
                        playouts.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }

            let mut rng = fastrand::Rng::with_seed(base_seed);
            let mut scratch = Scratch::new();
            let mut last_report = start;
            loop {
                if self.should_stop(&limits, start.elapsed(), playouts.load(Ordering::Relaxed)) {
                    break;
                }
                self.play_simulation(root, &mut rng, &mut scratch);
                playouts.fetch_add(1, Ordering::Relaxed);

                if last_report.elapsed() >= report_period {
                    self.report_progress(root, playouts.load(Ordering::Relaxed), start.elapsed());
                    last_report = Instant::now();
                }
            }
            running.store(false, Ordering::Relaxed);
        });

        playouts.into_inner()
    }

    fn should_stop(&self, limits: &Limits, elapsed: Duration, playouts: usize) -> bool {
        if limits.stop.is_some_and(|stop| stop.load(Ordering::Relaxed)) {
            return true;
        }
        if limits.playouts.is_some_and(|limit| playouts >= limit) {
            return true;
        }
        let Some(budget) = limits.deadline else {
            return false;
        };
        if elapsed >= budget {
            return true;
        }
        self.config.early_exit && playouts > 0 && self.decided(elapsed, budget, playouts)
    }

    /// True when the runner-up cannot catch the best move in the time left.
    fn decided(&self, elapsed: Duration, budget: Duration, playouts: usize) -> bool {
        let children = self.tree.sorted_children(self.tree.root(), Color::Black);
        let (Some((_, first)), Some((_, second))) = (children.first(), children.get(1)) else {
            return false;
        };
        let rate = playouts as f64 / elapsed.as_secs_f64().max(1e-3);
        let remaining = rate * (budget - elapsed).as_secs_f64();
        first.search_visits().saturating_sub(second.search_visits()) as f64 > remaining
    }

    /// One descent, playout and backup from a clone of `root`.
    fn play_simulation(&self, root: &Position, rng: &mut fastrand::Rng, scratch: &mut Scratch) {
        let mut state = root.clone();
        scratch.amaf.fill(0);
        scratch.path.clear();
        let use_tt = self.config.use_transposition;
        let mut node = self.tree.node_ref(self.tree.root());

        let value = loop {
            let hash = state.board.hash();
            let color = state.to_move();
            let finished = state.passes() >= 2;
            // Terminal weight must not come back through the cache.
            if use_tt && !finished {
                self.tree.sync_from_cache(node, hash, &self.cache);
            }
            scratch.path.push((node, hash, color));

            if finished {
                let value = terminal_value(&state);
                self.tree.finalize_terminal(node, value);
                break value;
            }

            if self.tree.wants_expansion(node, self.config.mature_threshold) {
                self.tree.expand(
                    node,
                    &state,
                    self.engine.scorer(),
                    self.config.max_children,
                    self.config.max_tree_size,
                );
            }

            let Some((child, mv)) = self.tree.select_child(node, color) else {
                break self.playout(&mut state, rng, &mut scratch.amaf);
            };
            if state.creates_superko(color, mv) {
                if self.tree.delete_child(node, child) {
                    log::debug!("pruned superko move {} in the tree", state.move_to_text(mv));
                }
                break self.playout(&mut state, rng, &mut scratch.amaf);
            }
            amaf_mark(&mut scratch.amaf, color, mv);
            state.play_move(color, mv);
            node = child;
        };

        for &(node, hash, color) in scratch.path.iter().rev() {
            self.tree.update(node, value);
            self.tree.update_rave(node, color, &scratch.amaf, value);
            if use_tt {
                self.tree.push_to_cache(node, hash, &self.cache);
            }
        }
    }

    fn playout(&self, state: &mut Position, rng: &mut fastrand::Rng, amaf: &mut AmafMap) -> f32 {
        self.engine.run(state, rng, true, Some(amaf)).black_value()
    }

    // -------------------------------------------------------------------------
    // Move selection
    // -------------------------------------------------------------------------

    fn best_move(&mut self, root: &Position, policy: PassPolicy) -> Vertex {
        let color = root.to_move();
        let children = self.tree.sorted_children(self.tree.root(), color);
        let Some((_, first)) = children.first() else {
            return PASS_MOVE;
        };
        let mut best: &NodeData = first;

        if best.mv != PASS_MOVE {
            if let Some((_, pass)) = children.iter().find(|(_, d)| d.mv == PASS_MOVE) {
                let pass_rate = pass.winrate(color);
                if pass.visits > 0
                    && pass_rate >= PASS_MIN_WINRATE
                    && pass_rate >= best.winrate(color) - PASS_WINRATE_MARGIN
                {
                    log::debug!("preferring pass at {:.1}%", pass_rate * 100.0);
                    best = pass;
                }
            }
        }

        if policy == PassPolicy::Allowed
            && best.mv != PASS_MOVE
            && root.last_move() == Some(PASS_MOVE)
        {
            // Passing now ends the game.
            let score = self.final_score(root);
            let wins = match color {
                Color::Black => score > 0.0,
                Color::White => score < 0.0,
            };
            if wins {
                log::debug!("opponent passed and passing wins by {:.1}", score.abs());
                return PASS_MOVE;
            }
        }

        if policy == PassPolicy::Forbidden && best.mv == PASS_MOVE {
            if let Some((_, alt)) = children.iter().find(|(_, d)| d.mv != PASS_MOVE) {
                best = alt;
            }
        }

        let root_visits = self.tree.visits(self.tree.root());
        if self.config.allow_resign
            && best.mv != PASS_MOVE
            && root_visits >= RESIGN_MIN_VISITS
            && best.winrate(color) < RESIGN_THRES
        {
            log::info!(
                "resigning at {:.1}% after {root_visits} visits",
                best.winrate(color) * 100.0
            );
            return RESIGN_MOVE;
        }

        best.mv
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    fn pv_text(&self, root: &Position) -> String {
        self.tree
            .principal_variation(self.tree.root(), 10)
            .into_iter()
            .map(|mv| root.move_to_text(mv))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn report_progress(&self, root: &Position, playouts: usize, elapsed: Duration) {
        let color = root.to_move();
        let Some((_, best)) = self.tree.sorted_children(self.tree.root(), color).into_iter().next()
        else {
            return;
        };
        log::info!(
            "{playouts} playouts ({:.0}/s), {} {:.1}%, PV: {}",
            playouts as f64 / elapsed.as_secs_f64().max(1e-3),
            root.move_to_text(best.mv),
            best.winrate(color) * 100.0,
            self.pv_text(root)
        );
    }

    fn finish_stats(&mut self, root: &Position, mv: Vertex, playouts: usize, elapsed: Duration) {
        let color = root.to_move();
        let root_id = self.tree.root();
        let winrate = self
            .tree
            .find_child(root_id, mv)
            .map_or(0.5, |child| self.tree.stats(child).winrate(color));
        self.last_stats = SearchStats {
            playouts,
            elapsed,
            root_visits: self.tree.visits(root_id),
            winrate,
            nodes: self.tree.node_count(),
            reused_tree: self.last_stats.reused_tree,
        };
    }

    /// Log the most visited root moves.
    fn dump_stats(&self, root: &Position) {
        let color = root.to_move();
        for (child, data) in self
            .tree
            .sorted_children(self.tree.root(), color)
            .into_iter()
            .filter(|(_, d)| d.visits > 0)
            .take(8)
        {
            let pv = self
                .tree
                .principal_variation(child, 8)
                .into_iter()
                .map(|mv| root.move_to_text(mv))
                .collect::<Vec<_>>()
                .join(" ");
            log::info!(
                "{:>5} -> {:>7} (W: {:5.1}%) (R: {:5.1}%) (P: {:4.2}) PV: {} {}",
                root.move_to_text(data.mv),
                data.search_visits(),
                data.winrate(color) * 100.0,
                data.rave_winrate() * 100.0,
                data.prior,
                root.move_to_text(data.mv),
                pv
            );
        }
        let stats = &self.last_stats;
        log::info!(
            "{} playouts in {:.2}s ({:.0}/s), {} nodes",
            stats.playouts,
            stats.elapsed.as_secs_f64(),
            stats.playouts_per_second(),
            stats.nodes
        );
    }
}

/// Result for Black of a game ended by two passes in the tree.
///
/// Open territory still counts here, unlike the filled boards playouts end
/// on.
fn terminal_value(state: &Position) -> f32 {
    black_value(state.score_area())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::parse_coord;
    use crate::scorer::UniformScorer;

    fn config(playouts: usize) -> SearchConfig {
        SearchConfig {
            threads: 1,
            seed: 42,
            playout_limit: Some(playouts),
            early_exit: false,
            allow_resign: false,
            priming_playouts: 16,
            tt_size: 4096,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_root_visits_match_children() {
        let mut game = GameRecord::new(5, 0.5).unwrap();
        let mut search = SearchController::with_default_scorer(config(600));
        let mv = search.think(&mut game, Color::Black, PassPolicy::Allowed);
        assert!(game.state().is_legal(Color::Black, mv));

        let tree = search.tree();
        let root = tree.root();
        let child_visits: u32 = tree.children_stats(root).iter().map(|(_, d)| d.visits).sum();
        assert_eq!(tree.visits(root), child_visits);
        assert_eq!(tree.visits(root), 600);
        assert_eq!(search.last_stats().playouts, 600);
    }

    #[test]
    fn test_think_is_deterministic() {
        let run = || {
            let mut game = GameRecord::new(5, 0.5).unwrap();
            let mut search = SearchController::with_default_scorer(config(400));
            search.think(&mut game, Color::Black, PassPolicy::Allowed)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_forbidden_pass_picks_a_stone() {
        let mut game = GameRecord::new(5, 0.5).unwrap();
        let mut search = SearchController::new(config(100), Arc::new(UniformScorer));
        let mv = search.think(&mut game, Color::Black, PassPolicy::Forbidden);
        assert_ne!(mv, PASS_MOVE);
        assert_ne!(mv, RESIGN_MOVE);
    }

    #[test]
    fn test_pass_when_nothing_to_play() {
        // Two-eyed groups fill the board: passing is the only move.
        let mut game = GameRecord::new(5, 0.5).unwrap();
        for s in ["A1", "A3", "A5", "B1", "B2", "B3", "B4", "B5", "C1", "C2", "C3", "C4", "C5"] {
            let v = parse_coord(s, &game.state().board).unwrap();
            game.play_move(Color::Black, v).unwrap();
        }
        for s in ["D1", "D2", "D3", "D4", "D5", "E1", "E3", "E5"] {
            let v = parse_coord(s, &game.state().board).unwrap();
            game.play_move(Color::White, v).unwrap();
        }
        let mut search = SearchController::with_default_scorer(config(50));
        assert_eq!(search.think(&mut game, Color::Black, PassPolicy::Allowed), PASS_MOVE);
        assert_eq!(search.think(&mut game, Color::Black, PassPolicy::Forbidden), PASS_MOVE);
    }

    #[test]
    fn test_superko_children_pruned_at_root() {
        // After Black's B1 captures at A1 and White passes, White retaking
        // at A1 would repeat the position after White's B2.
        let mut game = GameRecord::new(5, 7.5).unwrap();
        let at = |game: &GameRecord, s: &str| parse_coord(s, &game.state().board).unwrap();
        let moves = [
            (Color::White, "A1"),
            (Color::Black, "A2"),
            (Color::White, "C1"),
            (Color::Black, "pass"),
            (Color::White, "B2"),
            (Color::Black, "B1"),
            (Color::White, "pass"),
        ];
        for (color, s) in moves {
            let v = at(&game, s);
            game.play_move(color, v).unwrap();
        }
        let a1 = at(&game, "A1");
        assert_eq!(game.state().ko_move(), None);
        assert!(game.state().creates_superko(Color::White, a1));

        let mut search = SearchController::new(config(300), Arc::new(UniformScorer));
        search.think(&mut game, Color::White, PassPolicy::Forbidden);
        let tree = search.tree();
        assert!(tree.find_child(tree.root(), a1).is_none());

        // A second search on the same position keeps the tree and never
        // brings the move back.
        let mv = search.think(&mut game, Color::White, PassPolicy::Forbidden);
        assert_ne!(mv, a1);
        assert!(search.last_stats().reused_tree);
        let tree = search.tree();
        assert!(tree.find_child(tree.root(), a1).is_none());
        assert_eq!(tree.visits(tree.root()), 600);
    }

    /// Scores one move for one colour far above everything else, which
    /// sorts below a pass.
    struct FavouriteScorer {
        color: Color,
        target: Vertex,
    }

    impl MoveScorer for FavouriteScorer {
        fn score(&self, _pos: &Position, color: Color, v: Vertex) -> f32 {
            if color == self.color && v == self.target {
                10.0
            } else {
                -1.0
            }
        }
    }

    #[test]
    fn test_superko_child_detached_during_descent() {
        // As above, but Black is to move after B1. Black passing lets White
        // retake at A1, which repeats the position after White's B2.
        let mut game = GameRecord::new(5, 7.5).unwrap();
        let at = |game: &GameRecord, s: &str| parse_coord(s, &game.state().board).unwrap();
        let moves = [
            (Color::White, "A1"),
            (Color::Black, "A2"),
            (Color::White, "C1"),
            (Color::Black, "pass"),
            (Color::White, "B2"),
            (Color::Black, "B1"),
        ];
        for (color, s) in moves {
            let v = at(&game, s);
            game.play_move(color, v).unwrap();
        }
        let a1 = at(&game, "A1");
        let mut root = game.state().clone();
        root.set_to_move(Color::Black);
        let mut after_pass = root.clone();
        after_pass.play_move(Color::Black, PASS_MOVE);
        assert_eq!(after_pass.ko_move(), None);
        assert!(after_pass.creates_superko(Color::White, a1));

        // One child per node: Black's pass, then White's A1.
        let mut search = SearchController::new(
            SearchConfig {
                max_children: 1,
                mature_threshold: 0,
                ..config(1)
            },
            Arc::new(FavouriteScorer {
                color: Color::White,
                target: a1,
            }),
        );
        search.prepare_root(&root);
        let tree_root = search.tree().root();
        let pass = search.tree().find_child(tree_root, PASS_MOVE).unwrap();
        assert_eq!(search.tree().children(tree_root), vec![pass]);

        let mut rng = fastrand::Rng::with_seed(3);
        let mut scratch = Scratch::new();
        search.play_simulation(&root, &mut rng, &mut scratch);
        let tree = search.tree();
        assert!(tree.is_expanded(pass));
        assert!(tree.children(pass).is_empty());
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.visits(pass), 1);
        assert_eq!(tree.visits(tree_root), 1);

        for _ in 0..20 {
            search.play_simulation(&root, &mut rng, &mut scratch);
        }
        let tree = search.tree();
        assert!(tree.find_child(pass, a1).is_none());
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.visits(pass), 21);
        assert_eq!(tree.visits(tree_root), 21);
    }

    #[test]
    fn test_no_pass_into_lost_game() {
        // White passed on an empty board: passing back loses by komi.
        let mut game = GameRecord::new(4, 0.5).unwrap();
        game.play_move(Color::White, PASS_MOVE).unwrap();
        let mut search = SearchController::with_default_scorer(config(3000));
        let mv = search.think(&mut game, Color::Black, PassPolicy::Allowed);
        assert_ne!(mv, PASS_MOVE);
        assert!(game.state().is_legal(Color::Black, mv));

        let tree = search.tree();
        let children = tree.sorted_children(tree.root(), Color::Black);
        let (_, pass) = children.iter().find(|(_, d)| d.mv == PASS_MOVE).unwrap();
        if pass.visits > 0 {
            assert!(pass.terminal);
            assert_eq!(pass.winrate(Color::Black), 0.0);
        }
        assert_eq!(children[0].1.mv, mv);
    }

    /// Black walls off columns A-C against White's D-E and passes.
    fn walled_game() -> GameRecord {
        let mut game = GameRecord::new(5, 0.5).unwrap();
        for row in ["1", "2", "3", "4", "5"] {
            let black = parse_coord(&format!("C{row}"), &game.state().board).unwrap();
            game.play_move(Color::Black, black).unwrap();
            let white = parse_coord(&format!("D{row}"), &game.state().board).unwrap();
            game.play_move(Color::White, white).unwrap();
        }
        game.play_move(Color::Black, PASS_MOVE).unwrap();
        game
    }

    #[test]
    fn test_terminal_value_counts_territory() {
        let mut ended = walled_game().state().clone();
        ended.play_move(Color::White, PASS_MOVE);
        assert_eq!(ended.passes(), 2);
        assert_eq!(ended.score_area(), 4.5);
        assert!(ended.mc_score() < 0.0);
        assert_eq!(terminal_value(&ended), 1.0);
    }

    #[test]
    fn test_no_pass_when_behind_on_territory() {
        let mut game = walled_game();
        let mut search = SearchController::with_default_scorer(config(3000));
        let mv = search.think(&mut game, Color::White, PassPolicy::Allowed);
        assert_ne!(mv, PASS_MOVE);

        let tree = search.tree();
        let pass = tree.find_child(tree.root(), PASS_MOVE).unwrap();
        let pass = tree.stats(pass);
        if pass.visits > 0 {
            assert!(pass.terminal);
            assert_eq!(pass.winrate(Color::White), 0.0);
        }
    }

    #[test]
    fn test_tree_reuse_after_moves() {
        let mut game = GameRecord::new(5, 0.5).unwrap();
        let mut search = SearchController::with_default_scorer(config(1500));
        let first = search.think(&mut game, Color::Black, PassPolicy::Forbidden);
        game.play_move(Color::Black, first).unwrap();
        assert!(!search.last_stats().reused_tree);

        search.think(&mut game, Color::White, PassPolicy::Forbidden);
        assert!(search.last_stats().reused_tree);
        assert!(search.last_stats().root_visits > 1500);
    }

    #[test]
    fn test_ponder_stops_on_flag() {
        let game = GameRecord::new(5, 0.5).unwrap();
        let mut search = SearchController::with_default_scorer(SearchConfig {
            threads: 2,
            ..config(0)
        });
        let stop = AtomicBool::new(true);
        search.ponder(&game, &stop);
        assert!(search.tree().is_expanded(search.tree().root()));
    }
}
