//! Monte Carlo search tree with UCT+RAVE selection.
//!
//! Nodes live in an arena and refer to each other by index:
//! - children of a node form a singly linked sibling list in prior order
//! - freed slots go on a free list and get their generation bumped, so a
//!   stale [`NodeRef`] held by another thread never updates the new owner
//!
//! Locking:
//! - the arena sits behind an `RwLock`: statistics work takes the read
//!   side, structural changes (expand, delete, extract) take the write side
//! - every node has its own `Mutex` for its counters
//! - when two node locks are held the parent is always locked first

use parking_lot::{Mutex, RwLock};

use crate::board::Color;
use crate::constants::{FPU_VALUE, PASS_MOVE, RAVE_EQUIV, TERMINAL_VISITS, UCT_C, Vertex};
use crate::playout::{AmafMap, amaf_sign};
use crate::position::Position;
use crate::scorer::MoveScorer;
use crate::tt::TranspositionCache;

/// Index of a node in the arena.
pub type NodeId = u32;

/// "No node" link value.
pub const NIL: NodeId = NodeId::MAX;

/// Node handle that survives concurrent deletion of its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeRef {
    pub id: NodeId,
    pub generation: u32,
}

/// Statistics and links of one tree node.
#[derive(Clone, Debug)]
pub struct NodeData {
    /// Move leading to this node (`PASS_MOVE` for the root)
    pub mv: Vertex,
    pub visits: u32,
    /// Sum of results from Black's point of view (1, ½ or 0 per visit)
    pub black_wins: f64,
    pub rave_visits: u32,
    /// Sum of RAVE results for the player making `mv`
    pub rave_wins: f64,
    /// Static score from the move scorer
    pub prior: f32,
    pub first_child: NodeId,
    pub next_sibling: NodeId,
    pub generation: u32,
    pub expanded: bool,
    pub terminal: bool,
}

impl NodeData {
    fn new(mv: Vertex, prior: f32, generation: u32) -> Self {
        NodeData {
            mv,
            visits: 0,
            black_wins: 0.0,
            rave_visits: 0,
            rave_wins: 0.0,
            prior,
            first_child: NIL,
            next_sibling: NIL,
            generation,
            expanded: false,
            terminal: false,
        }
    }

    /// Win rate for `color`; 0.5 when unvisited.
    pub fn winrate(&self, color: Color) -> f32 {
        if self.visits == 0 {
            return 0.5;
        }
        let black = (self.black_wins / self.visits as f64) as f32;
        match color {
            Color::Black => black,
            Color::White => 1.0 - black,
        }
    }

    /// Visits from simulations, without the synthetic weight of a
    /// terminal node.
    pub fn search_visits(&self) -> u32 {
        if self.terminal {
            self.visits.saturating_sub(TERMINAL_VISITS)
        } else {
            self.visits
        }
    }

    /// RAVE win rate for the player making this move; 0.5 without data.
    pub fn rave_winrate(&self) -> f32 {
        if self.rave_visits == 0 {
            0.5
        } else {
            (self.rave_wins / self.rave_visits as f64) as f32
        }
    }
}

struct Node {
    data: Mutex<NodeData>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Node {
            data: Mutex::new(data),
        }
    }
}

struct Arena {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    live: usize,
}

impl Arena {
    fn alloc(&mut self, mv: Vertex, prior: f32) -> NodeId {
        if let Some(id) = self.free.pop() {
            let data = self.nodes[id as usize].data.get_mut();
            *data = NodeData::new(mv, prior, data.generation);
            self.live += 1;
            return id;
        }
        self.nodes.push(Node::new(NodeData::new(mv, prior, 0)));
        self.live += 1;
        (self.nodes.len() - 1) as NodeId
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.nodes[id as usize].data.get_mut()
    }
}

/// Number of children considered by selection at a given visit count.
#[inline]
pub fn child_bound(visits: u32) -> usize {
    let bound = ((visits.max(1) as f32).ln() - 3.0) * 3.0 + 2.0;
    bound.max(2.0) as usize
}

/// The shared search tree.
pub struct SearchTree {
    arena: RwLock<Arena>,
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTree {
    /// A tree holding only an unexpanded root.
    pub fn new() -> Self {
        let mut arena = Arena {
            nodes: Vec::new(),
            free: Vec::new(),
            live: 0,
        };
        arena.alloc(PASS_MOVE, 0.0);
        SearchTree {
            arena: RwLock::new(arena),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        0
    }

    /// Live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.arena.read().live
    }

    /// Copy of a node's data.
    pub fn stats(&self, id: NodeId) -> NodeData {
        self.arena.read().nodes[id as usize].data.lock().clone()
    }

    pub fn node_ref(&self, id: NodeId) -> NodeRef {
        NodeRef {
            id,
            generation: self.arena.read().nodes[id as usize].data.lock().generation,
        }
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.arena.read().nodes[id as usize].data.lock().expanded
    }

    pub fn visits(&self, id: NodeId) -> u32 {
        self.arena.read().nodes[id as usize].data.lock().visits
    }

    /// Unexpanded with at least `threshold` visits. False for a stale
    /// handle.
    pub fn wants_expansion(&self, node: NodeRef, threshold: u32) -> bool {
        let arena = self.arena.read();
        let data = arena.nodes[node.id as usize].data.lock();
        data.generation == node.generation && !data.expanded && data.visits >= threshold
    }

    /// Children of `id` in sibling order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let arena = self.arena.read();
        let mut out = Vec::new();
        let mut child = arena.nodes[id as usize].data.lock().first_child;
        while child != NIL {
            out.push(child);
            child = arena.nodes[child as usize].data.lock().next_sibling;
        }
        out
    }

    /// Data of the children of `id` in sibling order.
    pub fn children_stats(&self, id: NodeId) -> Vec<(NodeId, NodeData)> {
        let arena = self.arena.read();
        let mut out = Vec::new();
        let mut child = arena.nodes[id as usize].data.lock().first_child;
        while child != NIL {
            let data = arena.nodes[child as usize].data.lock().clone();
            let next = data.next_sibling;
            out.push((child, data));
            child = next;
        }
        out
    }

    /// Children of `id` by search visits, then by win rate for `color`.
    pub fn sorted_children(&self, id: NodeId, color: Color) -> Vec<(NodeId, NodeData)> {
        let mut children = self.children_stats(id);
        children.sort_by(|(_, a), (_, b)| {
            b.search_visits()
                .cmp(&a.search_visits())
                .then_with(|| b.winrate(color).total_cmp(&a.winrate(color)))
        });
        children
    }

    pub fn find_child(&self, id: NodeId, mv: Vertex) -> Option<NodeId> {
        self.children_stats(id)
            .into_iter()
            .find(|(_, d)| d.mv == mv)
            .map(|(c, _)| c)
    }

    /// Create the children of `node` for the side to move in `state`.
    ///
    /// Candidates are every empty point that is not the ko point, an eye
    /// fill or suicide, plus a pass scored 0. Only the `max_children` best
    /// by prior are linked, best first. Returns the number of children
    /// created (0 if the node was already expanded or the tree is full).
    pub fn expand(
        &self,
        node: NodeRef,
        state: &Position,
        scorer: &dyn MoveScorer,
        max_children: usize,
        max_tree_size: usize,
    ) -> usize {
        let id = node.id;
        if self.is_expanded(id) {
            return 0;
        }
        let color = state.to_move();
        let board = &state.board;
        let mut candidates: Vec<(f32, Vertex)> = board
            .empty_points()
            .filter(|&v| {
                state.ko_move() != Some(v)
                    && !board.is_eye_fill(v, color)
                    && !board.is_suicide(v, color)
            })
            .map(|v| (scorer.score(state, color, v), v))
            .collect();
        candidates.push((0.0, PASS_MOVE));
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates.truncate(max_children.max(1));

        let mut arena = self.arena.write();
        let data = arena.data_mut(id);
        if data.expanded || data.generation != node.generation {
            return 0;
        }
        if arena.live + candidates.len() > max_tree_size {
            return 0;
        }

        let mut prev = NIL;
        for &(prior, mv) in &candidates {
            let child = arena.alloc(mv, prior);
            if prev == NIL {
                arena.data_mut(id).first_child = child;
            } else {
                arena.data_mut(prev).next_sibling = child;
            }
            prev = child;
        }
        arena.data_mut(id).expanded = true;
        log::trace!("expanded node {id} with {} children", candidates.len());
        candidates.len()
    }

    /// Pick the child of `node` with the highest UCT+RAVE value for
    /// `color`, together with its move.
    ///
    /// Only the first [`child_bound`] children compete. Ties go to the
    /// earlier child. `None` if the node has no children or `node` is stale.
    pub fn select_child(&self, node: NodeRef, color: Color) -> Option<(NodeRef, Vertex)> {
        let arena = self.arena.read();
        let parent = arena.nodes[node.id as usize].data.lock();
        if parent.generation != node.generation {
            return None;
        }
        let parent_visits = parent.visits.max(1) as f32;
        let log_parent = parent_visits.ln();
        let beta = (RAVE_EQUIV / (3.0 * parent_visits + RAVE_EQUIV)).sqrt();
        let bound = child_bound(parent.visits);

        let mut best = None;
        let mut best_value = f32::NEG_INFINITY;
        let mut child = parent.first_child;
        let mut seen = 0;
        while child != NIL && seen < bound {
            let data = arena.nodes[child as usize].data.lock();
            let uct = if data.visits == 0 {
                FPU_VALUE
            } else {
                data.winrate(color) + UCT_C * (log_parent / data.visits as f32).sqrt()
            };
            let value = beta * data.rave_winrate() + (1.0 - beta) * uct;
            if value > best_value {
                best_value = value;
                best = Some((
                    NodeRef {
                        id: child,
                        generation: data.generation,
                    },
                    data.mv,
                ));
            }
            seen += 1;
            child = data.next_sibling;
        }
        best
    }

    /// Add one visit with the given result for Black.
    pub fn update(&self, node: NodeRef, black_value: f32) {
        let arena = self.arena.read();
        let mut data = arena.nodes[node.id as usize].data.lock();
        if data.generation != node.generation {
            return;
        }
        data.visits += 1;
        data.black_wins += black_value as f64;
    }

    /// Credit the RAVE statistics of every child of `node` whose move was
    /// first played by `color` (the side to move at `id`).
    pub fn update_rave(&self, node: NodeRef, color: Color, amaf: &AmafMap, black_value: f32) {
        let sign = amaf_sign(color);
        let mover_value = match color {
            Color::Black => black_value,
            Color::White => 1.0 - black_value,
        } as f64;

        let arena = self.arena.read();
        let parent = arena.nodes[node.id as usize].data.lock();
        if parent.generation != node.generation {
            return;
        }
        let mut child = parent.first_child;
        while child != NIL {
            let mut data = arena.nodes[child as usize].data.lock();
            if data.mv != PASS_MOVE && amaf[data.mv] == sign {
                data.rave_visits += 1;
                data.rave_wins += mover_value;
            }
            child = data.next_sibling;
        }
    }

    /// Mark a two-pass node terminal and give it a heavy synthetic weight.
    pub fn finalize_terminal(&self, node: NodeRef, black_value: f32) {
        let arena = self.arena.read();
        let mut data = arena.nodes[node.id as usize].data.lock();
        if data.generation != node.generation || data.terminal {
            return;
        }
        data.terminal = true;
        data.visits += TERMINAL_VISITS;
        data.black_wins += black_value as f64 * TERMINAL_VISITS as f64;
    }

    pub fn is_terminal(&self, id: NodeId) -> bool {
        self.arena.read().nodes[id as usize].data.lock().terminal
    }

    /// Pull better statistics for `node` from the cache.
    pub fn sync_from_cache(&self, node: NodeRef, hash: u64, cache: &TranspositionCache) {
        let arena = self.arena.read();
        let mut data = arena.nodes[node.id as usize].data.lock();
        if data.generation != node.generation {
            return;
        }
        let data = &mut *data;
        cache.sync(hash, &mut data.visits, &mut data.black_wins);
    }

    /// Publish the statistics of `node` to the cache.
    pub fn push_to_cache(&self, node: NodeRef, hash: u64, cache: &TranspositionCache) {
        let arena = self.arena.read();
        let data = arena.nodes[node.id as usize].data.lock();
        if data.generation != node.generation {
            return;
        }
        cache.update(hash, data.visits, data.black_wins);
    }

    /// Unlink `child` from `parent` and free its whole subtree.
    ///
    /// Returns false if either handle is stale or `child` is not a child of
    /// `parent`.
    pub fn delete_child(&self, parent: NodeRef, child: NodeRef) -> bool {
        let mut arena = self.arena.write();
        if arena.data_mut(parent.id).generation != parent.generation
            || arena.data_mut(child.id).generation != child.generation
        {
            return false;
        }
        let (parent, child) = (parent.id, child.id);

        let mut prev = NIL;
        let mut cur = arena.data_mut(parent).first_child;
        while cur != NIL && cur != child {
            prev = cur;
            cur = arena.data_mut(cur).next_sibling;
        }
        if cur == NIL {
            return false;
        }
        let next = arena.data_mut(child).next_sibling;
        if prev == NIL {
            arena.data_mut(parent).first_child = next;
        } else {
            arena.data_mut(prev).next_sibling = next;
        }

        let mut stack = vec![child];
        while let Some(id) = stack.pop() {
            let data = arena.data_mut(id);
            let mut c = data.first_child;
            data.generation = data.generation.wrapping_add(1);
            data.first_child = NIL;
            data.next_sibling = NIL;
            data.expanded = false;
            while c != NIL {
                stack.push(c);
                c = arena.data_mut(c).next_sibling;
            }
            arena.free.push(id);
            arena.live -= 1;
        }
        true
    }

    /// Copy the subtree under `id` into a fresh tree rooted at it.
    pub fn extract_subtree(&self, id: NodeId) -> SearchTree {
        let arena = self.arena.read();
        let mut root = arena.nodes[id as usize].data.lock().clone();
        root.next_sibling = NIL;
        root.first_child = NIL;
        root.generation = 0;

        let mut nodes = vec![Node::new(root)];
        let mut queue = vec![(id, 0 as NodeId)];
        while let Some((old, new)) = queue.pop() {
            let mut prev = NIL;
            let mut child = arena.nodes[old as usize].data.lock().first_child;
            while child != NIL {
                let mut data = arena.nodes[child as usize].data.lock().clone();
                let next = data.next_sibling;
                data.first_child = NIL;
                data.next_sibling = NIL;
                data.generation = 0;
                let copy = nodes.len() as NodeId;
                nodes.push(Node::new(data));
                if prev == NIL {
                    nodes[new as usize].data.get_mut().first_child = copy;
                } else {
                    nodes[prev as usize].data.get_mut().next_sibling = copy;
                }
                prev = copy;
                queue.push((child, copy));
                child = next;
            }
        }

        let live = nodes.len();
        SearchTree {
            arena: RwLock::new(Arena {
                nodes,
                free: Vec::new(),
                live,
            }),
        }
    }

    /// Follow the children with the most search visits from `id`.
    pub fn principal_variation(&self, id: NodeId, max_len: usize) -> Vec<Vertex> {
        let mut pv = Vec::new();
        let mut node = id;
        while pv.len() < max_len {
            let best = self
                .children_stats(node)
                .into_iter()
                .filter(|(_, d)| d.visits > 0)
                .max_by_key(|(_, d)| d.search_visits());
            match best {
                Some((child, data)) => {
                    pv.push(data.mv);
                    node = child;
                }
                None => break,
            }
        }
        pv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_CHILDREN, MAX_TREE_SIZE};
    use crate::playout::amaf_mark;
    use crate::scorer::UniformScorer;

    fn expanded_tree(size: usize) -> (SearchTree, Position) {
        let pos = Position::new(size, 7.5);
        let tree = SearchTree::new();
        let root = tree.node_ref(tree.root());
        let n = tree.expand(root, &pos, &UniformScorer, MAX_CHILDREN, MAX_TREE_SIZE);
        assert!(n > 0);
        (tree, pos)
    }

    #[test]
    fn test_expand_adds_every_point_and_pass() {
        let (tree, pos) = expanded_tree(5);
        let children = tree.children_stats(tree.root());
        assert_eq!(children.len(), 26);
        assert_eq!(tree.node_count(), 27);
        assert_eq!(children.last().map(|(_, d)| d.mv), Some(PASS_MOVE));
        assert!(tree.is_expanded(tree.root()));

        // Second expansion is a no-op
        let root = tree.node_ref(tree.root());
        assert_eq!(tree.expand(root, &pos, &UniformScorer, MAX_CHILDREN, MAX_TREE_SIZE), 0);
        assert_eq!(tree.node_count(), 27);
    }

    #[test]
    fn test_expand_truncates_and_respects_size_limit() {
        let pos = Position::new(9, 7.5);
        let tree = SearchTree::new();
        let root = tree.node_ref(tree.root());
        assert_eq!(tree.expand(root, &pos, &UniformScorer, 10, MAX_TREE_SIZE), 10);

        let small = SearchTree::new();
        assert_eq!(small.expand(small.node_ref(small.root()), &pos, &UniformScorer, 10, 5), 0);
        assert!(!small.is_expanded(small.root()));
    }

    #[test]
    fn test_child_bound() {
        assert_eq!(child_bound(0), 2);
        assert_eq!(child_bound(20), 2);
        assert!(child_bound(1000) > child_bound(100));
    }

    #[test]
    fn test_select_prefers_first_among_equals() {
        let (tree, _) = expanded_tree(5);
        let first = tree.children(tree.root())[0];
        let (pick, mv) = tree.select_child(tree.node_ref(tree.root()), Color::Black).unwrap();
        assert_eq!(pick.id, first);
        assert_eq!(mv, tree.stats(first).mv);
    }

    #[test]
    fn test_select_uses_winrate_of_mover() {
        let (tree, _) = expanded_tree(5);
        let root = tree.root();
        let kids = tree.children(root);
        let (a, b) = (tree.node_ref(kids[0]), tree.node_ref(kids[1]));
        // Few enough root visits that only the first two children compete
        for _ in 0..10 {
            tree.update(tree.node_ref(root), 0.5);
            tree.update(a, 0.0);
            tree.update(b, 1.0);
        }
        let root = tree.node_ref(root);
        assert_eq!(tree.select_child(root, Color::Black).unwrap().0.id, kids[1]);
        assert_eq!(tree.select_child(root, Color::White).unwrap().0.id, kids[0]);
    }

    #[test]
    fn test_update_rave_credits_first_player_only() {
        let (tree, pos) = expanded_tree(5);
        let root = tree.root();
        let c3 = pos.board.vertex(2, 2);
        let d4 = pos.board.vertex(3, 3);
        let mut amaf = [0i8; crate::constants::MAX_SQ];
        amaf_mark(&mut amaf, Color::Black, c3);
        amaf_mark(&mut amaf, Color::White, d4);
        tree.update_rave(tree.node_ref(root), Color::Black, &amaf, 1.0);

        let c3_node = tree.find_child(root, c3).unwrap();
        let d4_node = tree.find_child(root, d4).unwrap();
        assert_eq!(tree.stats(c3_node).rave_visits, 1);
        assert_eq!(tree.stats(c3_node).rave_winrate(), 1.0);
        assert_eq!(tree.stats(d4_node).rave_visits, 0);
    }

    #[test]
    fn test_delete_child_invalidates_handles() {
        let (tree, _) = expanded_tree(5);
        let root = tree.root();
        let victim = tree.children(root)[0];
        let stale = tree.node_ref(victim);

        assert!(tree.delete_child(tree.node_ref(root), stale));
        assert!(!tree.delete_child(tree.node_ref(root), stale));
        assert_eq!(tree.children(root).len(), 25);
        assert_eq!(tree.node_count(), 26);

        tree.update(stale, 1.0);
        assert_eq!(tree.stats(victim).visits, 0);

        // Freed slot is reused by the next expansion
        let next = tree.children(root)[0];
        let mut pos = Position::new(5, 7.5);
        pos.play_move(Color::Black, tree.stats(next).mv);
        tree.expand(tree.node_ref(next), &pos, &UniformScorer, 3, MAX_TREE_SIZE);
        assert!(tree.children(next).contains(&victim));
        assert_ne!(tree.node_ref(victim).generation, stale.generation);

        // The old handle sees none of the new owner's data
        assert!(tree.select_child(stale, Color::White).is_none());
        assert!(!tree.wants_expansion(stale, 0));
        assert!(!tree.delete_child(tree.node_ref(next), stale));
        assert_eq!(tree.children(next).len(), 3);
    }

    #[test]
    fn test_wants_expansion() {
        let tree = SearchTree::new();
        let root = tree.node_ref(tree.root());
        assert!(tree.wants_expansion(root, 0));
        assert!(!tree.wants_expansion(root, 2));
        tree.update(root, 0.5);
        tree.update(root, 0.5);
        assert!(tree.wants_expansion(root, 2));

        let pos = Position::new(5, 7.5);
        tree.expand(root, &pos, &UniformScorer, MAX_CHILDREN, MAX_TREE_SIZE);
        assert!(!tree.wants_expansion(root, 0));
    }

    #[test]
    fn test_terminal_weight() {
        let (tree, _) = expanded_tree(5);
        let child = tree.node_ref(tree.children(tree.root())[0]);
        tree.finalize_terminal(child, 1.0);
        tree.finalize_terminal(child, 1.0);
        let data = tree.stats(child.id);
        assert!(data.terminal);
        assert_eq!(data.visits, TERMINAL_VISITS);
        assert_eq!(data.search_visits(), 0);
        assert_eq!(data.winrate(Color::Black), 1.0);
    }

    #[test]
    fn test_terminal_weight_does_not_rank_children() {
        let (tree, _) = expanded_tree(5);
        let root = tree.root();
        let kids = tree.children(root);
        let lost = tree.node_ref(kids[0]);
        let played = tree.node_ref(kids[1]);
        tree.finalize_terminal(lost, 0.0);
        tree.update(lost, 0.0);
        for _ in 0..5 {
            tree.update(played, 1.0);
        }

        let sorted = tree.sorted_children(root, Color::Black);
        assert_eq!(sorted[0].0, played.id);
        assert_eq!(sorted[1].0, lost.id);
        assert_eq!(sorted[1].1.search_visits(), 1);
        assert_eq!(tree.principal_variation(root, 3), vec![tree.stats(played.id).mv]);
    }

    #[test]
    fn test_extract_subtree_keeps_statistics() {
        let (tree, pos) = expanded_tree(5);
        let root = tree.root();
        let child = tree.children(root)[2];
        let mv = tree.stats(child).mv;
        let mut next = pos.clone();
        next.play_move(Color::Black, mv);
        tree.expand(tree.node_ref(child), &next, &UniformScorer, MAX_CHILDREN, MAX_TREE_SIZE);
        for _ in 0..7 {
            tree.update(tree.node_ref(child), 1.0);
        }

        let sub = tree.extract_subtree(child);
        assert_eq!(sub.stats(sub.root()).visits, 7);
        assert_eq!(sub.stats(sub.root()).mv, mv);
        assert_eq!(sub.children(sub.root()).len(), tree.children(child).len());
        assert_eq!(sub.node_count(), 1 + tree.children(child).len());
    }

    #[test]
    fn test_principal_variation() {
        let (tree, _) = expanded_tree(5);
        let root = tree.root();
        let kids = tree.children(root);
        tree.update(tree.node_ref(kids[3]), 1.0);
        tree.update(tree.node_ref(kids[3]), 1.0);
        tree.update(tree.node_ref(kids[1]), 1.0);
        let pv = tree.principal_variation(root, 5);
        assert_eq!(pv, vec![tree.stats(kids[3]).mv]);
    }

    #[test]
    fn test_cache_round_trip_through_nodes() {
        let (tree, _) = expanded_tree(5);
        let cache = TranspositionCache::new(64);
        let kids = tree.children(tree.root());
        let a = tree.node_ref(kids[0]);
        let b = tree.node_ref(kids[1]);
        for _ in 0..4 {
            tree.update(a, 1.0);
        }
        tree.push_to_cache(a, 99, &cache);
        tree.sync_from_cache(b, 99, &cache);
        assert_eq!(tree.stats(b.id).visits, 4);
        assert_eq!(tree.stats(b.id).winrate(Color::Black), 1.0);
    }
}
