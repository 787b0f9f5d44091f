//! Incremental Go board.
//!
//! The board is a 1D array over a `(size + 2)²` grid with a border of
//! [`Square::Invalid`] points, so neighbour lookups need no bounds checks.
//!
//! Strings (groups) are tracked incrementally:
//! - `next` links every stone of a string into a cycle
//! - `parent` points at the string's representative stone
//! - the representative holds the pseudo-liberty count (stone/empty
//!   adjacencies, not deduplicated) and the stone count
//!
//! Each point also keeps a packed counter of its black, white and empty
//! neighbours ([`NBR_SHIFT`] bits per field). The border counts as both
//! black and white, which makes eye tests along the edge come out right.
//!
//! Pseudo-liberties are an upper bound on true liberties and are zero
//! exactly when the string has no liberty. Where exactness matters
//! (atari, self-atari, capture and saving sizes) true liberties are
//! recounted over the string.

use std::fmt;

use crate::constants::{
    HASH_BASE, HASH_BLACK_TO_MOVE, MAX_BOARD_SIZE, MAX_SQ, MIN_BOARD_SIZE, NBR_MASK, NBR_SHIFT,
    Vertex,
};
use crate::zobrist::zobrist;

/// Representative of an empty or border point.
const NO_GROUP: u16 = MAX_SQ as u16;

/// Stone colour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    /// The other colour.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// Contents of a board point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Square {
    Black = 0,
    White = 1,
    Empty = 2,
    Invalid = 3,
}

impl Square {
    /// The stone colour on this point, if any.
    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            Square::Black => Some(Color::Black),
            Square::White => Some(Color::White),
            _ => None,
        }
    }

    #[inline]
    pub fn is_stone(self) -> bool {
        matches!(self, Square::Black | Square::White)
    }
}

impl From<Color> for Square {
    #[inline]
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Square::Black,
            Color::White => Square::White,
        }
    }
}

/// Neighbour-counter increment for one neighbour of the given kind.
#[inline]
const fn nbr_unit(square: Square) -> u16 {
    1 << (NBR_SHIFT * square as u32)
}

/// Bit that is set when all four neighbours are `color` (or border).
#[inline]
const fn eye_mask(color: Color) -> u16 {
    4 << (NBR_SHIFT * color as u32)
}

/// Up to two distinct liberties of a hypothetical string.
struct LibertySet {
    points: [Vertex; 2],
    len: usize,
    exclude: Vertex,
}

impl LibertySet {
    fn new(exclude: Vertex) -> Self {
        LibertySet {
            points: [0; 2],
            len: 0,
            exclude,
        }
    }

    /// Adds a liberty; returns true once two distinct liberties are known.
    #[inline]
    fn add(&mut self, v: Vertex) -> bool {
        if v != self.exclude && !self.points[..self.len].contains(&v) {
            self.points[self.len] = v;
            self.len += 1;
        }
        self.len == 2
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.len == 2
    }
}

/// Board with incremental string, liberty and hash bookkeeping.
#[derive(Clone)]
pub struct BoardState {
    size: usize,
    width: usize,
    squares: [Square; MAX_SQ],
    next: [u16; MAX_SQ],
    parent: [u16; MAX_SQ],
    libs: [i32; MAX_SQ],
    stones: [u16; MAX_SQ],
    neighbours: [u16; MAX_SQ],
    empty: [u16; MAX_SQ],
    empty_idx: [u16; MAX_SQ],
    empty_cnt: usize,
    prisoners: [usize; 2],
    stone_count: [usize; 2],
    to_move: Color,
    hash: u64,
    ko_hash: u64,
}

impl BoardState {
    /// An empty board of the given size.
    pub fn new(size: usize) -> Self {
        let mut board = BoardState {
            size: 0,
            width: 0,
            squares: [Square::Invalid; MAX_SQ],
            next: [0; MAX_SQ],
            parent: [NO_GROUP; MAX_SQ],
            libs: [0; MAX_SQ],
            stones: [0; MAX_SQ],
            neighbours: [0; MAX_SQ],
            empty: [0; MAX_SQ],
            empty_idx: [0; MAX_SQ],
            empty_cnt: 0,
            prisoners: [0; 2],
            stone_count: [0; 2],
            to_move: Color::Black,
            hash: 0,
            ko_hash: 0,
        };
        board.reset(size);
        board
    }

    /// Clear to an empty board of the given size.
    ///
    /// # Panics
    /// If `size` is outside `MIN_BOARD_SIZE..=MAX_BOARD_SIZE`.
    pub fn reset(&mut self, size: usize) {
        assert!(
            (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size),
            "board size {size} out of range"
        );
        self.size = size;
        self.width = size + 2;
        self.squares = [Square::Invalid; MAX_SQ];
        self.next = [0; MAX_SQ];
        self.parent = [NO_GROUP; MAX_SQ];
        self.libs = [0; MAX_SQ];
        self.stones = [0; MAX_SQ];
        self.neighbours = [0; MAX_SQ];
        self.empty_cnt = 0;

        for y in 0..size {
            for x in 0..size {
                let v = self.vertex(x, y);
                self.squares[v] = Square::Empty;
                self.empty_idx[v] = self.empty_cnt as u16;
                self.empty[self.empty_cnt] = v as u16;
                self.empty_cnt += 1;
            }
        }
        for y in 0..size {
            for x in 0..size {
                let v = self.vertex(x, y);
                let mut counter = 0;
                for ai in self.orthogonal(v) {
                    counter += if self.squares[ai] == Square::Invalid {
                        nbr_unit(Square::Black) + nbr_unit(Square::White)
                    } else {
                        nbr_unit(Square::Empty)
                    };
                }
                self.neighbours[v] = counter;
            }
        }

        self.prisoners = [0; 2];
        self.stone_count = [0; 2];
        self.to_move = Color::Black;
        self.hash = self.calc_hash(0);
        self.ko_hash = self.calc_ko_hash();
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Vertex of column `x`, row `y` (both 0-based, row 0 at the bottom).
    #[inline]
    pub fn vertex(&self, x: usize, y: usize) -> Vertex {
        debug_assert!(x < self.size && y < self.size);
        (y + 1) * self.width + x + 1
    }

    /// Column and row of an on-board vertex.
    #[inline]
    pub fn xy(&self, v: Vertex) -> (usize, usize) {
        (v % self.width - 1, v / self.width - 1)
    }

    /// Number of vertices in the padded grid.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.width * self.width
    }

    /// True if `v` is a playable point of this board.
    #[inline]
    pub fn is_on_board(&self, v: Vertex) -> bool {
        v < self.num_vertices() && self.squares[v] != Square::Invalid
    }

    /// All playable points, row by row.
    pub fn points(&self) -> impl Iterator<Item = Vertex> + '_ {
        (0..self.size).flat_map(move |y| (0..self.size).map(move |x| self.vertex(x, y)))
    }

    /// North, east, south and west neighbours of an on-board vertex.
    #[inline]
    pub fn orthogonal(&self, v: Vertex) -> [Vertex; 4] {
        [v + self.width, v + 1, v - self.width, v - 1]
    }

    /// NE, SE, SW and NW neighbours of an on-board vertex.
    #[inline]
    pub fn diagonal(&self, v: Vertex) -> [Vertex; 4] {
        [
            v + self.width + 1,
            v + 1 - self.width,
            v - self.width - 1,
            v + self.width - 1,
        ]
    }

    /// Distance of a point from the nearest edge (0 = first line).
    pub fn line_height(&self, v: Vertex) -> usize {
        let (x, y) = self.xy(v);
        x.min(y).min(self.size - 1 - x).min(self.size - 1 - y)
    }

    /// Star points marked on the board display.
    pub fn star_points(&self) -> Vec<Vertex> {
        if self.size < 7 {
            return Vec::new();
        }
        let edge = if self.size >= 13 { 3 } else { 2 };
        let far = self.size - 1 - edge;
        let mut lines = vec![edge, far];
        if self.size % 2 == 1 && self.size >= 9 {
            lines.push(self.size / 2);
        }
        let mut stars = Vec::with_capacity(lines.len() * lines.len());
        for &y in &lines {
            for &x in &lines {
                stars.push(self.vertex(x, y));
            }
        }
        stars
    }

    // -------------------------------------------------------------------------
    // State accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn square(&self, v: Vertex) -> Square {
        self.squares[v]
    }

    #[inline]
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    /// Set the side to move, keeping the hash in step.
    pub fn set_to_move(&mut self, color: Color) {
        if color != self.to_move {
            self.hash ^= HASH_BLACK_TO_MOVE;
            self.to_move = color;
        }
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn ko_hash(&self) -> u64 {
        self.ko_hash
    }

    /// Fold an externally tracked feature (the pass counter) into the hash.
    #[inline]
    pub(crate) fn xor_hash(&mut self, key: u64) {
        self.hash ^= key;
    }

    /// Stones captured by `color`.
    #[inline]
    pub fn prisoners(&self, color: Color) -> usize {
        self.prisoners[color.index()]
    }

    /// Stones of `color` on the board.
    #[inline]
    pub fn stone_count(&self, color: Color) -> usize {
        self.stone_count[color.index()]
    }

    #[inline]
    pub fn empty_count(&self) -> usize {
        self.empty_cnt
    }

    /// The `i`-th entry of the empty-point list.
    #[inline]
    pub fn empty_at(&self, i: usize) -> Vertex {
        self.empty[i] as Vertex
    }

    pub fn empty_points(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.empty[..self.empty_cnt].iter().map(|&v| v as Vertex)
    }

    /// Number of orthogonal neighbours of the given kind (border counts as
    /// black and white).
    #[inline]
    pub fn neighbour_count(&self, v: Vertex, kind: Square) -> u16 {
        (self.neighbours[v] >> (NBR_SHIFT * kind as u32)) & NBR_MASK
    }

    /// Number of empty orthogonal neighbours.
    #[inline]
    fn empty_neighbours(&self, v: Vertex) -> i32 {
        self.neighbour_count(v, Square::Empty) as i32
    }

    /// Representative stone of the string at `v`.
    #[inline]
    pub fn string_root(&self, v: Vertex) -> Vertex {
        debug_assert!(self.squares[v].is_stone());
        self.parent[v] as Vertex
    }

    /// Pseudo-liberty count of the string at `v`.
    #[inline]
    pub fn pseudo_liberties(&self, v: Vertex) -> i32 {
        self.libs[self.string_root(v)]
    }

    /// Number of stones in the string at `v`.
    #[inline]
    pub fn string_size(&self, v: Vertex) -> usize {
        self.stones[self.string_root(v)] as usize
    }

    /// All stones of the string at `v`.
    pub fn string_stones(&self, v: Vertex) -> Vec<Vertex> {
        let mut stones = Vec::with_capacity(self.string_size(v));
        let mut pos = v;
        loop {
            stones.push(pos);
            pos = self.next[pos] as Vertex;
            if pos == v {
                break;
            }
        }
        stones
    }

    // -------------------------------------------------------------------------
    // Hashing
    // -------------------------------------------------------------------------

    /// Position hash recomputed from scratch, for a given pass count.
    pub fn calc_hash(&self, passes: usize) -> u64 {
        let z = zobrist();
        let mut hash = HASH_BASE;
        for v in self.points() {
            hash ^= z.squares[self.squares[v] as usize][v];
        }
        hash ^= z.prisoner_key(0, self.prisoners[0]);
        hash ^= z.prisoner_key(1, self.prisoners[1]);
        if self.to_move == Color::Black {
            hash ^= HASH_BLACK_TO_MOVE;
        }
        hash ^ z.pass_term(passes)
    }

    /// Ko hash (stones only) recomputed from scratch.
    pub fn calc_ko_hash(&self) -> u64 {
        let z = zobrist();
        self.points()
            .fold(HASH_BASE, |hash, v| hash ^ z.squares[self.squares[v] as usize][v])
    }

    // -------------------------------------------------------------------------
    // Move execution
    // -------------------------------------------------------------------------

    /// Play a stone, maintaining both hashes.
    ///
    /// The point must be empty. Captures enemy strings left without
    /// liberties and removes the mover's own string if it is left without
    /// liberties (suicide supplied from outside). Returns the ko point when
    /// exactly one stone was captured by a move into an enemy eye.
    pub fn play_stone(&mut self, color: Color, v: Vertex) -> Option<Vertex> {
        self.place::<true>(color, v)
    }

    /// Play a stone without touching the hashes.
    ///
    /// Used by playouts, whose callers never pass a suicide. Hashes are
    /// stale afterwards.
    pub fn play_stone_fast(&mut self, color: Color, v: Vertex) -> Option<Vertex> {
        self.place::<false>(color, v)
    }

    fn place<const HASHED: bool>(&mut self, color: Color, v: Vertex) -> Option<Vertex> {
        debug_assert_eq!(self.squares[v], Square::Empty, "vertex {v} is not empty");
        let opp = color.opponent();
        let own_sq = Square::from(color);
        let opp_sq = Square::from(opp);
        let eyeplay = self.neighbours[v] & eye_mask(opp) != 0;

        if HASHED {
            let z = zobrist();
            let key = z.squares[Square::Empty as usize][v] ^ z.squares[own_sq as usize][v];
            self.hash ^= key;
            self.ko_hash ^= key;
        }

        self.squares[v] = own_sq;
        self.next[v] = v as u16;
        self.parent[v] = v as u16;
        self.libs[v] = self.empty_neighbours(v);
        self.stones[v] = 1;
        self.stone_count[color.index()] += 1;
        self.add_neighbour(v, color);

        let mut captured = 0;
        let mut captured_at = None;
        for ai in self.orthogonal(v) {
            let sq = self.squares[ai];
            if sq == opp_sq {
                if self.libs[self.parent[ai] as usize] <= 0 {
                    captured += self.remove_string::<HASHED>(ai);
                    captured_at = Some(ai);
                }
            } else if sq == own_sq {
                let ip = self.parent[v] as Vertex;
                let aip = self.parent[ai] as Vertex;
                if ip != aip {
                    if self.libs[ip] >= self.libs[aip] {
                        self.merge_strings(ip, aip);
                    } else {
                        self.merge_strings(aip, ip);
                    }
                }
            }
        }

        if captured > 0 {
            let c = color.index();
            if HASHED {
                let z = zobrist();
                self.hash ^= z.prisoner_key(c, self.prisoners[c]);
                self.hash ^= z.prisoner_key(c, self.prisoners[c] + captured);
            }
            self.prisoners[c] += captured;
        }

        self.remove_empty(v);

        if self.libs[self.parent[v] as usize] <= 0 {
            debug_assert_eq!(captured, 0, "suicide cannot follow a capture");
            self.remove_string::<HASHED>(v);
            return None;
        }

        if captured == 1 && eyeplay {
            captured_at
        } else {
            None
        }
    }

    /// A stone of `color` appeared at `v`: update the counters around it.
    fn add_neighbour(&mut self, v: Vertex, color: Color) {
        let add = nbr_unit(Square::from(color));
        let sub = nbr_unit(Square::Empty);
        for ai in self.orthogonal(v) {
            let sq = self.squares[ai];
            if sq == Square::Invalid {
                continue;
            }
            self.neighbours[ai] = self.neighbours[ai] + add - sub;
            if sq.is_stone() {
                self.libs[self.parent[ai] as usize] -= 1;
            }
        }
    }

    /// A stone of `color` left `v`: update the counters around it.
    fn remove_neighbour(&mut self, v: Vertex, color: Color) {
        let add = nbr_unit(Square::Empty);
        let sub = nbr_unit(Square::from(color));
        for ai in self.orthogonal(v) {
            let sq = self.squares[ai];
            if sq == Square::Invalid {
                continue;
            }
            self.neighbours[ai] = self.neighbours[ai] + add - sub;
            if sq.is_stone() {
                self.libs[self.parent[ai] as usize] += 1;
            }
        }
    }

    /// Absorb string `other` into string `root`.
    fn merge_strings(&mut self, root: Vertex, other: Vertex) {
        self.libs[root] += self.libs[other];
        self.stones[root] += self.stones[other];

        let mut pos = other;
        loop {
            self.parent[pos] = root as u16;
            pos = self.next[pos] as Vertex;
            if pos == other {
                break;
            }
        }
        self.next.swap(root, other);
    }

    /// Remove the string at `start`, returning the number of stones.
    fn remove_string<const HASHED: bool>(&mut self, start: Vertex) -> usize {
        let sq = self.squares[start];
        let Some(color) = sq.color() else {
            return 0;
        };
        let z = zobrist();
        let mut removed = 0;
        let mut pos = start;
        loop {
            if HASHED {
                let key = z.squares[sq as usize][pos] ^ z.squares[Square::Empty as usize][pos];
                self.hash ^= key;
                self.ko_hash ^= key;
            }
            self.squares[pos] = Square::Empty;
            self.parent[pos] = NO_GROUP;
            self.stone_count[color.index()] -= 1;
            self.remove_neighbour(pos, color);
            self.add_empty(pos);
            removed += 1;

            pos = self.next[pos] as Vertex;
            if pos == start {
                break;
            }
        }
        removed
    }

    fn add_empty(&mut self, v: Vertex) {
        self.empty_idx[v] = self.empty_cnt as u16;
        self.empty[self.empty_cnt] = v as u16;
        self.empty_cnt += 1;
    }

    fn remove_empty(&mut self, v: Vertex) {
        self.empty_cnt -= 1;
        let last = self.empty[self.empty_cnt];
        let idx = self.empty_idx[v];
        self.empty[idx as usize] = last;
        self.empty_idx[last as usize] = idx;
    }

    /// Empty a point without any bookkeeping.
    ///
    /// Only for throwaway copies that are scored afterwards: strings,
    /// counters and hashes are no longer consistent.
    pub(crate) fn clear_point(&mut self, v: Vertex) {
        self.squares[v] = Square::Empty;
    }

    // -------------------------------------------------------------------------
    // Legality
    // -------------------------------------------------------------------------

    /// Edges between `v` and the string with representative `root`.
    #[inline]
    fn edges_to(&self, v: Vertex, root: u16) -> i32 {
        self.orthogonal(v)
            .iter()
            .filter(|&&ai| self.squares[ai].is_stone() && self.parent[ai] == root)
            .count() as i32
    }

    /// Would `color` at the empty point `v` be suicide?
    ///
    /// The neighbour deltas of the stone are applied virtually: the move is
    /// legal if it has an empty neighbour, connects to a string that keeps
    /// a liberty, or takes the last liberty of an enemy string.
    pub fn is_suicide(&self, v: Vertex, color: Color) -> bool {
        if self.empty_neighbours(v) > 0 {
            return false;
        }
        let own_sq = Square::from(color);
        for ai in self.orthogonal(v) {
            let sq = self.squares[ai];
            if !sq.is_stone() {
                continue;
            }
            let root = self.parent[ai];
            let after = self.libs[root as usize] - self.edges_to(v, root);
            if sq == own_sq {
                if after > 0 {
                    return false;
                }
            } else if after <= 0 {
                return false;
            }
        }
        true
    }

    /// Is `v` an eye of `color` that playouts should not fill?
    ///
    /// All four neighbours must be `color` (or border). In the centre at
    /// most one diagonal may hold an enemy stone, on the edge none.
    pub fn is_eye_fill(&self, v: Vertex, color: Color) -> bool {
        if self.neighbours[v] & eye_mask(color) == 0 {
            return false;
        }
        let opp_sq = Square::from(color.opponent());
        let mut enemies = 0;
        let mut at_edge = false;
        for d in self.diagonal(v) {
            match self.squares[d] {
                Square::Invalid => at_edge = true,
                sq if sq == opp_sq => enemies += 1,
                _ => {}
            }
        }
        if at_edge { enemies == 0 } else { enemies <= 1 }
    }

    // -------------------------------------------------------------------------
    // Tactical queries
    // -------------------------------------------------------------------------

    /// Collect liberties of the string at `v` into `set` until it is full.
    fn collect_liberties(&self, v: Vertex, set: &mut LibertySet) {
        let mut pos = v;
        loop {
            for ai in self.orthogonal(pos) {
                if self.squares[ai] == Square::Empty && set.add(ai) {
                    return;
                }
            }
            pos = self.next[pos] as Vertex;
            if pos == v {
                return;
            }
        }
    }

    /// True liberties of the string at `v`.
    pub fn count_liberties(&self, v: Vertex) -> usize {
        let mut seen = [false; MAX_SQ];
        let mut count = 0;
        let mut pos = v;
        loop {
            for ai in self.orthogonal(pos) {
                if self.squares[ai] == Square::Empty && !seen[ai] {
                    seen[ai] = true;
                    count += 1;
                }
            }
            pos = self.next[pos] as Vertex;
            if pos == v {
                return count;
            }
        }
    }

    /// The only liberty of the string at `v`, if it has exactly one.
    pub fn in_atari(&self, v: Vertex) -> Option<Vertex> {
        // Each liberty contributes at most four edges.
        if self.pseudo_liberties(v) > 4 {
            return None;
        }
        let mut set = LibertySet::new(0);
        self.collect_liberties(v, &mut set);
        (set.len == 1).then_some(set.points[0])
    }

    /// Distinct strings of `sq` adjacent to `v`, by representative.
    fn adjacent_strings(&self, v: Vertex, sq: Square) -> ([u16; 4], usize) {
        let mut roots = [NO_GROUP; 4];
        let mut n = 0;
        for ai in self.orthogonal(v) {
            if self.squares[ai] == sq {
                let root = self.parent[ai];
                if !roots[..n].contains(&root) {
                    roots[n] = root;
                    n += 1;
                }
            }
        }
        (roots, n)
    }

    /// Stones `color` would capture by playing at `v`.
    pub fn capture_size(&self, color: Color, v: Vertex) -> usize {
        let (roots, n) = self.adjacent_strings(v, Square::from(color.opponent()));
        roots[..n]
            .iter()
            .map(|&r| r as Vertex)
            .filter(|&r| self.in_atari(r) == Some(v))
            .map(|r| self.stones[r] as usize)
            .sum()
    }

    /// Stones of `color` in atari at `v` that a move there would rescue.
    pub fn saving_size(&self, color: Color, v: Vertex) -> usize {
        let (roots, n) = self.adjacent_strings(v, Square::from(color));
        let endangered: usize = roots[..n]
            .iter()
            .map(|&r| r as Vertex)
            .filter(|&r| self.in_atari(r) == Some(v))
            .map(|r| self.stones[r] as usize)
            .sum();
        if endangered == 0 || self.is_suicide(v, color) || self.is_self_atari(color, v) {
            0
        } else {
            endangered
        }
    }

    /// Would `color` at `v` leave its string with exactly one liberty?
    ///
    /// False when the move captures or when the joined string keeps two or
    /// more true liberties.
    pub fn is_self_atari(&self, color: Color, v: Vertex) -> bool {
        if self.empty_neighbours(v) >= 2 {
            return false;
        }
        let mut set = LibertySet::new(v);
        for ai in self.orthogonal(v) {
            if self.squares[ai] == Square::Empty {
                set.add(ai);
            }
        }
        let own_sq = Square::from(color);
        let opp_sq = Square::from(color.opponent());
        for ai in self.orthogonal(v) {
            let sq = self.squares[ai];
            if sq == opp_sq {
                if self.in_atari(ai) == Some(v) {
                    return false;
                }
            } else if sq == own_sq {
                self.collect_liberties(ai, &mut set);
                if set.is_full() {
                    return false;
                }
            }
        }
        set.len == 1
    }

    // -------------------------------------------------------------------------
    // Scoring
    // -------------------------------------------------------------------------

    /// Points reachable from stones of `color` through empty points.
    fn reach(&self, color: Color) -> [bool; MAX_SQ] {
        let own_sq = Square::from(color);
        let mut reached = [false; MAX_SQ];
        for v in self.points() {
            reached[v] = self.squares[v] == own_sq;
        }
        let mut changed = true;
        while changed {
            changed = false;
            for v in self.points() {
                if reached[v] || self.squares[v] != Square::Empty {
                    continue;
                }
                if self.orthogonal(v).iter().any(|&ai| reached[ai]) {
                    reached[v] = true;
                    changed = true;
                }
            }
        }
        reached
    }

    /// Area score (Black minus White minus komi).
    ///
    /// Stones count for their owner; an empty point counts for the colour
    /// that alone reaches it. Points reached by both colours are neutral.
    pub fn score_area(&self, komi: f32) -> f32 {
        let black = self.reach(Color::Black);
        let white = self.reach(Color::White);
        let mut score = -komi;
        for v in self.points() {
            match self.squares[v] {
                Square::Black => score += 1.0,
                Square::White => score -= 1.0,
                _ => match (black[v], white[v]) {
                    (true, false) => score += 1.0,
                    (false, true) => score -= 1.0,
                    _ => {}
                },
            }
        }
        score
    }

    /// Owner of a point at the end of a playout: the stone on it, or the
    /// colour surrounding an empty point.
    #[inline]
    pub fn area_owner(&self, v: Vertex) -> Option<Color> {
        match self.squares[v] {
            Square::Empty => {
                if self.neighbours[v] & eye_mask(Color::Black) != 0 {
                    Some(Color::Black)
                } else if self.neighbours[v] & eye_mask(Color::White) != 0 {
                    Some(Color::White)
                } else {
                    None
                }
            }
            sq => sq.color(),
        }
    }

    /// Fast area count for finished playouts, where almost every empty
    /// point is a one-point eye.
    pub fn mc_score(&self, komi: f32) -> f32 {
        let mut score = self.stone_count[0] as f32 - self.stone_count[1] as f32 - komi;
        for v in self.empty_points() {
            match self.area_owner(v) {
                Some(Color::Black) => score += 1.0,
                Some(Color::White) => score -= 1.0,
                None => {}
            }
        }
        score
    }

    /// Stone difference minus komi, for early playout cutoffs.
    #[inline]
    pub fn estimate_score(&self, komi: f32) -> f32 {
        self.stone_count[0] as f32 - self.stone_count[1] as f32 - komi
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: String = (b'A'..=b'Z')
            .filter(|&c| c != b'I')
            .take(self.size)
            .map(|c| format!("{} ", c as char))
            .collect();
        writeln!(f, "   {columns}")?;
        let stars = self.star_points();
        for y in (0..self.size).rev() {
            write!(f, "{:>2} ", y + 1)?;
            for x in 0..self.size {
                let v = self.vertex(x, y);
                let ch = match self.squares[v] {
                    Square::Black => 'X',
                    Square::White => 'O',
                    _ if stars.contains(&v) => '+',
                    _ => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f, "{:>2}", y + 1)?;
        }
        write!(f, "   {columns}")
    }
}
