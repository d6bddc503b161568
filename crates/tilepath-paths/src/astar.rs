//! Resumable A* over a [`TileSource`].
//!
//! The open set is kept in insertion order and scanned linearly for the
//! lowest `f`; among equal scores the one seen last wins. Paths produced
//! here are therefore stable across runs and heuristics, tie for tie.

use rustc_hash::{FxHashMap, FxHashSet};
use tilepath_core::Point;

use crate::heuristic::Heuristic;
use crate::path::Path;
use crate::traits::TileSource;

/// Estimated total cost `f` and cost from the start `g` of a tile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Score {
    pub f: f32,
    pub g: f32,
}

/// Where a [`SearchContext`] stands after a call to
/// [`step`](SearchContext::step).
#[derive(Clone, Debug, PartialEq)]
pub enum SearchState {
    /// The expansion budget ran out; call `step` again.
    InProgress,
    /// A route was found. It may be empty when the start already touches an
    /// unwalkable target.
    Found(Path),
    /// Every reachable tile was expanded without arriving.
    Exhausted,
}

/// Per-search bookkeeping. Built fresh for one start/target pair and
/// dropped when the search ends.
#[derive(Clone, Debug)]
pub struct SearchContext {
    start: Point,
    target: Point,
    heuristic: Heuristic,
    target_walkable: bool,
    arrival: Vec<Point>,
    open: Vec<Point>,
    closed: FxHashSet<Point>,
    scores: FxHashMap<Point, Score>,
    came_from: FxHashMap<Point, Point>,
    expansions: usize,
}

impl SearchContext {
    /// Prepare a search from `start` to `target`. Returns `None` when either
    /// point is not a tile of `source`.
    pub fn new<S: TileSource + ?Sized>(
        source: &S,
        start: Point,
        target: Point,
        heuristic: Heuristic,
    ) -> Option<Self> {
        source.tile(start)?;
        let target_tile = source.tile(target)?;
        let arrival = target
            .orthogonal()
            .into_iter()
            .filter(|&p| source.tile(p).is_some())
            .collect();

        let mut scores = FxHashMap::default();
        scores.insert(
            start,
            Score {
                f: heuristic.estimate(start, target),
                g: 0.0,
            },
        );
        Some(Self {
            start,
            target,
            heuristic,
            target_walkable: target_tile.is_walkable(),
            arrival,
            open: vec![start],
            closed: FxHashSet::default(),
            scores,
            came_from: FxHashMap::default(),
            expansions: 0,
        })
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn target(&self) -> Point {
        self.target
    }

    #[inline]
    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Tiles moved to the closed set so far.
    #[inline]
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    pub fn score(&self, p: Point) -> Option<Score> {
        self.scores.get(&p).copied()
    }

    pub fn predecessor(&self, p: Point) -> Option<Point> {
        self.came_from.get(&p).copied()
    }

    /// Run at most `budget` expansions (at least one).
    pub fn step<S: TileSource + ?Sized>(&mut self, source: &S, budget: usize) -> SearchState {
        for _ in 0..budget.max(1) {
            let Some(i) = self.best_open() else {
                return SearchState::Exhausted;
            };
            let current = self.open[i];
            if self.arrived(current) {
                return SearchState::Found(self.reconstruct(source, current));
            }

            self.open.remove(i);
            self.closed.insert(current);
            self.expansions += 1;
            self.expand(source, current);
        }
        if self.open.is_empty() {
            SearchState::Exhausted
        } else {
            SearchState::InProgress
        }
    }

    /// Step until the search ends.
    pub fn run<S: TileSource + ?Sized>(&mut self, source: &S) -> Option<Path> {
        loop {
            match self.step(source, usize::MAX) {
                SearchState::InProgress => continue,
                SearchState::Found(path) => return Some(path),
                SearchState::Exhausted => return None,
            }
        }
    }

    fn best_open(&self) -> Option<usize> {
        if self.open.is_empty() {
            return None;
        }
        let mut best = 0;
        let mut best_f = f32::MAX;
        for (i, p) in self.open.iter().enumerate() {
            let f = self.scores.get(p).map_or(f32::MAX, |s| s.f);
            if f <= best_f {
                best = i;
                best_f = f;
            }
        }
        Some(best)
    }

    fn arrived(&self, p: Point) -> bool {
        p == self.target || (!self.target_walkable && self.arrival.contains(&p))
    }

    fn expand<S: TileSource + ?Sized>(&mut self, source: &S, current: Point) {
        let g = self.scores.get(&current).map_or(0.0, |s| s.g);
        for n in current.orthogonal() {
            if !source.tile(n).is_some_and(|t| t.is_walkable()) || self.closed.contains(&n) {
                continue;
            }
            let tentative = g + self.heuristic.estimate(current, n);
            let f = tentative + self.heuristic.estimate(n, self.target);
            match self.scores.get_mut(&n) {
                None => {
                    self.open.push(n);
                    self.scores.insert(n, Score { f, g: tentative });
                    self.came_from.insert(n, current);
                }
                Some(score) if tentative < score.g => {
                    *score = Score { f, g: tentative };
                    self.came_from.insert(n, current);
                }
                Some(_) => {}
            }
        }
    }

    fn reconstruct<S: TileSource + ?Sized>(&self, source: &S, terminal: Point) -> Path {
        let mut points = Vec::new();
        let mut cur = terminal;
        while let Some(&prev) = self.came_from.get(&cur) {
            points.push(cur);
            cur = prev;
        }
        points.reverse();
        points.into_iter().filter_map(|p| source.tile(p)).collect()
    }
}

/// Find a route from `start` to `target` in one go.
///
/// Returns `None` when either point is off the map or no route exists.
pub fn search<S: TileSource + ?Sized>(
    source: &S,
    start: Point,
    target: Point,
    heuristic: Heuristic,
) -> Option<Path> {
    SearchContext::new(source, start, target, heuristic)?.run(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilepath_core::TileGrid;

    fn rows(r: &[&str]) -> TileGrid {
        TileGrid::from_rows(r, 1.0).unwrap()
    }

    fn points(path: &Path) -> Vec<Point> {
        path.points().collect()
    }

    #[test]
    fn straight_corridor() {
        let g = rows(&["....."]);
        for h in Heuristic::ALL {
            let path = search(&g, Point::new(0, 0), Point::new(4, 0), h).unwrap();
            assert_eq!(
                points(&path),
                vec![
                    Point::new(1, 0),
                    Point::new(2, 0),
                    Point::new(3, 0),
                    Point::new(4, 0)
                ]
            );
        }
    }

    #[test]
    fn open_row_on_wider_grid() {
        let g = rows(&["........", "........", "........"]);
        for h in Heuristic::ALL {
            let path = search(&g, Point::new(0, 0), Point::new(7, 0), h).unwrap();
            assert_eq!(path.len(), 7);
            for (i, p) in path.points().enumerate() {
                assert_eq!(p, Point::new(i as i32 + 1, 0), "{h:?}");
            }
        }
    }

    #[test]
    fn unwalkable_target_stops_next_to_it() {
        let g = rows(&["...", ".#.", "..."]);
        let zone = [
            Point::new(0, 1),
            Point::new(1, 0),
            Point::new(2, 1),
            Point::new(1, 2),
        ];
        for h in Heuristic::ALL {
            let path = search(&g, Point::new(0, 0), Point::new(1, 1), h).unwrap();
            let end = path.end().unwrap().pos();
            assert!(zone.contains(&end), "{h:?} ended at {end}");
            assert!(path.points().all(|p| p != Point::new(1, 1)));
        }
    }

    #[test]
    fn enclosed_target_is_unreachable() {
        let g = rows(&[".....", ".###.", ".#.#.", ".###.", "....."]);
        for h in Heuristic::ALL {
            assert_eq!(search(&g, Point::new(0, 0), Point::new(2, 2), h), None);
        }
    }

    #[test]
    fn start_beside_blocked_target_gives_empty_path() {
        let g = rows(&[".#"]);
        let path = search(&g, Point::new(0, 0), Point::new(1, 0), Heuristic::Euclidean).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn off_map_points_are_rejected() {
        let g = rows(&["..."]);
        assert!(SearchContext::new(&g, Point::new(-1, 0), Point::new(2, 0), Heuristic::Euclidean).is_none());
        assert!(SearchContext::new(&g, Point::new(0, 0), Point::new(3, 0), Heuristic::Euclidean).is_none());
    }

    #[test]
    fn last_tie_wins() {
        // From (0,0) both (0,1) and (1,0) score the same toward (1,1); the
        // later one, (1,0), is expanded first.
        let g = rows(&["..", ".."]);
        let path = search(&g, Point::new(0, 0), Point::new(1, 1), Heuristic::Manhattan).unwrap();
        assert_eq!(points(&path), vec![Point::new(1, 0), Point::new(1, 1)]);
    }

    #[test]
    fn budgeted_steps_match_one_shot() {
        let g = rows(&[
            "..........",
            ".####.###.",
            ".#......#.",
            ".#.####.#.",
            "...#......",
        ]);
        let (start, target) = (Point::new(0, 0), Point::new(6, 2));
        let whole = search(&g, start, target, Heuristic::Combined);

        let mut ctx = SearchContext::new(&g, start, target, Heuristic::Combined).unwrap();
        let mut steps = 0;
        let stepped = loop {
            steps += 1;
            match ctx.step(&g, 1) {
                SearchState::InProgress => continue,
                SearchState::Found(p) => break Some(p),
                SearchState::Exhausted => break None,
            }
        };
        assert!(steps > 1);
        assert_eq!(stepped, whole);
        assert!(whole.is_some());
    }

    #[test]
    fn bookkeeping_lives_in_context() {
        let g = rows(&["..."]);
        let mut ctx = SearchContext::new(&g, Point::new(0, 0), Point::new(2, 0), Heuristic::Manhattan).unwrap();
        assert_eq!(ctx.score(Point::new(0, 0)), Some(Score { f: 2.0, g: 0.0 }));
        assert_eq!(ctx.step(&g, 1), SearchState::InProgress);
        assert_eq!(ctx.expansions(), 1);
        assert_eq!(ctx.closed_len(), 1);
        assert_eq!(ctx.open_len(), 1);
        assert_eq!(ctx.predecessor(Point::new(1, 0)), Some(Point::new(0, 0)));
        assert_eq!(ctx.score(Point::new(1, 0)), Some(Score { f: 2.0, g: 1.0 }));
    }

    #[test]
    fn repeated_searches_agree() {
        let g = rows(&["....#...", ".##.#.#.", "......#.", ".#####..", "........"]);
        for h in Heuristic::ALL {
            let a = search(&g, Point::new(0, 0), Point::new(7, 0), h);
            let b = search(&g, Point::new(0, 0), Point::new(7, 0), h);
            assert!(a.is_some());
            assert_eq!(a, b);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use tilepath_core::{GridConfig, TileGrid};

    fn arb_case() -> impl Strategy<Value = (TileGrid, Point, Point, Heuristic)> {
        (2i32..9, 2i32..9).prop_flat_map(|(w, d)| {
            let n = (w * d) as usize;
            (
                proptest::collection::vec(prop::bool::weighted(0.75), n),
                0..w,
                0..d,
                0..w,
                0..d,
                prop::sample::select(Heuristic::ALL.to_vec()),
            )
                .prop_map(move |(cells, sx, sy, tx, ty, h)| {
                    let mut cells = cells.into_iter();
                    let grid = TileGrid::new(&GridConfig::new(w, d, 1.0), &mut |_: Point| {
                        cells.next().unwrap_or(true)
                    })
                    .unwrap();
                    (grid, Point::new(sx, sy), Point::new(tx, ty), h)
                })
        })
    }

    /// Whether the search should arrive, by plain breadth-first flood over
    /// walkable tiles.
    fn arrivable(g: &TileGrid, start: Point, target: Point) -> bool {
        let target_walkable = g.is_walkable(target);
        let arrives = |p: Point| {
            p == target || (!target_walkable && target.orthogonal().contains(&p))
        };
        let mut seen = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(p) = queue.pop_front() {
            if arrives(p) {
                return true;
            }
            for n in p.orthogonal() {
                if g.is_walkable(n) && !seen.contains(&n) {
                    seen.push(n);
                    queue.push_back(n);
                }
            }
        }
        false
    }

    proptest! {
        #[test]
        fn paths_are_connected_walkable_and_arrive((g, start, target, h) in arb_case()) {
            prop_assume!(start != target);
            let found = search(&g, start, target, h);
            prop_assert_eq!(found.is_some(), arrivable(&g, start, target));

            if let Some(path) = found {
                let mut prev = start;
                for p in path.points() {
                    prop_assert_eq!((p - prev).x.abs() + (p - prev).y.abs(), 1);
                    prop_assert!(g.is_walkable(p));
                    prop_assert_ne!(p, start);
                    prev = p;
                }
                let end = path.end().map_or(start, |t| t.pos());
                if g.is_walkable(target) {
                    prop_assert_eq!(end, target);
                } else {
                    prop_assert!(target.orthogonal().contains(&end));
                }
            }
        }

        #[test]
        fn searches_are_deterministic((g, start, target, h) in arb_case()) {
            prop_assert_eq!(search(&g, start, target, h), search(&g, start, target, h));
        }
    }
}
