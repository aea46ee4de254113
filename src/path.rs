//! Self-avoiding walk construction over a grid.
//!
//! A [`Path`] grows greedily from its start node and, whenever it runs into a
//! dead end, applies a *backbite*: the tip is reconnected to one of its
//! neighbors already on the walk (the pivot) and the segment between them is
//! reversed, moving the dead end to a previously interior node. The walk
//! never revisits a cell, so the path stays simple throughout.

use std::collections::HashSet;
use std::fmt;

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::grid::{Edge, Grid, Node};
use crate::{Error, Result};

/// How a path is grown to its coverage target.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Strategy {
    /// Greedy growth; backbite only on dead ends. `tolerance` is the maximum
    /// fraction of cells allowed to remain unvisited.
    Greedy { tolerance: f64 },
    /// Growth restricted to border-hugging moves, followed by a fixed number
    /// of backbites that only randomize an already complete path.
    BorderFirst,
}

/// Path generator owning the random source.
pub struct PathBuilder {
    random: StdRng,
}

impl PathBuilder {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }

    /// Build a path over `grid` from `start` with the given strategy.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an out-of-bounds start or a tolerance outside
    /// `[0, 1]`; [`Error::GenerationStuck`] when the walk cannot reach its
    /// coverage target.
    pub fn build(&mut self, grid: Grid, start: Node, strategy: Strategy) -> Result<Path> {
        let mut path = Path::new(grid, start)?;
        match strategy {
            Strategy::Greedy { tolerance } => path.grow_greedy(&mut self.random, tolerance)?,
            Strategy::BorderFirst => path.grow_border_first(&mut self.random)?,
        }
        Ok(path)
    }
}

/// A simple (self-avoiding) path in a grid.
///
/// Invariants, restored after every mutation:
/// 1. consecutive edges are contiguous (`edges[i].dst == edges[i+1].src`),
/// 2. the first edge starts at the start node,
/// 3. no node is visited twice,
/// 4. every edge lies within the grid.
pub struct Path {
    grid: Grid,
    start: Node,
    edges: Vec<Edge>,
    visited: HashSet<Node>,
}

impl Path {
    /// Create an empty path seeded at `start`.
    pub fn new(grid: Grid, start: Node) -> Result<Self> {
        if !grid.contains(start) {
            return Err(Error::Config(format!(
                "start node {start} outside {grid}"
            )));
        }
        let mut visited = HashSet::with_capacity(grid.size());
        visited.insert(start);
        Ok(Self {
            grid,
            start,
            edges: Vec::with_capacity(grid.size()),
            visited,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn start(&self) -> Node {
        self.start
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of cells on the path.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// The tip: most recently visited node.
    pub fn last_node(&self) -> Node {
        self.edges.last().map_or(self.start, |e| e.dst)
    }

    /// Move letters of the walk, one per edge.
    pub fn letters(&self) -> String {
        self.edges.iter().map(Edge::letter).collect()
    }

    /// Append an edge at the tip, keeping all path invariants.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if !self.grid.contains(edge.src) || !self.grid.contains(edge.dst) {
            return Err(Error::InvalidPath(format!("edge {edge} outside {}", self.grid)));
        }
        if edge.direction().is_none() {
            return Err(Error::InvalidPath(format!("edge {edge} is not a unit move")));
        }
        if edge.src != self.last_node() {
            return Err(Error::InvalidPath(format!(
                "edge {edge} does not continue from {}",
                self.last_node()
            )));
        }
        if self.visited.contains(&edge.dst) {
            return Err(Error::InvalidPath(format!("edge {edge} revisits {}", edge.dst)));
        }
        self.visited.insert(edge.dst);
        self.edges.push(edge);
        Ok(())
    }

    /// Check all path invariants from scratch.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.visited.len());
        seen.insert(self.start);
        if let Some(first) = self.edges.first() {
            if first.src != self.start {
                return Err(Error::InvalidPath(format!(
                    "path starts at {} instead of {}",
                    first.src, self.start
                )));
            }
        }
        for pair in self.edges.windows(2) {
            if pair[0].dst != pair[1].src {
                return Err(Error::InvalidPath(format!(
                    "edges {} and {} are not contiguous",
                    pair[0], pair[1]
                )));
            }
        }
        for edge in &self.edges {
            if !self.grid.contains(edge.src) || !self.grid.contains(edge.dst) {
                return Err(Error::InvalidPath(format!("edge {edge} outside {}", self.grid)));
            }
            if edge.direction().is_none() {
                return Err(Error::InvalidPath(format!("edge {edge} is not a unit move")));
            }
            if !seen.insert(edge.dst) {
                return Err(Error::InvalidPath(format!("node {} visited twice", edge.dst)));
            }
        }
        Ok(())
    }

    /// Unvisited in-bounds neighbors of the tip.
    fn frontier(&self) -> Vec<Node> {
        self.grid
            .neighbors(self.last_node())
            .into_iter()
            .filter(|n| !self.visited.contains(n))
            .collect()
    }

    /// Reconnect the tip to a random earlier pivot, reversing the tail.
    ///
    /// The set of visited nodes is unchanged; only the order and direction of
    /// the edges after the pivot change, which moves the dead end to a node
    /// that generically has unvisited neighbors again.
    ///
    /// # Errors
    ///
    /// [`Error::GenerationStuck`] when the tip has no neighbor besides its
    /// predecessor (single-file grids), [`Error::InvalidPath`] on a path with
    /// no edges.
    pub fn backbite(&mut self, random: &mut StdRng) -> Result<()> {
        let last_edge = *self
            .edges
            .last()
            .ok_or_else(|| Error::InvalidPath("cannot backbite a path with no edges".into()))?;
        let tip = last_edge.dst;

        let mut candidates = self.grid.neighbors(tip);
        candidates.retain(|n| *n != last_edge.src);
        if candidates.is_empty() {
            return Err(Error::GenerationStuck {
                visited: self.visited.len(),
                target: self.grid.size(),
            });
        }
        let pivot = candidates[random.gen_range(0..candidates.len())];
        debug!("backbite: tip {tip}, pivot {pivot}");

        let index = self
            .edges
            .iter()
            .position(|e| e.src == pivot)
            .ok_or_else(|| Error::InvalidPath(format!("pivot {pivot} is not on the path")))?;

        // Keep edges[..index], bridge pivot -> tip, then walk the old tail
        // backwards with every edge reversed.
        let tail = self.edges.split_off(index + 1);
        self.edges[index] = Edge::new(pivot, tip);
        self.edges.extend(tail.into_iter().rev().map(Edge::reversed));
        Ok(())
    }

    /// Grow greedily until at most `tolerance` of the grid stays unvisited.
    ///
    /// At each step the walk extends to a uniformly random unvisited neighbor
    /// of the tip; on a dead end it backbites and continues.
    pub fn grow_greedy(&mut self, random: &mut StdRng, tolerance: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&tolerance) {
            return Err(Error::Config(format!(
                "tolerance must be within [0.0, 1.0], got {tolerance}"
            )));
        }
        let target = ((1.0 - tolerance) * self.grid.size() as f64).ceil() as usize;
        if target < 1 {
            // The coverage target rounds down to nothing; a successful run
            // would return an empty path, which no caller can use.
            return Err(Error::GenerationStuck {
                visited: self.visited.len(),
                target,
            });
        }

        while self.visited.len() < target {
            let frontier = self.frontier();
            if frontier.is_empty() {
                debug!(
                    "dead end at {} with {}/{} cells, backbiting",
                    self.last_node(),
                    self.visited.len(),
                    target
                );
                self.backbite(random)?;
            } else {
                let next = frontier[random.gen_range(0..frontier.len())];
                self.add_edge(Edge::new(self.last_node(), next))?;
            }
        }
        debug!("covered {}/{} cells in {} moves", self.visited.len(), target, self.edges.len());
        Ok(())
    }

    /// A candidate next node hugs the border when, looking perpendicular to
    /// the direction of travel, at least one side is out of bounds or
    /// already visited.
    fn along_border(&self, node: Node) -> bool {
        let blocked = |n: Node| !self.grid.contains(n) || self.visited.contains(&n);
        let diff = node - self.last_node();
        if diff.x != 0 {
            blocked(Node::new(node.x, node.y + 1)) || blocked(Node::new(node.x, node.y - 1))
        } else {
            blocked(Node::new(node.x - 1, node.y)) || blocked(Node::new(node.x + 1, node.y))
        }
    }

    /// Grow hugging filled regions and borders, then shuffle the complete
    /// path with `20 × grid.size()` backbites.
    ///
    /// The border bias empirically reaches full coverage without a tolerance;
    /// the trailing backbites only randomize the shape of the walk.
    pub fn grow_border_first(&mut self, random: &mut StdRng) -> Result<()> {
        loop {
            let frontier = self.frontier();
            if frontier.is_empty() {
                break;
            }
            let candidates: Vec<Node> = frontier
                .into_iter()
                .filter(|n| self.along_border(*n))
                .collect();
            if candidates.is_empty() {
                return Err(Error::GenerationStuck {
                    visited: self.visited.len(),
                    target: self.grid.size(),
                });
            }
            let next = candidates[random.gen_range(0..candidates.len())];
            self.add_edge(Edge::new(self.last_node(), next))?;
        }
        debug!(
            "border growth done with {}/{} cells, mixing",
            self.visited.len(),
            self.grid.size()
        );

        for _ in 0..20 * self.grid.size() {
            self.backbite(random)?;
        }
        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letters())
    }
}
