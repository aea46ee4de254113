//! Rectangular grid graph: nodes, directions, edges and bounds.

use std::fmt;
use std::ops::{Add, Sub};

use crate::{Error, Result};

/// Location of a cell in the grid.
///
/// Coordinates are signed so that off-grid neighbor candidates can be
/// represented and rejected by [`Grid::contains`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Node {
    pub x: i32,
    pub y: i32,
}

impl Node {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Node {
    type Output = Node;

    fn add(self, other: Node) -> Node {
        Node::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Node {
    type Output = Node;

    fn sub(self, other: Node) -> Node {
        Node::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four axis-aligned unit moves, bound to its move letter.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    /// Default iteration order: +x, +y, -x, -y.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    /// Unit vector of this direction.
    pub fn vector(self) -> Node {
        match self {
            Direction::Right => Node::new(1, 0),
            Direction::Up => Node::new(0, 1),
            Direction::Left => Node::new(-1, 0),
            Direction::Down => Node::new(0, -1),
        }
    }

    /// Single-letter move label.
    pub fn letter(self) -> char {
        match self {
            Direction::Right => 'r',
            Direction::Up => 'u',
            Direction::Left => 'l',
            Direction::Down => 'd',
        }
    }

    /// Inverse of [`Direction::letter`].
    pub fn from_letter(letter: char) -> Option<Direction> {
        match letter {
            'r' => Some(Direction::Right),
            'u' => Some(Direction::Up),
            'l' => Some(Direction::Left),
            'd' => Some(Direction::Down),
            _ => None,
        }
    }

    /// Inverse of [`Direction::vector`]. Non-unit vectors have no direction.
    pub fn from_vector(vector: Node) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.vector() == vector)
    }
}

/// Directed edge between two 4-adjacent nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Edge {
    pub src: Node,
    pub dst: Node,
}

impl Edge {
    pub fn new(src: Node, dst: Node) -> Self {
        debug_assert!(src != dst);
        Self { src, dst }
    }

    /// The same edge walked the other way.
    pub fn reversed(self) -> Edge {
        Edge::new(self.dst, self.src)
    }

    /// Direction of travel, if src and dst are 4-adjacent.
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_vector(self.dst - self.src)
    }

    /// Move letter of this edge, `'?'` if the nodes are not adjacent.
    pub fn letter(&self) -> char {
        self.direction().map_or('?', Direction::letter)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

/// A rectangular 4-connected grid.
///
/// The grid holds no generation state; it only defines the valid node space
/// and the adjacency relation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
}

impl Grid {
    /// Create a grid, rejecting non-positive dimensions.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width < 1 || height < 1 {
            return Err(Error::Config(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells.
    pub fn size(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn contains(&self, node: Node) -> bool {
        (0..self.width).contains(&node.x) && (0..self.height).contains(&node.y)
    }

    /// In-bounds 4-neighbors of `node`, in [`Direction::ALL`] order.
    pub fn neighbors(&self, node: Node) -> Vec<Node> {
        Direction::ALL
            .into_iter()
            .map(|d| node + d.vector())
            .filter(|n| self.contains(*n))
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid[{}x{}]", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Edge, Grid, Node};
    use crate::Error;

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(matches!(Grid::new(0, 5), Err(Error::Config(_))));
        assert!(matches!(Grid::new(5, -1), Err(Error::Config(_))));
        assert!(Grid::new(1, 1).is_ok());
    }

    #[test]
    fn neighbors_follow_fixed_order() {
        let grid = Grid::new(3, 3).unwrap();
        assert_eq!(
            grid.neighbors(Node::new(1, 1)),
            vec![
                Node::new(2, 1),
                Node::new(1, 2),
                Node::new(0, 1),
                Node::new(1, 0)
            ]
        );
        // Corner keeps only the in-bounds two
        assert_eq!(
            grid.neighbors(Node::new(0, 0)),
            vec![Node::new(1, 0), Node::new(0, 1)]
        );
    }

    #[test]
    fn letters_and_vectors_are_inverses() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_letter(direction.letter()), Some(direction));
            assert_eq!(Direction::from_vector(direction.vector()), Some(direction));
        }
        assert_eq!(Direction::from_letter('x'), None);
        assert_eq!(Direction::from_vector(Node::new(2, 0)), None);
        assert_eq!(Direction::from_vector(Node::new(1, 1)), None);
    }

    #[test]
    fn edge_letters() {
        let edge = Edge::new(Node::new(0, 0), Node::new(1, 0));
        assert_eq!(edge.letter(), 'r');
        assert_eq!(edge.reversed().letter(), 'l');
        assert_eq!(Edge::new(Node::new(0, 0), Node::new(0, 1)).letter(), 'u');
        assert_eq!(Edge::new(Node::new(0, 1), Node::new(0, 0)).letter(), 'd');

        // Non-adjacent nodes have no move letter
        let far = Edge::new(Node::new(0, 0), Node::new(2, 2));
        assert_eq!(far.letter(), '?');
    }

    #[test]
    fn grid_size_and_bounds() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.size(), 12);
        assert!(grid.contains(Node::new(0, 0)));
        assert!(grid.contains(Node::new(3, 2)));
        assert!(!grid.contains(Node::new(4, 0)));
        assert!(!grid.contains(Node::new(0, -1)));
    }
}
