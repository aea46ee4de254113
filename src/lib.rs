//! Generate rope race maps for Worms Armageddon
//!
//! A map is a single self-avoiding path that covers (nearly) every cell of a
//! rectangular grid, rasterized into a palette-indexed image of walls, turn
//! arrows and start/finish markers. The path is grown greedily; whenever it
//! runs into a dead end, a *backbite* rearrangement reconnects the tip to an
//! earlier point of the walk and reverses the segment in between, so the walk
//! keeps growing without ever revisiting a cell.
//!
//! # Examples
//! ```
//! use roperace::{Drawer, Grid, Layout, Node, PathBuilder, Strategy};
//!
//! let grid = Grid::new(8, 5).unwrap();
//! let mut builder = PathBuilder::new(Some(1));
//! let path = builder
//!     .build(grid, Node::new(0, 0), Strategy::Greedy { tolerance: 0.0 })
//!     .unwrap();
//! assert_eq!(path.visited_count(), 40);
//!
//! let drawer = Drawer::new(grid, Layout::default()).unwrap();
//! let image = drawer.render(&path, 1).unwrap();
//! assert_eq!(image.width() % 8, 0);
//! ```
//!
//! The same seed, grid, start node and strategy always produce the same path
//! and the same pixels.

use thiserror::Error as ThisError;

pub mod draw;
pub mod grid;
pub mod palette;
pub mod path;

pub use draw::{image_dimensions, Drawer, Layout, PixelBuffer};
pub use grid::{Direction, Edge, Grid, Node};
pub use path::{Path, PathBuilder, Strategy};

/// Everything that can go wrong between configuration and finished pixels.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    /// Invalid grid dimensions, layout parameters or generation settings.
    /// Reported before generation starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The walk could not reach its coverage target: a dead end with no
    /// backbite candidate, or a tolerance that makes the target degenerate.
    /// The caller may retry with a different seed.
    #[error("generation stuck with {visited} of {target} cells covered")]
    GenerationStuck { visited: usize, target: usize },

    /// A path violating its structural invariants was built or handed to the
    /// rasterizer. Always a programming error, never silently patched.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, Error>;
