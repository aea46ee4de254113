//! Rasterize a finished path into an indexed pixel buffer.
//!
//! The buffer holds palette indices, not colors: index 0 is the background
//! and the map is drawn with a single caller-chosen index. Rows are stored
//! bottom-up (pixel (0, 0) is the bottom-left corner) and exported top-down
//! for image encoders.

use crate::grid::{Direction, Node};
use crate::path::Path;
use crate::{Error, Grid, Result};

/// Hard limits of the target map format.
const MAX_WIDTH: i64 = 32512;
const MAX_HEIGHT: i64 = 32600;

/// Palette indices must fit a 64-entry palette.
const MAX_COLORS: u8 = 64;

// Glyph bitmaps. Row 0 is the bottom row of each bitmap.

const ARROW_RIGHT_DOWN: [&str; 7] = [
    "00000100",
    "00001110",
    "00011111",
    "00000100",
    "00000100",
    "00000100",
    "11111100",
];

const ARROW_UP_LEFT: [&str; 8] = [
    "0000001",
    "0000001",
    "0000001",
    "0010001",
    "0110001",
    "1111111",
    "0110000",
    "0010000",
];

const ARROW_LEFT_DOWN: [&str; 7] = [
    "00100000",
    "01110000",
    "11111000",
    "00100000",
    "00100000",
    "00100000",
    "00111111",
];

const ARROW_UP_RIGHT: [&str; 8] = [
    "1000000",
    "1000000",
    "1000000",
    "1000100",
    "1000110",
    "1111111",
    "0000110",
    "0000100",
];

const WATERMARK: [&str; 5] = [
    "000000000010000000000000000000000000000",
    "100000110010000011001000001110011100110",
    "100001001011100110001000010010100001100",
    "110001001010010101101100010010100001011",
    "101100110011100011001011001110011100110",
];

/// Pixel layout of the rendered map.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Layout {
    /// Side of a square cell, in pixels.
    pub cell_size: i64,
    /// Stroke width of walls and line glyphs, in pixels.
    pub wall_thickness: i64,
    /// Blank border around the whole map, in pixels.
    pub padding: i64,
    /// Draw turn arrows.
    pub arrows: bool,
    /// Draw the S glyph in the start cell.
    pub start_marker: bool,
    /// Draw the F glyph in the finish cell.
    pub finish_marker: bool,
    /// Stamp the watermark into the padding region.
    pub watermark: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            cell_size: 200,
            wall_thickness: 5,
            padding: 32,
            arrows: true,
            start_marker: true,
            finish_marker: true,
            watermark: true,
        }
    }
}

impl Layout {
    fn validate(&self) -> Result<()> {
        if self.cell_size < 1 {
            return Err(Error::Config(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.wall_thickness < 1 {
            return Err(Error::Config(format!(
                "wall thickness must be at least 1, got {}",
                self.wall_thickness
            )));
        }
        if self.padding < 0 {
            return Err(Error::Config(format!(
                "padding must not be negative, got {}",
                self.padding
            )));
        }
        Ok(())
    }
}

/// Grid of palette indices, rows stored bottom-up.
pub struct PixelBuffer {
    width: usize,
    height: usize,
    rows: Vec<Vec<u8>>,
}

impl PixelBuffer {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Palette index at (x, y), origin at the bottom-left corner.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.rows[y][x]
    }

    /// Rows from the top of the image down, the order encoders expect.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().rev().map(Vec::as_slice)
    }
}

enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Turn {
    RightDown,
    UpLeft,
    LeftDown,
    UpRight,
}

/// What an interior cell gets from its (incoming, outgoing) move pair: the
/// walls on the two untraversed sides, and an arrow on the four turn shapes
/// that carry one. Colinear reversals cannot occur on a simple path and
/// draw nothing.
fn cell_rule(incoming: Direction, outgoing: Direction) -> (&'static [Side], Option<Turn>) {
    use Direction::{Down, Left, Right, Up};
    match (incoming, outgoing) {
        (Right, Right) | (Left, Left) => (&[Side::Top, Side::Bottom], None),
        (Up, Up) | (Down, Down) => (&[Side::Left, Side::Right], None),
        (Right, Left) | (Left, Right) | (Up, Down) | (Down, Up) => (&[], None),
        (Right, Down) => (&[Side::Top, Side::Right], Some(Turn::RightDown)),
        (Right, Up) => (&[Side::Bottom, Side::Right], None),
        (Left, Down) => (&[Side::Top, Side::Left], Some(Turn::LeftDown)),
        (Left, Up) => (&[Side::Bottom, Side::Left], None),
        (Down, Right) => (&[Side::Bottom, Side::Left], None),
        (Down, Left) => (&[Side::Bottom, Side::Right], None),
        (Up, Right) => (&[Side::Top, Side::Left], Some(Turn::UpRight)),
        (Up, Left) => (&[Side::Top, Side::Right], Some(Turn::UpLeft)),
    }
}

/// The three walls around the start cell; the first move's side stays open.
fn start_walls(first_move: Direction) -> [Side; 3] {
    match first_move {
        Direction::Right => [Side::Left, Side::Top, Side::Bottom],
        Direction::Left => [Side::Right, Side::Top, Side::Bottom],
        Direction::Up => [Side::Left, Side::Right, Side::Bottom],
        Direction::Down => [Side::Left, Side::Right, Side::Top],
    }
}

/// The three walls around the finish cell; the side the last move entered
/// through stays open.
fn finish_walls(last_move: Direction) -> [Side; 3] {
    match last_move {
        Direction::Right => [Side::Right, Side::Top, Side::Bottom],
        Direction::Left => [Side::Left, Side::Top, Side::Bottom],
        Direction::Up => [Side::Left, Side::Right, Side::Top],
        Direction::Down => [Side::Left, Side::Right, Side::Bottom],
    }
}

/// Rasterizer for one map image.
pub struct Drawer {
    grid: Grid,
    layout: Layout,
    img_width: i64,
    img_height: i64,
    img: Vec<Vec<u8>>,
}

impl Drawer {
    /// Allocate a drawer for `grid` under `layout`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for invalid layout parameters or when the image
    /// would exceed the map format's dimension ceiling.
    pub fn new(grid: Grid, layout: Layout) -> Result<Self> {
        layout.validate()?;
        let (img_width, img_height) = image_dimensions(grid, &layout)?;
        let img = vec![vec![0u8; img_width as usize]; img_height as usize];
        Ok(Self {
            grid,
            layout,
            img_width,
            img_height,
            img,
        })
    }

    pub fn image_size(&self) -> (i64, i64) {
        (self.img_width, self.img_height)
    }

    /// Rasterize `path` with the given palette index and hand off the buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPath`] when the path is empty, violates a path
    /// invariant, or belongs to a different grid; [`Error::Config`] for a
    /// palette index outside the 64-entry palette.
    pub fn render(mut self, path: &Path, color: u8) -> Result<PixelBuffer> {
        if color >= MAX_COLORS {
            return Err(Error::Config(format!(
                "palette index {color} outside the {MAX_COLORS}-entry palette"
            )));
        }
        if path.grid() != self.grid {
            return Err(Error::InvalidPath(format!(
                "path belongs to {} but the drawer was built for {}",
                path.grid(),
                self.grid
            )));
        }
        path.validate()?;
        let edges = path.edges();
        if edges.is_empty() {
            return Err(Error::InvalidPath("path has no edges".into()));
        }
        let moves: Vec<Direction> = edges
            .iter()
            .map(|e| {
                e.direction()
                    .ok_or_else(|| Error::InvalidPath(format!("edge {e} is not a unit move")))
            })
            .collect::<Result<_>>()?;

        self.draw_start_cell(edges[0].src, moves[0], color);
        for i in 0..moves.len() - 1 {
            self.draw_cell(edges[i].dst, moves[i], moves[i + 1], color);
        }
        self.draw_finish_cell(edges[edges.len() - 1].dst, moves[moves.len() - 1], color);
        if self.layout.watermark {
            let y = self.layout.padding - WATERMARK.len() as i64 - 1;
            self.draw_glyph(self.layout.padding, y, &WATERMARK, color);
        }

        Ok(PixelBuffer {
            width: self.img_width as usize,
            height: self.img_height as usize,
            rows: self.img,
        })
    }

    fn paint(&mut self, x: i64, y: i64, color: u8) {
        if (0..self.img_width).contains(&x) && (0..self.img_height).contains(&y) {
            self.img[y as usize][x as usize] = color;
        }
    }

    /// Paint a wall_thickness-wide axis-aligned bar starting at (x, y).
    fn draw_line(&mut self, x: i64, y: i64, length: i64, orientation: Orientation, color: u8) {
        let (w, h) = match orientation {
            Orientation::Horizontal => (length, self.layout.wall_thickness),
            Orientation::Vertical => (self.layout.wall_thickness, length),
        };
        for i in x..x + w {
            for j in y..y + h {
                self.paint(i, j, color);
            }
        }
    }

    /// Stamp a bitmap whose row 0 is its bottom row; pixels falling outside
    /// the buffer are skipped.
    fn draw_glyph(&mut self, x: i64, y: i64, rows: &[&str], color: u8) {
        for (j, row) in rows.iter().enumerate() {
            for (i, cell) in row.bytes().enumerate() {
                if cell == b'1' {
                    self.paint(x + i as i64, y + j as i64, color);
                }
            }
        }
    }

    fn draw_wall(&mut self, node: Node, side: Side, color: u8) {
        let cell = self.layout.cell_size;
        let pad = self.layout.padding;
        let wall = self.layout.wall_thickness;
        let (nx, ny) = (node.x as i64, node.y as i64);
        match side {
            Side::Left => {
                self.draw_line(pad + nx * cell, pad + ny * cell, cell, Orientation::Vertical, color)
            }
            Side::Right => self.draw_line(
                pad + (nx + 1) * cell,
                pad + ny * cell,
                cell,
                Orientation::Vertical,
                color,
            ),
            Side::Bottom => {
                self.draw_line(pad + nx * cell, pad + ny * cell, cell, Orientation::Horizontal, color)
            }
            // One wall_thickness wider, closing the corner seam
            Side::Top => self.draw_line(
                pad + nx * cell,
                pad + (ny + 1) * cell,
                cell + wall,
                Orientation::Horizontal,
                color,
            ),
        }
    }

    fn draw_start_cell(&mut self, node: Node, first_move: Direction, color: u8) {
        if self.layout.start_marker {
            self.draw_start_glyph(node, color);
        }
        for side in start_walls(first_move) {
            self.draw_wall(node, side, color);
        }
    }

    fn draw_cell(&mut self, node: Node, incoming: Direction, outgoing: Direction, color: u8) {
        let (walls, turn) = cell_rule(incoming, outgoing);
        for side in walls {
            self.draw_wall(node, *side, color);
        }
        if let Some(turn) = turn {
            if self.layout.arrows {
                self.draw_turn_arrow(node, turn, color);
            }
        }
    }

    fn draw_finish_cell(&mut self, node: Node, last_move: Direction, color: u8) {
        if self.layout.finish_marker {
            self.draw_finish_glyph(node, color);
        }
        for side in finish_walls(last_move) {
            self.draw_wall(node, side, color);
        }
    }

    fn draw_turn_arrow(&mut self, node: Node, turn: Turn, color: u8) {
        let cell = self.layout.cell_size;
        let pad = self.layout.padding;
        let wall = self.layout.wall_thickness;
        let (nx, ny) = (node.x as i64, node.y as i64);
        let rows: &[&str] = match turn {
            Turn::RightDown => &ARROW_RIGHT_DOWN,
            Turn::UpLeft => &ARROW_UP_LEFT,
            Turn::LeftDown => &ARROW_LEFT_DOWN,
            Turn::UpRight => &ARROW_UP_RIGHT,
        };
        let glyph_w = rows[0].len() as i64;
        let glyph_h = rows.len() as i64;
        // Tucked into the corner the turn bends around
        let (x, y) = match turn {
            Turn::RightDown => (
                pad + (nx + 1) * cell - glyph_w - 1,
                pad + (ny + 1) * cell - glyph_h - 2,
            ),
            Turn::UpLeft => (
                pad + (nx + 1) * cell - glyph_w - 2,
                pad + (ny + 1) * cell - glyph_h - 1,
            ),
            Turn::LeftDown => (pad + nx * cell + wall + 1, pad + (ny + 1) * cell - glyph_h - 2),
            Turn::UpRight => (pad + nx * cell + wall + 2, pad + (ny + 1) * cell - glyph_h - 1),
        };
        self.draw_glyph(x, y, rows, color);
    }

    /// The S marker, drawn from line primitives so it scales with the cell.
    fn draw_start_glyph(&mut self, node: Node, color: u8) {
        let cell = self.layout.cell_size;
        let wall = self.layout.wall_thickness;
        let x = node.x as i64 * cell + self.layout.padding + wall;
        let y = node.y as i64 * cell + self.layout.padding + wall;

        let v_inset = 11 * cell / 100;
        let h_inset = 2 * v_inset;

        let h_len = cell - 2 * h_inset - wall;
        let h_step = (cell - v_inset) / 3;
        for i in 0..3 {
            self.draw_line(
                x + h_inset,
                y + v_inset + i * h_step,
                h_len,
                Orientation::Horizontal,
                color,
            );
        }
        self.draw_line(x + h_inset, y + h_step + v_inset, h_step, Orientation::Vertical, color);
        self.draw_line(
            x + h_inset + h_len - wall,
            y + v_inset,
            h_step,
            Orientation::Vertical,
            color,
        );
    }

    /// The F marker.
    fn draw_finish_glyph(&mut self, node: Node, color: u8) {
        let cell = self.layout.cell_size;
        let wall = self.layout.wall_thickness;
        let x = node.x as i64 * cell + self.layout.padding + wall;
        let y = node.y as i64 * cell + self.layout.padding + wall;

        let v_inset = 11 * cell / 100;
        let h_inset = 2 * v_inset;

        let v_len = 2 * ((cell - v_inset) / 3) + wall;
        self.draw_line(x + h_inset, y + v_inset, v_len, Orientation::Vertical, color);

        let h_len = cell - 2 * h_inset - wall;
        self.draw_line(
            x + h_inset,
            y + v_len + v_inset,
            h_len,
            Orientation::Horizontal,
            color,
        );
        self.draw_line(
            x + h_inset,
            y + 7 * v_len / 10,
            9 * h_len / 10,
            Orientation::Horizontal,
            color,
        );
    }
}

/// Pixel dimensions for `grid` under `layout`: the needed size rounded up to
/// a multiple of 8, floored at 640x32 and capped at the map format's limits.
pub fn image_dimensions(grid: Grid, layout: &Layout) -> Result<(i64, i64)> {
    let needed_width =
        layout.cell_size * grid.width() as i64 + layout.wall_thickness + 2 * layout.padding;
    let needed_height =
        layout.cell_size * grid.height() as i64 + layout.wall_thickness + 2 * layout.padding;

    let width = (8 * ((needed_width + 7) / 8)).max(640);
    let height = (8 * ((needed_height + 7) / 8)).max(32);

    if width > MAX_WIDTH || height > MAX_HEIGHT {
        return Err(Error::Config(format!(
            "image {width}x{height} exceeds the {MAX_WIDTH}x{MAX_HEIGHT} map limit"
        )));
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::{cell_rule, image_dimensions, Drawer, Layout, Turn};
    use crate::grid::{Direction, Edge, Grid, Node};
    use crate::path::Path;
    use crate::Error;

    fn bare_layout(cell_size: i64, wall_thickness: i64, padding: i64) -> Layout {
        Layout {
            cell_size,
            wall_thickness,
            padding,
            ..Layout::default()
        }
    }

    /// 3x3 serpentine with letters "rrullurr".
    fn serpentine(grid: Grid) -> Path {
        let mut path = Path::new(grid, Node::new(0, 0)).unwrap();
        for (x, y) in [
            (1, 0),
            (2, 0),
            (2, 1),
            (1, 1),
            (0, 1),
            (0, 2),
            (1, 2),
            (2, 2),
        ] {
            let tip = path.last_node();
            path.add_edge(Edge::new(tip, Node::new(x, y))).unwrap();
        }
        path
    }

    #[test]
    fn dimensions_hit_the_floor() {
        let grid = Grid::new(1, 1).unwrap();
        let dims = image_dimensions(grid, &bare_layout(1, 1, 0)).unwrap();
        assert_eq!(dims, (640, 32));
    }

    #[test]
    fn dimensions_round_up_to_multiples_of_eight() {
        let grid = Grid::new(40, 20).unwrap();
        // needed: 19*40+1+64 = 825 -> 832, 19*20+1+64 = 445 -> 448
        let dims = image_dimensions(grid, &bare_layout(19, 1, 32)).unwrap();
        assert_eq!(dims, (832, 448));

        let grid = Grid::new(30, 20).unwrap();
        let (w, h) = image_dimensions(grid, &Layout::default()).unwrap();
        assert_eq!(w % 8, 0);
        assert_eq!(h % 8, 0);
        assert!(w >= 640 && h >= 32);
    }

    #[test]
    fn oversized_image_is_a_configuration_error() {
        let grid = Grid::new(200, 200).unwrap();
        let result = image_dimensions(grid, &Layout::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn invalid_layout_is_rejected() {
        let grid = Grid::new(3, 3).unwrap();
        assert!(matches!(
            Drawer::new(grid, bare_layout(0, 1, 0)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Drawer::new(grid, bare_layout(10, 0, 0)),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Drawer::new(grid, bare_layout(10, 1, -1)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn empty_path_is_rejected_before_drawing() {
        let grid = Grid::new(3, 3).unwrap();
        let path = Path::new(grid, Node::new(0, 0)).unwrap();
        let drawer = Drawer::new(grid, bare_layout(10, 1, 0)).unwrap();
        assert!(matches!(
            drawer.render(&path, 1),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let grid = Grid::new(3, 3).unwrap();
        let other = Grid::new(4, 3).unwrap();
        let path = serpentine(grid);
        let drawer = Drawer::new(other, bare_layout(10, 1, 0)).unwrap();
        assert!(matches!(
            drawer.render(&path, 1),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn color_outside_palette_is_rejected() {
        let grid = Grid::new(3, 3).unwrap();
        let path = serpentine(grid);
        let drawer = Drawer::new(grid, bare_layout(10, 1, 0)).unwrap();
        assert!(matches!(drawer.render(&path, 64), Err(Error::Config(_))));
    }

    #[test]
    fn serpentine_boundary_is_fully_walled() {
        let grid = Grid::new(3, 3).unwrap();
        let path = serpentine(grid);
        let drawer = Drawer::new(grid, bare_layout(10, 1, 0)).unwrap();
        let buffer = drawer.render(&path, 1).unwrap();

        // The first move leaves through the right side of (0, 0) and the last
        // enters through the left side of (2, 2); both openings are interior,
        // so the whole 31x31 outline must be closed.
        for i in 0..=30 {
            assert_eq!(buffer.get(i, 0), 1, "bottom edge open at x={i}");
            assert_eq!(buffer.get(i, 30), 1, "top edge open at x={i}");
            assert_eq!(buffer.get(0, i), 1, "left edge open at y={i}");
            assert_eq!(buffer.get(30, i), 1, "right edge open at y={i}");
        }

        // The traversed sides stay open: (0,0)->(1,0) and (1,2)->(2,2)
        assert_eq!(buffer.get(10, 5), 0);
        assert_eq!(buffer.get(20, 25), 0);
    }

    #[test]
    fn decision_table_covers_all_move_pairs() {
        let colinear = [
            (Direction::Right, Direction::Left),
            (Direction::Left, Direction::Right),
            (Direction::Up, Direction::Down),
            (Direction::Down, Direction::Up),
        ];
        for incoming in Direction::ALL {
            for outgoing in Direction::ALL {
                let (walls, turn) = cell_rule(incoming, outgoing);
                if colinear.contains(&(incoming, outgoing)) {
                    assert!(walls.is_empty());
                    assert!(turn.is_none());
                } else {
                    assert_eq!(walls.len(), 2);
                }
            }
        }
        // Exactly the four arrow-carrying turn shapes
        assert_eq!(
            cell_rule(Direction::Right, Direction::Down).1,
            Some(Turn::RightDown)
        );
        assert_eq!(
            cell_rule(Direction::Up, Direction::Left).1,
            Some(Turn::UpLeft)
        );
        assert_eq!(
            cell_rule(Direction::Left, Direction::Down).1,
            Some(Turn::LeftDown)
        );
        assert_eq!(
            cell_rule(Direction::Up, Direction::Right).1,
            Some(Turn::UpRight)
        );
    }

    #[test]
    fn glyphs_clip_outside_the_buffer() {
        let grid = Grid::new(3, 3).unwrap();
        let mut drawer = Drawer::new(grid, bare_layout(10, 1, 0)).unwrap();
        // Negative origin: the part of the bitmap below (0, 0) is skipped,
        // the rest lands in the corner
        drawer.draw_glyph(-5, -5, &super::ARROW_UP_LEFT, 1);
        assert_eq!(drawer.img[0][0], 1);
        assert_eq!(drawer.img[0][2], 0);
    }

    #[test]
    fn hide_flags_suppress_their_glyphs() {
        let grid = Grid::new(3, 3).unwrap();
        let shown = Drawer::new(grid, bare_layout(10, 1, 0)).unwrap();
        let buffer = shown.render(&serpentine(grid), 1).unwrap();
        // ul turn arrow in cell (2, 1), S in (0, 0), F in (2, 2)
        assert_eq!(buffer.get(21, 16), 1);
        assert_eq!(buffer.get(3, 2), 1);
        assert_eq!(buffer.get(23, 22), 1);

        let hidden_layout = Layout {
            arrows: false,
            start_marker: false,
            finish_marker: false,
            watermark: false,
            ..bare_layout(10, 1, 0)
        };
        let hidden = Drawer::new(grid, hidden_layout).unwrap();
        let buffer = hidden.render(&serpentine(grid), 1).unwrap();
        assert_eq!(buffer.get(21, 16), 0);
        assert_eq!(buffer.get(3, 2), 0);
        assert_eq!(buffer.get(23, 22), 0);
    }

    #[test]
    fn buffer_rows_export_top_down() {
        let grid = Grid::new(3, 3).unwrap();
        let drawer = Drawer::new(grid, bare_layout(10, 1, 0)).unwrap();
        let buffer = drawer.render(&serpentine(grid), 1).unwrap();

        let top_down: Vec<&[u8]> = buffer.rows_top_down().collect();
        assert_eq!(top_down.len(), buffer.height());
        // Bottom row of the buffer comes out last
        assert_eq!(top_down[buffer.height() - 1][0], buffer.get(0, 0));
    }
}
