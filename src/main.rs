//! CLI for rope race map generation

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, ValueEnum};
use image::{Rgba, RgbaImage};
use itertools::Itertools;
use rand::seq::SliceRandom;

use roperace::{palette, Drawer, Grid, Layout, Node, PathBuilder, PixelBuffer, Strategy};

/// Generate a rope race map for the game Worms Armageddon
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The output file
    #[arg(short, long, default_value = "roperace.png")]
    output: PathBuf,

    /// Color of the map; any CSS keyword color except black
    /// (default: randomly chosen)
    #[arg(short, long)]
    color: Option<String>,

    /// List all available keyword colors; no map is generated
    #[arg(long)]
    colors: bool,

    /// Map width in number of cells
    #[arg(long, default_value_t = 30)]
    width: i32,

    /// Map height in number of cells
    #[arg(long, default_value_t = 20)]
    height: i32,

    /// Size of each square cell in pixels
    #[arg(long, default_value_t = 200)]
    cell_size: i64,

    /// Thickness of the walls in pixels
    #[arg(long, default_value_t = 5)]
    wall_thickness: i64,

    /// Padding around the whole map in pixels
    #[arg(long, default_value_t = 32)]
    padding: i64,

    /// Seed used to generate the map
    #[arg(long)]
    seed: Option<u64>,

    /// Path construction method
    #[arg(long, value_enum, default_value = "greedy")]
    method: Method,

    /// Maximum fraction of cells allowed to stay unvisited (greedy method)
    #[arg(long, default_value_t = 0.0)]
    tolerance: f64,

    /// Corner to start from
    #[arg(long, value_enum, default_value = "bottom-left")]
    start: Corner,

    /// Start from an explicit cell instead of a corner
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    start_at: Option<Vec<i32>>,

    /// Hide the turn arrows
    #[arg(long)]
    hide_arrows: bool,

    /// Hide the S in the start cell
    #[arg(long)]
    hide_start: bool,

    /// Hide the F in the finish cell
    #[arg(long)]
    hide_finish: bool,

    /// Hide the watermark
    #[arg(long)]
    hide_watermark: bool,

    /// Show the seed used to generate the map
    #[arg(long)]
    show_seed: bool,

    /// Show the generated move sequence
    #[arg(long)]
    show_path: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Method {
    /// Greedy growth with backbites on dead ends
    Greedy,
    /// Border-hugging growth, then a randomizing mix
    Border,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Corner {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.colors {
        let width = palette::CSS_COLORS
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            + 1;
        println!("Available colors:");
        println!(
            "{}",
            palette::CSS_COLORS
                .iter()
                .map(|(name, rgba)| format!(
                    "{name:>width$} #{:02x}{:02x}{:02x}",
                    rgba[0], rgba[1], rgba[2]
                ))
                .join("\n")
        );
        return Ok(());
    }

    // The map color is not part of the seeded generation, so a given seed
    // produces the same map whether or not a color was named.
    let rgba = match &args.color {
        Some(name) => palette::lookup(name).ok_or_else(|| {
            anyhow!("color '{name}' doesn't exist; try --colors to see the available colors")
        })?,
        None => {
            palette::CSS_COLORS
                .choose(&mut rand::thread_rng())
                .context("empty color palette")?
                .1
        }
    };

    let grid = Grid::new(args.width, args.height)?;
    let start = match &args.start_at {
        Some(at) => {
            let (x, y) = (at[0], at[1]);
            if !(0..args.width).contains(&x) || !(0..args.height).contains(&y) {
                bail!(
                    "start position must be within boundaries: \
                     0 <= X < WIDTH and 0 <= Y < HEIGHT"
                );
            }
            Node::new(x, y)
        }
        None => match args.start {
            Corner::BottomLeft => Node::new(0, 0),
            Corner::BottomRight => Node::new(args.width - 1, 0),
            Corner::TopLeft => Node::new(0, args.height - 1),
            Corner::TopRight => Node::new(args.width - 1, args.height - 1),
        },
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    if args.show_seed {
        println!("Seed: {seed}");
    }

    let strategy = match args.method {
        Method::Greedy => Strategy::Greedy {
            tolerance: args.tolerance,
        },
        Method::Border => Strategy::BorderFirst,
    };
    let mut builder = PathBuilder::new(Some(seed));
    let path = builder.build(grid, start, strategy)?;
    if args.show_path {
        println!("Path: {path}");
    }

    let layout = Layout {
        cell_size: args.cell_size,
        wall_thickness: args.wall_thickness,
        padding: args.padding,
        arrows: !args.hide_arrows,
        start_marker: !args.hide_start,
        finish_marker: !args.hide_finish,
        watermark: !args.hide_watermark,
    };
    let drawer = Drawer::new(grid, layout)?;
    let buffer = drawer.render(&path, 1)?;

    let filename = output_filename(args.output);
    write_png(&buffer, rgba, &filename)
        .with_context(|| format!("cannot write {}", filename.display()))?;
    println!("Created file {}", filename.display());
    Ok(())
}

/// Default file name inside directories, and a forced `.png` suffix.
fn output_filename(mut output: PathBuf) -> PathBuf {
    if output.is_dir() {
        output.push("roperace.png");
    }
    if output.extension().map_or(true, |ext| ext != "png") {
        let mut with_suffix = output.into_os_string();
        with_suffix.push(".png");
        output = PathBuf::from(with_suffix);
    }
    output
}

/// Encode the palette-indexed buffer as an RGBA PNG: index 0 is the black
/// background, every other index is the map color.
fn write_png(buffer: &PixelBuffer, rgba: [u8; 4], filename: &std::path::Path) -> anyhow::Result<()> {
    let mut image = RgbaImage::new(buffer.width() as u32, buffer.height() as u32);
    for (y, row) in buffer.rows_top_down().enumerate() {
        for (x, index) in row.iter().enumerate() {
            let pixel = if *index == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba(rgba)
            };
            image.put_pixel(x as u32, y as u32, pixel);
        }
    }
    image.save(filename)?;
    Ok(())
}
