use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use wordscape::{
    CloudFrequencyPlanner, ConceptSpace, FrameCompositor, Interpolator, Layout, ParleyFontEngine,
    Point, Raster, SvgExportOptions, export_svg,
};

#[derive(Parser, Debug)]
#[command(name = "wordscape", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the blended and background colors at a point.
    Color(ColorArgs),
    /// Print the concept ranking and frequency tables at a point.
    Rank(RankArgs),
    /// Export a layout JSON as an SVG document.
    Export(ExportArgs),
    /// Composite rendered cloud layers into one blurred frame PNG.
    Composite(CompositeArgs),
}

#[derive(Parser, Debug)]
struct ColorArgs {
    /// Concept dataset JSON (label -> [x, y]).
    #[arg(long)]
    space: PathBuf,

    #[arg(short)]
    x: f64,

    #[arg(short)]
    y: f64,
}

#[derive(Parser, Debug)]
struct RankArgs {
    /// Concept dataset JSON (label -> [x, y]).
    #[arg(long)]
    space: PathBuf,

    #[arg(short)]
    x: f64,

    #[arg(short)]
    y: f64,

    /// Foreground table size.
    #[arg(long, default_value_t = wordscape::DEFAULT_FG_WORDS)]
    fg: usize,

    /// Background table size.
    #[arg(long, default_value_t = wordscape::DEFAULT_BG_WORDS)]
    bg: usize,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input layout JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Font file backing the layout's metrics.
    #[arg(long)]
    font: PathBuf,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Embed a subset of the font as a data URI.
    #[arg(long)]
    embed_font: bool,

    /// Embed the full font face instead of a character subset.
    #[arg(long)]
    no_optimize_font: bool,
}

#[derive(Parser, Debug)]
struct CompositeArgs {
    /// Foreground cloud layer PNG (RGBA).
    #[arg(long)]
    fg: PathBuf,

    /// Background cloud layer PNG (RGBA).
    #[arg(long)]
    bg: PathBuf,

    /// Concept dataset JSON, used to derive the fill color.
    #[arg(long)]
    space: PathBuf,

    #[arg(short)]
    x: f64,

    #[arg(short)]
    y: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Box blur radius in pixels.
    #[arg(long, default_value_t = 10)]
    radius: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Color(args) => cmd_color(args),
        Command::Rank(args) => cmd_rank(args),
        Command::Export(args) => cmd_export(args),
        Command::Composite(args) => cmd_composite(args),
    }
}

fn cmd_color(args: ColorArgs) -> anyhow::Result<()> {
    let space = ConceptSpace::load(&args.space)?;
    let interp = Interpolator::new(&space);
    let point = Point::new(args.x, args.y);
    println!("color:      {}", interp.color_at(point).to_css());
    println!("background: {}", interp.background_at(point).to_css());
    Ok(())
}

fn cmd_rank(args: RankArgs) -> anyhow::Result<()> {
    let space = ConceptSpace::load(&args.space)?;
    let interp = Interpolator::new(&space);
    let planner = CloudFrequencyPlanner::new(interp);
    let (fg, bg) = planner.plan_frequencies(Point::new(args.x, args.y), args.fg, args.bg);

    println!("foreground ({} words):", fg.len());
    for (label, weight) in fg.iter() {
        println!("  {label}: {weight}");
    }
    println!("background ({} words):", bg.len());
    for (label, weight) in bg.iter() {
        println!("  {label}: {weight}");
    }
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read layout '{}'", args.in_path.display()))?;
    let layout: Layout =
        serde_json::from_str(&text).with_context(|| "parse layout JSON")?;

    let mut engine = ParleyFontEngine::from_path(&args.font)?;
    let options = SvgExportOptions {
        embed_font: args.embed_font,
        optimize_embedded_font: !args.no_optimize_font,
        embed_raster_preview: false,
    };
    let doc = export_svg(&layout, &mut engine, &options)?;

    write_output(&args.out, doc.as_bytes())?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_composite(args: CompositeArgs) -> anyhow::Result<()> {
    let space = ConceptSpace::load(&args.space)?;
    let interp = Interpolator::new(&space);
    let fill = interp.background_at(Point::new(args.x, args.y));

    let fg = read_rgba(&args.fg)?;
    let bg = read_rgba(&args.bg)?;

    let frame = FrameCompositor::new(args.radius).composite(&fg, &bg, fill)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.raster.data,
        frame.raster.width,
        frame.raster.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} (fill {})", args.out.display(), frame.fill.to_css());
    Ok(())
}

fn read_rgba(path: &Path) -> anyhow::Result<Raster> {
    let img = image::open(path)
        .with_context(|| format!("read layer '{}'", path.display()))?
        .into_rgba8();
    let (width, height) = img.dimensions();
    Ok(Raster::from_data(width, height, img.into_raw())?)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}
