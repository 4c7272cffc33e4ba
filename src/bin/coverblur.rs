use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use coverblur::{BitmapSink, BlurParams, CoverConfig, CoverImage, DrawOutcome, decode_image};

#[derive(Parser, Debug)]
#[command(name = "coverblur", version)]
/// Render one cover surface from an image file and write it as PNG.
struct Cli {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Decode width in device-independent units.
    #[arg(long)]
    width: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Blur radius in pixels.
    #[arg(long)]
    radius: Option<u32>,

    /// Blur sigma (defaults to radius / 2 when only --radius is given).
    #[arg(long)]
    sigma: Option<f32>,

    /// Pixel density used for the surface.
    #[arg(long)]
    dpi: Option<f32>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let bytes = std::fs::read(&cli.in_path)
        .with_context(|| format!("read input image {}", cli.in_path.display()))?;
    let bitmap = decode_image(&bytes)?;

    let mut unit = CoverImage::new(config)?;
    unit.set_decode_width(cli.width);
    if unit.on_bitmap_ready(&bitmap)? == DrawOutcome::Skipped {
        anyhow::bail!(
            "nothing drawn: width {} is too small for a {}x{} source",
            cli.width,
            bitmap.width(),
            bitmap.height()
        );
    }

    let surface = unit
        .surface()
        .context("unit reported a draw but holds no surface")?;
    let mut frame = surface.to_frame();
    frame.unpremultiply();
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
        .context("surface readback has unexpected length")?;

    if let Some(parent) = cli.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    img.save(&cli.out)
        .with_context(|| format!("write png {}", cli.out.display()))?;

    println!(
        "wrote {} ({}x{} from {}x{})",
        cli.out.display(),
        img.width(),
        img.height(),
        bitmap.width(),
        bitmap.height()
    );
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<CoverConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            CoverConfig::from_json_str(&json)?
        }
        None => CoverConfig::default(),
    }
    .with_env_overrides();

    match (cli.radius, cli.sigma) {
        (Some(r), Some(s)) => config.blur = BlurParams::new(r, s)?,
        (Some(r), None) => config.blur = BlurParams::from_radius(r)?,
        (None, Some(s)) => config.blur = BlurParams::new(config.blur.radius_px, s)?,
        (None, None) => {}
    }
    if let Some(dpi) = cli.dpi {
        config.dpi = dpi;
    }
    config.validate()?;
    Ok(config)
}
