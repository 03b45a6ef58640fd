use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

use vwsimplify::{simplify, GeoJson, Options};

/// Simplify the lines and polygons in a GeoJSON file.
#[derive(Parser)]
struct Cli {
    /// The GeoJSON file to read.
    input: PathBuf,

    /// Where to write the result. Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Remove vertices whose effective area is smaller than this.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Remove at least this fraction of all positions.
    #[arg(long)]
    fraction: Option<f64>,

    /// A JSON file of options (`{"tolerance": ..., "fraction": ...}`), which
    /// the command-line flags override.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Simplify a copy and also report how many positions the input had.
    #[arg(long)]
    copy: bool,

    /// Also write an SVG showing which positions were removed.
    #[cfg(feature = "debug-svg")]
    #[arg(long)]
    svg: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();

    let mut options = match &args.options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<Options>(&text)
                .with_context(|| format!("parsing options from {}", path.display()))?
        }
        None => Options::default(),
    };
    if let Some(tolerance) = args.tolerance {
        options = options.with_tolerance(tolerance);
    }
    if let Some(fraction) = args.fraction {
        options = options.with_fraction(fraction);
    }
    options = options.with_mutate(!args.copy);

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut geojson: GeoJson = text.parse()?;
    let before = geojson.position_count();

    #[cfg(feature = "debug-svg")]
    if let Some(path) = &args.svg {
        svg::save(path, &vwsimplify::dump_svg(&geojson, &options)?)?;
    }

    let simplified = simplify(&mut geojson, &options)?;
    let after = simplified.position_count();
    tracing::info!(before, after, "simplified {}", args.input.display());

    let json = serde_json::to_string(&*simplified)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }

    if args.copy {
        tracing::info!(positions = geojson.position_count(), "input left unchanged");
    }
    Ok(())
}
