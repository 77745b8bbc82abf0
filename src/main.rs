//! Placeholder artwork generator.
//!
//! Writes the fixed set of stand-in images (six labeled racing photos, two helmets, a driver,
//! two backgrounds, and the two logos when absent) into the output directory.
//!
//! Usage:
//!   cargo run --
//!   cargo run -- --out-dir public/images --seed 7
//!   RUST_LOG=debug cargo run -- --config assets/config/placeholders.ron

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mrad_placeholders::{run, PlaceholderConfig, Typeface};

#[derive(Parser, Debug)]
#[command(about = "Generate placeholder racing artwork", version)]
struct Args {
    /// RON config layer; repeat to stack layers (later ones win). Defaults to assets/config/placeholders{,.local}.ron
    #[arg(long = "config")]
    configs: Vec<PathBuf>,
    /// Directory the images are written to (created if missing).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Preferred scalable font, tried before the configured candidates.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Fixed seed for the background scatter.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    // Default layers are optional; layers named on the command line must load.
    let mut cfg = if args.configs.is_empty() {
        let (cfg, used, errors) = PlaceholderConfig::load_layered(PlaceholderConfig::DEFAULT_LAYERS);
        for e in &errors {
            warn!("config: {e}");
        }
        if !used.is_empty() {
            info!("config layers: {}", used.join(", "));
        }
        cfg
    } else {
        PlaceholderConfig::load_explicit(&args.configs)?
    };

    if let Some(dir) = args.out_dir {
        cfg.output_dir = dir;
    }
    if let Some(font) = args.font {
        cfg.fonts.candidates.insert(0, font);
    }
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    for w in cfg.validate() {
        warn!("config: {w}");
    }

    let face = Typeface::resolve(&cfg.fonts.candidates);
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run(&cfg, &face, &mut rng)?;
    Ok(())
}
