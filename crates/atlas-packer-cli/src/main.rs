use std::path::PathBuf;

use anyhow::Context;
use atlas_packer_core::config::AtlasConfig;
use atlas_packer_core::pipeline::{pack_directory, Phase};
use atlas_packer_core::publish;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "atlas-packer",
    about = "Pack a directory of images into an adaptive set of texture atlases",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress bar (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose and progress)
    #[arg(short, long, default_value_t = false, global = true, help_heading = "Logging/UX")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a directory of images into one or more atlases
    Pack(PackArgs),
    /// Compress a generated atlas directory's manifest for static hosting
    Publish(PublishArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Input directory of images
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory (atlas PNGs + manifest.json are written here)
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    output: PathBuf,

    /// Largest canvas side in pixels
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_atlas_size: u32,
    /// Symmetric padding (in pixels) reserved around each placed image
    #[arg(long, default_value_t = 2, help_heading = "Layout")]
    padding: u32,
    /// Images larger than this on either side are downscaled before packing
    #[arg(long, help_heading = "Layout")]
    max_image_size: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
struct PublishArgs {
    /// Directory containing a previously generated manifest.json and atlas PNGs
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory for atlas.json and the renamed atlas PNGs
    #[arg(short, long, default_value = "published", help_heading = "Input/Output")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Publish(args) => run_publish(args),
    }
}

fn run_pack(args: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = {
        let mut builder = AtlasConfig::builder()
            .max_atlas_size(args.max_atlas_size)
            .padding(args.padding);
        if let Some(max_image_size) = args.max_image_size {
            builder = builder.max_image_size(max_image_size);
        }
        builder.build()
    };
    cfg.validate().context("invalid packing configuration")?;

    let bar = if show_progress {
        let b = ProgressBar::new_spinner();
        b.set_style(
            ProgressStyle::with_template("{spinner:.green} {wide_msg} [{elapsed_precise}]")
                .unwrap(),
        );
        Some(b)
    } else {
        None
    };

    let progress = |phase: Phase, message: &str| {
        if let Some(b) = &bar {
            b.set_message(format!("{phase:?}: {message}"));
            b.tick();
        }
    };

    let manifest = pack_directory(&args.input, &args.output, &cfg, Some(&progress))
        .with_context(|| format!("packing '{}'", args.input.display()))?;

    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    info!(
        atlases = manifest.atlases.len(),
        images = manifest.total_images,
        output = %args.output.display(),
        "pack complete"
    );
    println!(
        "packed {} image(s) into {} atlas(es) -> {}",
        manifest.total_images,
        manifest.atlases.len(),
        args.output.display()
    );
    Ok(())
}

fn run_publish(args: &PublishArgs) -> anyhow::Result<()> {
    let compressed = publish::publish(&args.input, &args.output)
        .with_context(|| format!("publishing '{}'", args.input.display()))?;

    info!(
        atlases = compressed.atlases.len(),
        images = compressed.mapping.len(),
        output = %args.output.display(),
        "publish complete"
    );
    println!(
        "published {} image(s) across {} atlas(es) -> {}",
        compressed.mapping.len(),
        compressed.atlases.len(),
        args.output.display()
    );
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
