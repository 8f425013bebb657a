use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thumb_sync::config::{self, ConfigError, SyncConfig};
use thumb_sync::{output, sync};

/// Flags that override the config file for commands that walk the tree.
#[derive(clap::Args, Clone, Default)]
struct WalkArgs {
    /// Maximum thumbnail width in pixels
    #[arg(long)]
    max_width: Option<u32>,

    /// Maximum thumbnail height in pixels
    #[arg(long)]
    max_height: Option<u32>,

    /// File-name suffixes to process, comma separated (e.g. jpg,png)
    #[arg(long = "ext", value_delimiter = ',')]
    extensions: Vec<String>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Descend into symlinked directories
    #[arg(long)]
    follow_links: bool,
}

#[derive(Parser)]
#[command(name = "thumb-sync")]
#[command(about = "Mirror an image tree as downsized thumbnails")]
#[command(long_about = "\
Mirror an image tree as downsized thumbnails

Every image under the source directory gets a thumbnail at the same
relative path under the output directory, in the same format. Thumbnails
that already exist are skipped, so re-running only processes new images.

  images/                      thumbnails/
  ├── cover.png        →       ├── cover.png
  └── 2023/                    └── 2023/
      ├── beach.JPG    →           └── beach.JPG
      └── notes.txt                (ignored: not an image)

Settings come from stock defaults, then --config, then flags.
Run 'thumb-sync gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Source directory (default: images)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory for thumbnails (default: thumbnails)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create missing thumbnails
    Sync(WalkArgs),
    /// Show what sync would do without writing anything
    Plan(WalkArgs),
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Sync(args) => {
            let config = resolve_config(&cli, args)?;
            println!(
                "==> Syncing {} \u{2192} {}",
                config.source_root.display(),
                config.dest_root.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for outcome in rx {
                    output::print_outcome(&outcome);
                }
            });
            let summary = sync::sync(&config, Some(tx));
            printer.join().map_err(|_| "output thread panicked")?;
            output::print_summary(&summary?);
        }
        Command::Plan(args) => {
            let config = resolve_config(&cli, args)?;
            let steps = sync::plan(&config)?;
            output::print_plan(&steps);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build the run config: stock defaults, then the config file, then flags.
fn resolve_config(cli: &Cli, args: &WalkArgs) -> Result<SyncConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => SyncConfig::default(),
    };

    if let Some(source) = &cli.source {
        config.source_root = source.clone();
    }
    if let Some(output) = &cli.output {
        config.dest_root = output.clone();
    }
    if let Some(width) = args.max_width {
        config.max_dimensions[0] = width;
    }
    if let Some(height) = args.max_height {
        config.max_dimensions[1] = height;
    }
    if !args.extensions.is_empty() {
        config.supported_extensions = args.extensions.clone();
    }
    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if args.follow_links {
        config.follow_links = true;
    }

    config.validate()?;
    Ok(config)
}
