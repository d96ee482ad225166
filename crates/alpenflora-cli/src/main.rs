use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use alpenflora_etl::config::LoggingConfig;
use alpenflora_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "alpenflora", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Resolve one Latin name into a multilingual flower record
    ///
    /// Finds the taxon on Wikidata, walks up the classification for its
    /// genus and family, and collects a name and a short description in
    /// each configured language from Wikipedia.
    ///
    /// The record is printed to stdout and appended to the records file
    /// (default: <data_dir>/records.json). Exits with status 2 when no
    /// taxon matches the name.
    Taxon {
        /// Latin species name, e.g. "Gentiana verna"
        latin: String,

        /// JSON array file to append the record to
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve every Latin name in a seed file
    ///
    /// The seed is a JSON array of objects with a `latin_name` field, such
    /// as the output of `harvest`. Names that cannot be resolved are
    /// reported and skipped; the run fails only if nothing resolves.
    Batch {
        /// Seed file (default: <data_dir>/hartinger.json)
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Output file (default: <data_dir>/AlpenBlumen.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List every Atlas der Alpenflora plate with its Latin name
    Harvest {
        /// Commons category to scan; repeat for several (default: all volumes)
        #[arg(short, long = "category")]
        categories: Vec<String>,

        /// Output file (default: <data_dir>/hartinger.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find plates for Latin names and save them into the asset catalog
    ///
    /// Exits with status 2 if any name has no plate and 3 if any plate
    /// could not be saved.
    Plate {
        /// One or more Latin names
        #[arg(required = true)]
        names: Vec<String>,

        /// Asset catalog directory (default: from config)
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Overwrite images that already exist
        #[arg(long)]
        force: bool,
    },
    /// Download the images listed in a harvest file
    Download {
        /// Harvest file, or "-" for stdin (default: <data_dir>/hartinger.json)
        source: Option<String>,

        /// Directory to save images into
        #[arg(short, long, default_value = "images")]
        output_dir: PathBuf,

        /// Leave existing files alone instead of picking a new name
        #[arg(long)]
        skip_existing: bool,
    },
    /// Manage the asset catalog
    Assets {
        #[command(subcommand)]
        command: AssetsCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, clap::Subcommand)]
enum AssetsCommands {
    /// Turn every JPEG in a directory into an image set
    Import {
        /// Directory holding the images
        #[arg(long, default_value = "images")]
        images_dir: PathBuf,

        /// Asset catalog directory (default: from config)
        #[arg(long)]
        assets_dir: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
    /// Get a value by dotted key, or print the config file
    Get {
        /// Key such as `taxonomy.max_hops`
        key: Option<String>,
    },
    /// Set a value by dotted key
    Set {
        key: String,
        value: String,
    },
}

fn setup_logging(logging: &LoggingConfig, verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        twyg::LogLevel::Error
    } else {
        match verbose {
            0 => parse_level(&logging.level)?,
            1 => twyg::LogLevel::Debug,
            _ => twyg::LogLevel::Trace,
        }
    };

    let opts = twyg::OptsBuilder::new()
        .coloured(logging.coloured)
        .level(level)
        .build()
        .map_err(|e| anyhow!("Invalid logging options: {e}"))?;
    twyg::setup(opts).map_err(|e| anyhow!("Failed to set up logging: {e}"))?;
    Ok(())
}

fn parse_level(name: &str) -> Result<twyg::LogLevel> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "trace" => twyg::LogLevel::Trace,
        "debug" => twyg::LogLevel::Debug,
        "info" => twyg::LogLevel::Info,
        "warn" | "warning" => twyg::LogLevel::Warn,
        "error" => twyg::LogLevel::Error,
        other => anyhow::bail!("Unknown log level: {other}"),
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Config commands must work even when the config file is broken.
    if let Commands::Config { command } = cli.command {
        match command {
            ConfigCommands::Show => commands::config::show_config()?,
            ConfigCommands::Path => commands::config::show_path(),
            ConfigCommands::Example => commands::config::show_example(),
            ConfigCommands::Init => commands::config::init_config()?,
            ConfigCommands::Get { key } => commands::config::get_config(key)?,
            ConfigCommands::Set { key, value } => commands::config::set_config(&key, &value)?,
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load()?;
    setup_logging(&config.logging, cli.verbose, cli.quiet)?;

    let code = match cli.command {
        Commands::Taxon { latin, output } => commands::run_taxon(&config, &latin, output).await?,
        Commands::Batch { seed, output } => {
            commands::run_batch(&config, seed, output).await?;
            ExitCode::SUCCESS
        }
        Commands::Harvest { categories, output } => {
            commands::run_harvest(&config, categories, output).await?;
            ExitCode::SUCCESS
        }
        Commands::Plate {
            names,
            assets_dir,
            force,
        } => commands::run_plate(&config, &names, assets_dir, force).await?,
        Commands::Download {
            source,
            output_dir,
            skip_existing,
        } => {
            commands::run_download(&config, source, &output_dir, skip_existing).await?;
            ExitCode::SUCCESS
        }
        Commands::Assets {
            command:
                AssetsCommands::Import {
                    images_dir,
                    assets_dir,
                },
        } => {
            commands::run_import(&config, &images_dir, assets_dir)?;
            ExitCode::SUCCESS
        }
        Commands::Config { .. } => ExitCode::SUCCESS,
    };

    Ok(code)
}
