use album_art::catalog::Locale;
use album_art::config::{find_config_file, get_config, load_config, Config};
use album_art::{AlbumArt, AlbumQuery, LookupFailurePolicy, SearchSession, SizeLabel};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Album Art - Find album artwork in the Amazon product catalog
#[derive(Parser, Debug)]
#[command(name = "album-art")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find album artwork in the Amazon product catalog", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the configuration file)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

/// Image sizes
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SizeArg {
    Swatch,
    Small,
    Thumbnail,
    Tiny,
    Medium,
    Large,
}

impl From<SizeArg> for SizeLabel {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Swatch => SizeLabel::Swatch,
            SizeArg::Small => SizeLabel::Small,
            SizeArg::Thumbnail => SizeLabel::Thumbnail,
            SizeArg::Tiny => SizeLabel::Tiny,
            SizeArg::Medium => SizeLabel::Medium,
            SizeArg::Large => SizeLabel::Large,
        }
    }
}

/// Catalog marketplaces
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LocaleArg {
    Us,
    Uk,
    De,
    Fr,
    Ca,
    Jp,
}

impl From<LocaleArg> for Locale {
    fn from(locale: LocaleArg) -> Self {
        match locale {
            LocaleArg::Us => Locale::Us,
            LocaleArg::Uk => Locale::Uk,
            LocaleArg::De => Locale::De,
            LocaleArg::Fr => Locale::Fr,
            LocaleArg::Ca => Locale::Ca,
            LocaleArg::Jp => Locale::Jp,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for an album's artwork
    #[command(alias = "s")]
    Search {
        /// Artist name
        artist: String,

        /// Album title
        album: String,

        /// Image size to fetch (repeatable; default: all sizes)
        #[arg(long, short, value_enum)]
        size: Vec<SizeArg>,

        /// Marketplace to search
        #[arg(long, short, value_enum)]
        locale: Option<LocaleArg>,

        /// Report a matched album even if its image lookup fails
        #[arg(long)]
        keep_partial: bool,

        /// Largest edit distance at which names still match
        #[arg(long)]
        tolerance: Option<usize>,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Album Art - Environment Variables");
    println!();
    println!("Credentials:");
    println!("  AMAZON_ACCESS_KEY_ID        Product Advertising API access key");
    println!("  AMAZON_SECRET_ACCESS_KEY    Product Advertising API secret key");
    println!("  AMAZON_ASSOCIATE_TAG        Associate tag sent with every request (optional)");
    println!();
    println!("Settings (override the configuration file):");
    println!("  ALBUM_ART_LOCALE                    Marketplace: us, uk, de, fr, ca, jp (default: us)");
    println!("  ALBUM_ART_MATCHING__TOLERANCE       Edit distance tolerance (default: 2)");
    println!("  ALBUM_ART_LOOKUP__ON_FAILURE        discard or keep_match (default: discard)");
    println!("  ALBUM_ART_HTTP__TIMEOUT_SECONDS     Request timeout (default: 30)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export AMAZON_ACCESS_KEY_ID=\"your-key-here\"");
    println!("  export AMAZON_SECRET_ACCESS_KEY=\"your-secret-here\"");
    println!("  album-art search \"Phish\" \"Rift\" --size medium");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("album_art={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from file if specified or found in default locations
    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()
    };

    if let Some(timeout) = cli.timeout {
        config.http.timeout_seconds = timeout;
    }

    match cli.command {
        Some(Commands::Search {
            artist,
            album,
            size,
            locale,
            keep_partial,
            tolerance,
        }) => {
            apply_search_overrides(&mut config, locale, keep_partial, tolerance);

            let mut query = AlbumQuery::new(&artist, &album)?;
            if !size.is_empty() {
                query = query.sizes(size.into_iter().map(SizeLabel::from));
            }

            let session = SearchSession::from_config(&config)?;
            match session.search(&query).await? {
                Some(art) => output_art(&art, cli.output)?,
                None => {
                    if !cli.quiet {
                        eprintln!("No artwork found for '{}' by '{}'", album, artist);
                    }
                    std::process::exit(1);
                }
            }
        }

        None => {
            // No command provided - show help
            println!("No command provided. Use --help for usage information.");
            println!("Common commands:");
            println!("  search <artist> <album>   - Find artwork for an album");
        }
    }

    Ok(())
}

fn apply_search_overrides(
    config: &mut Config,
    locale: Option<LocaleArg>,
    keep_partial: bool,
    tolerance: Option<usize>,
) {
    if let Some(locale) = locale {
        config.locale = locale.into();
    }
    if keep_partial {
        config.lookup.on_failure = LookupFailurePolicy::KeepMatch;
    }
    if let Some(tolerance) = tolerance {
        config.matching.tolerance = tolerance;
    }
}

fn output_art(art: &AlbumArt, format: OutputFormat) -> Result<()> {
    let actual_format = if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    };

    match actual_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(art)?);
        }
        OutputFormat::Plain => {
            println!("{} - {}", art.artist, art.album);
            for (size, url) in &art.images {
                println!("  {}: {}", size, url);
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Size", "URL"]);

            for (size, url) in &art.images {
                let url = if url.is_empty() { "-" } else { url.as_str() };
                table.add_row(vec![
                    Cell::new(size.as_str()).add_attribute(Attribute::Bold),
                    Cell::new(url),
                ]);
            }
            println!("{} - {}", art.artist, art.album);
            println!("{table}");
        }
        OutputFormat::Auto => unreachable!(),
    }

    Ok(())
}
