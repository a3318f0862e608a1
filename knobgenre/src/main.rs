//! Genre indexer CLI

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use knobgenre::config_ext::MediaConfigExt;
use knobgenre::db::GenreDb;
use knobgenre::taxonomy::is_valid_parent;
use knobgenre::{metadata, report, scanner};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "knobgenre", about = "KNOB Radio genre indexer", version)]
struct Cli {
    /// Database path (default: from configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Media root directory (default: from configuration)
    #[arg(long, global = true)]
    media_root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover and index audio files
    Scan,
    /// Classify songs from their tags
    Classify {
        /// Limit the number of tracks to process
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print index reports
    Report {
        #[arg(long, value_enum, default_value_t = ReportKind::Summary)]
        by: ReportKind,
    },
    /// Export tracks to a playlist or data file
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Filter by parent genre
        #[arg(long)]
        genre: Option<String>,
        /// Filter by subgenre
        #[arg(long)]
        subgenre: Option<String>,
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    Summary,
    Parent,
    Sub,
    Unclassified,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
    M3u,
}

impl ExportFormat {
    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::M3u => "m3u",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let config = knobconfig::get_config();
    let db_path = match &cli.db {
        Some(p) => p.clone(),
        None => PathBuf::from(config.get_genre_db_path()?),
    };
    let media_root = match &cli.media_root {
        Some(p) => p.clone(),
        None => PathBuf::from(config.get_media_root()?),
    };

    let db = GenreDb::open(&db_path)?;

    match cli.command {
        Command::Scan => cmd_scan(&db, &media_root)?,
        Command::Classify { limit } => cmd_classify(&db, &media_root, limit)?,
        Command::Report { by } => cmd_report(&db, by)?,
        Command::Export {
            format,
            genre,
            subgenre,
            output,
        } => cmd_export(&db, &media_root, format, genre, subgenre, output)?,
    }

    Ok(())
}

fn cmd_scan(db: &GenreDb, media_root: &Path) -> Result<()> {
    println!("Scanning {}...", media_root.display());
    let t0 = Instant::now();
    let stats = scanner::scan_to_db(db, media_root)?;

    println!("\nScan complete in {:.1}s:", t0.elapsed().as_secs_f64());
    println!("  New:     {}", stats.new);
    println!("  Updated: {}", stats.updated);
    println!("  Removed: {}", stats.removed);
    println!("  Total:   {}", db.count_all()?);

    let content_types = db.content_type_counts()?;
    println!("\n  Content types:");
    for row in &content_types {
        let label = row.label.as_deref().unwrap_or("none");
        println!("    {:15} {:5}", label, row.count);
    }
    Ok(())
}

fn cmd_classify(db: &GenreDb, media_root: &Path, limit: Option<usize>) -> Result<()> {
    let t0 = Instant::now();
    let stats = metadata::run_metadata_pass(db, media_root, limit)?;

    println!("\nMetadata pass complete in {:.1}s:", t0.elapsed().as_secs_f64());
    println!("  Classified: {}", stats.classified);
    println!("  Skipped:    {}", stats.skipped);

    let songs = db.count_songs()?;
    let classified = db.count_classified()?;
    if songs > 0 {
        println!(
            "\nOverall: {}/{} songs classified ({:.1}%)",
            classified,
            songs,
            classified as f64 / songs as f64 * 100.0
        );
    }
    Ok(())
}

fn cmd_report(db: &GenreDb, by: ReportKind) -> Result<()> {
    match by {
        ReportKind::Summary => {
            print!("{}", report::summary(db)?);
            print!("{}", report::by_parent(db)?);
        }
        ReportKind::Parent => print!("{}", report::by_parent(db)?),
        ReportKind::Sub => print!("{}", report::by_sub(db)?),
        ReportKind::Unclassified => print!("{}", report::unclassified(db)?),
    }
    Ok(())
}

fn cmd_export(
    db: &GenreDb,
    media_root: &Path,
    format: ExportFormat,
    genre: Option<String>,
    subgenre: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    if let Some(parent) = &genre {
        if !is_valid_parent(parent) {
            anyhow::bail!("Unknown genre: {}", parent);
        }
    }

    let parent = genre.as_deref();
    let sub = subgenre.as_deref();
    let output = output.unwrap_or_else(|| {
        PathBuf::from(report::default_export_name(parent, sub, format.as_str()))
    });

    let count = match format {
        ExportFormat::Json => report::export_json(db, &output, parent, sub)?,
        ExportFormat::Csv => report::export_csv(db, &output, parent, sub)?,
        ExportFormat::M3u => report::export_m3u(db, &output, parent, sub, media_root)?,
    };

    println!("Exported {} tracks to {}", count, output.display());
    Ok(())
}
