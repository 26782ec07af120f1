//! Quillpad command line front end.
//!
//! # Responsibility
//! - Expose sanitization, projections, import/export and search over a
//!   SQLite note database for scripting and local checks.
//! - Keep all domain rules inside `quillpad_core`.

use clap::{Parser, Subcommand, ValueEnum};
use log::error;
use quillpad_core::{
    flat_text, init_logging, sanitize, summary, CoreConfig, DbTarget, ExportFormat, LogLevel,
    LoggingConfig, NoteService, SearchQuery, SqliteNoteStore,
};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "quillpad")]
#[command(about = "Inspect, convert and search Quillpad notes", long_about = None)]
struct Cli {
    /// Absolute directory for rolling log files; logging is off when absent
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show block kinds, repairs and a summary of a document JSON file
    Inspect {
        /// Document JSON (`{ "blocks": [...] }`)
        input: PathBuf,
    },
    /// Print the sanitized form of a document JSON file
    Sanitize {
        input: PathBuf,
    },
    /// Render a document JSON file as Markdown, plain text or flat text
    Render {
        input: PathBuf,

        #[arg(short, long, value_enum, default_value = "md")]
        format: RenderFormat,
    },
    /// Import an export file into a note database
    Import {
        /// SQLite database path (created when missing)
        #[arg(long)]
        db: PathBuf,

        /// Export file (`.json`)
        input: PathBuf,
    },
    /// Export one note or the whole database
    Export {
        #[arg(long)]
        db: PathBuf,

        /// Note id; exports every note as JSON when absent
        #[arg(long)]
        id: Option<String>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: ArtifactFormat,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Search notes by keywords
    Search {
        #[arg(long)]
        db: PathBuf,

        /// Search terms; every term must match
        terms: Vec<String>,

        /// Only notes carrying this tag
        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RenderFormat {
    Md,
    Txt,
    Flat,
}

#[derive(Clone, Copy, ValueEnum)]
enum ArtifactFormat {
    Json,
    Md,
    Txt,
}

impl From<ArtifactFormat> for ExportFormat {
    fn from(value: ArtifactFormat) -> Self {
        match value {
            ArtifactFormat::Json => Self::Json,
            ArtifactFormat::Md => Self::Markdown,
            ArtifactFormat::Txt => Self::PlainText,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let configured = cli
            .log_level
            .parse::<LogLevel>()
            .map(|level| {
                LoggingConfig::new(log_dir)
                    .with_level(level)
                    .with_stderr_mirror(true)
            })
            .and_then(|config| init_logging(&config));
        if let Err(err) = configured {
            eprintln!("logging disabled: {err}");
        }
    }

    if let Err(err) = run(cli.command).await {
        error!("event=cli_command module=cli status=error error={err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Inspect { input } => inspect(&input),
        Commands::Sanitize { input } => {
            let sanitized = sanitize(&read_json(&input)?);
            println!("{}", serde_json::to_string_pretty(&sanitized.document)?);
            Ok(())
        }
        Commands::Render { input, format } => {
            let document = sanitize(&read_json(&input)?).document;
            let rendered = match format {
                RenderFormat::Md => quillpad_core::markdown(&document),
                RenderFormat::Txt => quillpad_core::plain_text(&document),
                RenderFormat::Flat => flat_text(&document),
            };
            println!("{rendered}");
            Ok(())
        }
        Commands::Import { db, input } => {
            let service = open_service(&db)?;
            let report = service.import_json(&fs::read_to_string(&input)?).await?;
            println!("imported {} notes ({:?})", report.imported, report.format);
            if let Some(patch) = report.settings {
                if !patch.rejected.is_empty() {
                    println!("ignored settings fields: {}", patch.rejected.join(", "));
                }
                if !patch.is_empty() {
                    println!("settings found in file were not applied");
                }
            }
            Ok(())
        }
        Commands::Export {
            db,
            id,
            format,
            out,
        } => {
            let service = open_service(&db)?;
            let artifact = match id {
                Some(id) => service.export_note(&id, format.into()).await?,
                None => service.export_all_artifact(None).await?,
            };
            let path = out.join(&artifact.file_name);
            fs::write(&path, artifact.contents)?;
            println!("wrote {}", path.display());
            Ok(())
        }
        Commands::Search {
            db,
            terms,
            tag,
            limit,
        } => {
            let service = open_service(&db)?;
            let query = SearchQuery {
                text: terms.join(" "),
                tag,
                limit,
            };
            for hit in service.search(&query).await? {
                println!("{}\t{}\t{}", hit.note_id, hit.title, hit.snippet);
            }
            Ok(())
        }
    }
}

fn inspect(input: &Path) -> Result<(), Box<dyn Error>> {
    let sanitized = sanitize(&read_json(input)?);
    let document = &sanitized.document;
    println!("blocks: {}", document.blocks.len());
    for (index, block) in document.blocks.iter().enumerate() {
        println!("  {index}: {}", block.kind());
    }
    println!("repairs: {}", sanitized.repairs.len());
    for repair in &sanitized.repairs {
        println!("  {repair}");
    }
    println!("summary: {}", summary(document, CoreConfig::default().summary_max_chars));
    Ok(())
}

fn open_service(db: &Path) -> Result<NoteService, Box<dyn Error>> {
    let store = SqliteNoteStore::open(&DbTarget::file(db))?;
    Ok(NoteService::new(Arc::new(store), CoreConfig::default()))
}

fn read_json(path: &Path) -> Result<Value, Box<dyn Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
