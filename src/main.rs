//! CLI for refkit - Collect, format and export bibliographic references.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refkit::export::export_format_names;
use refkit::lookup::DEFAULT_ENDPOINT;
use refkit::{
    style_names, CitationStyle, ExportError, ExportFormat, HttpTransport, ImportError,
    InputFormat, MetadataClient, Session,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Collect, format and export bibliographic references
#[derive(Parser)]
#[command(name = "refkit")]
#[command(version)]
#[command(after_help = "\
Examples:
  refkit format refs.bib --style ieee
  refkit format --doi 10.1038/nature14539 --style apa -o citations.txt
  refkit export refs.bib refs.ris --to csv --to docx --out-dir out
  refkit styles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format references as citations
    #[command(after_help = "\
Examples:
  refkit format refs.bib --style mla
  refkit format --add \"Fake Title\" \"Fake Author\" 2020 --style ieee
  refkit format refs.bib --table edited.csv -o citations.txt")]
    Format {
        #[command(flatten)]
        sources: SourceArgs,

        /// Citation style (see 'styles' command)
        #[arg(short, long, default_value = "apa")]
        style: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export references to files
    #[command(after_help = "\
Examples:
  refkit export refs.bib --to bibtex
  refkit export refs.bib --to csv --to docx --style chicago --out-dir exports

Files are written as exported_references.{bib,csv,docx} and overwrite earlier exports.")]
    Export {
        #[command(flatten)]
        sources: SourceArgs,

        /// Export format: bibtex, csv or docx (repeatable)
        #[arg(long = "to", required = true)]
        formats: Vec<String>,

        /// Citation style used for the Word document
        #[arg(short, long, default_value = "apa")]
        style: String,

        /// Directory the export files are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// List available citation styles
    Styles,
}

/// Where references come from. Applied in order: files, manual entries,
/// DOI lookups, then the edited table.
#[derive(Args)]
struct SourceArgs {
    /// Bibliography files to import (.bib or .ris)
    files: Vec<PathBuf>,

    /// Add a reference by hand (repeatable)
    #[arg(long, num_args = 3, value_names = ["TITLE", "AUTHOR", "YEAR"], action = ArgAction::Append)]
    add: Vec<String>,

    /// DOI to look up (repeatable)
    #[arg(long = "doi")]
    dois: Vec<String>,

    /// File with one DOI per line
    #[arg(long)]
    doi_file: Option<PathBuf>,

    /// Edited reference table (CSV: Title,Author,Year) replacing all references
    #[arg(long)]
    table: Option<PathBuf>,

    /// Metadata lookup endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Lookup timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — input file not found / unreadable / unsupported
    InputFile(String),
    /// Exit 11 — input document does not parse
    Parse(String),
    /// Exit 12 — unknown citation style
    Style(String),
    /// Exit 13 — lookup client cannot be set up
    Lookup(String),
    /// Exit 14 — unknown export format
    ExportFormat(String),
    /// Exit 15 — cannot write output file
    OutputFile(String),
    /// Exit 16 — a reference cannot be represented in the export format
    ExportData(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::Parse(_) => 11,
            AppError::Style(_) => 12,
            AppError::Lookup(_) => 13,
            AppError::ExportFormat(_) => 14,
            AppError::OutputFile(_) => 15,
            AppError::ExportData(_) => 16,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: verify the file path is correct and ends in .bib, .ris or .csv",
                    msg
                )
            }
            AppError::Parse(msg) => {
                write!(
                    f,
                    "{}\n  hint: no references were imported from this file",
                    msg
                )
            }
            AppError::Style(msg) => {
                let names = style_names().join(", ");
                write!(f, "{}\n  available styles: {}", msg, names)
            }
            AppError::Lookup(msg) => {
                write!(
                    f,
                    "{}\n  hint: check the --endpoint and --timeout options",
                    msg
                )
            }
            AppError::ExportFormat(msg) => {
                let names = export_format_names().join(", ");
                write!(f, "{}\n  available formats: {}", msg, names)
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
            AppError::ExportData(msg) => {
                write!(
                    f,
                    "{}\n  hint: correct the reference, for example via --table, and export again",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refkit=error".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Format {
            sources,
            style,
            output,
        } => {
            format_command(&sources, &style, output.as_deref())?;
        }
        Commands::Export {
            sources,
            formats,
            style,
            out_dir,
        } => {
            export_command(&sources, &formats, &style, &out_dir)?;
        }
        Commands::Styles => {
            styles_command();
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Format the collected references and print or write them.
fn format_command(sources: &SourceArgs, style: &str, output: Option<&Path>) -> Result<(), AppError> {
    let style = parse_style(style)?;
    let mut session = build_session(sources, style)?;

    let mut result = session.format().join("\n");
    if !result.is_empty() {
        result.push('\n');
    }

    if let Some(output_path) = output {
        fs::write(output_path, &result).map_err(|e| {
            AppError::OutputFile(format!("'{}': {}", output_path.display(), e))
        })?;
        eprintln!(
            "formatted {} reference(s) as {}, wrote {}",
            session.last_formatted().len(),
            style,
            output_path.display()
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", result)
            .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?;
    }

    Ok(())
}

/// Export the collected references in every requested format.
fn export_command(
    sources: &SourceArgs,
    formats: &[String],
    style: &str,
    out_dir: &Path,
) -> Result<(), AppError> {
    let style = parse_style(style)?;
    let formats = formats
        .iter()
        .map(|name| {
            ExportFormat::from_name(name)
                .ok_or_else(|| AppError::ExportFormat(format!("unknown export format '{}'", name)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = build_session(sources, style)?;

    for format in formats {
        let path = session
            .export(format, out_dir)
            .map_err(|e| map_export_error(&out_dir.join(format.file_name()), e))?;
        eprintln!(
            "exported {} reference(s) as {}, wrote {}",
            session.store().len(),
            format.label(),
            path.display()
        );
    }

    Ok(())
}

/// List available citation styles.
fn styles_command() {
    for name in style_names() {
        println!("{}", name);
    }
}

// ---------------------------------------------------------------------------
// Session assembly
// ---------------------------------------------------------------------------

fn parse_style(name: &str) -> Result<CitationStyle, AppError> {
    name.parse::<CitationStyle>()
        .map_err(|e| AppError::Style(e.to_string()))
}

/// Runs every source action against a fresh session.
fn build_session(sources: &SourceArgs, style: CitationStyle) -> Result<Session, AppError> {
    let mut session = Session::new(style);

    for path in &sources.files {
        let count = session
            .import_file(path)
            .map_err(|e| map_import_error(path, e))?;
        eprintln!("imported {} reference(s) from {}", count, path.display());
    }

    for entry in sources.add.chunks(3) {
        if let [title, author, year] = entry {
            session.add_manual(title, author, year);
            eprintln!("added reference: {}", title);
        }
    }

    let identifiers = collect_identifiers(sources)?;
    if !identifiers.trim().is_empty() {
        let transport = HttpTransport::new(Duration::from_secs(sources.timeout))
            .map_err(|e| AppError::Lookup(format!("cannot create HTTP client: {}", e)))?;
        let client = MetadataClient::new(sources.endpoint.as_str(), transport);

        let report = session.fetch_identifiers(&client, &identifiers);
        for failure in &report.failures {
            eprintln!("error: {}", failure);
        }
        eprintln!(
            "fetched {} reference(s) from {}, {} failed",
            report.references.len(),
            client.endpoint(),
            report.failures.len()
        );
    }

    if let Some(path) = &sources.table {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::InputFile(format!("'{}': {}", path.display(), e)))?;
        let records = InputFormat::Table
            .parse(&content)
            .map_err(|e| map_import_error(path, e))?;
        eprintln!("applied table edits: {} reference(s)", records.len());
        session.apply_table_edits(records);
    }

    Ok(session)
}

/// Joins `--doi` values and the `--doi-file` content into one
/// newline-separated batch.
fn collect_identifiers(sources: &SourceArgs) -> Result<String, AppError> {
    let mut text = sources.dois.join("\n");

    if let Some(path) = &sources.doi_file {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::InputFile(format!("'{}': {}", path.display(), e)))?;
        text.push('\n');
        text.push_str(&content);
    }

    Ok(text)
}

/// Maps an ExportError to an AppError using type-safe matching.
fn map_export_error(path: &Path, e: ExportError) -> AppError {
    let msg = format!("'{}': {}", path.display(), e);
    match e {
        ExportError::UnbalancedBraces { .. } => AppError::ExportData(msg),
        _ => AppError::OutputFile(msg),
    }
}

/// Maps an ImportError to an AppError using type-safe matching.
fn map_import_error(path: &Path, e: ImportError) -> AppError {
    let msg = format!("'{}': {}", path.display(), e);
    match e {
        ImportError::IoError(_) | ImportError::UnsupportedFormat(_) => AppError::InputFile(msg),
        _ => AppError::Parse(msg),
    }
}
