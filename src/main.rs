//! tooldat: inspect, check and edit NX ASCII tool-library databases.
//!
//! - `tooldat detect lib/*.dat`: print the dialect of each file
//! - `tooldat dump tool_database.dat -f json`: print the parsed tree
//! - `tooldat check lib/`: verify every file writes back unchanged
//! - `tooldat set tool_database.dat --class END_MILL --row 1 --field DIA --value 12.5`
//! - `tooldat shapes holder_database.dat HLD0_00001`: steps of one holder

mod logging;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tooldat::query;
use tooldat::{Grouping, Kind, LoadedFile, ParseOptions};

#[derive(Parser)]
#[command(
    name = "tooldat",
    version,
    about = "Inspect, check and edit NX ASCII tool-library databases"
)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that parses a file.
#[derive(clap::Args)]
struct ParseArgs {
    /// Dialect to parse as instead of detecting it:
    /// tools, holders, shanks, trackpoints, segmented
    #[arg(long)]
    kind: Option<Kind>,

    /// Holder/shank grouping: auto, discriminator, markers
    #[arg(long, default_value = "auto")]
    grouping: Grouping,
}

impl ParseArgs {
    fn options(&self) -> ParseOptions {
        ParseOptions {
            grouping: self.grouping,
        }
    }

    fn open(&self, path: &Path) -> Result<LoadedFile> {
        let options = self.options();
        let file = match self.kind {
            Some(kind) => LoadedFile::open_as(path, kind, &options),
            None => LoadedFile::open(path, &options),
        };
        file.with_context(|| format!("failed to load {}", path.display()))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print the detected dialect of each file
    Detect {
        /// Input files (glob patterns and directories supported)
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the parsed classes and rows of a file
    Dump {
        file: PathBuf,

        /// Output format: text (default), json
        #[arg(short = 'f', long, default_value = "text")]
        format: String,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Parse each file and verify it is written back unchanged
    Check {
        /// Input files (glob patterns and directories supported)
        #[arg(required = true)]
        files: Vec<String>,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Change one field of one row and save the file
    Set {
        file: PathBuf,

        /// Class name (case-insensitive)
        #[arg(long)]
        class: String,

        /// Row number within the class, starting at 1
        #[arg(long)]
        row: usize,

        #[arg(long)]
        field: String,

        #[arg(long)]
        value: String,

        /// Write to this path instead of overwriting the input
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Print the shape rows of a holder or shank, or the segments of a tool
    Shapes {
        file: PathBuf,

        /// LIBRF key of the holder, shank or tool
        librf: String,

        #[command(flatten)]
        parse: ParseArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Detect { files } => detect(&files),
        Command::Dump {
            file,
            format,
            parse,
        } => dump(&file, &format, &parse),
        Command::Check { files, parse } => check(&files, &parse),
        Command::Set {
            file,
            class,
            row,
            field,
            value,
            output,
            parse,
        } => set(&file, &class, row, &field, &value, output.as_deref(), &parse),
        Command::Shapes {
            file,
            librf,
            parse,
        } => shapes(&file, &librf, &parse),
    }
}

fn detect(patterns: &[String]) -> Result<()> {
    for path in expand_globs(patterns)? {
        let kind = tooldat::detect_file_kind(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        println!("{}\t{}", path.display(), kind);
    }
    Ok(())
}

fn dump(path: &Path, format: &str, args: &ParseArgs) -> Result<()> {
    let renderer = render::create_renderer(format)?;
    let file = args.open(path)?;
    print!("{}", renderer.render(&file.document)?);
    Ok(())
}

/// Round-trip every file. Failures are reported per file; the command fails
/// if any file did.
fn check(patterns: &[String], args: &ParseArgs) -> Result<()> {
    let files = expand_globs(patterns)?;
    let mut failed = 0;

    for path in &files {
        match round_trip(path, args) {
            Ok(None) => println!("ok\t{}", path.display()),
            Ok(Some(line)) => {
                failed += 1;
                println!("differs\t{}\tline {}", path.display(), line);
            }
            Err(e) => {
                failed += 1;
                println!("error\t{}\t{:#}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed the round trip", failed, files.len());
    }
    Ok(())
}

/// First 1-based line where the rewritten text differs from the source.
fn round_trip(path: &Path, args: &ParseArgs) -> Result<Option<usize>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let kind = match args.kind {
        Some(kind) => kind,
        None => tooldat::detect_file_kind(path)?,
    };
    let doc = tooldat::parse_str(&text, kind, &args.options())?;
    let out = tooldat::render(&doc);
    if out == text {
        return Ok(None);
    }

    let line = text
        .split('\n')
        .zip(out.split('\n'))
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| text.split('\n').count().min(out.split('\n').count()));
    Ok(Some(line + 1))
}

fn set(
    path: &Path,
    class: &str,
    row: usize,
    field: &str,
    value: &str,
    output: Option<&Path>,
    args: &ParseArgs,
) -> Result<()> {
    let mut file = args.open(path)?;
    let doc = &mut file.document;

    let Some(id) = doc.class_id(class) else {
        bail!("no class named {} in {}", class, path.display());
    };
    let target = &doc.classes[id.0];
    if !target.has_field(field) {
        bail!(
            "class {} has no field {} (fields: {})",
            target.display_name(),
            field,
            target.fields().join(" ")
        );
    }
    if row == 0 || row > target.rows().len() {
        bail!(
            "row {} out of range: class {} has {} rows",
            row,
            target.display_name(),
            target.rows().len()
        );
    }

    let at = tooldat::RowRef {
        class: id,
        row: row - 1,
    };
    let outcome = doc.set(at, field, value).context("row vanished")?;
    if !outcome.is_changed() {
        debug!("{} already {}", field, value);
    }

    match output {
        Some(out) => file.save_as(out)?,
        None if outcome.is_changed() => file.save()?,
        None => warn!("value unchanged, {} not rewritten", path.display()),
    }
    Ok(())
}

fn shapes(path: &Path, librf: &str, args: &ParseArgs) -> Result<()> {
    let file = args.open(path)?;
    let doc = &file.document;
    let rows = match file.kind {
        Kind::Holders | Kind::Shanks => query::shape_rows_for(doc, librf),
        Kind::SegmentedTools => query::segment_rows_for(doc, librf),
        other => bail!("{} files have no shape rows", other),
    };

    let Some((first, _)) = rows.first() else {
        warn!("no rows for {} in {}", librf, path.display());
        return Ok(());
    };
    let fields = doc
        .class(first.class)
        .map(|c| c.fields().to_vec())
        .unwrap_or_default();
    let rows: Vec<_> = rows.iter().map(|(_, row)| *row).collect();
    print!("{}", render::text::table(&fields, &rows));
    Ok(())
}

/// File extension scanned for when a directory is given.
const SUPPORTED_EXTENSIONS: &[&str] = &["dat"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for `.dat` files.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // If it's a directory, scan for supported extensions (non-recursive)
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
                        if SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                            files.push(p);
                        }
                    }
                }
            }
            continue;
        }
        // Try as glob
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
