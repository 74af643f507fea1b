//! Loaded database files and the set of files open at once.

use crate::detect::{self, Kind, SNIFF_LINES};
use crate::error::{DatError, Result};
use crate::model::Document;
use crate::parser::{self, ParseOptions};
use crate::writer;
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

fn io_error(path: &Path, source: std::io::Error) -> DatError {
    DatError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Detect the dialect of a file on disk. The file is only opened when its
/// name carries no hint, and then only the first lines are read.
pub fn detect_file_kind(path: &Path) -> Result<Kind> {
    if let Some(kind) = detect::kind_from_file_name(path) {
        return Ok(kind);
    }
    let file = fs::File::open(path).map_err(|e| io_error(path, e))?;
    let sample = BufReader::new(file)
        .lines()
        .take(SNIFF_LINES)
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(|e| io_error(path, e))?;
    Ok(detect::detect_kind(path, &sample))
}

/// One database file and its parsed document.
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub kind: Kind,
    pub document: Document,
    pub read_only: bool,
}

impl LoadedFile {
    /// Read and parse a file, detecting its dialect.
    pub fn open(path: &Path, options: &ParseOptions) -> Result<Self> {
        let kind = detect_file_kind(path)?;
        Self::open_as(path, kind, options)
    }

    pub fn open_as(path: &Path, kind: Kind, options: &ParseOptions) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let document = parser::parse_str(&text, kind, options)?;
        let read_only = fs::metadata(path)
            .map(|m| m.permissions().readonly())
            .unwrap_or(false);
        info!(
            "loaded {} as {} ({} classes, {} rows)",
            path.display(),
            kind,
            document.classes.len(),
            document.rows().count()
        );
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            document,
            read_only,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn units(&self) -> &str {
        &self.document.units
    }

    /// True when the document has edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.document.is_modified()
    }

    pub fn save(&mut self) -> Result<()> {
        writer::write(&self.path, &self.document)?;
        self.document.mark_saved();
        Ok(())
    }

    /// Write to a new path, which becomes the file's path.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        writer::write(path, &self.document)?;
        self.path = path.to_path_buf();
        self.read_only = false;
        self.document.mark_saved();
        Ok(())
    }
}

/// The open files, at most one per dialect.
#[derive(Debug, Default)]
pub struct Library {
    files: BTreeMap<Kind, LoadedFile>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a file into the slot for its dialect. Returns the file it
    /// replaced, if any.
    pub fn load(&mut self, path: &Path, options: &ParseOptions) -> Result<Option<LoadedFile>> {
        let file = LoadedFile::open(path, options)?;
        Ok(self.insert(file))
    }

    pub fn insert(&mut self, file: LoadedFile) -> Option<LoadedFile> {
        let replaced = self.files.insert(file.kind, file);
        if let Some(ref old) = replaced {
            info!("replaced {} ({})", old.path.display(), old.kind);
        }
        replaced
    }

    pub fn unload(&mut self, kind: Kind) -> Option<LoadedFile> {
        self.files.remove(&kind)
    }

    pub fn get(&self, kind: Kind) -> Option<&LoadedFile> {
        self.files.get(&kind)
    }

    pub fn get_mut(&mut self, kind: Kind) -> Option<&mut LoadedFile> {
        self.files.get_mut(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedFile> {
        self.files.values()
    }

    pub fn is_dirty(&self) -> bool {
        self.files.values().any(LoadedFile::is_dirty)
    }
}
