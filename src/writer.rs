//! Serialize a [`Document`] back to text.
//!
//! Everything but rows is written verbatim. A row whose values are unchanged
//! is written from its source lines; an edited row is rebuilt as
//! `<prefix>DATA | v1 | v2 ...` behind the same indentation and comment
//! marker it had.

use crate::error::{DatError, Result};
use crate::model::{Class, Document, Layout, Row};
use crate::syntax;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Prefix for new rows when no FORMAT line says otherwise.
pub const FALLBACK_INDENT: &str = "    ";

const SEPARATOR: &str = " | ";

/// Render the whole document, line ending and final newline included.
pub fn render(doc: &Document) -> String {
    let lines = render_lines(doc);
    let eol = doc.line_ending.as_str();
    let mut out = lines.join(eol);
    if doc.final_newline && !lines.is_empty() {
        out.push_str(eol);
    }
    out
}

/// Overwrite `path` with the rendered document.
pub fn write(path: &Path, doc: &Document) -> Result<()> {
    fs::write(path, render(doc)).map_err(|source| DatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {} ({} classes)", path.display(), doc.classes.len());
    Ok(())
}

/// The document as lines, without line endings.
pub fn render_lines(doc: &Document) -> Vec<String> {
    let mut out = doc.head.clone();
    let fallback = document_prefix(doc);

    match doc.layout {
        Layout::Sectioned => {
            for class in &doc.classes {
                emit_prologue(&mut out, class);
                for row in class.rows() {
                    emit_row(&mut out, class, row, fallback);
                }
                out.extend(class.post_data.iter().cloned());
            }
        }
        Layout::Interleaved => {
            for class in &doc.classes {
                emit_prologue(&mut out, class);
            }
            for (ci, ri) in source_order(doc) {
                let class = &doc.classes[ci];
                emit_row(&mut out, class, &class.rows()[ri], fallback);
            }
            for class in &doc.classes {
                out.extend(class.post_data.iter().cloned());
            }
        }
    }
    out
}

fn emit_prologue(out: &mut Vec<String>, class: &Class) {
    out.extend(class.pre_class.iter().cloned());
    out.extend(class.class_line.iter().cloned());
    out.extend(class.pre_format.iter().cloned());
    out.extend(class.format_lines.iter().cloned());
    out.extend(class.pre_data.iter().cloned());
}

fn emit_row(out: &mut Vec<String>, class: &Class, row: &Row, fallback: &str) {
    out.extend(row.leading().iter().cloned());

    let cells: Vec<&str> = class.fields().iter().map(|f| row.get(f)).collect();
    if cells.iter().all(|c| c.trim().is_empty()) {
        debug!("skipping blank row in class {}", class.display_name());
        return;
    }

    let unchanged = cells.iter().copied().eq(row.baseline().iter().map(String::as_str));
    if unchanged && !row.raw_lines().is_empty() {
        out.extend(row.raw_lines().iter().cloned());
        return;
    }

    let prefix = row
        .raw_lines()
        .first()
        .and_then(|line| syntax::keyword(line))
        .map(|kw| kw.prefix)
        .or_else(|| format_prefix(class))
        .unwrap_or(fallback);
    out.push(format!("{}DATA | {}", prefix, cells.join(SEPARATOR)));
}

/// Indentation and comment marker of the class's FORMAT line.
fn format_prefix(class: &Class) -> Option<&str> {
    class
        .format_lines
        .iter()
        .find_map(|line| syntax::keyword(line))
        .map(|kw| kw.prefix)
}

fn document_prefix(doc: &Document) -> &str {
    doc.classes
        .iter()
        .find_map(format_prefix)
        .unwrap_or(FALLBACK_INDENT)
}

/// Row addresses of every class merged into source order. A row without an
/// origin follows the row before it in its own class.
fn source_order(doc: &Document) -> Vec<(usize, usize)> {
    let mut keyed = Vec::new();
    for (ci, class) in doc.classes.iter().enumerate() {
        let mut anchor = 0;
        for (ri, row) in class.rows().iter().enumerate() {
            if let Some(origin) = row.origin() {
                anchor = anchor.max(origin);
            }
            keyed.push(((anchor, ci, ri), (ci, ri)));
        }
    }
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, at)| at).collect()
}
