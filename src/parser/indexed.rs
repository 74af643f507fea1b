//! RTYPE routing for holder and shank files without `CLASS` markers.
//!
//! The whole file is one schema block. Each `DATA` row is routed by its
//! `RTYPE` value into a synthetic index class (`1`) or shape class (`2`).
//! Rows are routed once complete, so continuation lines count.

use super::sections::SectionBuilder;
use crate::detect::Kind;
use crate::error::{Fault, ParseError};
use crate::model::{Class, Document, Layout, Row};
use crate::syntax::{self, Keyword};
use log::debug;

pub(crate) const INDEX_RTYPE: &str = "1";
pub(crate) const SHAPE_RTYPE: &str = "2";

/// Names of the two synthetic classes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Buckets {
    pub index: &'static str,
    pub shape: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Format,
    Data,
}

/// A `DATA` row still collecting continuation lines.
struct OpenRow {
    lines: Vec<String>,
    values: Vec<String>,
    origin: usize,
}

struct IndexedParser {
    sections: SectionBuilder,
    buckets: Buckets,
    /// The most recent FORMAT field list.
    fields: Vec<String>,
    index: Option<usize>,
    shape: Option<usize>,
    open: Option<OpenRow>,
    mode: Mode,
}

pub(crate) fn parse<S: AsRef<str>>(
    lines: &[S],
    kind: Kind,
    buckets: Buckets,
) -> Result<Document, ParseError> {
    let mut p = IndexedParser {
        sections: SectionBuilder::new(kind),
        buckets,
        fields: Vec::new(),
        index: None,
        shape: None,
        open: None,
        mode: Mode::Idle,
    };
    for (i, line) in lines.iter().enumerate() {
        p.process_line(i + 1, line.as_ref())?;
    }
    p.close_row();

    let mut doc = p.sections.finish();
    doc.layout = Layout::Interleaved;
    Ok(doc)
}

impl IndexedParser {
    fn process_line(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        if self.mode == Mode::Data && !syntax::is_comment(line) {
            if let Some(payload) = syntax::continuation(line) {
                if let Some(open) = self.open.as_mut() {
                    open.lines.push(line.to_string());
                    open.values.extend(syntax::split_values(payload));
                    return Ok(());
                }
            }
        }
        self.close_row();

        match syntax::keyword(line) {
            Some(kw) if kw.keyword == Keyword::Format => {
                self.index_class();
                self.fields = syntax::field_tokens(kw.rest);
                self.sections.format_line(line);
                self.mode = Mode::Format;
            }
            Some(kw) if kw.keyword == Keyword::Data => {
                if self.fields.is_empty() {
                    let class = self.index.map(|_| self.buckets.index);
                    return Err(ParseError::new(number, class, Fault::DataBeforeFormat));
                }
                let payload = kw.rest.trim_start();
                if !payload.starts_with('|') {
                    return Err(ParseError::new(
                        number,
                        Some(self.buckets.index),
                        Fault::MissingSeparator,
                    ));
                }
                self.open = Some(OpenRow {
                    lines: vec![line.to_string()],
                    values: syntax::split_values(payload),
                    origin: number,
                });
                self.mode = Mode::Data;
            }
            Some(kw) if kw.keyword == Keyword::EndData => {
                self.sections.end_data(line);
                self.mode = Mode::Idle;
            }
            _ => self.other_line(line),
        }
        Ok(())
    }

    /// Blank lines, comments, prose, and `CLASS` markers, which carry no
    /// meaning in this mode.
    fn other_line(&mut self, line: &str) {
        if self.mode == Mode::Format {
            if syntax::is_blank(line) || syntax::is_comment(line) {
                self.sections.format_line(line);
                return;
            }
            let more = syntax::field_tokens(line);
            if !more.is_empty() {
                self.fields.extend(more);
                self.sections.format_line(line);
                return;
            }
        }
        self.mode = Mode::Idle;
        self.sections.text(line);
    }

    /// The index class, opened at the first FORMAT so it owns the schema text.
    fn index_class(&mut self) -> usize {
        match self.index {
            Some(i) => i,
            None => {
                let i = self.sections.open_class(Class::synthetic(self.buckets.index));
                self.index = Some(i);
                i
            }
        }
    }

    fn shape_class(&mut self) -> usize {
        match self.shape {
            Some(i) => i,
            None => {
                let i = self.sections.add_class(Class::synthetic(self.buckets.shape));
                self.shape = Some(i);
                i
            }
        }
    }

    /// Route the finished row by its RTYPE value.
    fn close_row(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        let rtype = self
            .fields
            .iter()
            .position(|f| f == "RTYPE")
            .and_then(|i| open.values.get(i))
            .map(|v| v.trim())
            .unwrap_or("");

        let target = match rtype {
            INDEX_RTYPE => self.index_class(),
            SHAPE_RTYPE => self.shape_class(),
            other => {
                debug!(
                    "line {}: dropping row with RTYPE '{}' from {} and {}",
                    open.origin, other, self.buckets.index, self.buckets.shape
                );
                for line in &open.lines {
                    self.sections.text(line);
                }
                return;
            }
        };

        let class = self.sections.class_mut(target);
        if class.fields().is_empty() {
            class.extend_fields(self.fields.iter().cloned());
        }

        let mut lines = open.lines.into_iter();
        let first = lines.next().unwrap_or_default();
        let mut row = Row::parsed(&first, open.values, open.origin);
        for line in lines {
            row.continue_with(&line, Vec::new());
        }
        self.sections.push_row(target, row);
    }
}
