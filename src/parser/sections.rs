//! Placement of verbatim text while a document is being built.
//!
//! Every parser feeds the lines it does not interpret to [`SectionBuilder`],
//! which files them into the right bucket of the document or of the class
//! that currently owns the text, so the writer can put them back where they
//! came from.

use crate::detect::Kind;
use crate::model::{Class, ClassId, Document, Row};

/// Where verbatim text goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// No class yet: document head.
    Head,
    /// After a class marker: `pre_format`.
    Header,
    /// After the FORMAT block: `pre_data`.
    Format,
    /// After at least one row: pending, attached to the next row or closed
    /// into `post_data`.
    Rows,
    /// After `END_DATA`: pending, becomes the next class's `pre_class`.
    Closed,
}

pub(crate) struct SectionBuilder {
    doc: Document,
    phase: Phase,
    pending: Vec<String>,
    /// The class that owns verbatim text.
    current: Option<usize>,
    /// Class and index of the last row, for continuation lines.
    last_row: Option<(usize, usize)>,
}

impl SectionBuilder {
    pub fn new(kind: Kind) -> Self {
        Self {
            doc: Document::new(kind),
            phase: Phase::Head,
            pending: Vec::new(),
            current: None,
            last_row: None,
        }
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_class(&self) -> Option<&Class> {
        self.current.map(|i| &self.doc.classes[i])
    }

    pub fn current_class_mut(&mut self) -> Option<&mut Class> {
        self.current.map(|i| &mut self.doc.classes[i])
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_class().map(|c| c.name.as_str())
    }

    pub fn class_mut(&mut self, index: usize) -> &mut Class {
        &mut self.doc.classes[index]
    }

    /// A verbatim line that belongs wherever the text cursor is.
    pub fn text(&mut self, line: &str) {
        let line = line.to_string();
        match (self.phase, self.current) {
            (Phase::Head, _) | (_, None) => self.doc.head.push(line),
            (Phase::Header, Some(i)) => self.doc.classes[i].pre_format.push(line),
            (Phase::Format, Some(i)) => self.doc.classes[i].pre_data.push(line),
            (Phase::Rows | Phase::Closed, Some(_)) => self.pending.push(line),
        }
    }

    /// Start a new class that owns the following text.
    pub fn open_class(&mut self, class: Class) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let index = self.add_class(class);
        match (self.phase, self.current) {
            (Phase::Closed, _) => self.doc.classes[index].pre_class = pending,
            (_, Some(prev)) => self.doc.classes[prev].post_data.extend(pending),
            (_, None) => self.doc.head.extend(pending),
        }
        self.current = Some(index);
        self.phase = Phase::Header;
        self.last_row = None;
        index
    }

    /// Add a class without moving the text cursor.
    pub fn add_class(&mut self, class: Class) -> usize {
        self.doc.classes.push(class);
        self.doc.classes.len() - 1
    }

    /// A line of the FORMAT block. Before the first row it lands in the
    /// class's format bucket; a FORMAT between rows is ordinary text.
    pub fn format_line(&mut self, line: &str) {
        match (self.phase, self.current) {
            (Phase::Header | Phase::Format, Some(i)) => {
                self.doc.classes[i].format_lines.push(line.to_string());
                self.phase = Phase::Format;
            }
            _ => self.text(line),
        }
    }

    /// Attach a row to `target`. Text seen since the previous row travels
    /// with it; after `END_DATA` the footer already captured moves ahead of
    /// the row so the source order survives.
    pub fn push_row(&mut self, target: usize, mut row: Row) {
        let mut leading = Vec::new();
        if self.phase == Phase::Closed {
            if let Some(i) = self.current {
                leading.append(&mut self.doc.classes[i].post_data);
            }
        }
        leading.append(&mut self.pending);
        row.set_leading(leading);
        row.owner = Some(ClassId(target));

        let index = self.doc.classes[target].push_parsed(row);
        self.last_row = Some((target, index));
        self.phase = Phase::Rows;
    }

    /// Extend the last row with a continuation line.
    pub fn continue_row(&mut self, line: &str, values: Vec<String>) -> bool {
        let Some((class, _)) = self.last_row else {
            return false;
        };
        match self.doc.classes[class].last_row_mut() {
            Some(row) => {
                row.continue_with(line, values);
                true
            }
            None => false,
        }
    }

    /// An `END_DATA` marker closes the data block of the current class.
    pub fn end_data(&mut self, line: &str) {
        let Some(i) = self.current else {
            self.text(line);
            return;
        };
        let class = &mut self.doc.classes[i];
        class.post_data.append(&mut self.pending);
        class.post_data.push(line.to_string());
        self.phase = Phase::Closed;
        self.last_row = None;
    }

    /// Close the last section and align every row with its class fields.
    pub fn finish(mut self) -> Document {
        let pending = std::mem::take(&mut self.pending);
        match self.current {
            Some(i) => self.doc.classes[i].post_data.extend(pending),
            None => self.doc.head.extend(pending),
        }
        for class in &mut self.doc.classes {
            class.map_rows();
        }
        self.doc
    }
}
