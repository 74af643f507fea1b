//! JSON renderer: structured output for tooling integration.

use crate::render::Renderer;
use anyhow::Result;
use serde::Serialize;
use tooldat::{Class, Document, Layout, Row};

pub struct JsonRenderer;

#[derive(Serialize)]
struct DocumentView<'a> {
    kind: String,
    units: &'a str,
    layout: &'static str,
    head: &'a [String],
    classes: Vec<ClassView<'a>>,
}

#[derive(Serialize)]
struct ClassView<'a> {
    name: &'a str,
    synthetic: bool,
    fields: &'a [String],
    rows: Vec<RowView<'a>>,
}

#[derive(Serialize)]
struct RowView<'a> {
    /// Source line of the `DATA` keyword.
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    /// Values in field order.
    values: Vec<&'a str>,
}

impl<'a> ClassView<'a> {
    fn new(class: &'a Class) -> Self {
        Self {
            name: &class.name,
            synthetic: class.is_synthetic(),
            fields: class.fields(),
            rows: class.rows().iter().map(|row| RowView::new(class, row)).collect(),
        }
    }
}

impl<'a> RowView<'a> {
    fn new(class: &'a Class, row: &'a Row) -> Self {
        Self {
            line: row.origin(),
            values: class.fields().iter().map(|f| row.get(f)).collect(),
        }
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, doc: &Document) -> Result<String> {
        let view = DocumentView {
            kind: doc.kind.to_string(),
            units: &doc.units,
            layout: match doc.layout {
                Layout::Sectioned => "sectioned",
                Layout::Interleaved => "interleaved",
            },
            head: &doc.head,
            classes: doc.classes.iter().map(ClassView::new).collect(),
        };
        let mut out = serde_json::to_string_pretty(&view)?;
        out.push('\n');
        Ok(out)
    }
}
