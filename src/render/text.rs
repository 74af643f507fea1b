//! Plain-text summary: one aligned table per class.

use crate::render::Renderer;
use anyhow::Result;
use tooldat::{Class, Document, Row};

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, doc: &Document) -> Result<String> {
        let rows: usize = doc.classes.iter().map(|c| c.rows().len()).sum();
        let mut out = format!(
            "kind: {}\nunits: {}\nclasses: {}\nrows: {}\n",
            doc.kind,
            doc.units,
            doc.classes.len(),
            rows
        );
        for class in &doc.classes {
            out.push('\n');
            out.push_str(&render_class(class));
        }
        Ok(out)
    }
}

fn render_class(class: &Class) -> String {
    let mut out = class.display_header();
    if class.is_synthetic() {
        out.push_str(" [synthetic]");
    }
    out.push('\n');
    let rows: Vec<&Row> = class.rows().iter().collect();
    out.push_str(&table(class.fields(), &rows));
    out
}

/// Aligned table of `rows` under a header of `fields`, indented two spaces.
pub fn table(fields: &[String], rows: &[&Row]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let mut widths: Vec<usize> = fields.iter().map(|f| f.chars().count()).collect();
    for row in rows {
        for (width, field) in widths.iter_mut().zip(fields) {
            *width = (*width).max(row.get(field).chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<&str> = fields.iter().map(String::as_str).collect();
    push_line(&mut out, &header, &widths);
    for row in rows {
        let cells: Vec<&str> = fields.iter().map(|f| row.get(f)).collect();
        push_line(&mut out, &cells, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str("  ");
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use tooldat::{parse_str, Kind, ParseOptions};

    #[test]
    fn renders_aligned_tables() {
        let doc = parse_str(
            "#CLASS END_MILL\nFORMAT LIBRF DIA\nDATA | ugt0201_001 | 10\n",
            Kind::Tools,
            &ParseOptions::default(),
        )
        .unwrap();
        let out = TextRenderer.render(&doc).unwrap();
        assert!(out.starts_with("kind: Tools\nunits: Unknown\nclasses: 1\nrows: 1\n"));
        assert!(out.contains("END_MILL (1)\n"));
        assert!(out.contains("  LIBRF        DIA\n"));
        assert!(out.contains("  ugt0201_001  10\n"));
    }
}
