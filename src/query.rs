//! Read-only lookups used by the editing views: the holder/shank index grid,
//! the steps of one holder or shank, and the segments of one tool.

use crate::model::{Document, Row, RowRef};
use crate::parser::{holder, shank};

/// Earlier name of the synthetic index class, still accepted on lookup.
pub const LEGACY_INDEX_CLASS: &str = "GENERAL";

fn is_index_class(name: &str) -> bool {
    [holder::INDEX_CLASS, shank::INDEX_CLASS, LEGACY_INDEX_CLASS]
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
}

/// Position of the index class, by synthetic or legacy name.
fn index_class(doc: &Document) -> Option<usize> {
    doc.classes.iter().position(|c| is_index_class(&c.name))
}

/// Rows of the index class whose `RTYPE` is `1`.
pub fn index_rows(doc: &Document) -> Vec<(RowRef, &Row)> {
    let Some(id) = index_class(doc) else {
        return Vec::new();
    };
    doc.rows()
        .filter(|(at, row)| at.class.0 == id && row.get("RTYPE") == "1")
        .collect()
}

/// Shape rows (`RTYPE 2`) for one `LIBRF`, outside the index class, ordered
/// by `SEQ`.
pub fn shape_rows_for<'a>(doc: &'a Document, librf: &str) -> Vec<(RowRef, &'a Row)> {
    if librf.trim().is_empty() {
        return Vec::new();
    }
    let index = index_class(doc);
    let rows = doc
        .rows()
        .filter(|(at, _)| Some(at.class.0) != index)
        .filter(|(_, row)| row.get("RTYPE") == "2" && row.get("LIBRF").eq_ignore_ascii_case(librf))
        .collect();
    by_seq(rows)
}

/// Segments of one segmented tool, ordered by `SEQ`.
pub fn segment_rows_for<'a>(doc: &'a Document, librf: &str) -> Vec<(RowRef, &'a Row)> {
    if librf.trim().is_empty() {
        return Vec::new();
    }
    let rows = doc
        .rows()
        .filter(|(_, row)| row.get("LIBRF").eq_ignore_ascii_case(librf))
        .collect();
    by_seq(rows)
}

/// Stable sort by numeric `SEQ`; rows without a number go last.
fn by_seq(mut rows: Vec<(RowRef, &Row)>) -> Vec<(RowRef, &Row)> {
    rows.sort_by_key(|(_, row)| {
        row.get("SEQ")
            .trim()
            .parse::<i64>()
            .map_or((1, 0), |n| (0, n))
    });
    rows
}
