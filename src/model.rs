//! Document model shared by every parser and the writer.
//!
//! Ownership runs strictly downwards: a [`Document`] owns its [`Class`]es and
//! a class owns its [`Row`]s. The way back up is an index handle
//! ([`ClassId`]), never a shared pointer. Modification state is tracked on
//! rows and classes and read upwards by [`Document::is_modified`].

use crate::detect::Kind;
use log::debug;
use std::collections::BTreeMap;
use std::fmt;

/// Unit label used until a `# Unit:` comment says otherwise.
pub const UNKNOWN_UNITS: &str = "Unknown";

/// Complete parsed database file.
#[derive(Debug)]
pub struct Document {
    pub kind: Kind,
    /// Verbatim lines before the first class or schema declaration.
    pub head: Vec<String>,
    pub units: String,
    pub classes: Vec<Class>,
    pub layout: Layout,
    pub line_ending: LineEnding,
    /// Whether the source text ended with a line break.
    pub final_newline: bool,
}

/// How the writer orders rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Rows are written class by class.
    #[default]
    Sectioned,
    /// Rows of all classes are merged back into source order. Used when the
    /// parser split one physical block into several synthetic classes.
    Interleaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Index of a class inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub usize);

/// Address of a row inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRef {
    pub class: ClassId,
    pub row: usize,
}

impl Document {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            head: Vec::new(),
            units: UNKNOWN_UNITS.to_string(),
            classes: Vec::new(),
            layout: Layout::default(),
            line_ending: LineEnding::default(),
            final_newline: true,
        }
    }

    pub fn class(&self, id: ClassId) -> Option<&Class> {
        self.classes.get(id.0)
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut Class> {
        self.classes.get_mut(id.0)
    }

    /// Find a class by name, ignoring case.
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .map(ClassId)
    }

    pub fn class_by_name(&self, name: &str) -> Option<&Class> {
        self.class_id(name).and_then(|id| self.class(id))
    }

    pub fn row(&self, at: RowRef) -> Option<&Row> {
        self.class(at.class).and_then(|c| c.rows.get(at.row))
    }

    pub fn row_mut(&mut self, at: RowRef) -> Option<&mut Row> {
        self.class_mut(at.class).and_then(|c| c.rows.get_mut(at.row))
    }

    /// Every row of every class, in class order.
    pub fn rows(&self) -> impl Iterator<Item = (RowRef, &Row)> {
        self.classes.iter().enumerate().flat_map(|(ci, class)| {
            class.rows.iter().enumerate().map(move |(ri, row)| {
                (
                    RowRef {
                        class: ClassId(ci),
                        row: ri,
                    },
                    row,
                )
            })
        })
    }

    /// Set a field on the addressed row. `None` when the row does not exist.
    pub fn set(&mut self, at: RowRef, field: &str, value: &str) -> Option<SetOutcome> {
        self.row_mut(at).map(|row| row.set(field, value))
    }

    /// Append an empty row to a class, tagged with its owner.
    pub fn new_row(&mut self, class: ClassId) -> Option<RowRef> {
        let target = self.class_mut(class)?;
        let mut row = Row::new();
        row.owner = Some(class);
        target.rows.push(row);
        target.restructured = true;
        Some(RowRef {
            class,
            row: target.rows.len() - 1,
        })
    }

    pub fn is_modified(&self) -> bool {
        self.classes.iter().any(Class::is_modified)
    }

    /// Forget every modification, typically after a successful save.
    pub fn mark_saved(&mut self) {
        for class in &mut self.classes {
            class.mark_saved();
        }
    }
}

/// One schema section: `CLASS`, `FORMAT`, `DATA` rows and surrounding text.
#[derive(Debug, Default)]
pub struct Class {
    pub name: String,
    fields: Vec<String>,
    rows: Vec<Row>,
    /// Verbatim lines between the previous section and the class marker.
    pub pre_class: Vec<String>,
    /// The literal `CLASS` marker line; `None` for synthetic classes.
    pub class_line: Option<String>,
    pub pre_format: Vec<String>,
    /// The `FORMAT` line, its continuation lines and comments inside them.
    pub format_lines: Vec<String>,
    pub pre_data: Vec<String>,
    /// Verbatim lines after the last row, `END_DATA` included.
    pub post_data: Vec<String>,
    synthetic: bool,
    restructured: bool,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A class created by a parser rather than declared by a marker.
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self {
            synthetic: true,
            ..Self::new(name)
        }
    }

    /// A class opened by a `CLASS` marker line.
    pub(crate) fn from_marker(line: &str, name: &str) -> Self {
        Self {
            class_line: Some(line.to_string()),
            ..Self::new(name.trim())
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "(Unnamed Class)"
        } else {
            &self.name
        }
    }

    /// Tree label such as `END_MILL (12)`.
    pub fn display_header(&self) -> String {
        format!("{} ({})", self.display_name(), self.rows.len())
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.eq_ignore_ascii_case(field))
    }

    /// Append field names. The list only ever grows.
    pub(crate) fn extend_fields(&mut self, fields: impl IntoIterator<Item = String>) {
        for field in fields {
            if self.has_field(&field) {
                debug!("class {}: field {} declared twice", self.display_name(), field);
            }
            self.fields.push(field);
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable access to existing rows; adding or removing rows goes through
    /// the methods that record the structural change.
    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub(crate) fn push_parsed(&mut self, row: Row) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub(crate) fn last_row_mut(&mut self) -> Option<&mut Row> {
        self.rows.last_mut()
    }

    pub fn remove_row(&mut self, index: usize) -> Option<Row> {
        if index >= self.rows.len() {
            return None;
        }
        self.restructured = true;
        Some(self.rows.remove(index))
    }

    /// Move a row to a new position. Returns false when either index is out
    /// of range.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rows.len() || to >= self.rows.len() {
            return false;
        }
        if from != to {
            let row = self.rows.remove(from);
            self.rows.insert(to, row);
            self.restructured = true;
        }
        true
    }

    /// Blank every field of a row. The writer drops blank rows, so this is
    /// how a row is deleted while keeping indices stable.
    pub fn soft_delete(&mut self, index: usize) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        for field in &self.fields {
            let _ = row.set(field, "");
        }
        true
    }

    /// Renumber `field` as 1..n in row order. Returns how many rows changed.
    pub fn resequence(&mut self, field: &str) -> usize {
        let mut changed = 0;
        for (i, row) in self.rows.iter_mut().enumerate() {
            if row.set(field, &(i + 1).to_string()).is_changed() {
                changed += 1;
            }
        }
        changed
    }

    pub fn is_modified(&self) -> bool {
        self.restructured || self.rows.iter().any(Row::is_modified)
    }

    pub(crate) fn mark_saved(&mut self) {
        self.restructured = false;
        for row in &mut self.rows {
            row.modified = false;
        }
    }

    /// Align every row with the field list: pad short rows, drop extra
    /// values, rebuild the maps.
    pub(crate) fn map_rows(&mut self) {
        for row in &mut self.rows {
            row.map_to_fields(&self.fields);
        }
    }
}

/// Result of [`Row::set`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Unchanged,
    Changed,
}

impl SetOutcome {
    pub fn is_changed(self) -> bool {
        self == SetOutcome::Changed
    }
}

/// Notification passed to row observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

type Observer = Box<dyn FnMut(&RowChange)>;

/// One data record.
#[derive(Default)]
pub struct Row {
    values: Vec<String>,
    map: FieldMap,
    /// Field lookups as of parse time, one per field.
    baseline: Vec<String>,
    raw_lines: Vec<String>,
    leading: Vec<String>,
    origin: Option<usize>,
    pub(crate) owner: Option<ClassId>,
    modified: bool,
    observers: Vec<Observer>,
}

impl Row {
    /// A fresh row with no source text.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn parsed(line: &str, values: Vec<String>, origin: usize) -> Self {
        Self {
            values,
            raw_lines: vec![line.to_string()],
            origin: Some(origin),
            ..Self::default()
        }
    }

    /// Add a continuation line and its values.
    pub(crate) fn continue_with(&mut self, line: &str, values: Vec<String>) {
        self.raw_lines.push(line.to_string());
        self.values.extend(values);
    }

    pub(crate) fn set_leading(&mut self, lines: Vec<String>) {
        self.leading = lines;
    }

    pub(crate) fn map_to_fields(&mut self, fields: &[String]) {
        self.values.resize(fields.len(), String::new());
        self.map = FieldMap::default();
        for (field, value) in fields.iter().zip(&self.values) {
            self.map.insert(field, value.clone());
        }
        self.baseline = fields
            .iter()
            .map(|f| self.map.get(f).unwrap_or("").to_string())
            .collect();
    }

    /// Value of a field, empty when the field is unknown.
    pub fn get(&self, field: &str) -> &str {
        self.map.get(field).unwrap_or("")
    }

    /// Set a field. Setting the current value again is a no-op that neither
    /// notifies observers nor marks the row modified.
    pub fn set(&mut self, field: &str, value: &str) -> SetOutcome {
        let old = self.get(field);
        if old == value {
            return SetOutcome::Unchanged;
        }
        let change = RowChange {
            field: field.to_string(),
            old: old.to_string(),
            new: value.to_string(),
        };
        self.map.insert(field, value.to_string());
        self.modified = true;
        for observer in &mut self.observers {
            observer(&change);
        }
        SetOutcome::Changed
    }

    /// Register a callback invoked after every effective [`Row::set`].
    pub fn subscribe(&mut self, observer: impl FnMut(&RowChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn map(&self) -> &FieldMap {
        &self.map
    }

    /// Values as parsed, index-aligned with the class fields.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// What [`Row::get`] returned for each field right after parsing. A
    /// field declared twice reads the later column in both places.
    pub(crate) fn baseline(&self) -> &[String] {
        &self.baseline
    }

    pub fn raw_lines(&self) -> &[String] {
        &self.raw_lines
    }

    /// Verbatim text that sat between the previous row and this one.
    pub fn leading(&self) -> &[String] {
        &self.leading
    }

    /// 1-based line number of the row's `DATA` line.
    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    pub fn owner(&self) -> Option<ClassId> {
        self.owner
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// True when every listed field is blank.
    pub fn is_blank(&self, fields: &[String]) -> bool {
        fields.iter().all(|f| self.get(f).trim().is_empty())
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("values", &self.values)
            .field("map", &self.map)
            .field("raw_lines", &self.raw_lines)
            .field("origin", &self.origin)
            .field("owner", &self.owner)
            .field("modified", &self.modified)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Field name to value mapping with case-insensitive keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(&field.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn insert(&mut self, field: &str, value: String) -> Option<String> {
        self.0.insert(field.to_ascii_uppercase(), value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(&field.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample_class() -> Class {
        let mut class = Class::new("END_MILL");
        class.extend_fields(fields(&["T", "ST", "DIA"]));
        class.push_parsed(Row::parsed(
            "DATA | 1 | 2 | 10.0",
            vec!["1".into(), "2".into(), "10.0".into()],
            4,
        ));
        class.map_rows();
        class
    }

    #[test]
    fn map_pads_and_truncates() {
        let mut short = Row::parsed("DATA | 1", vec!["1".into()], 1);
        short.map_to_fields(&fields(&["A", "B", "C"]));
        assert_eq!(short.values(), ["1", "", ""]);
        assert_eq!(short.get("C"), "");
        assert!(short.map().contains("C"));

        let mut long = Row::parsed("DATA | 1 | 2 | 3", vec!["1".into(), "2".into(), "3".into()], 1);
        long.map_to_fields(&fields(&["A"]));
        assert_eq!(long.values(), ["1"]);
        assert_eq!(long.map().len(), 1);
    }

    #[test]
    fn get_is_case_insensitive() {
        let class = sample_class();
        let row = &class.rows()[0];
        assert_eq!(row.get("dia"), "10.0");
        assert_eq!(row.get("DIA"), "10.0");
        assert_eq!(row.get("missing"), "");
    }

    #[test]
    fn set_same_value_notifies_once() {
        let mut class = sample_class();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let row = &mut class.rows_mut()[0];
        row.subscribe(move |change| sink.borrow_mut().push(change.clone()));

        assert_eq!(row.set("DIA", "5.0"), SetOutcome::Changed);
        assert_eq!(row.set("DIA", "5.0"), SetOutcome::Unchanged);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].old, "10.0");
        assert_eq!(seen[0].new, "5.0");
    }

    #[test]
    fn unchanged_set_keeps_document_clean() {
        let mut doc = Document::new(Kind::Tools);
        doc.classes.push(sample_class());
        let at = RowRef {
            class: ClassId(0),
            row: 0,
        };
        assert_eq!(doc.set(at, "DIA", "10.0"), Some(SetOutcome::Unchanged));
        assert!(!doc.is_modified());

        assert_eq!(doc.set(at, "DIA", "12.5"), Some(SetOutcome::Changed));
        assert!(doc.classes[0].is_modified());
        assert!(doc.is_modified());

        doc.mark_saved();
        assert!(!doc.is_modified());
    }

    #[test]
    fn new_row_sets_owner_and_marks_structure() {
        let mut doc = Document::new(Kind::Tools);
        doc.classes.push(sample_class());
        let at = doc.new_row(ClassId(0)).unwrap();
        assert_eq!(at.row, 1);
        assert_eq!(doc.row(at).unwrap().owner(), Some(ClassId(0)));
        assert!(doc.row(at).unwrap().raw_lines().is_empty());
        assert!(doc.is_modified());
        assert!(doc.new_row(ClassId(7)).is_none());
    }

    #[test]
    fn soft_delete_blanks_every_field() {
        let mut class = sample_class();
        assert!(class.soft_delete(0));
        assert!(class.rows()[0].is_blank(class.fields()));
        assert!(!class.soft_delete(3));
    }

    #[test]
    fn move_and_resequence() {
        let mut class = Class::new("SEGMENTS");
        class.extend_fields(fields(&["SEQ", "LEN"]));
        for (seq, len) in [("1", "a"), ("2", "b"), ("3", "c")] {
            class.push_parsed(Row::parsed("", vec![seq.into(), len.into()], 1));
        }
        class.map_rows();

        assert!(class.move_row(2, 0));
        assert_eq!(class.resequence("SEQ"), 3);
        let order: Vec<_> = class.rows().iter().map(|r| (r.get("SEQ"), r.get("LEN"))).collect();
        assert_eq!(order, [("1", "c"), ("2", "a"), ("3", "b")]);
        assert!(!class.move_row(0, 9));
    }

    #[test]
    fn display_names() {
        let class = sample_class();
        assert_eq!(class.display_header(), "END_MILL (1)");
        assert_eq!(Class::new("  ").display_name(), "(Unnamed Class)");
    }
}
