//! `shank_database.dat`: same layout as holders, with shank fields.

use super::indexed::Buckets;
use super::Grouping;
use crate::detect::Kind;
use crate::error::ParseError;
use crate::model::Document;

pub const INDEX_CLASS: &str = "SHANK_INDEX";
pub const SHAPE_CLASS: &str = "SHANK_SHAPE";

const BUCKETS: Buckets = Buckets {
    index: INDEX_CLASS,
    shape: SHAPE_CLASS,
};

pub fn parse<S: AsRef<str>>(lines: &[S], grouping: Grouping) -> Result<Document, ParseError> {
    super::parse_grouped(lines, Kind::Shanks, BUCKETS, grouping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;

    #[test]
    fn marker_classes_with_top_level_index() {
        let text = "\
# shank_database.dat
#FORMAT LIBRF RTYPE STYPE
#DATA | SHK_01 | 1 | 1
#END_DATA

#CLASS SHK_01
#FORMAT LIBRF RTYPE SEQ DIAM LENGTH TAPER
#DATA | SHK_01 | 2 | 1 | 16.0 | 48.0 | 0.0
#DATA | SHK_01 | 2 | 2 | 12.0 | 30.0 | 2.5
#END_DATA
";
        let lines: Vec<&str> = text.lines().collect();
        let doc = parse(&lines, Grouping::Auto).unwrap();
        assert_eq!(doc.head, ["# shank_database.dat"]);
        assert_eq!(doc.classes[0].name, INDEX_CLASS);
        assert_eq!(doc.classes[0].rows().len(), 1);
        assert_eq!(doc.classes[1].rows()[1].get("TAPER"), "2.5");
        assert_eq!(doc.classes[1].pre_class, [""]);
    }

    #[test]
    fn data_without_format_fails() {
        let lines = ["# CLASS X", "", "DATA | a | 1"];
        let err = parse(&lines, Grouping::Auto).unwrap_err();
        assert_eq!(err.fault, Fault::DataBeforeFormat);
        assert_eq!(err.line, 3);
        assert_eq!(err.class.as_deref(), Some("X"));
    }
}
