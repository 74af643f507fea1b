//! `holder_database.dat`: index rows (`RTYPE 1`) list holders, shape rows
//! (`RTYPE 2`) describe their steps.

use super::indexed::Buckets;
use super::Grouping;
use crate::detect::Kind;
use crate::error::ParseError;
use crate::model::Document;

pub const INDEX_CLASS: &str = "HOLDER_INDEX";
pub const SHAPE_CLASS: &str = "HOLDER_SHAPE";

const BUCKETS: Buckets = Buckets {
    index: INDEX_CLASS,
    shape: SHAPE_CLASS,
};

pub fn parse<S: AsRef<str>>(lines: &[S], grouping: Grouping) -> Result<Document, ParseError> {
    super::parse_grouped(lines, Kind::Holders, BUCKETS, grouping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layout;

    const SPLIT: &str = "\
# holder_database.dat
FORMAT LIBRF RTYPE HTYPE STYPE SEQ DIAM LENGTH TAPER CRAD MTS
DATA | HLD0_00001 | 1 | 01 | | | | | | | HSK63
DATA | HLD0_00001 | 2 | | | 1 | 40.0 | 20.0 | 0.0 | 0.0 |
DATA | HLD0_00001 | 2 | | | 2 | 63.0 | 26.0 | 0.0 | 0.0 |
";

    const MARKED: &str = "\
FORMAT LIBRF RTYPE HTYPE MTS
DATA | HLD0_00001 | 1 | 01 | HSK63
# CLASS HLD0_00001
# FORMAT LIBRF RTYPE SEQ DIAM LENGTH
# DATA | HLD0_00001 | 2 | 1 | 40.0 | 20.0
# END_DATA
";

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn auto_without_markers_routes_by_rtype() {
        let doc = parse(&lines(SPLIT), Grouping::Auto).unwrap();
        assert_eq!(doc.layout, Layout::Interleaved);
        assert_eq!(doc.class_by_name(INDEX_CLASS).unwrap().rows().len(), 1);
        assert_eq!(doc.class_by_name(SHAPE_CLASS).unwrap().rows().len(), 2);
    }

    #[test]
    fn auto_with_markers_uses_classes() {
        let doc = parse(&lines(MARKED), Grouping::Auto).unwrap();
        assert_eq!(doc.layout, Layout::Sectioned);
        assert_eq!(doc.classes.len(), 2);
        assert_eq!(doc.classes[0].name, INDEX_CLASS);
        assert_eq!(doc.classes[1].rows()[0].get("DIAM"), "40.0");
    }

    #[test]
    fn forced_discriminator_ignores_markers() {
        let doc = parse(&lines(MARKED), Grouping::Discriminator).unwrap();
        assert_eq!(doc.classes.len(), 2);
        let shape = doc.class_by_name(SHAPE_CLASS).unwrap();
        assert_eq!(shape.rows()[0].get("SEQ"), "1");
    }
}
