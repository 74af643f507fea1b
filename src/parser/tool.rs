//! `tool_database.dat`: one class per `CLASS` marker.

use super::blocks::{self, Policy, TopLevel};
use crate::detect::Kind;
use crate::error::ParseError;
use crate::model::Document;

const POLICY: Policy = Policy {
    commented_head_keywords: false,
    top_level: TopLevel::Reject,
};

pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Document, ParseError> {
    blocks::parse(lines, Kind::Tools, POLICY)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
#####################################################
# tool_database.dat
#
# FORMAT LIBRF T ST UGT UGST DIA HEI
# DATA | ugt0201_001 | 02 | 01 | 1 | 1 | 10 | 75
#####################################################

#CLASS END_MILL
FORMAT LIBRF T ST UGT UGST DIA HEI
DATA | ugt0201_001 | 02 | 01 | 1 | 1 | 10 | 75
DATA | ugt0201_002 | 02 | 01 | 1 | 1 | 12 | 75

#CLASS DRILL
FORMAT LIBRF T ST DIA
       HEI
DATA | ugt0211_001 | 03 | 01 | 5.0
     | 60
";

    #[test]
    fn parses_classes_and_head() {
        let lines: Vec<&str> = SAMPLE.lines().collect();
        let doc = parse(&lines).unwrap();
        assert_eq!(doc.kind, Kind::Tools);
        assert_eq!(doc.head.len(), 7);
        assert_eq!(doc.classes.len(), 2);

        let mill = &doc.classes[0];
        assert_eq!(mill.display_header(), "END_MILL (2)");
        assert_eq!(mill.rows()[1].get("DIA"), "12");
        assert_eq!(mill.post_data, [""]);

        let drill = &doc.classes[1];
        assert_eq!(drill.fields().len(), 5);
        assert_eq!(drill.rows()[0].get("HEI"), "60");
        assert!(drill.pre_class.is_empty());
    }
}
