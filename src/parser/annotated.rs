//! Text-preserving state machine for the trackpoint and segmented-tool
//! dialects. Every non-data line is kept in the bucket it came from, since
//! editors only ever rewrite rows.

use super::sections::SectionBuilder;
use crate::detect::Kind;
use crate::error::{Fault, ParseError};
use crate::model::{Class, Document, Row};
use crate::syntax::{self, Keyword, KeywordLine};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeFirstClass,
    ClassHeader,
    /// The class has its FORMAT line, no rows yet.
    Format,
    Data,
    Footer,
}

struct AnnotatedParser {
    sections: SectionBuilder,
    commented_keywords: bool,
    state: State,
    units_found: bool,
}

/// Parse an annotated dialect. With `commented_keywords`, `#FORMAT`,
/// `#DATA` and `#END_DATA` are live; `#CLASS` always is.
pub(crate) fn parse<S: AsRef<str>>(
    lines: &[S],
    kind: Kind,
    commented_keywords: bool,
) -> Result<Document, ParseError> {
    let mut p = AnnotatedParser {
        sections: SectionBuilder::new(kind),
        commented_keywords,
        state: State::BeforeFirstClass,
        units_found: false,
    };
    for (i, line) in lines.iter().enumerate() {
        p.process_line(i + 1, line.as_ref())?;
    }
    Ok(p.sections.finish())
}

impl AnnotatedParser {
    fn process_line(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        let live = syntax::keyword(line)
            .filter(|kw| kw.keyword == Keyword::Class || !kw.is_commented() || self.commented_keywords);
        if let Some(kw) = live {
            return self.keyword_line(number, line, kw);
        }

        if self.state == State::Data && !syntax::is_comment(line) {
            if let Some(payload) = syntax::continuation(line) {
                if self.sections.continue_row(line, syntax::split_values(payload)) {
                    return Ok(());
                }
            }
        }

        match self.state {
            State::BeforeFirstClass => {
                if !self.units_found {
                    if let Some(units) = syntax::unit_label(line) {
                        self.sections.document_mut().units = units.to_string();
                        self.units_found = true;
                    }
                }
            }
            State::Data => self.state = State::Footer,
            _ => {}
        }
        self.sections.text(line);
        Ok(())
    }

    fn keyword_line(&mut self, number: usize, line: &str, kw: KeywordLine<'_>) -> Result<(), ParseError> {
        match kw.keyword {
            Keyword::Class => {
                self.sections.open_class(Class::from_marker(line, kw.rest));
                self.state = State::ClassHeader;
            }
            Keyword::EndData => {
                self.sections.end_data(line);
                if self.state != State::BeforeFirstClass {
                    self.state = State::Footer;
                }
            }
            Keyword::Format => {
                if self.state == State::ClassHeader {
                    if let Some(class) = self.sections.current_class_mut() {
                        class.extend_fields(syntax::field_tokens(kw.rest));
                    }
                    self.sections.format_line(line);
                    self.state = State::Format;
                } else {
                    debug!("line {}: extra FORMAT kept as text", number);
                    self.sections.text(line);
                }
            }
            Keyword::Data => {
                let name = self.sections.current_name().map(str::to_string);
                let fault = match self.state {
                    State::BeforeFirstClass => Some(Fault::DataBeforeClass),
                    State::ClassHeader => Some(Fault::DataBeforeFormat),
                    _ if !kw.rest.trim_start().starts_with('|') => Some(Fault::MissingSeparator),
                    _ => None,
                };
                if let Some(fault) = fault {
                    return Err(ParseError::new(number, name.as_deref(), fault));
                }
                let Some(target) = self.sections.current() else {
                    return Err(ParseError::new(number, None, Fault::DataBeforeClass));
                };
                let row = Row::parsed(line, syntax::split_values(kw.rest), number);
                self.sections.push_row(target, row);
                self.state = State::Data;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACKPOINTS: &str = "\
# trackpoint_database.dat
# Unit: Metric
# Units: Inch

#CLASS MILL
# milling trackpoints
FORMAT LIBRF DEFTYPE X Y
# ---
DATA | TP_001 | 1 | 0.0 | 0.0
# between
DATA | TP_002 | 1 | 5.0 | 0.0
#END_DATA

#CLASS DRILL
FORMAT LIBRF DEFTYPE X
DATA | TP_100 | 2 | 1.0
";

    fn run(text: &str, commented: bool) -> Result<Document, ParseError> {
        let lines: Vec<&str> = text.lines().collect();
        parse(&lines, Kind::Trackpoints, commented)
    }

    #[test]
    fn buckets_are_filled_in_order() {
        let doc = run(TRACKPOINTS, false).unwrap();
        assert_eq!(doc.units, "Metric");
        assert_eq!(doc.head.len(), 4);

        let mill = &doc.classes[0];
        assert_eq!(mill.class_line.as_deref(), Some("#CLASS MILL"));
        assert_eq!(mill.pre_format, ["# milling trackpoints"]);
        assert_eq!(mill.format_lines, ["FORMAT LIBRF DEFTYPE X Y"]);
        assert_eq!(mill.pre_data, ["# ---"]);
        assert_eq!(mill.rows()[1].leading(), ["# between"]);
        assert_eq!(mill.post_data, ["#END_DATA", ""]);
        assert_eq!(mill.rows()[0].owner(), Some(crate::model::ClassId(0)));

        let drill = &doc.classes[1];
        assert!(drill.pre_class.is_empty());
        assert_eq!(drill.rows()[0].get("X"), "1.0");
    }

    #[test]
    fn commented_keywords_follow_the_flag() {
        let text = "#CLASS S\n# FORMAT LIBRF SEQ SWEEP\n# DATA | T1 | 1 | 90\n# END_DATA\n";
        let doc = run(text, true).unwrap();
        assert_eq!(doc.classes[0].rows().len(), 1);
        assert_eq!(doc.classes[0].rows()[0].get("SWEEP"), "90");

        let doc = run(text, false).unwrap();
        assert!(doc.classes[0].fields().is_empty());
        assert_eq!(doc.classes[0].pre_format.len(), 3);
    }

    #[test]
    fn data_after_end_data_continues_class() {
        let doc = run("CLASS A\nFORMAT X\nDATA | 1\nEND_DATA\nDATA | 2\n# tail\n", false).unwrap();
        let class = &doc.classes[0];
        assert_eq!(class.rows().len(), 2);
        assert_eq!(class.rows()[1].leading(), ["END_DATA"]);
        assert_eq!(class.post_data, ["# tail"]);
    }

    #[test]
    fn structural_errors() {
        let err = run("# Unit: mm\nDATA | 1\n", false).unwrap_err();
        assert_eq!(err.fault, Fault::DataBeforeClass);

        let err = run("CLASS A\nDATA | 1\n", false).unwrap_err();
        assert_eq!(err.fault, Fault::DataBeforeFormat);
        assert_eq!(err.class.as_deref(), Some("A"));

        let err = run("CLASS A\nFORMAT X\nDATA oops\n", false).unwrap_err();
        assert_eq!((err.line, err.fault), (3, Fault::MissingSeparator));
    }
}
