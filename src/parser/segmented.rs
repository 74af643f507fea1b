//! `segmented_tool_database.dat`. Keywords may be commented out with `#`
//! and are still live.

use super::annotated;
use crate::detect::Kind;
use crate::error::ParseError;
use crate::model::Document;

pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Document, ParseError> {
    annotated::parse(lines, Kind::SegmentedTools, true)
}
