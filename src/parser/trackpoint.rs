//! `trackpoint_database.dat`. Only `#CLASS` may be commented; `# FORMAT`
//! and `# DATA` lines are documentation.

use super::annotated;
use crate::detect::Kind;
use crate::error::ParseError;
use crate::model::Document;

pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Document, ParseError> {
    annotated::parse(lines, Kind::Trackpoints, false)
}
