//! Parser module: dispatch by dialect.

mod annotated;
mod blocks;
mod indexed;
mod sections;

pub mod holder;
pub mod segmented;
pub mod shank;
pub mod tool;
pub mod trackpoint;

use crate::detect::Kind;
use crate::error::ParseError;
use crate::model::{Document, LineEnding};
use crate::syntax::{self, Keyword};
use log::debug;
use std::fmt;
use std::str::FromStr;

/// How holder and shank rows are grouped into classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// Class markers when the file has any, RTYPE routing otherwise.
    #[default]
    Auto,
    /// Route every row by `RTYPE` into synthetic index and shape classes.
    Discriminator,
    /// One class per `CLASS` marker, plus a synthetic index class for a
    /// top-of-file block.
    ClassMarkers,
}

impl Grouping {
    /// Settle [`Grouping::Auto`] for a concrete file.
    pub fn resolve<S: AsRef<str>>(self, lines: &[S]) -> Grouping {
        match self {
            Grouping::Auto if has_class_marker(lines) => Grouping::ClassMarkers,
            Grouping::Auto => Grouping::Discriminator,
            other => other,
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grouping::Auto => "auto",
            Grouping::Discriminator => "discriminator",
            Grouping::ClassMarkers => "markers",
        })
    }
}

impl FromStr for Grouping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Grouping::Auto),
            "discriminator" | "rtype" => Ok(Grouping::Discriminator),
            "markers" | "class-markers" | "classes" => Ok(Grouping::ClassMarkers),
            _ => Err(format!(
                "unknown grouping: {}. Use auto, discriminator or markers",
                s
            )),
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub grouping: Grouping,
}

/// Parse lines as the given dialect with default options.
pub fn parse<S: AsRef<str>>(lines: &[S], kind: Kind) -> Result<Document, ParseError> {
    parse_with(lines, kind, &ParseOptions::default())
}

pub fn parse_with<S: AsRef<str>>(
    lines: &[S],
    kind: Kind,
    options: &ParseOptions,
) -> Result<Document, ParseError> {
    debug!("parsing {} lines as {}", lines.len(), kind);
    match kind {
        Kind::Tools => tool::parse(lines),
        Kind::Holders => holder::parse(lines, options.grouping),
        Kind::Shanks => shank::parse(lines, options.grouping),
        Kind::Trackpoints => trackpoint::parse(lines),
        Kind::SegmentedTools => segmented::parse(lines),
    }
}

/// Parse a whole file's text, remembering its line ending and whether it
/// ends with a newline so the writer can reproduce both.
pub fn parse_str(text: &str, kind: Kind, options: &ParseOptions) -> Result<Document, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut doc = parse_with(&lines, kind, options)?;
    doc.line_ending = if text.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };
    doc.final_newline = text.ends_with('\n');
    Ok(doc)
}

fn has_class_marker<S: AsRef<str>>(lines: &[S]) -> bool {
    lines
        .iter()
        .filter_map(|line| syntax::keyword(line.as_ref()))
        .any(|kw| kw.keyword == Keyword::Class)
}

/// Shared entry for the two RTYPE-carrying dialects.
fn parse_grouped<S: AsRef<str>>(
    lines: &[S],
    kind: Kind,
    buckets: indexed::Buckets,
    grouping: Grouping,
) -> Result<Document, ParseError> {
    let grouping = grouping.resolve(lines);
    debug!("{} grouping: {}", kind, grouping);
    match grouping {
        Grouping::ClassMarkers => blocks::parse(
            lines,
            kind,
            blocks::Policy {
                commented_head_keywords: true,
                top_level: blocks::TopLevel::Synthesize(buckets.index),
            },
        ),
        _ => indexed::parse(lines, kind, buckets),
    }
}
