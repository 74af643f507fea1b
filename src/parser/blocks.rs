//! Class-block state machine: `CLASS`, `FORMAT` (with continuation lines),
//! `DATA` (with `|` continuation lines) and `END_DATA`.
//!
//! Used as is by the tool dialect, and by the holder and shank dialects when
//! their rows are grouped by `CLASS` markers.

use super::sections::SectionBuilder;
use crate::detect::Kind;
use crate::error::{Fault, ParseError};
use crate::model::{Class, Document, Row};
use crate::syntax::{self, Keyword, KeywordLine};
use log::debug;

/// What happens to a `FORMAT` or `DATA` line seen before the first `CLASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TopLevel {
    /// `FORMAT` is documentation kept in the head; `DATA` is an error.
    Reject,
    /// Open a synthetic class with this name to hold the block.
    Synthesize(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Policy {
    /// Whether `#FORMAT`, `#DATA` and `#END_DATA` are live before the first
    /// class. Inside a class they always are, and so is `#CLASS`.
    pub commented_head_keywords: bool,
    pub top_level: TopLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Format,
    Data,
}

struct BlockParser {
    sections: SectionBuilder,
    policy: Policy,
    mode: Mode,
}

pub(crate) fn parse<S: AsRef<str>>(
    lines: &[S],
    kind: Kind,
    policy: Policy,
) -> Result<Document, ParseError> {
    let mut p = BlockParser {
        sections: SectionBuilder::new(kind),
        policy,
        mode: Mode::Idle,
    };
    for (i, line) in lines.iter().enumerate() {
        p.process_line(i + 1, line.as_ref())?;
    }
    Ok(p.sections.finish())
}

impl BlockParser {
    fn process_line(&mut self, number: usize, line: &str) -> Result<(), ParseError> {
        if let Some(kw) = syntax::keyword(line).filter(|kw| self.is_live(kw)) {
            return self.keyword_line(number, line, kw);
        }

        if syntax::is_blank(line) || syntax::is_comment(line) {
            match self.mode {
                Mode::Format => self.sections.format_line(line),
                Mode::Data => {
                    self.mode = Mode::Idle;
                    self.sections.text(line);
                }
                Mode::Idle => self.sections.text(line),
            }
            return Ok(());
        }

        match self.mode {
            Mode::Format => {
                let more = syntax::field_tokens(line);
                if more.is_empty() {
                    self.mode = Mode::Idle;
                    self.sections.text(line);
                } else {
                    self.add_fields(more);
                    self.sections.format_line(line);
                }
            }
            Mode::Data => match syntax::continuation(line) {
                Some(payload) => {
                    let values = syntax::split_values(payload);
                    if !self.sections.continue_row(line, values) {
                        self.sections.text(line);
                    }
                }
                None => {
                    self.mode = Mode::Idle;
                    self.sections.text(line);
                }
            },
            Mode::Idle => self.sections.text(line),
        }
        Ok(())
    }

    fn is_live(&self, kw: &KeywordLine<'_>) -> bool {
        kw.keyword == Keyword::Class
            || !kw.is_commented()
            || self.policy.commented_head_keywords
            || self.sections.current().is_some()
    }

    fn keyword_line(&mut self, number: usize, line: &str, kw: KeywordLine<'_>) -> Result<(), ParseError> {
        match kw.keyword {
            Keyword::Class => {
                self.sections.open_class(Class::from_marker(line, kw.rest));
                self.mode = Mode::Idle;
            }
            Keyword::EndData => {
                self.sections.end_data(line);
                self.mode = Mode::Idle;
            }
            Keyword::Format => {
                if self.sections.current().is_none() {
                    match self.policy.top_level {
                        TopLevel::Reject => {
                            debug!("line {}: FORMAT before any class kept as text", number);
                            self.sections.text(line);
                            self.mode = Mode::Idle;
                            return Ok(());
                        }
                        TopLevel::Synthesize(name) => {
                            self.sections.open_class(Class::synthetic(name));
                        }
                    }
                }
                self.add_fields(syntax::field_tokens(kw.rest));
                self.sections.format_line(line);
                self.mode = Mode::Format;
            }
            Keyword::Data => {
                if self.sections.current().is_none() {
                    match self.policy.top_level {
                        TopLevel::Reject => {
                            return Err(ParseError::new(number, None, Fault::DataBeforeClass));
                        }
                        TopLevel::Synthesize(name) => {
                            self.sections.open_class(Class::synthetic(name));
                        }
                    }
                }
                let row = self.data_row(number, line, kw)?;
                let Some(target) = self.sections.current() else {
                    return Err(ParseError::new(number, None, Fault::DataBeforeClass));
                };
                self.sections.push_row(target, row);
                self.mode = Mode::Data;
            }
        }
        Ok(())
    }

    fn data_row(&self, number: usize, line: &str, kw: KeywordLine<'_>) -> Result<Row, ParseError> {
        let class = self.sections.current_class();
        let name = class.map(|c| c.name.as_str());
        if class.map_or(true, |c| c.fields().is_empty()) {
            return Err(ParseError::new(number, name, Fault::DataBeforeFormat));
        }
        let payload = kw.rest.trim_start();
        if !payload.starts_with('|') {
            return Err(ParseError::new(number, name, Fault::MissingSeparator));
        }
        Ok(Row::parsed(line, syntax::split_values(payload), number))
    }

    fn add_fields(&mut self, fields: Vec<String>) {
        if let Some(class) = self.sections.current_class_mut() {
            class.extend_fields(fields);
        }
    }
}
