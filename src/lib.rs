//! tooldat: read, edit and write NX ASCII tool-library databases.
//!
//! Five dialects share one line grammar: `tool_database.dat`,
//! `holder_database.dat`, `shank_database.dat`, `trackpoint_database.dat` and
//! `segmented_tool_database.dat`. Parsing builds an editable
//! [`Document`] → [`Class`] → [`Row`] tree that keeps every non-data line, so
//! an unmodified document is written back byte for byte and an edited one
//! differs only in the rows that changed.
//!
//! ```no_run
//! use std::path::Path;
//! use tooldat::{LoadedFile, ParseOptions};
//!
//! let mut file = LoadedFile::open(Path::new("tool_database.dat"), &ParseOptions::default())?;
//! if let Some(id) = file.document.class_id("END_MILL") {
//!     let at = tooldat::RowRef { class: id, row: 0 };
//!     let _ = file.document.set(at, "DIA", "12.5");
//! }
//! file.save()?;
//! # Ok::<(), tooldat::DatError>(())
//! ```

pub mod detect;
pub mod error;
pub mod library;
pub mod model;
pub mod parser;
pub mod query;
pub mod syntax;
pub mod writer;

pub use detect::{detect_kind, Kind};
pub use error::{DatError, Fault, ParseError, Result};
pub use library::{detect_file_kind, Library, LoadedFile};
pub use model::{Class, ClassId, Document, Layout, LineEnding, Row, RowChange, RowRef, SetOutcome};
pub use parser::{parse, parse_str, parse_with, Grouping, ParseOptions};
pub use writer::{render, write};
