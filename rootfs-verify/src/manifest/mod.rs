//! Manifest model and parser.

pub mod entry;
pub mod parser;

pub use entry::{EntryKind, ManifestEntry};
pub use parser::{parse_line, ParseError, ParseErrorKind};
