//! Best-effort programming language detection.
//!
//! Resolution order: uploaded file extension, then a pluggable text
//! guesser whose raw answer is normalized through a fixed alias table.

mod guesser;
mod resolver;
mod tables;

pub use guesser::{KeywordGuesser, LanguageGuesser, NoMatch};
pub use resolver::{extension_of, normalize_language_name, resolve_language, Resolution};
pub use tables::{language_for_extension, LanguageTag, EXTENSION_TABLE, NAME_ALIASES};
