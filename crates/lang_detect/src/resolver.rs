use std::path::Path;

use tracing::debug;

use crate::{
    guesser::LanguageGuesser,
    tables::{language_for_extension, LanguageTag, NAME_ALIASES},
};

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Recognized(LanguageTag),
    /// Lower-cased guesser name that matched no alias.
    Guessed(String),
}

impl Resolution {
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::Recognized(tag) => tag.as_str(),
            Resolution::Guessed(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Resolution::Recognized(_))
    }

    pub fn tag(&self) -> Option<LanguageTag> {
        match self {
            Resolution::Recognized(tag) => Some(*tag),
            Resolution::Guessed(_) => None,
        }
    }
}

/// Extension of the last path component, lower-cased, with its leading dot.
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Resolves the language of `code_text`.
///
/// A known extension on `uploaded_file_name` wins outright. Otherwise the
/// guesser runs on non-empty text and its answer is normalized; names that
/// match no alias come back as [`Resolution::Guessed`]. A guesser miss
/// yields `None`.
pub fn resolve_language(
    uploaded_file_name: Option<&str>,
    code_text: &str,
    guesser: &dyn LanguageGuesser,
) -> Option<Resolution> {
    if let Some(tag) = uploaded_file_name
        .and_then(extension_of)
        .and_then(|ext| language_for_extension(&ext))
    {
        return Some(Resolution::Recognized(tag));
    }

    if code_text.is_empty() {
        return None;
    }

    let raw = match guesser.guess(code_text) {
        Ok(raw) => raw.to_lowercase(),
        Err(err) => {
            debug!(%err, "language guesser gave up");
            return None;
        }
    };

    match normalize_language_name(&raw) {
        Some(tag) => Some(Resolution::Recognized(tag)),
        None => Some(Resolution::Guessed(raw)),
    }
}

/// Maps a guesser name onto a canonical tag: direct, then case-insensitive,
/// then with every non-alphanumeric character stripped from both sides.
pub fn normalize_language_name(raw: &str) -> Option<LanguageTag> {
    if let Some(tag) = lookup_alias(raw) {
        return Some(tag);
    }

    let lowered = raw.to_lowercase();
    if let Some(tag) = lookup_alias(&lowered) {
        return Some(tag);
    }

    let simple = alphanumeric_only(&lowered);
    if simple.is_empty() {
        return None;
    }
    NAME_ALIASES
        .iter()
        .find(|(key, _)| alphanumeric_only(key) == simple)
        .map(|(_, tag)| *tag)
}

fn lookup_alias(name: &str) -> Option<LanguageTag> {
    NAME_ALIASES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, tag)| *tag)
}

fn alphanumeric_only(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
