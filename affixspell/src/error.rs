//! Errors raised while opening a spelling session.
//!
//! Once a session is open, `check` and `suggest` never fail: empty words,
//! unknown scripts and exhausted suggestion budgets are all ordinary results.

/// Errors that can occur while loading or looking up a language.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No affix rules or wordlist could be found for the language code
    #[error("Unknown language {language}: {reason}")]
    UnknownLanguage { language: String, reason: String },

    /// The affix data (or a flag inside the wordlist header) could not be parsed
    #[error("Malformed affix data: {message}")]
    MalformedRule { message: String },

    /// The language was queried before a session for it was opened
    #[error("Dictionary for {language} is not loaded")]
    DictionaryNotLoaded { language: String },
}

impl Error {
    pub(crate) fn unknown_language(language: &str, reason: impl Into<String>) -> Self {
        Error::UnknownLanguage {
            language: language.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedRule {
            message: message.into(),
        }
    }

    pub(crate) fn malformed_at(line: usize, message: impl AsRef<str>) -> Self {
        Error::MalformedRule {
            message: format!("line {}: {}", line, message.as_ref()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
