#![warn(missing_debug_implementations)]

//! Spellchecking with affix-driven morphology, reading hunspell-format
//! `.aff` and `.dic` files.
//!
//! ```no_run
//! let checker = affixspell::open("en_US")?;
//! if !checker.check("rainning") {
//!     for (word, category) in checker.suggest("rainning") {
//!         println!("{} ({})", word, category);
//!     }
//! }
//! # Ok::<(), affixspell::Error>(())
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

mod affix_trie;
mod casing;
mod checker;
mod delins;
mod error;
mod ngram;

pub mod dictionary;
pub mod flags;
pub mod loader;
pub mod morph;
pub mod registry;
pub mod ruleset;
pub mod suggest;
pub mod tokenizer;

pub use crate::checker::{find_misspellings, SpellChecker};
pub use crate::error::{Error, Result};
pub use crate::loader::{FsLoader, MemoryLoader, ResourceLoader};
pub use crate::registry::Registry;
pub use crate::suggest::{Cancel, Category, SuggestConfig, Suggestion, Suggestions};
pub use crate::tokenizer::{Token, Tokenizer, WordTokenizer};

pub trait Speller {
    /// Returns true if the word is in the dictionary or can be derived
    /// from it, otherwise false.
    fn check(&self, word: &str) -> bool;

    /// Returns a ranked list of possible corrections to a misspelled
    /// word, each with the label of the strategy that found it.
    /// The list is empty if the word is correct.
    fn suggest(&self, word: &str) -> Vec<(String, Category)>;
}

/// Open the session for `language` from the global registry, loading
/// its dictionary from the default search path on first use.
pub fn open(language: &str) -> Result<Arc<SpellChecker>> {
    registry::global().open(language)
}

/// Map each misspelled word of `text` to its suggestions.
pub fn check_sentence(text: &str, language: &str) -> Result<BTreeMap<String, Vec<(String, Category)>>> {
    Ok(open(language)?.check_sentence(text))
}
