use std::collections::BTreeMap;
use std::time::Instant;

use crate::dictionary::{Dictionary, Wordlist};
use crate::error::Result;
use crate::loader::ResourceLoader;
use crate::morph::{Derivation, MorphAnalyzer};
use crate::ruleset::AffixRuleSet;
use crate::suggest::{Cancel, Category, SuggestConfig, SuggestionEngine, Suggestions};
use crate::tokenizer::{Tokenizer, WordTokenizer};
use crate::Speller;

/// A spelling session for one language.
///
/// The rules and the dictionary are immutable once built, so a checker
/// can be shared between threads behind an `Arc` without locking.
#[derive(Debug)]
pub struct SpellChecker {
    language: String,
    rules: AffixRuleSet,
    dict: Dictionary,
    config: SuggestConfig,
}

impl SpellChecker {
    pub fn new(language: &str, rules: AffixRuleSet, wordlist: Wordlist) -> Self {
        let dict = Dictionary::new(wordlist, &rules);
        SpellChecker {
            language: language.to_string(),
            rules,
            dict,
            config: SuggestConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SuggestConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a session from the resources `loader` has for `language`.
    pub fn load(language: &str, loader: &dyn ResourceLoader, config: SuggestConfig) -> Result<Self> {
        let start = Instant::now();
        let rules = loader.load_rule_set(language)?;
        let wordlist = loader.load_wordlist(language, &rules)?;
        let checker = SpellChecker::new(language, rules, wordlist).with_config(config);
        log::debug!(
            "Loaded {}: {} stems, {} affix rules, {} lines skipped, in {:?}",
            language,
            checker.dict.len(),
            checker.rules.rule_count(),
            checker.dict.skipped_lines(),
            start.elapsed()
        );
        Ok(checker)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn rules(&self) -> &AffixRuleSet {
        &self.rules
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    fn prepare(&self, word: &str) -> String {
        self.rules.input_conversion().convert(word.trim())
    }

    fn analyzer(&self) -> MorphAnalyzer<'_> {
        MorphAnalyzer::new(&self.rules, &self.dict)
    }

    pub fn check(&self, word: &str) -> bool {
        let word = self.prepare(word);
        if word.is_empty() {
            return false;
        }
        self.dict
            .exact_lookup(&word)
            .map_or(false, |entry| entry.is_standalone())
            || self.analyzer().accepts(&word)
    }

    /// Explain how `word` is derived, if it's correct.
    pub fn analyze(&self, word: &str) -> Option<Derivation> {
        self.analyzer().analyze(&self.prepare(word))
    }

    /// Ranked corrections with their labels. Empty if `word` is correct.
    pub fn suggest(&self, word: &str) -> Vec<(String, Category)> {
        self.suggest_with(word, &Cancel::new())
            .into_iter()
            .map(|s| (s.word, s.category))
            .collect()
    }

    pub fn suggest_with(&self, word: &str, cancel: &Cancel) -> Suggestions {
        if self.check(word) {
            return Suggestions::default();
        }
        let word = self.prepare(word);
        SuggestionEngine::new(&self.rules, &self.dict, &self.config).suggest(&word, cancel)
    }

    pub fn suggest_strings(&self, word: &str) -> Vec<String> {
        self.suggest(word).into_iter().map(|(word, _)| word).collect()
    }

    /// Check every word of `text` with the default tokenizer.
    pub fn check_sentence(&self, text: &str) -> BTreeMap<String, Vec<(String, Category)>> {
        find_misspellings(self, &WordTokenizer, text)
    }
}

impl Speller for SpellChecker {
    fn check(&self, word: &str) -> bool {
        SpellChecker::check(self, word)
    }

    fn suggest(&self, word: &str) -> Vec<(String, Category)> {
        SpellChecker::suggest(self, word)
    }
}

/// Map each misspelled word of `text` to its suggestions. A word that
/// occurs more than once is checked once.
pub fn find_misspellings(
    speller: &dyn Speller,
    tokenizer: &dyn Tokenizer,
    text: &str,
) -> BTreeMap<String, Vec<(String, Category)>> {
    let mut result = BTreeMap::new();
    for token in tokenizer.tokenize(text) {
        if result.contains_key(token.text) || speller.check(token.text) {
            continue;
        }
        result.insert(token.text.to_string(), speller.suggest(token.text));
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dictionary::parse_wordlist;
    use crate::loader::MemoryLoader;

    const AFF: &str = "SET UTF-8
TRY esianrtolcdugmphbyfvkwz
ICONV 1
ICONV ’ '
FORBIDDENWORD !
SFX G Y 2
SFX G e ing e
SFX G 0 ing [^e]
";
    const DIC: &str = "5\nrain/G\nlake\ndon't\nsheeps/!\nfish\n";

    fn checker() -> SpellChecker {
        let rules = AffixRuleSet::parse(AFF).unwrap();
        let wordlist = parse_wordlist(DIC, &rules);
        SpellChecker::new("test", rules, wordlist)
    }

    #[test]
    fn test_check() {
        let sc = checker();
        assert!(sc.check("rain"));
        assert!(sc.check(" raining "));
        assert!(sc.check("Rain"));
        assert!(sc.check("don’t"));
        assert!(!sc.check("rainning"));
        assert!(!sc.check("sheeps"));
        assert!(!sc.check(""));
        assert!(!sc.check("   "));
    }

    #[test]
    fn test_analyze() {
        let sc = checker();
        assert_eq!(
            Some(Derivation::Exact {
                stem: "lake".to_string()
            }),
            sc.analyze("lake")
        );
        assert!(matches!(sc.analyze("raining"), Some(Derivation::Affixed { .. })));
        assert_eq!(None, sc.analyze("rainning"));
    }

    #[test]
    fn test_suggest() {
        let sc = checker();
        assert!(sc.suggest("rain").is_empty());
        let suggestions = sc.suggest("rainning");
        assert!(suggestions.len() <= 10);
        assert_eq!("raining", suggestions[0].0);
        assert!(matches!(suggestions[0].1, Category::Other | Category::BadChar));
        for (word, _) in suggestions.iter() {
            assert!(sc.check(word), "{} should be correct", word);
        }
        assert_eq!(
            suggestions.iter().map(|(w, _)| w.clone()).collect::<Vec<_>>(),
            sc.suggest_strings("rainning")
        );
        assert!(sc.suggest("").is_empty());
    }

    #[test]
    fn test_check_sentence() {
        let sc = checker();
        let result = sc.check_sentence("Fish rain in the lke, lke fishe");
        assert!(result.contains_key("lke"));
        assert!(result.contains_key("fishe"));
        assert!(result.contains_key("the"));
        assert!(!result.contains_key("Fish"));
        assert!(!result.contains_key("rain"));
        assert!(result["lke"].iter().any(|(w, _)| w == "lake"));
    }

    #[test]
    fn test_load() {
        let loader = MemoryLoader::new().with_language("test", AFF, DIC);
        let sc = SpellChecker::load("test", &loader, SuggestConfig::default()).unwrap();
        assert_eq!("test", sc.language());
        assert_eq!(5, sc.dictionary().len());
        assert!(sc.check("raining"));
        assert!(SpellChecker::load("nope", &loader, SuggestConfig::default()).is_err());
    }
}
