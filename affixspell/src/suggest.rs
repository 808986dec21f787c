//! Generate and rank corrections for a rejected word.
//!
//! Several strategies run independently, each vetting its candidates
//! with the analyzer. Their results are merged so that each suggested
//! string appears once, with its best score, and sorted by score, then
//! strategy priority, then alphabetically.
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fnv::FnvHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

mod collector;
mod generators;

use crate::dictionary::{normalize, Dictionary};
use crate::delins::delins;
use crate::morph::{Derivation, MorphAnalyzer};
use crate::ngram::similarity;
use crate::ruleset::AffixRuleSet;
use crate::suggest::collector::Collector;
use crate::suggest::generators::*;

const CASE_SCORE: f32 = 0.0;
const EDIT_SCORE: f32 = 1.0;
const EDIT_TWO_SCORE: f32 = 2.0;
const SPLIT_SCORE: f32 = 1.0;
const COMPOUND_SCORE: f32 = 1.0;
const PHONETIC_SCORE: f32 = 1.5;
const NGRAM_BASE_SCORE: f32 = 2.0;

/// At most this many characters are tried in insertions and substitutions.
const MAX_ALPHABET: usize = 80;

/// The strategy that produced a suggestion. The order of the variants is
/// the tie-breaking priority between equal scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Edit,
    Case,
    Compound,
    Phonetic,
    Split,
    Ngram,
}

impl SuggestionKind {
    fn default_category(self) -> Category {
        match self {
            SuggestionKind::Edit => Category::Other,
            SuggestionKind::Case => Category::Case,
            SuggestionKind::Compound => Category::Compound,
            SuggestionKind::Phonetic => Category::Phonet,
            SuggestionKind::Split => Category::TwoWords,
            SuggestionKind::Ngram => Category::Ngram,
        }
    }
}

/// The public label of a suggestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Case,
    Other,
    BadChar,
    Compound,
    Phonet,
    TwoWords,
    Ngram,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Case => "case",
            Category::Other => "other",
            Category::BadChar => "badchar",
            Category::Compound => "compound",
            Category::Phonet => "phonet",
            Category::TwoWords => "twowords",
            Category::Ngram => "ngram",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A correction for a misspelled word
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    /// the suggested word
    pub word: String,
    /// the strategy that found it
    pub kind: SuggestionKind,
    pub category: Category,
    /// closeness to the input; lower is closer
    pub score: f32,
    /// how the analyzer accepted the suggested word
    #[serde(skip)]
    pub derivation: Derivation,
}

impl Suggestion {
    pub fn as_pair(&self) -> (&str, &'static str) {
        (&self.word, self.category.label())
    }
}

/// The ranked suggestions for one word.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Suggestions {
    pub items: Vec<Suggestion>,
    /// Set when a candidate budget ran out or the call was cancelled,
    /// so better suggestions may have been missed.
    pub truncated: bool,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Suggestion> {
        self.items.iter()
    }

    pub fn words(&self) -> Vec<String> {
        self.items.iter().map(|s| s.word.clone()).collect()
    }
}

impl IntoIterator for Suggestions {
    type Item = Suggestion;
    type IntoIter = std::vec::IntoIter<Suggestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Tuning for suggestion generation. Every field has a default, so a
/// config file only needs to mention what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Most suggestions returned for one word
    pub max_suggestions: usize,
    /// Most candidates any one strategy may generate and check
    pub max_candidates: usize,
    /// Try two edits when no single edit gives a known word
    pub edit_distance_two: bool,
    /// Fall back on n-gram similarity when all else fails
    pub ngram: bool,
    pub max_ngram_distance: usize,
    /// Run the strategies on the rayon thread pool
    pub parallel: bool,
    /// Give up on a word after this many milliseconds
    pub timeout_ms: Option<u64>,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        SuggestConfig {
            max_suggestions: 10,
            max_candidates: 10_000,
            edit_distance_two: true,
            ngram: true,
            max_ngram_distance: 2,
            parallel: true,
            timeout_ms: None,
        }
    }
}

/// A cooperative cancellation hook for long suggestion calls.
///
/// Clones share the same flag, so one thread can cancel a call that is
/// running on another.
#[derive(Clone, Debug, Default)]
pub struct Cancel {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancel {
    pub fn new() -> Self {
        Cancel::default()
    }

    pub fn with_flag(flag: Arc<AtomicBool>) -> Self {
        Cancel {
            flag,
            deadline: None,
        }
    }

    /// Also give up at `deadline`, or at the existing deadline if that
    /// comes first.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(d) => d.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

#[derive(Debug)]
pub struct SuggestionEngine<'a> {
    rules: &'a AffixRuleSet,
    dict: &'a Dictionary,
    config: &'a SuggestConfig,
    alphabet: Vec<char>,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(rules: &'a AffixRuleSet, dict: &'a Dictionary, config: &'a SuggestConfig) -> Self {
        SuggestionEngine {
            rules,
            dict,
            config,
            alphabet: edit_alphabet(rules, dict),
        }
    }

    fn analyzer(&self) -> MorphAnalyzer<'a> {
        MorphAnalyzer::new(self.rules, self.dict).for_suggestions()
    }

    /// Suggest corrections for `word`, which should already have been
    /// rejected by the analyzer.
    pub fn suggest(&self, word: &str, cancel: &Cancel) -> Suggestions {
        if word.is_empty() || self.config.max_suggestions == 0 || !self.knows_script(word) {
            return Suggestions::default();
        }
        let cancel = match self.config.timeout_ms {
            Some(ms) => cancel.clone().with_timeout(Duration::from_millis(ms)),
            None => cancel.clone(),
        };

        let strategies = [
            SuggestionKind::Case,
            SuggestionKind::Edit,
            SuggestionKind::Split,
            SuggestionKind::Compound,
            SuggestionKind::Phonetic,
        ];
        let runs: Vec<(Vec<Suggestion>, bool)> = if self.config.parallel {
            strategies
                .par_iter()
                .map(|kind| self.run(*kind, word, &cancel))
                .collect()
        } else {
            strategies
                .iter()
                .map(|kind| self.run(*kind, word, &cancel))
                .collect()
        };

        let mut truncated = runs.iter().any(|(_, t)| *t);
        let mut found: Vec<Suggestion> = runs.into_iter().flat_map(|(found, _)| found).collect();
        if found.is_empty() && self.config.ngram && !cancel.is_cancelled() {
            let (ngram_found, ngram_truncated) = self.run(SuggestionKind::Ngram, word, &cancel);
            found = ngram_found;
            truncated |= ngram_truncated;
        }
        truncated |= cancel.is_cancelled();
        if truncated {
            log::warn!("suggestions for {} were cut short", word);
        }

        let mut items = merge(found);
        items.truncate(self.config.max_suggestions);
        let oconv = self.rules.output_conversion();
        if !oconv.is_empty() {
            for item in items.iter_mut() {
                item.word = oconv.convert(&item.word);
            }
        }
        Suggestions { items, truncated }
    }

    /// Words with letters, none of which the dictionary uses, are in a
    /// script this language can't correct.
    fn knows_script(&self, word: &str) -> bool {
        let mut letters = word.chars().filter(|c| c.is_alphabetic()).peekable();
        letters.peek().is_none()
            || letters.any(|c| c.to_lowercase().any(|lc| self.alphabet.contains(&lc)))
    }

    fn run(&self, kind: SuggestionKind, word: &str, cancel: &Cancel) -> (Vec<Suggestion>, bool) {
        let mut c = Collector::new(self.analyzer(), word, kind, self.config.max_candidates, cancel);
        match kind {
            SuggestionKind::Case => case_suggestions(word, |s| c.offer(s, CASE_SCORE)),
            SuggestionKind::Edit => self.edits(word, &mut c),
            SuggestionKind::Split => split_suggestions(word, |s| c.offer(s, SPLIT_SCORE)),
            SuggestionKind::Compound => join_suggestions(word, |s| c.offer(s, COMPOUND_SCORE)),
            SuggestionKind::Phonetic => {
                replacement_suggestions(self.rules.replacements(), word, |s| {
                    c.offer(s, PHONETIC_SCORE)
                });
                if !c.limit() {
                    related_char_suggestions(self.rules.related_chars(), word, |s| {
                        c.offer(s, PHONETIC_SCORE)
                    });
                }
            }
            SuggestionKind::Ngram => self.ngrams(word, &mut c),
        }
        let (found, truncated) = c.finish();
        log::trace!("{:?} found {} suggestions for {}", kind, found.len(), word);
        (found, truncated)
    }

    fn edits(&self, word: &str, c: &mut Collector<'_>) {
        // Keep the generated strings around in case a second edit is needed.
        let keep = self.config.edit_distance_two;
        let mut first: Vec<String> = Vec::new();
        edit_suggestions(word, &self.alphabet, |s| {
            if keep {
                first.push(s.clone());
            }
            c.offer(s, EDIT_SCORE)
        });
        if !keep || c.has_suggestions() || c.limit() {
            return;
        }
        first.sort_unstable();
        first.dedup();
        for w in first.iter() {
            if !edit_suggestions(w, &self.alphabet, |s| c.offer(s, EDIT_TWO_SCORE)) {
                return;
            }
        }
    }

    fn ngrams(&self, word: &str, c: &mut Collector<'_>) {
        let key = normalize(word);
        let key_chars: Vec<char> = key.chars().collect();
        let max_distance = self.config.max_ngram_distance;
        let mut ranked: Vec<(f64, usize, &str)> = self
            .dict
            .entries_near(&key, max_distance)
            .into_iter()
            .filter(|e| e.is_standalone())
            .map(|e| {
                let stem_key: Vec<char> = normalize(e.stem()).chars().collect();
                let distance = delins(&key_chars, &stem_key, max_distance);
                (similarity(&key_chars, &stem_key), distance, e.stem())
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(b.2)));
        for (_, distance, stem) in ranked {
            let score = NGRAM_BASE_SCORE + distance as f32 / 2.0;
            if !c.offer(stem.to_string(), score) {
                return;
            }
        }
    }
}

/// TRY characters first, then the rest of the characters seen in
/// lowercase and uncased stems, most frequent first.
fn edit_alphabet(rules: &AffixRuleSet, dict: &Dictionary) -> Vec<char> {
    let mut alphabet: Vec<char> = Vec::new();
    let try_chars = rules.try_chars().unwrap_or("").chars();
    for c in try_chars.chain(dict.alphabet().iter().copied()) {
        if c.is_uppercase() || alphabet.contains(&c) {
            continue;
        }
        alphabet.push(c);
        if alphabet.len() == MAX_ALPHABET {
            break;
        }
    }
    alphabet
}

/// Keep each word once with its best score and strategy, then rank.
fn merge(found: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut best: FnvHashMap<String, Suggestion> = FnvHashMap::default();
    for sugg in found {
        match best.get(&sugg.word) {
            Some(prev) if rank(prev, &sugg) != std::cmp::Ordering::Greater => (),
            _ => {
                best.insert(sugg.word.clone(), sugg);
            }
        }
    }
    let mut items: Vec<Suggestion> = best.into_values().collect();
    items.sort_by(rank);
    items
}

fn rank(a: &Suggestion, b: &Suggestion) -> std::cmp::Ordering {
    a.score
        .total_cmp(&b.score)
        .then(a.kind.cmp(&b.kind))
        .then_with(|| a.word.cmp(&b.word))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dictionary::parse_wordlist;

    fn engine_parts(aff: &str, dic: &str) -> (AffixRuleSet, Dictionary) {
        let rules = AffixRuleSet::parse(aff).unwrap();
        let dict = Dictionary::new(parse_wordlist(dic, &rules), &rules);
        (rules, dict)
    }

    const AFF: &str = "TRY esianrtolcdugmphbyfvkwz
REP 1
REP f ph
SFX G Y 1
SFX G 0 ing .
";
    const DIC: &str = "8\nrain/G\nlake\nlike\nfish\nphone\na\nlot\nrain coat\n";

    fn words(s: &Suggestions) -> Vec<&str> {
        s.iter().map(|s| s.word.as_str()).collect()
    }

    #[test]
    fn test_edit_suggestions() {
        let (rules, dict) = engine_parts(AFF, DIC);
        let config = SuggestConfig::default();
        let engine = SuggestionEngine::new(&rules, &dict, &config);
        let s = engine.suggest("rainning", &Cancel::new());
        assert_eq!(Some("raining"), s.iter().next().map(|s| s.word.as_str()));
        assert!(!s.truncated);
        let s = engine.suggest("lke", &Cancel::new());
        assert_eq!(vec!["lake", "like"], words(&s));
        let s = engine.suggest("lape", &Cancel::new());
        assert_eq!(("lake", "badchar"), s.items[0].as_pair());
    }

    #[test]
    fn test_other_strategies() {
        let (rules, dict) = engine_parts(AFF, DIC);
        let config = SuggestConfig {
            parallel: false,
            ..Default::default()
        };
        let engine = SuggestionEngine::new(&rules, &dict, &config);
        let s = engine.suggest("fone", &Cancel::new());
        assert!(s.iter().any(|s| s.as_pair() == ("phone", "phonet")));
        let s = engine.suggest("alot", &Cancel::new());
        assert!(s.iter().any(|s| s.as_pair() == ("a lot", "twowords")));
        let s = engine.suggest("lo t", &Cancel::new());
        assert_eq!(Some(("lot", "compound")), s.iter().next().map(|s| s.as_pair()));
        let s = engine.suggest("LAKE", &Cancel::new());
        assert!(s.is_empty() || s.iter().all(|s| s.word != "LAKE"));
        let s = engine.suggest("Lkae", &Cancel::new());
        assert_eq!(Some("Lake"), s.iter().next().map(|s| s.word.as_str()));
    }

    #[test]
    fn test_merge_keeps_best() {
        let d = Derivation::Exact {
            stem: "x".to_string(),
        };
        let mk = |word: &str, kind, score| Suggestion {
            word: word.to_string(),
            kind,
            category: SuggestionKind::default_category(kind),
            score,
            derivation: d.clone(),
        };
        let merged = merge(vec![
            mk("b", SuggestionKind::Phonetic, 1.5),
            mk("a", SuggestionKind::Split, 1.0),
            mk("b", SuggestionKind::Edit, 1.0),
            mk("c", SuggestionKind::Case, 0.0),
            mk("a", SuggestionKind::Edit, 1.0),
        ]);
        let got: Vec<(&str, SuggestionKind)> = merged.iter().map(|s| (s.word.as_str(), s.kind)).collect();
        assert_eq!(
            vec![
                ("c", SuggestionKind::Case),
                ("a", SuggestionKind::Edit),
                ("b", SuggestionKind::Edit)
            ],
            got
        );
    }

    #[test]
    fn test_cap_and_budget() {
        let (rules, dict) = engine_parts(AFF, DIC);
        let config = SuggestConfig {
            max_suggestions: 1,
            max_candidates: 5,
            ..Default::default()
        };
        let engine = SuggestionEngine::new(&rules, &dict, &config);
        let s = engine.suggest("xyzzyq", &Cancel::new());
        assert!(s.len() <= 1);
        assert!(s.truncated);
    }

    #[test]
    fn test_ngram_fallback() {
        let (rules, dict) = engine_parts(AFF, DIC);
        let config = SuggestConfig {
            edit_distance_two: false,
            ..Default::default()
        };
        let engine = SuggestionEngine::new(&rules, &dict, &config);
        let s = engine.suggest("fiishh", &Cancel::new());
        assert_eq!(vec![("fish", "ngram")], s.iter().map(|s| s.as_pair()).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel() {
        let (rules, dict) = engine_parts(AFF, DIC);
        let config = SuggestConfig::default();
        let engine = SuggestionEngine::new(&rules, &dict, &config);
        let cancel = Cancel::new();
        cancel.cancel();
        let s = engine.suggest("zzzzzzzzzzzzzzzzzzzz", &cancel);
        assert!(s.truncated);
        assert!(Cancel::new().with_timeout(Duration::from_secs(0)).is_cancelled());
        assert!(!Cancel::new().is_cancelled());
    }

    #[test]
    fn test_unknown_script() {
        let (rules, dict) = engine_parts(AFF, DIC);
        let config = SuggestConfig::default();
        let engine = SuggestionEngine::new(&rules, &dict, &config);
        let s = engine.suggest("дождь", &Cancel::new());
        assert!(s.is_empty());
        assert!(!s.truncated);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: SuggestConfig = serde_json::from_str(r#"{"max_suggestions": 3}"#).unwrap();
        assert_eq!(3, config.max_suggestions);
        assert_eq!(10_000, config.max_candidates);
        assert!(config.parallel);
    }
}
