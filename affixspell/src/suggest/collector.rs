use fnv::FnvHashSet;

use crate::casing::CapStyle;
use crate::morph::MorphAnalyzer;
use crate::suggest::{Cancel, Category, Suggestion, SuggestionKind};

/// How many candidates to generate between looks at the cancel hook.
const CANCEL_POLL_INTERVAL: usize = 64;

/// Gathers the accepted candidates of one strategy.
///
/// Every candidate counts against the strategy's budget, accepted or not.
/// Once the budget is spent or the call is cancelled, `offer` returns
/// false and the generator should stop.
pub(crate) struct Collector<'a> {
    analyzer: MorphAnalyzer<'a>,
    word: &'a str,
    caps: CapStyle,
    kind: SuggestionKind,
    budget: usize,
    generated: usize,
    cancel: &'a Cancel,
    seen: FnvHashSet<String>,
    found: Vec<Suggestion>,
    truncated: bool,
}

impl<'a> Collector<'a> {
    pub fn new(
        analyzer: MorphAnalyzer<'a>,
        word: &'a str,
        kind: SuggestionKind,
        budget: usize,
        cancel: &'a Cancel,
    ) -> Self {
        Collector {
            analyzer,
            word,
            caps: CapStyle::of(word),
            kind,
            budget,
            generated: 0,
            cancel,
            seen: FnvHashSet::default(),
            found: Vec::new(),
            truncated: false,
        }
    }

    pub fn has_suggestions(&self) -> bool {
        !self.found.is_empty()
    }

    /// Return true iff no more candidates should be offered
    pub fn limit(&self) -> bool {
        self.truncated
    }

    /// Vet a candidate and keep it if the analyzer accepts it.
    /// Returns false when generation should stop.
    pub fn offer(&mut self, candidate: String, score: f32) -> bool {
        if self.truncated {
            return false;
        }
        if candidate.is_empty() || candidate == self.word || !self.seen.insert(candidate.clone()) {
            return true;
        }
        if self.generated >= self.budget {
            self.truncated = true;
            return false;
        }
        self.generated += 1;
        if self.generated % CANCEL_POLL_INTERVAL == 0 && self.cancel.is_cancelled() {
            self.truncated = true;
            return false;
        }

        // If the original word was capitalized or uppercase, then prefer
        // capitalized or uppercased suggestions. Do fall back on the
        // unmodified suggestion in case the recased form is rejected.
        if self.kind != SuggestionKind::Case {
            let recased = self.caps.apply(&candidate);
            if recased != candidate && recased != self.word {
                if let Some(derivation) = self.analyzer.analyze(&recased) {
                    self.push(recased, score, derivation);
                    return true;
                }
            }
        }
        if let Some(derivation) = self.analyzer.analyze(&candidate) {
            self.push(candidate, score, derivation);
        }
        true
    }

    fn push(&mut self, word: String, score: f32, derivation: crate::morph::Derivation) {
        if self.found.iter().any(|s| s.word == word) {
            return;
        }
        let category = match self.kind {
            SuggestionKind::Edit if is_badchar(self.word, &word) => Category::BadChar,
            kind => kind.default_category(),
        };
        self.found.push(Suggestion {
            word,
            kind: self.kind,
            category,
            score,
            derivation,
        });
    }

    pub fn finish(self) -> (Vec<Suggestion>, bool) {
        (self.found, self.truncated)
    }
}

/// Does `sugg` differ from `word` in exactly one char, in place, other
/// than the first?
fn is_badchar(word: &str, sugg: &str) -> bool {
    if word.chars().count() != sugg.chars().count() {
        return false;
    }
    let mut diffs = word
        .chars()
        .zip(sugg.chars())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(i, _)| i);
    matches!((diffs.next(), diffs.next()), (Some(i), None) if i > 0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dictionary::{parse_wordlist, Dictionary};
    use crate::ruleset::AffixRuleSet;

    #[test]
    fn test_is_badchar() {
        assert!(is_badchar("lape", "lake"));
        assert!(!is_badchar("bake", "lake"));
        assert!(!is_badchar("lke", "lake"));
        assert!(!is_badchar("lkae", "lake"));
        assert!(!is_badchar("lake", "lake"));
    }

    #[test]
    fn test_collector() {
        let rules = AffixRuleSet::parse("NOSUGGEST x\n").unwrap();
        let dict = Dictionary::new(parse_wordlist("3\nlake\nlike\nlame/x\n", &rules), &rules);
        let analyzer = MorphAnalyzer::new(&rules, &dict).for_suggestions();
        let cancel = Cancel::default();
        let mut c = Collector::new(analyzer, "Lape", SuggestionKind::Edit, 3, &cancel);
        assert!(c.offer("lake".to_string(), 1.0));
        assert!(c.offer("lake".to_string(), 1.0));
        assert!(c.offer("lame".to_string(), 1.0));
        assert!(c.offer("Lape".to_string(), 1.0));
        assert!(c.offer("lope".to_string(), 1.0));
        assert!(!c.offer("like".to_string(), 1.0));
        assert!(c.limit());
        let (found, truncated) = c.finish();
        assert!(truncated);
        assert_eq!(1, found.len());
        assert_eq!("Lake", found[0].word);
        assert_eq!(Category::BadChar, found[0].category);
    }

    #[test]
    fn test_cancelled() {
        let rules = AffixRuleSet::parse("").unwrap();
        let dict = Dictionary::new(parse_wordlist("1\nlake\n", &rules), &rules);
        let analyzer = MorphAnalyzer::new(&rules, &dict);
        let cancel = Cancel::default();
        cancel.cancel();
        let mut c = Collector::new(analyzer, "lke", SuggestionKind::Edit, 10_000, &cancel);
        let mut n = 0;
        while c.offer(format!("cand{}", n), 1.0) {
            n += 1;
        }
        assert_eq!(CANCEL_POLL_INTERVAL - 1, n);
        assert!(c.finish().1);
    }
}
