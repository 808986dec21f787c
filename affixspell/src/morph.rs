//! Decide whether a surface form can be derived from the dictionary.
//!
//! A word is tried as a bare stem first, then with one prefix, one suffix
//! or a cross-product pair of both, then as a compound. Capitalized and
//! all-caps words are also tried in lowercase. If all of that fails, the
//! word is split at BREAK patterns and every piece is tried on its own.
use crate::casing::case_variants;
use crate::dictionary::{Dictionary, DictionaryEntry};
use crate::flags::{AffixFlag, CompoundRole, WordFlags};
use crate::ruleset::{AffixRule, AffixRuleSet};

/// A limit on the recursive attempts to break a word at breakpoints such as -
const MAX_WORD_BREAK_ATTEMPTS: u16 = 1000;
/// Compounds made with the compound flags have at most this many parts.
const MAX_COMPOUND_PARTS: usize = 3;
/// A limit on the search through COMPOUNDRULE decompositions.
const MAX_COMPOUNDRULE_STEPS: usize = 10_000;

/// How a word was accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Derivation {
    /// The word is a dictionary stem.
    Exact { stem: String },
    /// The word is a stem with a prefix, a suffix, or both.
    Affixed {
        stem: String,
        prefix: Option<AffixFlag>,
        suffix: Option<AffixFlag>,
    },
    /// The word is made of several accepted parts.
    Compound { parts: Vec<String> },
}

impl Derivation {
    pub fn is_compound(&self) -> bool {
        matches!(self, Derivation::Compound { .. })
    }
}

/// Allow numbers with dots or commas, with - at the front and -- at the end.
pub fn is_numeric(word: &str) -> bool {
    let word = word.strip_suffix("--").unwrap_or(word);
    let word = word.strip_prefix('-').unwrap_or(word);
    let mut any_digit = false;
    // no two separators in a row, and none before the first digit
    let mut seen_digit = false;
    for c in word.chars() {
        if c == '.' || c == ',' {
            if !seen_digit {
                return false;
            }
            seen_digit = false;
        } else if c.is_ascii_digit() {
            seen_digit = true;
            any_digit = true;
        } else {
            return false;
        }
    }
    any_digit
}

#[derive(Clone, Copy, Debug)]
pub struct MorphAnalyzer<'a> {
    rules: &'a AffixRuleSet,
    dict: &'a Dictionary,
    suggest_mode: bool,
}

impl<'a> MorphAnalyzer<'a> {
    pub fn new(rules: &'a AffixRuleSet, dict: &'a Dictionary) -> Self {
        MorphAnalyzer {
            rules,
            dict,
            suggest_mode: false,
        }
    }

    /// An analyzer that also refuses NOSUGGEST stems, for vetting
    /// suggestion candidates.
    pub fn for_suggestions(self) -> Self {
        MorphAnalyzer {
            suggest_mode: true,
            ..self
        }
    }

    pub fn accepts(&self, word: &str) -> bool {
        self.analyze(word).is_some()
    }

    pub fn analyze(&self, word: &str) -> Option<Derivation> {
        if word.is_empty() {
            return None;
        }
        if is_numeric(word) {
            return Some(Derivation::Exact {
                stem: word.to_string(),
            });
        }
        if self.is_forbidden(word) {
            return None;
        }
        let mut count = 0u16;
        if let Some(d) = self.analyze_with_breaks(word, &mut count) {
            return Some(d);
        }
        // Several words, such as a two-word suggestion
        if word.contains(' ') {
            let mut parts = Vec::new();
            for part in word.split(' ') {
                if part.is_empty() || !self.accepts(part) {
                    return None;
                }
                parts.push(part.to_string());
            }
            return Some(Derivation::Compound { parts });
        }
        None
    }

    fn is_forbidden(&self, word: &str) -> bool {
        self.dict.get(word).map_or(false, DictionaryEntry::is_forbidden)
    }

    fn analyze_with_breaks(&self, word: &str, count: &mut u16) -> Option<Derivation> {
        if *count > MAX_WORD_BREAK_ATTEMPTS {
            return None;
        }
        *count += 1;

        if let Some(d) = self.analyze_word(word) {
            return Some(d);
        }

        // break patterns may be anchored with ^ or $
        // Try those first.
        for brk in self.rules.word_breaks() {
            let rest = if let Some(brk) = brk.strip_prefix('^') {
                word.strip_prefix(brk)
            } else if let Some(brk) = brk.strip_suffix('$') {
                word.strip_suffix(brk)
            } else {
                None
            };
            if let Some(rest) = rest.filter(|r| !r.is_empty()) {
                if let Some(d) = self.analyze_with_breaks(rest, count) {
                    return Some(d);
                }
            }
        }

        for brk in self.rules.word_breaks() {
            if brk.starts_with('^') || brk.ends_with('$') || brk.is_empty() {
                continue;
            }
            if let Some((worda, wordb)) = word.split_once(brk.as_str()) {
                if worda.is_empty() || wordb.is_empty() {
                    continue;
                }
                if self.analyze_with_breaks(worda, count).is_some()
                    && self.analyze_with_breaks(wordb, count).is_some()
                {
                    return Some(Derivation::Compound {
                        parts: vec![worda.to_string(), wordb.to_string()],
                    });
                }
            }
        }
        None
    }

    /// Try the word and its case variants as a stem, then affixed, then
    /// as a compound.
    fn analyze_word(&self, word: &str) -> Option<Derivation> {
        let variants = case_variants(word);
        for (variant, original) in variants.iter() {
            if let Some(entry) = self.dict.get(variant) {
                if entry.is_standalone() && self.stem_allowed(entry, *original) {
                    return Some(Derivation::Exact {
                        stem: entry.stem().to_string(),
                    });
                }
            }
        }
        for (variant, original) in variants.iter() {
            if let Some(d) = self.affixed(variant, *original) {
                return Some(d);
            }
        }
        for (variant, original) in variants.iter() {
            if let Some(parts) = self.compound_by_flags(variant, *original) {
                return Some(Derivation::Compound { parts });
            }
            if let Some(parts) = self.compound_by_rules(variant) {
                return Some(Derivation::Compound { parts });
            }
        }
        None
    }

    fn stem_allowed(&self, entry: &DictionaryEntry, original: bool) -> bool {
        let wf = entry.word_flags();
        if wf.contains(WordFlags::Forbidden) {
            return false;
        }
        if !original && wf.contains(WordFlags::KeepCase) {
            return false;
        }
        !(self.suggest_mode && wf.contains(WordFlags::NoSuggest))
    }

    /// Can a lone affix rule make a complete word?
    fn stands_alone(&self, rule: &AffixRule) -> bool {
        let special = self.rules.special_flags();
        !rule.has_continuation(special.circumfix) && !rule.has_continuation(special.need_affix)
    }

    fn affixed_entry(&self, stem: &str, flag: AffixFlag, original: bool) -> Option<&'a DictionaryEntry> {
        let entry = self.dict.get(stem)?;
        if !entry.has_flag(flag)
            || entry.word_flags().contains(WordFlags::OnlyInCompound)
            || !self.stem_allowed(entry, original)
        {
            return None;
        }
        Some(entry)
    }

    fn affixed(&self, word: &str, original: bool) -> Option<Derivation> {
        let fullstrip = self.rules.fullstrip();
        let mut found = None;

        self.rules.for_each_suffix(word, |sfx| {
            if !self.stands_alone(sfx) {
                return false;
            }
            let entry = sfx
                .unapply(word, fullstrip)
                .and_then(|stem| self.affixed_entry(&stem, sfx.flag(), original));
            if let Some(entry) = entry {
                found = Some(Derivation::Affixed {
                    stem: entry.stem().to_string(),
                    prefix: None,
                    suffix: Some(sfx.flag()),
                });
            }
            found.is_some()
        });
        if found.is_some() {
            return found;
        }

        self.rules.for_each_prefix(word, |pfx| {
            if !self.stands_alone(pfx) {
                return false;
            }
            let entry = pfx
                .unapply(word, fullstrip)
                .and_then(|stem| self.affixed_entry(&stem, pfx.flag(), original));
            if let Some(entry) = entry {
                found = Some(Derivation::Affixed {
                    stem: entry.stem().to_string(),
                    prefix: Some(pfx.flag()),
                    suffix: None,
                });
            }
            found.is_some()
        });
        if found.is_some() {
            return found;
        }

        self.prefixed_and_suffixed(word, original)
    }

    fn prefixed_and_suffixed(&self, word: &str, original: bool) -> Option<Derivation> {
        let fullstrip = self.rules.fullstrip();
        let circumfix = self.rules.special_flags().circumfix;
        let mut found = None;
        self.rules.for_each_prefix(word, |pfx| {
            if !pfx.cross_product() {
                return false;
            }
            let middle = match pfx.unapply(word, fullstrip) {
                Some(middle) => middle,
                None => return false,
            };
            self.rules.for_each_suffix(&middle, |sfx| {
                if !sfx.cross_product()
                    || pfx.has_continuation(circumfix) != sfx.has_continuation(circumfix)
                {
                    return false;
                }
                let stem = match sfx.unapply(&middle, fullstrip) {
                    Some(stem) => stem,
                    None => return false,
                };
                let entry = match self.affixed_entry(&stem, sfx.flag(), original) {
                    Some(entry) => entry,
                    None => return false,
                };
                // The prefix flag may sit on the stem or on the suffix.
                if entry.has_flag(pfx.flag()) || sfx.has_continuation(Some(pfx.flag())) {
                    found = Some(Derivation::Affixed {
                        stem: entry.stem().to_string(),
                        prefix: Some(pfx.flag()),
                        suffix: Some(sfx.flag()),
                    });
                }
                found.is_some()
            })
        });
        found
    }

    fn compound_entry_allowed(&self, entry: &DictionaryEntry, role: CompoundRole, original: bool) -> bool {
        self.stem_allowed(entry, original) && self.rules.is_compound_capable(entry, role)
    }

    /// Is `piece` acceptable in the given compound position? The first
    /// part may carry a prefix and the last part a suffix. Affixes with
    /// COMPOUNDPERMITFLAG may appear anywhere.
    fn compound_part(&self, piece: &str, role: CompoundRole, original: bool) -> bool {
        if let Some(entry) = self.dict.get(piece) {
            if self.compound_entry_allowed(entry, role, original) {
                return true;
            }
        }
        let fullstrip = self.rules.fullstrip();
        let permit = self.rules.special_flags().compound_permit;
        let try_rule = |rule: &AffixRule, edge_role: CompoundRole| {
            if role != edge_role && !rule.has_continuation(permit) {
                return false;
            }
            rule.unapply(piece, fullstrip)
                .and_then(|stem| self.dict.get(&stem))
                .map_or(false, |entry| {
                    entry.has_flag(rule.flag()) && self.compound_entry_allowed(entry, role, original)
                })
        };
        self.rules
            .for_each_suffix(piece, |sfx| try_rule(sfx, CompoundRole::End))
            || self
                .rules
                .for_each_prefix(piece, |pfx| try_rule(pfx, CompoundRole::Begin))
    }

    /// Split `word` into up to MAX_COMPOUND_PARTS pieces that carry the
    /// compound flags for their positions. Depth-first over an explicit
    /// stack of (piece start, next piece end) in char positions.
    fn compound_by_flags(&self, word: &str, original: bool) -> Option<Vec<String>> {
        if !self.rules.special_flags().allows_compounds() {
            return None;
        }
        let min = self.rules.compound_min();
        let bounds: Vec<usize> = word
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(word.len()))
            .collect();
        let n = bounds.len() - 1;
        if n < 2 * min {
            return None;
        }

        let mut stack: Vec<(usize, usize)> = vec![(0, min)];
        while let Some(top) = stack.last_mut() {
            let (start, end) = *top;
            if end > n {
                stack.pop();
                continue;
            }
            top.1 += 1;
            let depth = stack.len() - 1;
            let piece = &word[bounds[start]..bounds[end]];
            if end == n {
                if depth > 0 && self.compound_part(piece, CompoundRole::End, original) {
                    // every frame's chosen piece ends one before its next end
                    let parts = stack
                        .iter()
                        .map(|&(s, e)| word[bounds[s]..bounds[e - 1]].to_string())
                        .collect();
                    return Some(parts);
                }
                continue;
            }
            if n - end < min {
                continue;
            }
            let role = if depth == 0 {
                CompoundRole::Begin
            } else {
                CompoundRole::Middle
            };
            if self.compound_part(piece, role, original) {
                // The last allowed part has to take the whole remainder.
                let next_end = if depth + 2 == MAX_COMPOUND_PARTS {
                    n
                } else {
                    end + min
                };
                stack.push((end, next_end));
            }
        }
        None
    }

    /// Split `word` into dictionary stems that together match one of the
    /// COMPOUNDRULE patterns.
    fn compound_by_rules(&self, word: &str) -> Option<Vec<String>> {
        let rules = self.rules.compound_rules();
        if rules.is_empty() {
            return None;
        }
        let has = |piece: &str, flag: AffixFlag| {
            self.dict
                .get(piece)
                .map_or(false, |e| e.has_flag(flag) && self.stem_allowed(e, true))
        };
        let min = self.rules.compound_min();
        let bounds: Vec<usize> = word
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(word.len()))
            .collect();
        let n = bounds.len() - 1;

        let mut steps = 0;
        let mut stack: Vec<(usize, usize)> = vec![(0, min)];
        while let Some(top) = stack.last_mut() {
            steps += 1;
            if steps > MAX_COMPOUNDRULE_STEPS {
                return None;
            }
            let (start, end) = *top;
            if end > n {
                stack.pop();
                continue;
            }
            top.1 += 1;
            if self.dict.get(&word[bounds[start]..bounds[end]]).is_none() {
                continue;
            }
            let pieces: Vec<&str> = stack
                .iter()
                .map(|&(s, e)| &word[bounds[s]..bounds[e - 1]])
                .collect();
            if end == n {
                if pieces.len() > 1 && rules.iter().any(|r| r.matches(&pieces, has)) {
                    return Some(pieces.into_iter().map(str::to_string).collect());
                }
                continue;
            }
            if n - end >= min && rules.iter().any(|r| r.partial_match(&pieces, has)) {
                stack.push((end, end + min));
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dictionary::parse_wordlist;

    fn setup(aff: &str, dic: &str) -> (AffixRuleSet, Dictionary) {
        let rules = AffixRuleSet::parse(aff).unwrap();
        let dict = Dictionary::new(parse_wordlist(dic, &rules), &rules);
        (rules, dict)
    }

    const AFF: &str = "
PFX A Y 1
PFX A 0 re .

SFX G Y 2
SFX G e ing e
SFX G 0 ing [^e]

SFX S Y 1
SFX S 0 s .

NEEDAFFIX n
FORBIDDENWORD !
KEEPCASE K
NOSUGGEST x
";

    const DIC: &str = "6
rain/GS
appear/AGS
angle/G
Alberta
sheeps/!
bound/n
SQL/K
rainn/x
";

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("54"));
        assert!(is_numeric("-1,000.00"));
        assert!(is_numeric("-1,000.--"));
        assert!(is_numeric("1,000."));
        assert!(!is_numeric("1..0"));
        assert!(!is_numeric(",5"));
        assert!(!is_numeric("5a"));
        assert!(!is_numeric("-"));
    }

    #[test]
    fn test_exact_and_affixed() {
        let (rules, dict) = setup(AFF, DIC);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert_eq!(
            Some(Derivation::Exact {
                stem: "rain".to_string()
            }),
            m.analyze("rain")
        );
        assert!(m.accepts("raining"));
        assert!(m.accepts("rains"));
        assert!(m.accepts("angling"));
        assert!(!m.accepts("angleing"));
        assert!(m.accepts("reappear"));
        assert_eq!(
            Some(Derivation::Affixed {
                stem: "appear".to_string(),
                prefix: Some('A' as u32),
                suffix: Some('G' as u32),
            }),
            m.analyze("reappearing")
        );
        assert!(!m.accepts("rainning"));
        assert!(!m.accepts("rerain"));
    }

    #[test]
    fn test_special_flags() {
        let (rules, dict) = setup(AFF, DIC);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert!(!m.accepts("sheeps"));
        assert!(!m.accepts("bound"));
        assert!(m.accepts("SQL"));
        assert!(!m.accepts("Sql"));
        assert!(m.accepts("rainn"));
        assert!(!m.for_suggestions().accepts("rainn"));
    }

    #[test]
    fn test_case_variants() {
        let (rules, dict) = setup(AFF, DIC);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert!(m.accepts("Raining"));
        assert!(m.accepts("RAINING"));
        assert!(m.accepts("ALBERTA"));
        assert!(!m.accepts("alberta"));
        assert!(!m.accepts(""));
    }

    #[test]
    fn test_breaks_and_spaces() {
        let (rules, dict) = setup(AFF, DIC);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert!(m.accepts("rain-appear"));
        assert!(m.accepts("-rain"));
        assert!(!m.accepts("rain-apear"));
        assert!(m.accepts("rain appear"));
        assert!(!m.accepts("rain  appear"));
        assert!(m.accepts("42"));
    }

    #[test]
    fn test_compound_flags() {
        let aff = "COMPOUNDBEGIN B\nCOMPOUNDMIDDLE M\nCOMPOUNDEND E\nSFX S Y 1\nSFX S 0 s .\n";
        let dic = "4\nrain/B\ncoat/ES\ndrop/BM\ntop\n";
        let (rules, dict) = setup(aff, dic);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert_eq!(
            Some(Derivation::Compound {
                parts: vec!["rain".to_string(), "coat".to_string()]
            }),
            m.analyze("raincoat")
        );
        assert!(m.accepts("raincoats"));
        assert!(m.accepts("raindropcoat"));
        assert!(!m.accepts("coatrain"));
        assert!(!m.accepts("raintop"));
        assert!(!m.accepts("raindropdropcoat"));
    }

    #[test]
    fn test_compound_min() {
        let aff = "COMPOUNDFLAG Y\nCOMPOUNDMIN 4\n";
        let dic = "3\nfoot/Y\nball/Y\nsea/Y\n";
        let (rules, dict) = setup(aff, dic);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert!(m.accepts("football"));
        assert!(!m.accepts("seaball"));
    }

    #[test]
    fn test_compound_rules() {
        let aff = "COMPOUNDMIN 1\nONLYINCOMPOUND c\nCOMPOUNDRULE 2\nCOMPOUNDRULE n*1t\nCOMPOUNDRULE n*mp\n";
        let dic = "6\n0/nm\n1/n1\n2/nm\n1st/p\nth/pt\nst/pc\n";
        let (rules, dict) = setup(aff, dic);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert!(m.accepts("10th"));
        assert!(m.accepts("21th") || m.accepts("21st"));
        assert!(!m.accepts("st"));
    }

    #[test]
    fn test_circumfix() {
        let aff = "CIRCUMFIX X\nPFX P Y 1\nPFX P 0 ge/X .\nSFX T Y 1\nSFX T 0 t/X .\nSFX D Y 1\nSFX D 0 d .\n";
        let dic = "1\nmach/PTD\n";
        let (rules, dict) = setup(aff, dic);
        let m = MorphAnalyzer::new(&rules, &dict);
        assert!(m.accepts("gemacht"));
        assert!(!m.accepts("macht"));
        assert!(!m.accepts("gemach"));
        assert!(!m.accepts("gemachd"));
        assert!(m.accepts("machd"));
    }
}
