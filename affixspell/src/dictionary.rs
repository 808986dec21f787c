//! The stem list of a language, with the indexes the analyzer and the
//! suggestion engine need.
use fnv::FnvHashMap;
use smallvec::SmallVec;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::casing::CapStyle;
use crate::delins::delins;
use crate::flags::{AffixFlag, FlagSet, WordFlags};
use crate::ruleset::AffixRuleSet;

/// One line of a wordlist, before it is indexed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordlistEntry {
    pub stem: String,
    pub flags: FlagSet,
    pub morph: Option<String>,
}

impl WordlistEntry {
    pub fn new(stem: &str, flags: FlagSet) -> Self {
        WordlistEntry {
            stem: stem.to_string(),
            flags,
            morph: None,
        }
    }
}

/// A parsed wordlist, plus the number of lines that had to be skipped.
#[derive(Clone, Debug, Default)]
pub struct Wordlist {
    pub entries: Vec<WordlistEntry>,
    pub skipped: usize,
}

/// Parse hunspell `.dic` text. The first line holds the (approximate)
/// number of words and is skipped. Lines whose flags don't parse in the
/// rule set's flag mode are skipped with a warning.
pub fn parse_wordlist(text: &str, rules: &AffixRuleSet) -> Wordlist {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut wordlist = Wordlist::default();
    let mut lines = text.lines().enumerate();
    // The count line is optional in practice; only skip it if it's a number.
    if let Some((_, first)) = lines.clone().next() {
        if first.trim().parse::<usize>().is_ok() {
            lines.next();
        }
    }
    for (nr, line) in lines {
        if line.starts_with('\t') || line.trim().is_empty() {
            // comment
            continue;
        }
        let (word, morph) = split_morphological_fields(line);
        let (stem, flagstr) = split_flags(word);
        let stem = stem.trim().to_string();
        if stem.is_empty() {
            continue;
        }
        match rules.flag_mode().parse(flagstr.trim()) {
            Ok(flags) => wordlist.entries.push(WordlistEntry {
                stem,
                flags,
                morph: morph.map(str::to_string),
            }),
            Err(e) => {
                log::warn!("wordlist line {}: skipping {}: {}", nr + 1, stem, e);
                wordlist.skipped += 1;
            }
        }
    }
    wordlist
}

/// Split `word/FLAGS` at the first slash that isn't escaped as `\/`.
fn split_flags(s: &str) -> (String, &str) {
    let mut stem = String::with_capacity(s.len());
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '/' if !escaped => return (stem, &s[i + 1..]),
            c => {
                if escaped && c != '/' {
                    stem.push('\\');
                }
                stem.push(c);
                escaped = false;
            }
        }
    }
    (stem, "")
}

fn split_morphological_fields(s: &str) -> (&str, Option<&str>) {
    // The fields are separated from the word by whitespace, but the word
    // may itself contain a space, so recognize them by their xx:yyy shape.
    let mut last_space = None;
    for (i, c) in s.char_indices() {
        if let Some(spos) = last_space {
            if (i - spos <= 2 && !c.is_alphanumeric()) || (i - spos == 3 && c != ':') {
                last_space = None;
            } else if i - spos == 3 {
                return (&s[..spos], Some(s[spos + 1..].trim()));
            }
        } else if c == ' ' || c == '\t' {
            last_space = Some(i);
        }
    }
    (s, None)
}

/// The key used for near-match scanning: case folded, with diacritics removed.
pub fn normalize(word: &str) -> String {
    caseless::default_case_fold_str(word)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionaryEntry {
    stem: String,
    flags: FlagSet,
    word_flags: WordFlags,
    morph: Option<String>,
}

impl DictionaryEntry {
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn flags(&self) -> &[AffixFlag] {
        &self.flags
    }

    pub fn has_flag(&self, flag: AffixFlag) -> bool {
        self.flags.binary_search(&flag).is_ok()
    }

    pub fn word_flags(&self) -> WordFlags {
        self.word_flags
    }

    /// Morphological fields from the wordlist, passed through untouched.
    pub fn morph(&self) -> Option<&str> {
        self.morph.as_deref()
    }

    pub fn is_forbidden(&self) -> bool {
        self.word_flags.contains(WordFlags::Forbidden)
    }

    /// Can this stem stand on its own, without affixes or compounding?
    pub fn is_standalone(&self) -> bool {
        !self
            .word_flags
            .intersects(WordFlags::Forbidden | WordFlags::NeedAffix | WordFlags::OnlyInCompound)
    }
}

type Bucket = SmallVec<[u32; 4]>;

#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
    exact: FnvHashMap<String, u32>,
    /// lowercased stem -> entries that may be found under another case
    folded: FnvHashMap<String, Bucket>,
    /// normalized key
    keys: Vec<Vec<char>>,
    /// (key length, first char of key) -> entries
    near: FnvHashMap<(usize, char), Bucket>,
    alphabet: Vec<char>,
    skipped_lines: usize,
}

impl Dictionary {
    pub fn new(wordlist: Wordlist, rules: &AffixRuleSet) -> Self {
        let mut dict = Dictionary {
            skipped_lines: wordlist.skipped,
            ..Default::default()
        };
        let mut counts: FnvHashMap<char, usize> = FnvHashMap::default();

        for item in wordlist.entries {
            if let Some(&idx) = dict.exact.get(&item.stem) {
                // Homonyms share one entry with the union of their flags.
                let entry = &mut dict.entries[idx as usize];
                entry.flags.extend(item.flags);
                entry.flags.sort_unstable();
                entry.flags.dedup();
                entry.word_flags = rules.special_flags().word_flags(&entry.flags);
                if entry.morph.is_none() {
                    entry.morph = item.morph;
                }
                continue;
            }
            for c in item.stem.chars() {
                *counts.entry(c).or_default() += 1;
            }
            let idx = dict.entries.len() as u32;
            let word_flags = rules.special_flags().word_flags(&item.flags);
            dict.exact.insert(item.stem.clone(), idx);
            dict.entries.push(DictionaryEntry {
                stem: item.stem,
                flags: item.flags,
                word_flags,
                morph: item.morph,
            });
        }

        for (idx, entry) in dict.entries.iter().enumerate() {
            let idx = idx as u32;
            let key: Vec<char> = normalize(&entry.stem).chars().collect();
            if let Some(&first) = key.first() {
                dict.near.entry((key.len(), first)).or_default().push(idx);
            }
            dict.keys.push(key);
            let lower = entry.stem.to_lowercase();
            if lower != entry.stem {
                dict.folded.entry(lower).or_default().push(idx);
            }
        }

        // Most frequent characters first, so edits try likely letters early.
        let mut alphabet: Vec<(char, usize)> = counts
            .into_iter()
            .filter(|(c, _)| c.is_alphabetic() || *c == '\'' || *c == '-')
            .collect();
        alphabet.sort_by(|(c1, n1), (c2, n2)| n2.cmp(n1).then(c1.cmp(c2)));
        dict.alphabet = alphabet.into_iter().map(|(c, _)| c).collect();
        dict
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter()
    }

    /// Lines of the wordlist that were skipped during loading.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// The characters that occur in stems, most frequent first.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Case-sensitive lookup of a stem.
    pub fn get(&self, stem: &str) -> Option<&DictionaryEntry> {
        self.exact.get(stem).map(|idx| &self.entries[*idx as usize])
    }

    /// Look up `word` as written, then fall back to differently-cased
    /// stems if `word` is capitalized or all caps. KEEPCASE stems are only
    /// found as written.
    pub fn exact_lookup(&self, word: &str) -> Option<&DictionaryEntry> {
        if let Some(entry) = self.get(word) {
            return Some(entry);
        }
        let style = CapStyle::of(word);
        if !matches!(style, CapStyle::Capitalized | CapStyle::AllCaps) {
            return None;
        }
        let lower = word.to_lowercase();
        let from_lower = self
            .get(&lower)
            .into_iter()
            .filter(|e| !e.word_flags.contains(WordFlags::KeepCase));
        let from_folded = self
            .folded
            .get(&lower)
            .into_iter()
            .flatten()
            .map(|idx| &self.entries[*idx as usize])
            .filter(|e| !e.word_flags.contains(WordFlags::KeepCase))
            .filter(move |e| match style {
                // "Mcdonald" must not find "McDonald"
                CapStyle::Capitalized => CapStyle::of(&e.stem) != CapStyle::Mixed,
                _ => true,
            });
        from_lower.chain(from_folded).next()
    }

    /// Entries whose normalized key is within `max_distance` insertions
    /// and deletions of `key`, which should itself be normalized. Only
    /// entries sharing the key's first character are considered.
    pub fn entries_near(&self, key: &str, max_distance: usize) -> Vec<&DictionaryEntry> {
        let key: Vec<char> = key.chars().collect();
        let first = match key.first() {
            Some(c) => *c,
            None => return Vec::new(),
        };
        let min_len = key.len().saturating_sub(max_distance).max(1);
        let max_len = key.len() + max_distance;
        let mut found = Vec::new();
        for len in min_len..=max_len {
            if let Some(bucket) = self.near.get(&(len, first)) {
                for idx in bucket.iter() {
                    let idx = *idx as usize;
                    if delins(&key, &self.keys[idx], max_distance) <= max_distance {
                        found.push(&self.entries[idx]);
                    }
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn rules() -> AffixRuleSet {
        let mut b = AffixRuleSet::builder();
        b.special_flag("KEEPCASE", "K").unwrap();
        b.special_flag("NEEDAFFIX", "n").unwrap();
        b.build()
    }

    fn dict(text: &str) -> Dictionary {
        let rules = rules();
        Dictionary::new(parse_wordlist(text, &rules), &rules)
    }

    #[test]
    fn test_parse_wordlist() {
        let rules = rules();
        let wl = parse_wordlist(
            "5\nrain/SGDM\n\tcomment line\nAlberta/M po:noun\n1\\/2/K\nNew York\n",
            &rules,
        );
        assert_eq!(0, wl.skipped);
        let stems: Vec<&str> = wl.entries.iter().map(|e| e.stem.as_str()).collect();
        assert_eq!(vec!["rain", "Alberta", "1/2", "New York"], stems);
        assert_eq!(Some("po:noun".to_string()), wl.entries[1].morph);
        assert_eq!(4, wl.entries[0].flags.len());
    }

    #[test]
    fn test_skipped_lines() {
        let rules = AffixRuleSet::parse("FLAG num\n").unwrap();
        let wl = parse_wordlist("2\nrain/12,14\ncoat/1x\n", &rules);
        assert_eq!(1, wl.entries.len());
        assert_eq!(1, wl.skipped);
        assert_eq!(1, Dictionary::new(wl, &rules).skipped_lines());
    }

    #[test]
    fn test_homonyms_merge() {
        let d = dict("2\nfall/S\nfall/G\n");
        assert_eq!(1, d.len());
        let entry = d.get("fall").unwrap();
        assert!(entry.has_flag('S' as u32));
        assert!(entry.has_flag('G' as u32));
    }

    #[test]
    fn test_exact_lookup_casing() {
        let d = dict("4\nrain\nAlberta\nMcDonald\nSQL/K\n");
        assert!(d.exact_lookup("rain").is_some());
        assert!(d.exact_lookup("Rain").is_some());
        assert!(d.exact_lookup("RAIN").is_some());
        assert!(d.exact_lookup("ALBERTA").is_some());
        assert!(d.exact_lookup("alberta").is_none());
        assert!(d.exact_lookup("MCDONALD").is_some());
        assert!(d.exact_lookup("Mcdonald").is_none());
        assert!(d.exact_lookup("SQL").is_some());
        assert!(d.exact_lookup("Sql").is_none());
        assert!(d.exact_lookup("rAIN").is_none());
    }

    #[test]
    fn test_entries_near() {
        let d = dict("5\nlake\nlike\nlaker\nfish\nLäke\n");
        let near: Vec<&str> = d.entries_near(&normalize("lke"), 1).iter().map(|e| e.stem()).collect();
        assert_eq!(vec!["lake", "like", "Läke"], near);
        let near = d.entries_near(&normalize("lke"), 2);
        assert_eq!(4, near.len());
        assert!(d.entries_near("", 2).is_empty());
    }

    #[test]
    fn test_normalize_and_alphabet() {
        assert_eq!("cafe", normalize("Café"));
        assert_eq!("strasse", normalize("Straße"));
        let d = dict("3\naab\nab\nc1\n");
        assert_eq!(&['a', 'b', 'c'][..], d.alphabet());
    }
}
