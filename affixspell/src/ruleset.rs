//! The affix rules and language settings for one language.
//!
//! An [`AffixRuleSet`] is normally parsed from a hunspell `.aff` file with
//! [`AffixRuleSet::parse`], but can also be assembled in code with
//! [`AffixRuleSet::builder`]. It is immutable once built.
use fnv::FnvHashMap;
use smallvec::SmallVec;

mod compoundrule;
mod condition;
mod parse_aff;
mod replacements;

pub use crate::ruleset::compoundrule::CompoundRule;
pub use crate::ruleset::condition::AffixCondition;
pub use crate::ruleset::replacements::ReplacementTable;

use crate::affix_trie::{AffixTrie, Edge};
use crate::dictionary::DictionaryEntry;
use crate::error::{Error, Result};
use crate::flags::{AffixFlag, CompoundRole, FlagMode, FlagSet, SpecialFlags, WordFlags};

/// Strip and add strings longer than this are rejected as corrupt data.
pub const MAX_AFFIX_LEN: usize = 64;

/// The minimum length of compound word pieces, unless COMPOUNDMIN says otherwise.
const DEFAULT_COMPOUND_MIN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

/// One conditioned variant of a prefix or suffix rule.
#[derive(Clone, Debug)]
pub struct AffixRule {
    flag: AffixFlag,
    kind: AffixKind,
    cross_product: bool,
    strip: String,
    add: String,
    condition: AffixCondition,
    continuation: FlagSet,
}

impl AffixRule {
    /// `0` stands for the empty string in `strip` and `add`, as in affix files.
    pub fn new(
        kind: AffixKind,
        flag: AffixFlag,
        cross_product: bool,
        strip: &str,
        add: &str,
        condition: &str,
    ) -> std::result::Result<Self, String> {
        let strip = if strip == "0" { "" } else { strip };
        let add = if add == "0" { "" } else { add };
        if strip.chars().count() > MAX_AFFIX_LEN {
            return Err(format!("strip string {} is longer than any plausible stem", strip));
        }
        if add.chars().count() > MAX_AFFIX_LEN {
            return Err(format!("affix {} is too long", add));
        }
        Ok(AffixRule {
            flag,
            kind,
            cross_product,
            strip: strip.to_string(),
            add: add.to_string(),
            condition: AffixCondition::new(condition)?,
            continuation: FlagSet::new(),
        })
    }

    /// Attach continuation flags (the `/flags` part of an affix string).
    pub fn with_continuation(mut self, flags: FlagSet) -> Self {
        self.continuation = flags;
        self
    }

    pub fn flag(&self) -> AffixFlag {
        self.flag
    }

    pub fn kind(&self) -> AffixKind {
        self.kind
    }

    pub fn cross_product(&self) -> bool {
        self.cross_product
    }

    pub fn strip(&self) -> &str {
        &self.strip
    }

    pub fn add(&self) -> &str {
        &self.add
    }

    pub fn has_continuation(&self, flag: Option<AffixFlag>) -> bool {
        match flag {
            Some(f) => self.continuation.binary_search(&f).is_ok(),
            None => false,
        }
    }

    fn condition_matches(&self, stem: &str) -> bool {
        match self.kind {
            AffixKind::Prefix => self.condition.prefix_match(stem),
            AffixKind::Suffix => self.condition.suffix_match(stem),
        }
    }

    /// Derive a surface form from `stem`, or None if the rule doesn't apply.
    pub fn apply(&self, stem: &str) -> Option<String> {
        if !self.condition_matches(stem) {
            return None;
        }
        match self.kind {
            AffixKind::Prefix => {
                let core = stem.strip_prefix(self.strip.as_str())?;
                Some(format!("{}{}", self.add, core))
            }
            AffixKind::Suffix => {
                let core = stem.strip_suffix(self.strip.as_str())?;
                Some(format!("{}{}", core, self.add))
            }
        }
    }

    /// Recover the stem that `surface` would be derived from by this rule.
    /// Unless `fullstrip` is set, some of the stem must survive the strip.
    pub fn unapply(&self, surface: &str, fullstrip: bool) -> Option<String> {
        let stem = match self.kind {
            AffixKind::Prefix => {
                let core = surface.strip_prefix(self.add.as_str())?;
                if core.is_empty() && !fullstrip {
                    return None;
                }
                format!("{}{}", self.strip, core)
            }
            AffixKind::Suffix => {
                let core = surface.strip_suffix(self.add.as_str())?;
                if core.is_empty() && !fullstrip {
                    return None;
                }
                format!("{}{}", core, self.strip)
            }
        };
        if stem.is_empty() || !self.condition_matches(&stem) {
            return None;
        }
        Some(stem)
    }
}

#[derive(Clone, Debug)]
pub struct AffixRuleSet {
    flag_mode: FlagMode,
    special: SpecialFlags,
    rules: Vec<AffixRule>,
    by_flag: FnvHashMap<AffixFlag, SmallVec<[u32; 4]>>,
    prefix_index: AffixTrie<u32>,
    suffix_index: AffixTrie<u32>,
    compound_min: usize,
    compound_rules: Vec<CompoundRule>,
    replacements: ReplacementTable,
    related_chars: Vec<Vec<char>>,
    word_breaks: Vec<String>,
    try_chars: Option<String>,
    iconv: ReplacementTable,
    oconv: ReplacementTable,
    fullstrip: bool,
    encoding: Option<String>,
}

impl AffixRuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Parse the contents of a hunspell `.aff` file.
    pub fn parse(text: &str) -> Result<Self> {
        parse_aff::parse_affix_data(text)
    }

    /// All conditioned variants of the rule named by `flag`, in file order.
    pub fn resolve(&self, flag: AffixFlag) -> impl Iterator<Item = &AffixRule> + '_ {
        self.by_flag
            .get(&flag)
            .into_iter()
            .flat_map(move |idxs| idxs.iter().map(move |i| &self.rules[*i as usize]))
    }

    /// Visit the prefix rules whose add-string starts `word`.
    /// Stops and returns true when `f` returns true.
    pub fn for_each_prefix(&self, word: &str, mut f: impl FnMut(&AffixRule) -> bool) -> bool {
        self.prefix_index
            .lookup(word, |i| f(&self.rules[i as usize]))
    }

    /// Visit the suffix rules whose add-string ends `word`.
    /// Stops and returns true when `f` returns true.
    pub fn for_each_suffix(&self, word: &str, mut f: impl FnMut(&AffixRule) -> bool) -> bool {
        self.suffix_index
            .lookup(word, |i| f(&self.rules[i as usize]))
    }

    /// May this entry appear in the given position of a compound word?
    pub fn is_compound_capable(&self, entry: &DictionaryEntry, role: CompoundRole) -> bool {
        entry
            .word_flags()
            .intersects(WordFlags::CompoundFlag | role.word_flag())
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn flag_mode(&self) -> FlagMode {
        self.flag_mode
    }

    pub fn special_flags(&self) -> &SpecialFlags {
        &self.special
    }

    pub fn compound_min(&self) -> usize {
        self.compound_min
    }

    pub fn compound_rules(&self) -> &[CompoundRule] {
        &self.compound_rules
    }

    pub fn replacements(&self) -> &ReplacementTable {
        &self.replacements
    }

    pub fn related_chars(&self) -> &[Vec<char>] {
        &self.related_chars
    }

    pub fn word_breaks(&self) -> &[String] {
        &self.word_breaks
    }

    pub fn try_chars(&self) -> Option<&str> {
        self.try_chars.as_deref()
    }

    pub fn input_conversion(&self) -> &ReplacementTable {
        &self.iconv
    }

    pub fn output_conversion(&self) -> &ReplacementTable {
        &self.oconv
    }

    pub fn fullstrip(&self) -> bool {
        self.fullstrip
    }

    /// The character encoding named by the SET line, if any.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }
}

/// Collects affix rules and settings, then indexes them into an
/// [`AffixRuleSet`].
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    flag_mode: FlagMode,
    special: SpecialFlags,
    rules: Vec<AffixRule>,
    compound_min: Option<usize>,
    compound_rules: Vec<CompoundRule>,
    replacements: ReplacementTable,
    related_chars: Vec<Vec<char>>,
    word_breaks: Option<Vec<String>>,
    try_chars: Option<String>,
    iconv: ReplacementTable,
    oconv: ReplacementTable,
    fullstrip: bool,
    encoding: Option<String>,
}

impl RuleSetBuilder {
    pub fn flag_mode(&mut self, mode: FlagMode) -> &mut Self {
        self.flag_mode = mode;
        self
    }

    /// Assign a special flag by its affix file keyword, e.g. `NEEDAFFIX`.
    pub fn special_flag(&mut self, keyword: &str, flag: &str) -> Result<&mut Self> {
        let flag = self
            .flag_mode
            .parse_one(flag)
            .map_err(|e| Error::malformed(format!("{}: {}", keyword, e)))?;
        if !self.special.assign(keyword, flag) {
            return Err(Error::malformed(format!("{} is not a flag keyword", keyword)));
        }
        Ok(self)
    }

    pub fn rule(&mut self, rule: AffixRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Add a rule in affix-file notation: `add` may carry continuation
    /// flags after a slash, and `0` means empty.
    pub fn affix(
        &mut self,
        kind: AffixKind,
        flag: &str,
        cross_product: bool,
        strip: &str,
        add: &str,
        condition: &str,
    ) -> Result<&mut Self> {
        let (add, cont) = add.split_once('/').unwrap_or((add, ""));
        let mode = self.flag_mode;
        let flag = mode.parse_one(flag).map_err(Error::malformed)?;
        let continuation = mode.parse(cont).map_err(Error::malformed)?;
        let rule = AffixRule::new(kind, flag, cross_product, strip, add, condition)
            .map_err(Error::malformed)?
            .with_continuation(continuation);
        Ok(self.rule(rule))
    }

    pub fn prefix(
        &mut self,
        flag: &str,
        cross_product: bool,
        strip: &str,
        add: &str,
        condition: &str,
    ) -> Result<&mut Self> {
        self.affix(AffixKind::Prefix, flag, cross_product, strip, add, condition)
    }

    pub fn suffix(
        &mut self,
        flag: &str,
        cross_product: bool,
        strip: &str,
        add: &str,
        condition: &str,
    ) -> Result<&mut Self> {
        self.affix(AffixKind::Suffix, flag, cross_product, strip, add, condition)
    }

    pub fn compound_min(&mut self, min: usize) -> &mut Self {
        self.compound_min = Some(min.max(1));
        self
    }

    pub fn compound_rule(&mut self, pattern: &str) -> Result<&mut Self> {
        let rule = CompoundRule::parse(pattern, self.flag_mode).map_err(Error::malformed)?;
        self.compound_rules.push(rule);
        Ok(self)
    }

    /// Add a REP entry. `_` stands for a space.
    pub fn replacement(&mut self, from: &str, to: &str) -> &mut Self {
        self.replacements
            .push(&from.replace('_', " "), &to.replace('_', " "));
        self
    }

    /// Add a MAP group of related characters, such as `aáàâ`.
    /// Parenthesized multi-character members are skipped.
    pub fn related_chars(&mut self, group: &str) -> &mut Self {
        let mut chars = Vec::new();
        let mut paren: Option<String> = None;
        for c in group.chars() {
            match (c, paren.as_mut()) {
                ('(', None) => paren = Some(String::new()),
                (')', Some(inner)) => {
                    let mut it = inner.chars();
                    if let (Some(single), None) = (it.next(), it.next()) {
                        chars.push(single);
                    }
                    paren = None;
                }
                (c, Some(inner)) => inner.push(c),
                (c, None) => chars.push(c),
            }
        }
        if chars.len() > 1 {
            self.related_chars.push(chars);
        }
        self
    }

    pub fn word_break(&mut self, pattern: &str) -> &mut Self {
        self.word_breaks
            .get_or_insert_with(Vec::new)
            .push(pattern.to_string());
        self
    }

    pub fn try_chars(&mut self, chars: &str) -> &mut Self {
        self.try_chars = Some(chars.to_string());
        self
    }

    pub fn input_conversion(&mut self, from: &str, to: &str) -> &mut Self {
        self.iconv.push(from, to);
        self
    }

    pub fn output_conversion(&mut self, from: &str, to: &str) -> &mut Self {
        self.oconv.push(from, to);
        self
    }

    pub fn fullstrip(&mut self, fullstrip: bool) -> &mut Self {
        self.fullstrip = fullstrip;
        self
    }

    pub fn encoding(&mut self, encoding: &str) -> &mut Self {
        self.encoding = Some(encoding.to_string());
        self
    }

    pub fn current_flag_mode(&self) -> FlagMode {
        self.flag_mode
    }

    pub fn build(&mut self) -> AffixRuleSet {
        let rules = std::mem::take(&mut self.rules);
        let mut by_flag: FnvHashMap<AffixFlag, SmallVec<[u32; 4]>> = FnvHashMap::default();
        let mut prefix_index = AffixTrie::new(Edge::Front);
        let mut suffix_index = AffixTrie::new(Edge::Back);
        for (i, rule) in rules.iter().enumerate() {
            let i = i as u32;
            by_flag.entry(rule.flag).or_default().push(i);
            match rule.kind {
                AffixKind::Prefix => prefix_index.insert(&rule.add, i),
                AffixKind::Suffix => suffix_index.insert(&rule.add, i),
            }
        }
        let word_breaks = self.word_breaks.take().unwrap_or_else(|| {
            vec!["-".to_string(), "^-".to_string(), "-$".to_string()]
        });
        AffixRuleSet {
            flag_mode: self.flag_mode,
            special: std::mem::take(&mut self.special),
            rules,
            by_flag,
            prefix_index,
            suffix_index,
            compound_min: self.compound_min.unwrap_or(DEFAULT_COMPOUND_MIN),
            compound_rules: std::mem::take(&mut self.compound_rules),
            replacements: std::mem::take(&mut self.replacements),
            related_chars: std::mem::take(&mut self.related_chars),
            word_breaks,
            try_chars: self.try_chars.take(),
            iconv: std::mem::take(&mut self.iconv),
            oconv: std::mem::take(&mut self.oconv),
            fullstrip: self.fullstrip,
            encoding: self.encoding.take(),
        }
    }
}
