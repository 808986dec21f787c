#![allow(non_upper_case_globals)]

use bitflags::bitflags;
use itertools::Itertools;
use smallvec::SmallVec;

/// Flags are stored as numbers regardless of how the affix file spells them.
pub type AffixFlag = u32;

/// The flags attached to one stem or one affix continuation, kept sorted.
pub type FlagSet = SmallVec<[AffixFlag; 4]>;

/// Represents the format of the flags after words in the dictionary file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlagMode {
    /// Single-character flags
    #[default]
    CharFlags,
    /// Two-character flags
    DoubleCharFlags,
    /// Flags are comma-separated ASCII integers
    NumericFlags,
    /// Flags are Unicode codepoints in UTF-8 format
    Utf8Flags,
}

impl FlagMode {
    /// Parse a flag string such as `SDG` into a sorted, deduplicated set.
    pub fn parse(self, flags: &str) -> Result<FlagSet, String> {
        let mut v: FlagSet = match self {
            FlagMode::CharFlags | FlagMode::Utf8Flags => {
                flags.chars().map(|c| c as AffixFlag).collect()
            }
            FlagMode::DoubleCharFlags => {
                if flags.chars().count() % 2 != 0 {
                    return Err(format!("Odd number of characters in long flags {}", flags));
                }
                flags
                    .chars()
                    .tuples()
                    .map(|(c1, c2)| {
                        let (c1, c2) = (c1 as u32, c2 as u32);
                        if c1 > 255 || c2 > 255 {
                            Err(format!("Invalid characters in long flag {}", flags))
                        } else {
                            Ok(c1 * 256 + c2)
                        }
                    })
                    .collect::<Result<_, _>>()?
            }
            FlagMode::NumericFlags => flags
                .split(',')
                .filter(|d| !d.trim().is_empty())
                .map(|d| {
                    d.trim()
                        .parse::<AffixFlag>()
                        .map_err(|e| format!("Invalid numeric flag {}: {}", d, e))
                })
                .collect::<Result<_, _>>()?,
        };
        v.sort_unstable();
        v.dedup();
        Ok(v)
    }

    /// Parse a string that must contain exactly one flag.
    pub fn parse_one(self, flag: &str) -> Result<AffixFlag, String> {
        let v = self.parse(flag)?;
        if v.len() != 1 {
            return Err(format!("Expected a single flag, got {}", flag));
        }
        Ok(v[0])
    }
}

bitflags! {
    /// Properties of a stem, derived from its affix flags and the special
    /// flags declared in the affix file.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WordFlags: u16 {
        /// This word must not be accepted as good.
        const Forbidden = 0x0001;
        /// This word may appear at the beginning of compound words.
        const CompoundBegin = 0x0002;
        /// This word may appear as a middle word in compound words.
        const CompoundMiddle = 0x0004;
        /// This word may appear at the end of compound words.
        const CompoundEnd = 0x0008;
        /// This word can only appear as part of compound words.
        const OnlyInCompound = 0x0020;
        /// This word must not be suggested as a correction.
        const NoSuggest = 0x0040;
        /// This word is not valid without an affix.
        const NeedAffix = 0x0100;
        /// This word should not have its case changed.
        const KeepCase = 0x0200;
        /// This word may appear anywhere in compounds.
        /// (predates the CompoundBegin, Middle, End flags)
        const CompoundFlag = 0x0400;
    }
}

/// Where in a compound word a piece sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompoundRole {
    Begin,
    Middle,
    End,
}

impl CompoundRole {
    pub fn word_flag(self) -> WordFlags {
        match self {
            CompoundRole::Begin => WordFlags::CompoundBegin,
            CompoundRole::Middle => WordFlags::CompoundMiddle,
            CompoundRole::End => WordFlags::CompoundEnd,
        }
    }
}

/// The affix file can assign any flag to these roles.
#[derive(Clone, Debug, Default)]
pub struct SpecialFlags {
    pub forbidden: Option<AffixFlag>,
    pub compound_flag: Option<AffixFlag>,
    pub compound_begin: Option<AffixFlag>,
    pub compound_middle: Option<AffixFlag>,
    pub compound_end: Option<AffixFlag>,
    /// Affixes carrying this continuation flag may appear inside compounds.
    pub compound_permit: Option<AffixFlag>,
    pub only_in_compound: Option<AffixFlag>,
    pub no_suggest: Option<AffixFlag>,
    /// Affixes carrying this continuation flag must surround a word together.
    pub circumfix: Option<AffixFlag>,
    pub need_affix: Option<AffixFlag>,
    pub keep_case: Option<AffixFlag>,
}

impl SpecialFlags {
    pub fn word_flags(&self, flags: &[AffixFlag]) -> WordFlags {
        let mut wf = WordFlags::empty();
        let mut mark = |special: Option<AffixFlag>, word_flag: WordFlags| {
            if let Some(f) = special {
                if flags.binary_search(&f).is_ok() {
                    wf |= word_flag;
                }
            }
        };
        mark(self.forbidden, WordFlags::Forbidden);
        mark(self.compound_flag, WordFlags::CompoundFlag);
        mark(self.compound_begin, WordFlags::CompoundBegin);
        mark(self.compound_middle, WordFlags::CompoundMiddle);
        mark(self.compound_end, WordFlags::CompoundEnd);
        mark(self.only_in_compound, WordFlags::OnlyInCompound);
        mark(self.no_suggest, WordFlags::NoSuggest);
        mark(self.need_affix, WordFlags::NeedAffix);
        mark(self.keep_case, WordFlags::KeepCase);
        wf
    }

    /// Does the affix file declare any flag that makes compounding possible?
    pub fn allows_compounds(&self) -> bool {
        self.compound_flag.is_some()
            || self.compound_begin.is_some()
            || self.compound_middle.is_some()
            || self.compound_end.is_some()
    }

    /// Assign a special flag by its affix file keyword.
    /// Returns false if the keyword is not a special flag.
    pub fn assign(&mut self, keyword: &str, flag: AffixFlag) -> bool {
        let slot = match keyword {
            "FORBIDDENWORD" => &mut self.forbidden,
            "COMPOUNDFLAG" => &mut self.compound_flag,
            "COMPOUNDBEGIN" => &mut self.compound_begin,
            "COMPOUNDMIDDLE" => &mut self.compound_middle,
            "COMPOUNDEND" => &mut self.compound_end,
            "COMPOUNDPERMITFLAG" => &mut self.compound_permit,
            "ONLYINCOMPOUND" => &mut self.only_in_compound,
            "NOSUGGEST" => &mut self.no_suggest,
            "CIRCUMFIX" => &mut self.circumfix,
            "NEEDAFFIX" => &mut self.need_affix,
            "KEEPCASE" => &mut self.keep_case,
            _ => return false,
        };
        *slot = Some(flag);
        true
    }
}
