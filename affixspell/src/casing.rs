use unicode_casing::CharExt;
use unicode_titlecase::StrTitleCase;

/// The capitalization pattern of a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapStyle {
    Lowercase,
    Capitalized,
    AllCaps,
    Mixed,
    /// No cased characters at all, such as digits or CJK.
    Neutral,
}

impl CapStyle {
    pub fn of(word: &str) -> Self {
        let mut iter = word.chars();
        let c1 = match iter.next() {
            Some(c1) => c1,
            None => return CapStyle::Neutral,
        };
        if c1.is_lowercase() {
            if iter.any(|c| c.is_uppercase() || c.is_titlecase()) {
                return CapStyle::Mixed;
            }
            CapStyle::Lowercase
        } else if c1.is_uppercase() {
            let mut seen_ucase = false;
            let mut seen_lcase = false;
            for c in iter {
                if c.is_lowercase() {
                    seen_lcase = true;
                } else if c.is_uppercase() {
                    seen_ucase = true;
                } else if c.is_titlecase() {
                    return CapStyle::Mixed;
                }
            }
            match (seen_ucase, seen_lcase) {
                (true, true) => CapStyle::Mixed,
                (false, true) => CapStyle::Capitalized,
                _ => CapStyle::AllCaps,
            }
        } else if c1.is_titlecase() {
            if iter.any(|c| c.is_uppercase() || c.is_titlecase()) {
                return CapStyle::Mixed;
            }
            CapStyle::Capitalized
        } else {
            // skip leading punctuation and digits
            CapStyle::of(&word[c1.len_utf8()..])
        }
    }

    /// Rewrite `word` in this style, where that's meaningful.
    /// Lowercase, mixed and neutral styles leave the word alone.
    pub fn apply(self, word: &str) -> String {
        match self {
            CapStyle::Capitalized => word.to_titlecase(),
            CapStyle::AllCaps => word.to_uppercase(),
            _ => word.to_string(),
        }
    }
}

/// The word with its first letter lowercased and the rest untouched.
pub fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The other spellings a word may be looked up under: the word itself
/// first, then decapitalized forms. Returns (variant, is_original) pairs.
pub fn case_variants(word: &str) -> Vec<(String, bool)> {
    let mut v = vec![(word.to_string(), true)];
    match CapStyle::of(word) {
        CapStyle::Capitalized => {
            v.push((lowercase_first(word), false));
            v.push((word.to_lowercase(), false));
        }
        CapStyle::AllCaps => {
            v.push((word.to_lowercase(), false));
            v.push((word.to_titlecase_lower_rest(), false));
        }
        _ => (),
    }
    v.dedup_by(|a, b| a.0 == b.0);
    v
}
