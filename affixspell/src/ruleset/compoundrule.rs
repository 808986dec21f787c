use crate::flags::{AffixFlag, FlagMode};

/// A COMPOUNDRULE pattern, such as `n*1t` or `(aa)?(bb)`.
/// Each element names a flag that one piece of the compound must carry.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundRule {
    elements: Vec<Element>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Element {
    Once(AffixFlag),
    Optional(AffixFlag),
    Multi(AffixFlag),
}

impl Element {
    fn flag(self) -> AffixFlag {
        match self {
            Element::Once(f) | Element::Optional(f) | Element::Multi(f) => f,
        }
    }
}

impl CompoundRule {
    pub fn parse(s: &str, mode: FlagMode) -> Result<Self, String> {
        let mut elements: Vec<Element> = Vec::new();
        let mut group_start = None;
        for (i, c) in s.char_indices() {
            if let Some(start) = group_start {
                if c == ')' {
                    elements.push(Element::Once(mode.parse_one(&s[start..i])?));
                    group_start = None;
                }
                continue;
            }
            match c {
                '(' => group_start = Some(i + c.len_utf8()),
                '*' | '?' => {
                    let last = match elements.last_mut() {
                        Some(last) if matches!(last, Element::Once(_)) => last,
                        _ => return Err(format!("COMPOUNDRULE {}: {} must follow a flag", s, c)),
                    };
                    let flag = last.flag();
                    *last = if c == '*' {
                        Element::Multi(flag)
                    } else {
                        Element::Optional(flag)
                    };
                }
                _ => {
                    let flag = mode.parse_one(&s[i..i + c.len_utf8()])?;
                    elements.push(Element::Once(flag));
                }
            }
        }
        if group_start.is_some() {
            return Err(format!("COMPOUNDRULE {}: unclosed (", s));
        }
        if elements.is_empty() {
            return Err("COMPOUNDRULE: empty pattern".to_string());
        }
        Ok(CompoundRule { elements })
    }

    pub fn flags(&self) -> impl Iterator<Item = AffixFlag> + '_ {
        self.elements.iter().map(|e| e.flag())
    }

    fn matches_from(
        &self,
        pieces: &[&str],
        pos: usize,
        partial: bool,
        check: &impl Fn(&str, AffixFlag) -> bool,
    ) -> bool {
        let piece = match pieces.first() {
            Some(piece) => *piece,
            None => {
                // Out of pieces: a partial match is good enough, a full match
                // needs the rest of the pattern to be skippable.
                return partial
                    || self.elements[pos..]
                        .iter()
                        .all(|e| !matches!(e, Element::Once(_)));
            }
        };
        match self.elements.get(pos) {
            None => false,
            Some(Element::Once(f)) => {
                check(piece, *f) && self.matches_from(&pieces[1..], pos + 1, partial, check)
            }
            Some(Element::Optional(f)) => {
                (check(piece, *f) && self.matches_from(&pieces[1..], pos + 1, partial, check))
                    || self.matches_from(pieces, pos + 1, partial, check)
            }
            Some(Element::Multi(f)) => {
                (check(piece, *f) && self.matches_from(&pieces[1..], pos, partial, check))
                    || self.matches_from(pieces, pos + 1, partial, check)
            }
        }
    }

    /// Do the pieces, in order, form a complete match for this rule?
    /// `check` reports whether a piece carries a flag.
    pub fn matches(&self, pieces: &[&str], check: impl Fn(&str, AffixFlag) -> bool) -> bool {
        self.matches_from(pieces, 0, false, &check)
    }

    /// Could more pieces be appended to form a match?
    pub fn partial_match(&self, pieces: &[&str], check: impl Fn(&str, AffixFlag) -> bool) -> bool {
        self.matches_from(pieces, 0, true, &check)
    }
}
