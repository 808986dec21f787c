/// Affix conditions are rudimentary regexps (supporting [] groups and
/// [^] negated groups and '.' as wildcard). They are matched against
/// the start or end of a stem to determine eligibility for suffix and
/// prefix rules.
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq)]
enum CondChar {
    Any,
    Literal(char),
    Group(SmallVec<[char; 8]>),
    NegatedGroup(SmallVec<[char; 8]>),
}

impl CondChar {
    fn matches(&self, wc: char) -> bool {
        match self {
            CondChar::Any => true,
            CondChar::Literal(c) => *c == wc,
            CondChar::Group(set) => set.contains(&wc),
            CondChar::NegatedGroup(set) => !set.contains(&wc),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AffixCondition {
    cond: Vec<CondChar>,
}

impl AffixCondition {
    /// Parse a condition. A lone `.` is the empty condition.
    /// An unterminated group is an error.
    pub fn new(condition: &str) -> Result<Self, String> {
        let mut cond = Vec::new();
        if condition == "." {
            return Ok(AffixCondition { cond });
        }
        let mut chars = condition.chars();
        while let Some(c) = chars.next() {
            match c {
                '.' => cond.push(CondChar::Any),
                '[' => {
                    let mut set = SmallVec::new();
                    let mut negated = false;
                    let mut first = true;
                    let mut closed = false;
                    for gc in chars.by_ref() {
                        if gc == ']' {
                            closed = true;
                            break;
                        }
                        // a caret is only special at the start of a group
                        if first && gc == '^' {
                            negated = true;
                        } else {
                            set.push(gc);
                        }
                        first = false;
                    }
                    if !closed {
                        return Err(format!("Unterminated group in condition {}", condition));
                    }
                    if negated {
                        cond.push(CondChar::NegatedGroup(set));
                    } else {
                        cond.push(CondChar::Group(set));
                    }
                }
                ']' => {
                    return Err(format!("Unbalanced ] in condition {}", condition));
                }
                c => cond.push(CondChar::Literal(c)),
            }
        }
        Ok(AffixCondition { cond })
    }

    /// Number of characters this condition inspects.
    pub fn len(&self) -> usize {
        self.cond.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cond.is_empty()
    }

    /// Does the start of `stem` satisfy the condition?
    pub fn prefix_match(&self, stem: &str) -> bool {
        let mut chars = stem.chars();
        self.cond
            .iter()
            .all(|cc| chars.next().map_or(false, |c| cc.matches(c)))
    }

    /// Does the end of `stem` satisfy the condition?
    pub fn suffix_match(&self, stem: &str) -> bool {
        let mut chars = stem.chars().rev();
        self.cond
            .iter()
            .rev()
            .all(|cc| chars.next().map_or(false, |c| cc.matches(c)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn prefix(cond: &str, word: &str) -> bool {
        AffixCondition::new(cond).unwrap().prefix_match(word)
    }

    fn suffix(cond: &str, word: &str) -> bool {
        AffixCondition::new(cond).unwrap().suffix_match(word)
    }

    #[test]
    fn test_prefix_condition() {
        assert!(prefix(".", "rain"));
        assert!(prefix("", "rain"));
        assert!(prefix("[aeiou]", "apply"));
        assert!(prefix("[^aeiou]", "rain"));
        assert!(prefix("ap", "appear"));
        assert!(prefix("a.p", "appear"));
        // a caret not at the start of a group is a normal member
        assert!(prefix("[x^]", "^rain"));
        // a dot inside a group is literal
        assert!(!prefix("[.]", "rain"));

        assert!(!prefix("[^aeiou]", "apply"));
        assert!(!prefix("appearance", "appear"));
    }

    #[test]
    fn test_suffix_condition() {
        assert!(suffix(".", "apply"));
        assert!(suffix("[^aeiou]y", "apply"));
        assert!(suffix("[aeiou]y", "delay"));
        assert!(suffix("[sxzh]", "fish"));
        assert!(suffix("[^ey]", "rain"));
        assert!(suffix("e", "angle"));

        assert!(!suffix("[^aeiou]y", "delay"));
        assert!(!suffix("[^ey]", "angle"));
        assert!(!suffix("ly", "y"));
    }

    #[test]
    fn test_bad_condition() {
        assert!(AffixCondition::new("[aeiou").is_err());
        assert!(AffixCondition::new("ab]").is_err());
        assert_eq!(2, AffixCondition::new("[^aeiou]y").unwrap().len());
    }
}
