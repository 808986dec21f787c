/// One `from -> to` pair. `^` and `$` on `from` anchor it to the start
/// or end of the word.
#[derive(Clone, Debug, Default)]
struct Replacement {
    anchor_start: bool,
    anchor_end: bool,
    from: String,
    to: String,
}

impl Replacement {
    /// Does this replacement apply at the start of `rest`, where `rest`
    /// is the tail of a word beginning at char offset `at`?
    fn applies(&self, rest: &str, at: usize) -> bool {
        if self.anchor_start && at != 0 {
            return false;
        }
        if self.anchor_end {
            rest == self.from
        } else {
            rest.starts_with(&self.from)
        }
    }
}

/// An ordered table of string replacements.
///
/// Used for the REP table (confusable spellings to try when suggesting)
/// and for the ICONV/OCONV tables that normalize input and output.
#[derive(Clone, Debug, Default)]
pub struct ReplacementTable {
    reps: Vec<Replacement>,
}

impl ReplacementTable {
    pub fn push(&mut self, from: &str, to: &str) {
        let (anchor_start, from) = match from.strip_prefix('^') {
            Some(f) => (true, f),
            None => (false, from),
        };
        let (anchor_end, from) = match from.strip_suffix('$') {
            Some(f) => (true, f),
            None => (false, from),
        };
        if from.is_empty() {
            return;
        }
        self.reps.push(Replacement {
            anchor_start,
            anchor_end,
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.reps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reps.len()
    }

    fn longest_match(&self, rest: &str, at: usize) -> Option<&Replacement> {
        self.reps
            .iter()
            .filter(|rep| rep.applies(rest, at))
            .max_by_key(|rep| rep.from.len())
    }

    /// Rewrite `word` left to right, always taking the longest replacement
    /// that applies at each position.
    pub fn convert(&self, word: &str) -> String {
        if self.reps.is_empty() {
            return word.to_string();
        }
        let mut output = String::with_capacity(word.len());
        let mut skip_to = 0;
        for (i, c) in word.char_indices() {
            if i < skip_to {
                continue;
            }
            match self.longest_match(&word[i..], i) {
                Some(rep) => {
                    output.push_str(&rep.to);
                    skip_to = i + rep.from.len();
                }
                None => output.push(c),
            }
        }
        output
    }

    /// Offer one candidate per replacement per matching position.
    /// Stops early when `suggest` returns false.
    pub fn suggest(&self, word: &str, mut suggest: impl FnMut(String) -> bool) {
        for (i, _) in word.char_indices() {
            for rep in self.reps.iter().filter(|rep| rep.applies(&word[i..], i)) {
                let mut sugg = String::with_capacity(word.len() + rep.to.len());
                sugg.push_str(&word[..i]);
                sugg.push_str(&rep.to);
                sugg.push_str(&word[i + rep.from.len()..]);
                if !suggest(sugg) {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn collect(table: &ReplacementTable, word: &str) -> Vec<String> {
        let mut v = Vec::new();
        table.suggest(word, |s| {
            v.push(s);
            true
        });
        v
    }

    #[test]
    fn test_suggest_every_position() {
        let mut table = ReplacementTable::default();
        table.push("f", "ph");
        assert_eq!(vec!["pheff", "fephf", "fefph"], collect(&table, "feff"));
    }

    #[test]
    fn test_anchors() {
        let mut table = ReplacementTable::default();
        table.push("^alot$", "a lot");
        table.push("^k", "c");
        assert_eq!(vec!["a lot"], collect(&table, "alot"));
        assert!(collect(&table, "alots").is_empty());
        assert_eq!(vec!["cick"], collect(&table, "kick"));
    }

    #[test]
    fn test_convert_longest_match() {
        let mut table = ReplacementTable::default();
        table.push("\u{2019}", "'");
        table.push("a", "b");
        table.push("aa", "c");
        assert_eq!("don't", table.convert("don\u{2019}t"));
        assert_eq!("cb", table.convert("aaa"));
    }

    #[test]
    fn test_suggest_stops() {
        let mut table = ReplacementTable::default();
        table.push("e", "i");
        let mut n = 0;
        table.suggest("eeee", |_| {
            n += 1;
            n < 2
        });
        assert_eq!(2, n);
    }
}
