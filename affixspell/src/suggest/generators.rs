//! Candidate generators. Each one feeds strings to a `suggest` callback
//! and stops as soon as the callback returns false.
use unicode_titlecase::StrTitleCase;

use crate::ruleset::ReplacementTable;

pub fn case_suggestions(word: &str, mut suggest: impl FnMut(String) -> bool) {
    let _ = suggest(word.to_lowercase())
        && suggest(word.to_uppercase())
        && suggest(word.to_titlecase_lower_rest());
}

/// Drop one char at a time. Spaces and hyphens are left alone;
/// `join_suggestions` handles those.
pub fn delete_char_suggestions(word: &str, mut suggest: impl FnMut(String) -> bool) -> bool {
    for (i, c) in word.char_indices() {
        if c == ' ' || c == '-' {
            continue;
        }
        let mut sugg = String::with_capacity(word.len());
        sugg.push_str(&word[..i]);
        sugg.push_str(&word[i + c.len_utf8()..]);
        if !suggest(sugg) {
            return false;
        }
    }
    true
}

pub fn swap_char_suggestions(word: &str, mut suggest: impl FnMut(String) -> bool) -> bool {
    let mut prev = None;
    for (i, c) in word.char_indices() {
        if let Some((prev_i, prev_c)) = prev {
            if prev_c != c {
                let mut sugg = String::with_capacity(word.len());
                sugg.push_str(&word[..prev_i]);
                sugg.push(c);
                sugg.push(prev_c);
                sugg.push_str(&word[i + c.len_utf8()..]);
                if !suggest(sugg) {
                    return false;
                }
            }
        }
        prev = Some((i, c));
    }
    true
}

/// Insert each char of `alphabet` at every position, including the end.
pub fn add_char_suggestions(
    word: &str,
    alphabet: &[char],
    mut suggest: impl FnMut(String) -> bool,
) -> bool {
    // The alphabet is ordered by likelihood, so try one char everywhere
    // before moving on to the next.
    for tc in alphabet.iter() {
        let positions = word.char_indices().map(|(i, _)| i).chain(std::iter::once(word.len()));
        for i in positions {
            let mut sugg = String::with_capacity(word.len() + tc.len_utf8());
            sugg.push_str(&word[..i]);
            sugg.push(*tc);
            sugg.push_str(&word[i..]);
            if !suggest(sugg) {
                return false;
            }
        }
    }
    true
}

/// Replace each char of `word` with each char of `alphabet`.
pub fn replace_char_suggestions(
    word: &str,
    alphabet: &[char],
    mut suggest: impl FnMut(String) -> bool,
) -> bool {
    for tc in alphabet.iter() {
        for (i, c) in word.char_indices() {
            if c == *tc {
                continue;
            }
            let mut sugg = String::with_capacity(word.len() + tc.len_utf8());
            sugg.push_str(&word[..i]);
            sugg.push(*tc);
            sugg.push_str(&word[i + c.len_utf8()..]);
            if !suggest(sugg) {
                return false;
            }
        }
    }
    true
}

/// All strings one deletion, swap, insertion or substitution away.
pub fn edit_suggestions(
    word: &str,
    alphabet: &[char],
    mut suggest: impl FnMut(String) -> bool,
) -> bool {
    delete_char_suggestions(word, &mut suggest)
        && swap_char_suggestions(word, &mut suggest)
        && add_char_suggestions(word, alphabet, &mut suggest)
        && replace_char_suggestions(word, alphabet, &mut suggest)
}

/// Split the word in two at every position.
pub fn split_suggestions(word: &str, mut suggest: impl FnMut(String) -> bool) {
    for (i, _) in word.char_indices().skip(1) {
        let (a, b) = word.split_at(i);
        if a.ends_with('-') || b.starts_with('-') {
            continue;
        }
        if !suggest(format!("{} {}", a, b)) {
            return;
        }
    }
}

/// Join the pieces on either side of each space or hyphen.
pub fn join_suggestions(word: &str, mut suggest: impl FnMut(String) -> bool) {
    for (i, c) in word.char_indices() {
        if c != ' ' && c != '-' {
            continue;
        }
        let (a, b) = (&word[..i], &word[i + c.len_utf8()..]);
        if a.is_empty() || b.is_empty() {
            continue;
        }
        if !suggest(format!("{}{}", a, b)) {
            return;
        }
    }
}

/// One candidate per REP replacement per matching position.
pub fn replacement_suggestions(
    table: &ReplacementTable,
    word: &str,
    suggest: impl FnMut(String) -> bool,
) {
    table.suggest(word, suggest);
}

/// Swap a char for each of its MAP relatives, one substitution per
/// candidate. Groups come first to last as the affix file ordered them.
pub fn related_char_suggestions(
    related: &[Vec<char>],
    word: &str,
    mut suggest: impl FnMut(String) -> bool,
) {
    for group in related.iter() {
        for (i, c) in word.char_indices() {
            if !group.contains(&c) {
                continue;
            }
            for newc in group.iter().filter(|g| **g != c) {
                let mut sugg = String::with_capacity(word.len() + newc.len_utf8());
                sugg.push_str(&word[..i]);
                sugg.push(*newc);
                sugg.push_str(&word[i + c.len_utf8()..]);
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

    fn collect(gen: impl FnOnce(&mut dyn FnMut(String) -> bool)) -> Vec<String> {
        let mut v = Vec::new();
        gen(&mut |s: String| {
            v.push(s);
            true
        });
        v
    }

    #[test]
    fn test_delete_and_swap() {
        let v = collect(|f| {
            delete_char_suggestions("abc", f);
        });
        assert_eq!(vec!["bc", "ac", "ab"], v);
        let v = collect(|f| {
            delete_char_suggestions("a b-c", f);
        });
        assert_eq!(vec![" b-c", "a -c", "a b-"], v);
        let v = collect(|f| {
            swap_char_suggestions("abb", f);
        });
        assert_eq!(vec!["bab"], v);
    }

    #[test]
    fn test_add_and_replace() {
        let v = collect(|f| {
            add_char_suggestions("ab", &['x'], f);
        });
        assert_eq!(vec!["xab", "axb", "abx"], v);
        let v = collect(|f| {
            replace_char_suggestions("ab", &['a', 'é'], f);
        });
        assert_eq!(vec!["aa", "éb", "aé"], v);
    }

    #[test]
    fn test_split_and_join() {
        let v = collect(|f| split_suggestions("alot", f));
        assert_eq!(vec!["a lot", "al ot", "alo t"], v);
        let v = collect(|f| join_suggestions("rain coat-s", f));
        assert_eq!(vec!["raincoat-s", "rain coats"], v);
        assert!(collect(|f| join_suggestions("-rain", f)).is_empty());
    }

    #[test]
    fn test_related_chars() {
        let related = vec![vec!['a', 'á', 'à']];
        let v = collect(|f| related_char_suggestions(&related, "tá", f));
        assert_eq!(vec!["ta", "tà"], v);
    }

    #[test]
    fn test_stop_early() {
        let mut n = 0;
        let done = edit_suggestions("abcdef", &['x', 'y'], |_| {
            n += 1;
            n < 3
        });
        assert!(!done);
        assert_eq!(3, n);
    }
}
