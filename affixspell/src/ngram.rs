/// Count the n-grams of `str1`, for every n from 1 to `nmax`, that also
/// occur somewhere in `str2`. Longer shared chunks add more to the score.
pub fn ngram(nmax: usize, str1: &[char], str2: &[char]) -> usize {
    let mut score = 0;
    for n in 1..=nmax {
        if n > str1.len() || n > str2.len() {
            break;
        }
        let hits = str1
            .windows(n)
            .filter(|gram| str2.windows(n).any(|other| other == *gram))
            .count();
        if hits == 0 {
            // no longer chunk can be shared either
            break;
        }
        score += hits * n;
    }
    score
}

/// Symmetric similarity of two words in the range 0.0 to 1.0.
/// Identical words score 1.0.
pub fn similarity(str1: &[char], str2: &[char]) -> f64 {
    const NMAX: usize = 3;
    let self1 = ngram(NMAX, str1, str1);
    let self2 = ngram(NMAX, str2, str2);
    if self1 == 0 || self2 == 0 {
        return 0.0;
    }
    let shared = ngram(NMAX, str1, str2) + ngram(NMAX, str2, str1);
    shared as f64 / (self1 + self2) as f64
}

#[cfg(test)]
mod test {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_ngram_scores() {
        assert_eq!(0, ngram(1, &chars("foo"), &chars("bar")));
        assert_eq!(3, ngram(1, &chars("foo"), &chars("oof")));
        // f, o, o, fo, oo
        assert_eq!(7, ngram(2, &chars("foo"), &chars("food")));
        // plus foo
        assert_eq!(10, ngram(3, &chars("foo"), &chars("food")));
    }

    #[test]
    fn test_similarity() {
        assert_eq!(1.0, similarity(&chars("lake"), &chars("lake")));
        assert_eq!(0.0, similarity(&chars("abc"), &chars("xyz")));
        let close = similarity(&chars("lke"), &chars("lake"));
        let far = similarity(&chars("lke"), &chars("like"));
        assert!(close > 0.3);
        assert!(close >= far);
    }
}
