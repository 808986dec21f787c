/// How many single-character deletions and insertions does it take to go
/// from `str1` to `str2`? Substitution is not an operation here, so a
/// changed character costs 2.
///
/// `maxscore` is a cutoff: the caller isn't interested in exact scores
/// above it, and any result above it is reported as `maxscore + 1`.
pub fn delins(str1: &[char], str2: &[char], maxscore: usize) -> usize {
    let over = maxscore + 1;
    if str1.len().abs_diff(str2.len()) > maxscore {
        return over;
    }
    // Equal leading and trailing runs cost nothing.
    let front = str1.iter().zip(str2).take_while(|(a, b)| a == b).count();
    let (s1, s2) = (&str1[front..], &str2[front..]);
    let back = s1
        .iter()
        .rev()
        .zip(s2.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let (s1, s2) = (&s1[..s1.len() - back], &s2[..s2.len() - back]);

    if s1.is_empty() || s2.is_empty() {
        return (s1.len() + s2.len()).min(over);
    }

    // Longest common subsequence, one row at a time.
    let mut prev = vec![0usize; s2.len() + 1];
    let mut row = vec![0usize; s2.len() + 1];
    for c1 in s1 {
        for (j, c2) in s2.iter().enumerate() {
            row[j + 1] = if c1 == c2 {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    let lcs = prev[s2.len()];
    (s1.len() + s2.len() - 2 * lcs).min(over)
}

#[cfg(test)]
mod test {
    use super::*;

    fn delins_helper(str1: &str, str2: &str) -> usize {
        let v1 = str1.chars().collect::<Vec<char>>();
        let v2 = str2.chars().collect::<Vec<char>>();
        delins(&v1, &v2, 100)
    }

    #[test]
    fn test_delins_scores() {
        assert_eq!(0, delins_helper("rain", "rain"));
        assert_eq!(1, delins_helper("rainning", "raining"));
        assert_eq!(1, delins_helper("lke", "lake"));
        assert_eq!(2, delins_helper("fish", "fist"));
        assert_eq!(2, delins_helper("Valhalla", "Walhalla"));
        assert_eq!(7, delins_helper("AÁBCDEÉ", "DÁDÁ"));
    }

    #[test]
    fn test_delins_cutoff() {
        let a = "abcdefgh".chars().collect::<Vec<char>>();
        let b = "ab".chars().collect::<Vec<char>>();
        assert_eq!(3, delins(&a, &b, 2));
        let c = "hgfedcba".chars().collect::<Vec<char>>();
        assert_eq!(3, delins(&a, &c, 2));
    }
}
