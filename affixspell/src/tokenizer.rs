//! Splitting running text into words to check.
use nom::branch::alt;
use nom::bytes::complete::{take_till1, take_while1};
use nom::character::complete::one_of;
use nom::combinator::{map, recognize};
use nom::multi::{fold_many0, separated_list1};
use nom::{Finish, IResult};

/// A word and its byte offset in the text it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub offset: usize,
}

pub trait Tokenizer {
    /// Returns the words of `text` in order.
    fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>>;
}

/// Words are runs of letters and digits, which may be joined into one
/// word by hyphens and apostrophes.
#[derive(Clone, Copy, Debug, Default)]
pub struct WordTokenizer;

fn word(s: &str) -> IResult<&str, &str> {
    // U+2019 is the unicode apostrophe
    recognize(separated_list1(
        one_of("-'\u{2019}"),
        take_while1(char::is_alphanumeric),
    ))(s)
}

fn separator(s: &str) -> IResult<&str, &str> {
    take_till1(char::is_alphanumeric)(s)
}

impl Tokenizer for WordTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        let start = text.as_ptr() as usize;
        let parsed: IResult<&str, Vec<Token>> = fold_many0(
            alt((map(word, Some), map(separator, |_| None))),
            Vec::new,
            |mut v, w: Option<&str>| {
                if let Some(w) = w {
                    v.push(Token {
                        text: w,
                        offset: w.as_ptr() as usize - start,
                    });
                }
                v
            },
        )(text);
        match parsed.finish() {
            Ok((_, tokens)) => tokens,
            Err(err) => {
                log::warn!("Could not tokenize text: {:?}", err);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn words(text: &str) -> Vec<&str> {
        WordTokenizer.tokenize(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_sentence() {
        assert_eq!(
            vec!["There", "are", "fishe", "in", "the", "lke"],
            words("There are fishe in the lke.")
        );
        assert!(words("").is_empty());
        assert!(words(" ... !? ").is_empty());
    }

    #[test]
    fn test_joiners() {
        assert_eq!(vec!["don't", "well-known", "l’eau"], words("don't well-known l’eau"));
        assert_eq!(vec!["rain", "coat"], words("-rain- 'coat'"));
        assert_eq!(vec!["a", "b"], words("a--b"));
    }

    #[test]
    fn test_offsets() {
        let tokens = WordTokenizer.tokenize("§ dé jà");
        assert_eq!(
            vec![
                Token {
                    text: "dé",
                    offset: 3
                },
                Token {
                    text: "jà",
                    offset: 7
                }
            ],
            tokens
        );
    }
}
