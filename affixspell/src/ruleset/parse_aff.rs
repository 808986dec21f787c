/// Parser for hunspell-format .aff files
use fnv::FnvHashMap;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1, take_while1};
use nom::character::complete::{char, not_line_ending, one_of, space0, space1, u32};
use nom::combinator::{cut, eof, map, opt, rest, success, value};
use nom::error::{ErrorKind, ParseError};
use nom::sequence::{preceded, separated_pair, tuple};
use nom::{Compare, Err, Finish, IResult, InputLength, Parser};

use crate::error::{Error, Result};
use crate::flags::FlagMode;
use crate::ruleset::{AffixKind, AffixRuleSet};

type Input<'a> = &'a str;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

#[derive(Debug)]
struct AffError {
    message: String,
}

impl<'a> ParseError<Input<'a>> for AffError {
    fn from_error_kind(input: Input, kind: ErrorKind) -> Self {
        let message = format!("{:?} at '{}'", kind, input);
        AffError { message }
    }

    fn append(_input: Input, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

#[derive(Clone, Debug)]
enum AffixLine<'a> {
    Empty,
    SetEncoding(&'a str),
    SetFlagMode(FlagMode),
    SetTryString(&'a str),
    SetFlag(&'a str, &'a str),
    SetCompoundMin(u32),
    AddIconv((&'a str, &'a str)),
    AddOconv((&'a str, &'a str)),
    AddReplacement((&'a str, &'a str)),
    AddCompoundRule(&'a str),
    AddRelatedChars(&'a str),
    AddWordBreak(&'a str),
    SetFullstrip,
    AffixHeader(AffixKind, &'a str, bool),
    AffixEntry(AffixKind, &'a str, (&'a str, &'a str, &'a str)),
    Ignored(&'a str),
}

/// Parse a line starting with a keyword and then a value.
/// Once the keyword matched, a bad value is a hard failure.
fn keyword<'a, T, O, F>(key: T, mut value: F) -> impl FnMut(Input<'a>) -> IResult<Input<'a>, O, AffError>
where
    F: Parser<Input<'a>, O, AffError>,
    Input<'a>: Compare<T>,
    T: InputLength + Copy,
{
    move |s: Input<'a>| {
        let (s, _) = tag(key).parse(s)?;
        let (s, _) = space1.parse(s)?;
        match value.parse(s) {
            Err(Err::Error(e)) => Err(Err::Failure(e)),
            other => other,
        }
    }
}

/// Parse a line that is a table entry. Each line of a table starts with
/// the same keyword; the first one only holds the number of entries,
/// which is not needed and comes back as `AffixLine::Empty`.
fn table_line<'a, T, O>(
    key: T,
    mut value: impl Parser<Input<'a>, O, AffError>,
    conv: impl Fn(O) -> AffixLine<'a>,
) -> impl FnMut(Input<'a>) -> IResult<Input<'a>, AffixLine<'a>, AffError>
where
    Input<'a>: Compare<T>,
    T: InputLength + Copy,
{
    move |s: Input<'a>| {
        let (s, _) = tag(key).parse(s)?;
        let (s, _) = space1.parse(s)?;
        if let Ok((after, _)) = u32::<Input<'a>, AffError>(s) {
            if ending(after).is_ok() {
                return Ok((after, AffixLine::Empty));
            }
        }
        match value.parse(s) {
            Err(Err::Error(e)) => Err(Err::Failure(e)),
            Ok((s, v)) => Ok((s, conv(v))),
            Err(other) => Err(other),
        }
    }
}

fn comment(s: &str) -> IResult<&str, (), AffError> {
    value((), preceded(char('#'), rest))(s)
}

fn ending(s: &str) -> IResult<&str, (), AffError> {
    value((), tuple((space0, opt(comment), eof)))(s)
}

fn value_string(s: &str) -> IResult<&str, &str, AffError> {
    take_till1(|c: char| c.is_whitespace())(s)
}

fn pair(s: &str) -> IResult<&str, (&str, &str), AffError> {
    separated_pair(value_string, space1, value_string)(s)
}

const FLAG_NAMES: [&str; 11] = [
    "FORBIDDENWORD",
    "COMPOUNDFLAG",
    "COMPOUNDBEGIN",
    "COMPOUNDMIDDLE",
    "COMPOUNDEND",
    "COMPOUNDPERMITFLAG",
    "ONLYINCOMPOUND",
    "NOSUGGEST",
    "CIRCUMFIX",
    "NEEDAFFIX",
    "KEEPCASE",
];

fn assign_flag(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    let (s, key) = value_string(s)?;
    if !FLAG_NAMES.contains(&key) {
        return Err(Err::Error(AffError::from_error_kind(s, ErrorKind::Tag)));
    }
    let (s, _) = space1(s)?;
    let (s, v) = cut(value_string)(s)?;
    Ok((s, AffixLine::SetFlag(key, v)))
}

fn set_encoding(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    map(keyword("SET", value_string), AffixLine::SetEncoding)(s)
}

fn flag_mode(s: &str) -> IResult<&str, FlagMode, AffError> {
    alt((
        value(FlagMode::DoubleCharFlags, tag("long")),
        value(FlagMode::NumericFlags, tag("num")),
        value(FlagMode::Utf8Flags, tag("UTF-8")),
    ))(s)
}

fn set_flag_mode(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    map(keyword("FLAG", flag_mode), AffixLine::SetFlagMode)(s)
}

fn set_try_string(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    map(keyword("TRY", value_string), AffixLine::SetTryString)(s)
}

fn set_compound_min(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    map(keyword("COMPOUNDMIN", u32), AffixLine::SetCompoundMin)(s)
}

fn add_iconv(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    table_line("ICONV", pair, AffixLine::AddIconv)(s)
}

fn add_oconv(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    table_line("OCONV", pair, AffixLine::AddOconv)(s)
}

fn add_replacement(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    table_line("REP", pair, AffixLine::AddReplacement)(s)
}

fn add_compound_rule(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    table_line("COMPOUNDRULE", value_string, AffixLine::AddCompoundRule)(s)
}

fn add_related_chars(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    table_line("MAP", value_string, AffixLine::AddRelatedChars)(s)
}

fn add_word_break(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    table_line("BREAK", value_string, AffixLine::AddWordBreak)(s)
}

fn set_fullstrip(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    value(AffixLine::SetFullstrip, tag("FULLSTRIP"))(s)
}

fn affix_entry(s: &str) -> IResult<&str, (&str, &str, &str), AffError> {
    let (s, (strip, add)) = pair(s)?;
    // The condition may be left out, and morphological fields may follow it.
    let (s, cond) = opt(preceded(space1, value_string))(s)?;
    let (s, _) = opt(preceded(space1, not_line_ending))(s)?;
    Ok((s, (strip, add, cond.unwrap_or("."))))
}

fn add_affix<'a>(
    key: &'static str,
    kind: AffixKind,
) -> impl FnMut(Input<'a>) -> IResult<Input<'a>, AffixLine<'a>, AffError> {
    move |s: Input<'a>| {
        let (s, _) = tag(key)(s)?;
        let (s, _) = space1(s)?;
        let (s, flag) = cut(value_string)(s)?;
        let (s, _) = cut(space1)(s)?;
        // check if it's a valid first line
        let header = tuple((one_of::<_, _, AffError>("YN"), space1, u32))(s);
        if let Ok((after, (yn, _, _))) = header {
            if ending(after).is_ok() {
                return Ok((after, AffixLine::AffixHeader(kind, flag, yn == 'Y')));
            }
        }
        let (s, entry) = cut(affix_entry)(s)?;
        Ok((s, AffixLine::AffixEntry(kind, flag, entry)))
    }
}

fn ignored(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    let (s, key) = take_while1(|c: char| c.is_ascii_uppercase() || c == '_')(s)?;
    let (s, _) = rest(s)?;
    Ok((s, AffixLine::Ignored(key)))
}

fn line(s: &str) -> IResult<&str, AffixLine<'_>, AffError> {
    alt((
        set_encoding,
        set_flag_mode,
        set_try_string,
        assign_flag,
        set_compound_min,
        add_iconv,
        add_oconv,
        add_replacement,
        add_compound_rule,
        add_related_chars,
        add_word_break,
        set_fullstrip,
        add_affix("PFX", AffixKind::Prefix),
        add_affix("SFX", AffixKind::Suffix),
        ignored,
        success(AffixLine::Empty),
    ))(s)
}

pub fn parse_affix_data(text: &str) -> Result<AffixRuleSet> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut b = AffixRuleSet::builder();
    let mut cross: FnvHashMap<(AffixKind, &str), bool> = FnvHashMap::default();

    for (nr, raw) in text.lines().enumerate() {
        let lineno = nr + 1;
        let parsed = line
            .and(ending)
            .parse(raw)
            .finish()
            .map_err(|e| Error::malformed_at(lineno, e.message))?;
        let at = |e: Error| match e {
            Error::MalformedRule { message } => Error::malformed_at(lineno, message),
            other => other,
        };
        match (parsed.1).0 {
            AffixLine::Empty => (),
            AffixLine::SetEncoding(enc) => {
                b.encoding(enc);
            }
            AffixLine::SetFlagMode(fm) => {
                b.flag_mode(fm);
            }
            AffixLine::SetTryString(t) => {
                b.try_chars(t);
            }
            AffixLine::SetFlag(key, v) => {
                b.special_flag(key, v).map_err(at)?;
            }
            AffixLine::SetCompoundMin(v) => {
                b.compound_min(v as usize);
            }
            AffixLine::AddIconv((from, to)) => {
                b.input_conversion(from, to);
            }
            AffixLine::AddOconv((from, to)) => {
                b.output_conversion(from, to);
            }
            AffixLine::AddReplacement((from, to)) => {
                b.replacement(from, to);
            }
            AffixLine::AddCompoundRule(v) => {
                b.compound_rule(v).map_err(at)?;
            }
            AffixLine::AddRelatedChars(v) => {
                b.related_chars(v);
            }
            AffixLine::AddWordBreak(v) => {
                b.word_break(v);
            }
            AffixLine::SetFullstrip => {
                b.fullstrip(true);
            }
            AffixLine::AffixHeader(kind, flag, yn) => {
                cross.insert((kind, flag), yn);
            }
            AffixLine::AffixEntry(kind, flag, (strip, add, cond)) => {
                let allow_cross = cross.get(&(kind, flag)).copied().unwrap_or(false);
                b.affix(kind, flag, allow_cross, strip, add, cond).map_err(at)?;
            }
            AffixLine::Ignored(key) => {
                log::debug!("affix file line {}: ignoring {}", lineno, key);
            }
        }
    }
    Ok(b.build())
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "\u{FEFF}SET UTF-8
TRY esianrtolcdugmphbyfvkwzESIANRTOLCDUGMPHBYFVKWZ'
NOSUGGEST !
KEY qwertyuiop|asdfghjkl   # unsupported, skipped

REP 2
REP ph f
REP ^alot$ a_lot

PFX A Y 1
PFX A   0     re         .

SFX D Y 4
SFX D   0     d          e
SFX D   y     ied        [^aeiou]y
SFX D   0     ed         [^ey]
SFX D   0     ed         [aeiou]y    po:past

SFX N N 1
SFX N   e     ion/D
";

    #[test]
    fn test_parse_sample() {
        let rules = parse_affix_data(SAMPLE).unwrap();
        assert_eq!(Some("UTF-8"), rules.encoding());
        assert_eq!(6, rules.rule_count());
        assert_eq!(Some('!' as u32), rules.special_flags().no_suggest);
        assert_eq!(2, rules.replacements().len());
        assert!(rules.try_chars().unwrap().starts_with("esian"));

        let d: Vec<_> = rules.resolve('D' as u32).collect();
        assert_eq!(4, d.len());
        assert!(d.iter().all(|r| r.cross_product()));
        assert_eq!(Some("applied".to_string()), d[1].apply("apply"));

        let n = rules.resolve('N' as u32).next().unwrap();
        assert!(!n.cross_product());
        assert_eq!("ion", n.add());
        assert_eq!(Some("creation".to_string()), n.apply("create"));
    }

    #[test]
    fn test_long_flags() {
        let text = "FLAG long\nCOMPOUNDFLAG Yy\nSFX Aa Y 1\nSFX Aa 0 s/Bb .\n";
        let rules = parse_affix_data(text).unwrap();
        assert_eq!(FlagMode::DoubleCharFlags, rules.flag_mode());
        assert_eq!(Some('Y' as u32 * 256 + 'y' as u32), rules.special_flags().compound_flag);
        let rule = rules.resolve('A' as u32 * 256 + 'a' as u32).next().unwrap();
        assert!(rule.has_continuation(Some('B' as u32 * 256 + 'b' as u32)));
    }

    #[test]
    fn test_compound_settings() {
        let text = "COMPOUNDMIN 1\nCOMPOUNDRULE 1\nCOMPOUNDRULE n*1t\nBREAK 1\nBREAK -\nMAP 1\nMAP uúü\n";
        let rules = parse_affix_data(text).unwrap();
        assert_eq!(1, rules.compound_min());
        assert_eq!(1, rules.compound_rules().len());
        assert_eq!(&["-".to_string()][..], rules.word_breaks());
        assert_eq!(1, rules.related_chars().len());
    }

    #[test]
    fn test_rep_spaces() {
        let rules = parse_affix_data("REP 1\nREP alot a_lot\n").unwrap();
        let mut found = Vec::new();
        rules.replacements().suggest("alot", |s| {
            found.push(s);
            true
        });
        assert_eq!(vec!["a lot".to_string()], found);
    }

    #[test]
    fn test_malformed_lines() {
        let err = parse_affix_data("SFX D Y 1\nSFX D 0 ed [^ey\n").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
        assert!(parse_affix_data("FLAG bogus\n").is_err());
        assert!(parse_affix_data("this is not an affix file\n").is_err());
        assert!(parse_affix_data("FLAG long\nNEEDAFFIX abc\n").is_err());
    }
}
