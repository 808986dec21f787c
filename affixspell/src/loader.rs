//! Where affix rules and wordlists come from.
use std::env::current_exe;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use encoding::label::encoding_from_whatwg_label;
use encoding::DecoderTrap;
use fnv::FnvHashMap;
use home::home_dir;

use crate::dictionary::{parse_wordlist, Wordlist};
use crate::error::{Error, Result};
use crate::ruleset::AffixRuleSet;

/// Directories searched for `<lang>.aff` and `<lang>.dic`, in order.
/// `$HOME` and `$EXE` are expanded to the user's home directory and the
/// directory of the running executable.
pub const DEFAULT_SEARCH_PATH: [&str; 6] = [
    "./dicts",
    ".",
    "/usr/share/hunspell",
    "/usr/share/myspell",
    "$EXE/dicts",
    "$EXE",
];

/// Supplies the raw material for a spelling session.
pub trait ResourceLoader: Send + Sync + Debug {
    fn load_rule_set(&self, language: &str) -> Result<AffixRuleSet>;

    /// Load the stem list, interpreting its flags per `rules`.
    fn load_wordlist(&self, language: &str, rules: &AffixRuleSet) -> Result<Wordlist>;
}

/// Language codes name files, so they may not contain path separators.
pub fn is_valid_language_code(language: &str) -> bool {
    !language.is_empty()
        && language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Reads hunspell dictionaries from a search path of directories.
#[derive(Clone, Debug)]
pub struct FsLoader {
    search_path: Vec<PathBuf>,
}

impl Default for FsLoader {
    fn default() -> Self {
        FsLoader::new(DEFAULT_SEARCH_PATH)
    }
}

impl FsLoader {
    pub fn new<P: Into<PathBuf>>(search_path: impl IntoIterator<Item = P>) -> Self {
        FsLoader {
            search_path: search_path.into_iter().map(Into::into).collect(),
        }
    }

    /// Search `dir` before the rest of the search path.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path.insert(0, dir.into());
        self
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Look for a Hunspell-format dictionary for `language` in the search
    /// path. Return a tuple of paths to the affix file and the dictionary
    /// file.
    pub fn find(&self, language: &str) -> Result<(PathBuf, PathBuf)> {
        if !is_valid_language_code(language) {
            return Err(Error::unknown_language(language, "invalid language code"));
        }
        for dir in self.search_path.iter() {
            let dir = match expand_dir(dir) {
                Some(dir) => dir,
                None => {
                    log::debug!("Could not expand path {}", dir.display());
                    continue;
                }
            };
            let paff = dir.join(format!("{}.aff", language));
            let pdic = dir.join(format!("{}.dic", language));
            if paff.is_file() && pdic.is_file() {
                log::debug!("Found dictionary for {} in {}", language, dir.display());
                return Ok((paff, pdic));
            }
        }
        Err(Error::unknown_language(language, "no .aff and .dic files in the search path"))
    }
}

impl ResourceLoader for FsLoader {
    fn load_rule_set(&self, language: &str) -> Result<AffixRuleSet> {
        let (paff, _) = self.find(language)?;
        let bytes = read_bytes(language, &paff)?;
        let label = sniff_encoding(&bytes);
        let text = decode(&bytes, label.as_deref())?;
        AffixRuleSet::parse(&text).map_err(|err| match err {
            Error::MalformedRule { message } => {
                Error::malformed(format!("{}: {}", paff.display(), message))
            }
            err => err,
        })
    }

    fn load_wordlist(&self, language: &str, rules: &AffixRuleSet) -> Result<Wordlist> {
        let (_, pdic) = self.find(language)?;
        let bytes = read_bytes(language, &pdic)?;
        let text = decode(&bytes, rules.encoding())?;
        Ok(parse_wordlist(&text, rules))
    }
}

/// Look for paths starting with $HOME or $EXE and fill in the user's
/// home directory or the executable's directory, respectively.
fn expand_dir(dir: &Path) -> Option<PathBuf> {
    if let Ok(path) = dir.strip_prefix("$HOME") {
        Some(home_dir()?.join(path))
    } else if let Ok(path) = dir.strip_prefix("$EXE") {
        match current_exe() {
            Ok(exe) => Some(exe.parent()?.join(path)),
            Err(_) => None,
        }
    } else {
        Some(dir.to_path_buf())
    }
}

fn read_bytes(language: &str, path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|err| Error::unknown_language(language, format!("{}: {}", path.display(), err)))
}

/// Find the argument of the `SET` line, if any. The line itself is ASCII
/// in every encoding hunspell supports.
fn sniff_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    for line in bytes.split(|b| *b == b'\n') {
        let Some(rest) = line.strip_prefix(b"SET") else {
            continue;
        };
        if !rest.first().map_or(false, |b| b.is_ascii_whitespace()) {
            continue;
        }
        let label: String = rest
            .iter()
            .skip_while(|b| b.is_ascii_whitespace())
            .take_while(|b| b.is_ascii_graphic())
            .map(|b| *b as char)
            .collect();
        if !label.is_empty() {
            return Some(label);
        }
    }
    None
}

/// Decode file contents in the named encoding (UTF-8 if none).
fn decode(bytes: &[u8], label: Option<&str>) -> Result<String> {
    let label = label.unwrap_or("UTF-8").to_lowercase();
    // Hunspell uses a few names that aren't whatwg labels.
    let whatwg = match label.as_str() {
        "microsoft-cp1251" => "windows-1251",
        "tis620-2533" => "tis-620",
        other => other,
    };
    let encoding = encoding_from_whatwg_label(whatwg)
        .ok_or_else(|| Error::malformed(format!("unsupported encoding {}", label)))?;
    let text = encoding
        .decode(bytes, DecoderTrap::Replace)
        .map_err(|err| Error::malformed(err.into_owned()))?;
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => Ok(rest.to_string()),
        None => Ok(text),
    }
}

/// Serves affix and dictionary texts held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    languages: FnvHashMap<String, (String, String)>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    pub fn with_language(mut self, language: &str, aff: &str, dic: &str) -> Self {
        self.insert(language, aff, dic);
        self
    }

    pub fn insert(&mut self, language: &str, aff: &str, dic: &str) {
        self.languages
            .insert(language.to_string(), (aff.to_string(), dic.to_string()));
    }

    fn texts(&self, language: &str) -> Result<&(String, String)> {
        self.languages
            .get(language)
            .ok_or_else(|| Error::unknown_language(language, "not in memory"))
    }
}

impl ResourceLoader for MemoryLoader {
    fn load_rule_set(&self, language: &str) -> Result<AffixRuleSet> {
        AffixRuleSet::parse(&self.texts(language)?.0)
    }

    fn load_wordlist(&self, language: &str, rules: &AffixRuleSet) -> Result<Wordlist> {
        Ok(parse_wordlist(&self.texts(language)?.1, rules))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixture_loader() -> FsLoader {
        FsLoader::new([concat!(env!("CARGO_MANIFEST_DIR"), "/tests/dicts")])
    }

    #[test]
    fn test_language_codes() {
        assert!(is_valid_language_code("en_US"));
        assert!(is_valid_language_code("sr-Latn"));
        assert!(!is_valid_language_code(""));
        assert!(!is_valid_language_code("../en_US"));
        assert!(!is_valid_language_code("en US"));
    }

    #[test]
    fn test_find() {
        let loader = fixture_loader();
        let (paff, pdic) = loader.find("en_US").unwrap();
        assert!(paff.ends_with("en_US.aff"));
        assert!(pdic.ends_with("en_US.dic"));
        assert!(matches!(loader.find("xx_INVALID"), Err(Error::UnknownLanguage { .. })));
        assert!(matches!(loader.find("../dicts/en_US"), Err(Error::UnknownLanguage { .. })));
    }

    #[test]
    fn test_load_fixture() {
        let loader = fixture_loader();
        let rules = loader.load_rule_set("en_US").unwrap();
        assert!(rules.rule_count() > 0);
        let wordlist = loader.load_wordlist("en_US", &rules).unwrap();
        assert!(wordlist.entries.iter().any(|e| e.stem == "rain"));
    }

    #[test]
    fn test_expand_dir() {
        assert_eq!(Some(PathBuf::from("/x/y")), expand_dir(Path::new("/x/y")));
        let exe = expand_dir(Path::new("$EXE/dicts")).unwrap();
        assert!(exe.ends_with("dicts"));
        assert!(!exe.starts_with("$EXE"));
    }

    #[test]
    fn test_decode() {
        let latin1 = b"SET ISO8859-1\nSFX A Y 1\nSFX A 0 \xE9 .\n";
        assert_eq!(Some("ISO8859-1".to_string()), sniff_encoding(latin1));
        let text = decode(latin1, sniff_encoding(latin1).as_deref()).unwrap();
        assert!(text.ends_with("0 é .\n"));

        let utf8 = "\u{FEFF}SET UTF-8\nTRY é\n".as_bytes();
        assert_eq!(Some("UTF-8".to_string()), sniff_encoding(utf8));
        assert_eq!("SET UTF-8\nTRY é\n", decode(utf8, None).unwrap());

        assert_eq!(None, sniff_encoding(b"SETTINGS x\nTRY a\n"));
        assert!(matches!(decode(b"x", Some("EBCDIC-42")), Err(Error::MalformedRule { .. })));
    }

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new().with_language("tiny", "SFX S Y 1\nSFX S 0 s .\n", "1\ncat/S\n");
        let rules = loader.load_rule_set("tiny").unwrap();
        assert_eq!(1, rules.rule_count());
        assert_eq!(1, loader.load_wordlist("tiny", &rules).unwrap().entries.len());
        assert!(matches!(loader.load_rule_set("en_US"), Err(Error::UnknownLanguage { .. })));
    }
}
