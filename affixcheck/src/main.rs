use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::io::{stdin, Read};
use std::path::{Path, PathBuf};

use affixspell::{Cancel, Category, FsLoader, SpellChecker, SuggestConfig, Suggestion};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Language code of the dictionary to use.
    #[arg(short, long, global = true, default_value = "en_US")]
    lang: String,
    /// Extra directory to search for dictionaries. May be repeated.
    #[arg(short, long, global = true)]
    dict_dir: Vec<PathBuf>,
    /// JSON file with suggestion settings.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
    /// Most suggestions to show per word.
    #[arg(short, long, global = true)]
    max: Option<usize>,
    /// Give up suggesting for a word after this many milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether each word is spelled correctly.
    Check { words: Vec<String> },
    /// Suggest corrections for each word.
    Suggest { words: Vec<String> },
    /// Find the misspelled words in a text.
    Sentence { text: Vec<String> },
}

#[derive(Serialize)]
struct CheckResult<'a> {
    word: &'a str,
    correct: bool,
}

#[derive(Serialize)]
struct SuggestResult<'a> {
    word: &'a str,
    correct: bool,
    suggestions: Vec<Suggestion>,
    truncated: bool,
}

fn load_config(path: Option<&Path>) -> Result<SuggestConfig> {
    match path {
        Some(path) => {
            let text = read_to_string(path)
                .with_context(|| format!("Could not read config from {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Could not parse config in {}", path.display()))
        }
        None => Ok(SuggestConfig::default()),
    }
}

/// Return the command line arguments, or the lines of stdin if there
/// were none.
fn inputs(args: &[String]) -> Result<Vec<String>> {
    if !args.is_empty() {
        return Ok(args.to_vec());
    }
    let mut text = String::new();
    stdin()
        .read_to_string(&mut text)
        .with_context(|| "Could not read from stdin")?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).with_context(|| "Could not format output")?;
    println!("{}", out);
    Ok(())
}

fn format_suggestions<'a>(suggestions: impl Iterator<Item = (&'a str, Category)>) -> String {
    suggestions
        .map(|(word, category)| format!("{} ({})", word, category))
        .collect::<Vec<_>>()
        .join(", ")
}

fn check(speller: &SpellChecker, words: &[String], json: bool) -> Result<()> {
    let results: Vec<CheckResult> = words
        .iter()
        .map(|word| CheckResult {
            word,
            correct: speller.check(word),
        })
        .collect();
    if json {
        return print_json(&results);
    }
    for r in results {
        let verdict = if r.correct { "CORRECT" } else { "INCORRECT" };
        println!("{}: {}", r.word, verdict);
    }
    Ok(())
}

fn suggest(speller: &SpellChecker, words: &[String], json: bool) -> Result<()> {
    let results: Vec<SuggestResult> = words
        .iter()
        .map(|word| {
            let suggestions = speller.suggest_with(word, &Cancel::new());
            SuggestResult {
                word,
                correct: speller.check(word),
                truncated: suggestions.truncated,
                suggestions: suggestions.items,
            }
        })
        .collect();
    if json {
        return print_json(&results);
    }
    for r in results {
        if r.correct {
            println!("{}: CORRECT", r.word);
            continue;
        }
        let list = format_suggestions(r.suggestions.iter().map(|s| (s.word.as_str(), s.category)));
        let more = if r.truncated { " ..." } else { "" };
        println!("{}: {}{}", r.word, list, more);
    }
    Ok(())
}

fn sentence(speller: &SpellChecker, texts: &[String], json: bool) -> Result<()> {
    let text = texts.join(" ");
    let misspelled: BTreeMap<String, Vec<(String, Category)>> = speller.check_sentence(&text);
    if json {
        return print_json(&misspelled);
    }
    for (word, suggestions) in misspelled.iter() {
        let list = format_suggestions(suggestions.iter().map(|(w, c)| (w.as_str(), *c)));
        println!("{}: {}", word, list);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(max) = args.max {
        config.max_suggestions = max;
    }
    if let Some(ms) = args.timeout_ms {
        config.timeout_ms = Some(ms);
    }

    let mut loader = FsLoader::default();
    for dir in args.dict_dir.iter().rev() {
        loader = loader.with_dir(dir);
    }
    let speller = SpellChecker::load(&args.lang, &loader, config)
        .with_context(|| format!("Could not load dictionary for {}", args.lang))?;
    log::debug!("suggestion settings: {:?}", speller.config());

    match &args.command {
        Command::Check { words } => check(&speller, &inputs(words)?, args.json),
        Command::Suggest { words } => suggest(&speller, &inputs(words)?, args.json),
        Command::Sentence { text } => {
            let text = inputs(text)?;
            if text.is_empty() {
                bail!("No text to check.");
            }
            sentence(&speller, &text, args.json)
        }
    }
}
