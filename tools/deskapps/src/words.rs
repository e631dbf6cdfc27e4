use crate::commands::CommandBinding;
use crate::errors::DeskError;
use crate::shell::Desk;
use crate::types::AppKind;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

pub const DEFAULT_STOP_WORDS: [&str; 11] = [
    "the", "and", "a", "an", "in", "on", "is", "are", "it", "of", "to",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordStats {
    pub total: usize,
    /// Sorted by descending count, then alphabetically.
    pub frequencies: Vec<(String, usize)>,
}

impl WordStats {
    pub fn unique(&self) -> usize {
        self.frequencies.len()
    }
}

pub struct WordCounter {
    splitter: Regex,
    stop_words: BTreeSet<String>,
    ignore_common: bool,
}

impl WordCounter {
    pub fn new<I, S>(stop_words: I, ignore_common: bool) -> Result<Self, DeskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let splitter = Regex::new(r"\s+|[[:punct:]]")
            .map_err(|e| DeskError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            splitter,
            stop_words: stop_words
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
            ignore_common,
        })
    }

    pub fn with_defaults() -> Result<Self, DeskError> {
        Self::new(DEFAULT_STOP_WORDS, true)
    }

    pub fn ignore_common(&self) -> bool {
        self.ignore_common
    }

    pub fn set_ignore_common(&mut self, ignore: bool) {
        self.ignore_common = ignore;
    }

    pub fn count(&self, text: &str) -> Result<WordStats, DeskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DeskError::InvalidInput(
                "Please enter text to count words.".to_string(),
            ));
        }

        let mut total = 0;
        let mut tally: HashMap<String, usize> = HashMap::new();
        for token in self.splitter.split(text) {
            let word = token.to_lowercase();
            if word.is_empty() {
                continue;
            }
            if self.ignore_common && self.stop_words.contains(&word) {
                continue;
            }
            total += 1;
            *tally.entry(word).or_insert(0) += 1;
        }

        let mut frequencies = tally.into_iter().collect::<Vec<_>>();
        frequencies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(WordStats { total, frequencies })
    }
}

pub fn render_stats(stats: &WordStats) -> Vec<String> {
    let mut lines = vec![format!("Word Count: {}", stats.total)];
    if stats.frequencies.is_empty() {
        return lines;
    }
    lines.push(format!("Number of Unique Words: {}", stats.unique()));
    lines.extend(
        stats
            .frequencies
            .iter()
            .map(|(word, count)| format!("Word '{word}': {count} occurrences")),
    );
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordAction {
    Count,
    Ignore,
}

pub const WORD_BINDINGS: [CommandBinding; 2] = [
    CommandBinding {
        verb: "count",
        usage: "count <text>",
        action: "count words",
    },
    CommandBinding {
        verb: "ignore",
        usage: "ignore on|off",
        action: "toggle common-word filter",
    },
];

pub fn action_for_verb(verb: &str) -> Option<WordAction> {
    match verb {
        "count" => Some(WordAction::Count),
        "ignore" => Some(WordAction::Ignore),
        _ => None,
    }
}

impl Desk for WordCounter {
    fn app(&self) -> AppKind {
        AppKind::Words
    }

    fn bindings(&self) -> &'static [CommandBinding] {
        &WORD_BINDINGS
    }

    fn handle(&mut self, verb: &str, args: &str) -> Result<Vec<String>, DeskError> {
        let Some(action) = action_for_verb(verb) else {
            return Err(DeskError::InvalidInput(format!("Unknown command: {verb}")));
        };
        match action {
            WordAction::Count => Ok(render_stats(&self.count(args)?)),
            WordAction::Ignore => {
                let ignore = match args.trim().to_ascii_lowercase().as_str() {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    _ => {
                        return Err(DeskError::InvalidInput(
                            "Use 'ignore on' or 'ignore off'.".to_string(),
                        ))
                    }
                };
                self.set_ignore_common(ignore);
                let state = if ignore { "on" } else { "off" };
                Ok(vec![format!("Ignore Common Words: {state}")])
            }
        }
    }
}
