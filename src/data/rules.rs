// ============================================================
// Layer 4 — Rule Tables
// ============================================================
// Static, load-once data used by the normalizer:
//
//   SUBSTITUTIONS   — contraction / slang / abbreviation map
//   character sets  — allowed, spaced, kept-single, sentence-final
//   entity patterns — URL, #hashtag, @mention, emoji
//
// The character classes that the pipeline uses for
// "disallowed characters", "edge trim" and "punctuation runs"
// are expressed as predicates below rather than regexes, so the
// stages in data::stages can share one definition of each class.
//
// Nothing here is mutated after first use; every static is safe
// to read from any number of worker threads.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::rule::SubstitutionRule;

// ─── Substitution map ─────────────────────────────────────────────────────────
// Keys are lowercase. Replacements are lowercase letters and
// single spaces and never contain another key as a whole word.
pub const SUBSTITUTIONS: &[(&str, &str)] = &[
    // contractions
    ("ain't", "is not"),
    ("aren't", "are not"),
    ("can't", "can not"),
    ("cannot", "can not"),
    ("'cause", "because"),
    ("could've", "could have"),
    ("couldn't", "could not"),
    ("didn't", "did not"),
    ("doesn't", "does not"),
    ("don't", "do not"),
    ("hadn't", "had not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("he'd", "he would"),
    ("he'd've", "he would have"),
    ("he'll", "he will"),
    ("he'll've", "he will have"),
    ("he's", "he is"),
    ("how'd", "how did"),
    ("how'd'y", "how do you"),
    ("how'll", "how will"),
    ("how're", "how are"),
    ("how's", "how is"),
    ("i'd", "i would"),
    ("i'd've", "i would have"),
    ("i'll", "i will"),
    ("i'll've", "i will have"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("isn't", "is not"),
    ("it'd", "it would"),
    ("it'd've", "it would have"),
    ("it'll", "it will"),
    ("it'll've", "it will have"),
    ("it's", "it is"),
    ("let's", "let us"),
    ("ma'am", "madam"),
    ("mayn't", "may not"),
    ("might've", "might have"),
    ("mightn't", "might not"),
    ("mightn't've", "might not have"),
    ("must've", "must have"),
    ("mustn't", "must not"),
    ("mustn't've", "must not have"),
    ("needn't", "need not"),
    ("needn't've", "need not have"),
    ("o'clock", "of the clock"),
    ("oughtn't", "ought not"),
    ("oughtn't've", "ought not have"),
    ("shan't", "shall not"),
    ("sha'n't", "shall not"),
    ("shan't've", "shall not have"),
    ("she'd", "she would"),
    ("she'd've", "she would have"),
    ("she'll", "she will"),
    ("she'll've", "she will have"),
    ("she's", "she is"),
    ("should've", "should have"),
    ("shouldn't", "should not"),
    ("shouldn't've", "should not have"),
    ("so've", "so have"),
    ("so's", "so as"),
    ("this's", "this is"),
    ("that'd", "that would"),
    ("that'd've", "that would have"),
    ("that'll", "that will"),
    ("that's", "that is"),
    ("there'd", "there would"),
    ("there'd've", "there would have"),
    ("there'll", "there will"),
    ("there're", "there are"),
    ("there's", "there is"),
    ("here's", "here is"),
    ("they'd", "they would"),
    ("they'd've", "they would have"),
    ("they'll", "they will"),
    ("they'll've", "they will have"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("to've", "to have"),
    ("wasn't", "was not"),
    ("we'd", "we would"),
    ("we'd've", "we would have"),
    ("we'll", "we will"),
    ("we'll've", "we will have"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("weren't", "were not"),
    ("what'd", "what did"),
    ("what'll", "what will"),
    ("what'll've", "what will have"),
    ("what're", "what are"),
    ("what's", "what is"),
    ("what've", "what have"),
    ("when's", "when is"),
    ("when've", "when have"),
    ("where'd", "where did"),
    ("where're", "where are"),
    ("where's", "where is"),
    ("where've", "where have"),
    ("who'd", "who would"),
    ("who'd've", "who would have"),
    ("who'll", "who will"),
    ("who'll've", "who will have"),
    ("who're", "who are"),
    ("who's", "who is"),
    ("who've", "who have"),
    ("why'd", "why did"),
    ("why's", "why is"),
    ("why've", "why have"),
    ("will've", "will have"),
    ("won't", "will not"),
    ("won't've", "will not have"),
    ("would've", "would have"),
    ("wouldn't", "would not"),
    ("wouldn't've", "would not have"),
    ("y'all", "you all"),
    ("ya'll", "you all"),
    ("y'all'd", "you all would"),
    ("y'all'd've", "you all would have"),
    ("y'all're", "you all are"),
    ("y'all've", "you all have"),
    ("you'd", "you would"),
    ("you'd've", "you would have"),
    ("you'll", "you will"),
    ("you'll've", "you will have"),
    ("you're", "you are"),
    ("you've", "you have"),
    // contractions typed without the apostrophe
    ("arent", "are not"),
    ("couldnt", "could not"),
    ("didnt", "did not"),
    ("doesnt", "does not"),
    ("dont", "do not"),
    ("hasnt", "has not"),
    ("havent", "have not"),
    ("im", "i am"),
    ("isnt", "is not"),
    ("ive", "i have"),
    ("shouldnt", "should not"),
    ("thats", "that is"),
    ("theyre", "they are"),
    ("wasnt", "was not"),
    ("werent", "were not"),
    ("whats", "what is"),
    ("wouldnt", "would not"),
    ("youre", "you are"),
    // informal spellings
    ("dunno", "do not know"),
    ("gimme", "give me"),
    ("gonna", "going to"),
    ("gotta", "got to"),
    ("kinda", "kind of"),
    ("lemme", "let me"),
    ("sorta", "sort of"),
    ("wanna", "want to"),
    // platform slang and abbreviations
    ("rt", "retweet"),
    ("dm", "direct message"),
    ("dms", "direct messages"),
    ("afaik", "as far as i know"),
    ("b4", "before"),
    ("bc", "because"),
    ("btw", "by the way"),
    ("cuz", "because"),
    ("fyi", "for your information"),
    ("idk", "i do not know"),
    ("imho", "in my humble opinion"),
    ("imo", "in my opinion"),
    ("irl", "in real life"),
    ("ngl", "not going to lie"),
    ("omg", "oh my god"),
    ("pls", "please"),
    ("plz", "please"),
    ("ppl", "people"),
    ("rn", "right now"),
    ("smh", "shaking my head"),
    ("tbh", "to be honest"),
    ("tho", "though"),
    ("thx", "thanks"),
    ("ty", "thank you"),
    ("u", "you"),
    ("ur", "your"),
    ("w", "with"),
    ("w/", "with"),
    ("w/o", "without"),
    // domain vocabulary
    ("genai", "generative ai"),
    ("generativeai", "generative ai"),
    ("aiart", "ai art"),
    ("aigenerated", "ai generated"),
    ("aiphotography", "ai photography"),
    ("musicai", "music ai"),
    ("promts", "prompts"),
    // entity-encoded conjunction, matched before HTML unescape
    ("&amp;", "and"),
];

// ─── RuleTable ────────────────────────────────────────────────────────────────
/// The ordered, de-duplicated set of substitution rules that a
/// Matcher is compiled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<SubstitutionRule>,
}

impl RuleTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self::from_rules(
            SUBSTITUTIONS
                .iter()
                .map(|(pattern, replacement)| SubstitutionRule::new(*pattern, *replacement)),
        )
    }

    /// Build a table from arbitrary rules. When two rules share a
    /// (lowercased) pattern the first one is kept.
    pub fn from_rules(rules: impl IntoIterator<Item = SubstitutionRule>) -> Self {
        let mut seen  = HashSet::new();
        let mut table = Vec::new();

        for rule in rules {
            if rule.pattern.trim().is_empty() {
                tracing::warn!("Ignoring substitution rule with an empty pattern");
                continue;
            }
            if !seen.insert(rule.pattern.clone()) {
                tracing::warn!("Duplicate substitution pattern '{}' ignored", rule.pattern);
                continue;
            }
            table.push(rule);
        }

        Self { rules: table }
    }

    /// Merge `overrides` over this table: an override replaces the
    /// built-in rule with the same pattern, new patterns are appended.
    pub fn with_overrides(self, overrides: impl IntoIterator<Item = SubstitutionRule>) -> Self {
        let overrides: BTreeMap<String, SubstitutionRule> = overrides
            .into_iter()
            .map(|r| (r.pattern.clone(), r))
            .collect();

        let mut replaced = 0usize;
        let mut merged: Vec<SubstitutionRule> = self
            .rules
            .into_iter()
            .map(|rule| match overrides.get(&rule.pattern) {
                Some(o) => {
                    replaced += 1;
                    o.clone()
                }
                None => rule,
            })
            .collect();

        let known: HashSet<String> = merged.iter().map(|r| r.pattern.clone()).collect();
        let added: Vec<SubstitutionRule> = overrides
            .into_values()
            .filter(|r| !known.contains(&r.pattern))
            .collect();
        tracing::debug!("Rule overrides: {} replaced, {} added", replaced, added.len());
        merged.extend(added);

        Self::from_rules(merged)
    }

    pub fn rules(&self) -> &[SubstitutionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

// ─── Character classes ────────────────────────────────────────────────────────

/// Punctuation that survives disallowed-character removal.
pub const ALLOWED_PUNCT: &[char] = &['.', ',', '-', '?', '!', ';', ':', '\'', '/'];

/// Punctuation that is split off into its own token.
pub const SPACED_PUNCT: &[char] = &['.', ',', '-', '?', '!', ';', ':', '/'];

/// Non-alphanumeric one-character tokens that are kept.
pub const KEPT_SINGLE_TOKENS: &[char] = &['.', ',', '-', '?', '!', ';', ':'];

/// Marks allowed to end a canonical sentence.
pub const SENTENCE_FINAL: &[char] = &['!', '?', '.'];

/// Separator a punctuation run collapses to.
pub const RUN_SEPARATOR: &str = "; ";

/// Word characters for token-boundary checks.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_allowed_punct(c: char) -> bool {
    ALLOWED_PUNCT.contains(&c)
}

pub fn is_spaced_punct(c: char) -> bool {
    SPACED_PUNCT.contains(&c)
}

pub fn is_sentence_final(c: char) -> bool {
    SENTENCE_FINAL.contains(&c)
}

/// ASCII letters and digits, whitespace, and the allowed punctuation.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || is_allowed_punct(c)
}

// ─── Entity patterns ──────────────────────────────────────────────────────────

pub static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:(?:https?|ftp)://|\bwww\.)\S+").unwrap());

pub static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").unwrap());

pub static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").unwrap());

// Pictographs plus the joiners, selectors, skin-tone modifiers,
// regional indicators and tag characters that glue emoji sequences.
pub static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\p{Extended_Pictographic}\x{200D}\x{FE0E}\x{FE0F}\x{20E3}\x{1F3FB}-\x{1F3FF}\x{1F1E6}-\x{1F1FF}\x{E0020}-\x{E007F}]",
    )
    .unwrap()
});

pub static LINE_BREAKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());
