// ============================================================
// Layer 4 — Substitution Matcher
// ============================================================
// Replaces whole-token occurrences of rule patterns in one
// synchronized pass over the ORIGINAL text.
//
// All patterns are compiled once into a single Aho–Corasick
// automaton (ASCII case-insensitive). A lookup then runs in
// three steps:
//
//   1. collect every (possibly overlapping) pattern occurrence
//   2. keep only occurrences on token boundaries — the chars
//      just outside the match must not be word characters
//   3. scan left to right, taking at each start position the
//      longest surviving occurrence, skipping anything that
//      overlaps an occurrence already taken
//
// Example with patterns "i'd", "i'd've":
//   "i'd've said"  → one match, "i'd've" (longest at position 0)
//   "said"         → no match for "ai" (inside a larger token)
//
// Reference: aho-corasick crate documentation (overlapping search)

use aho_corasick::{AhoCorasick, MatchKind};
use thiserror::Error;

use crate::data::rules::is_word_char;
use crate::domain::rule::SubstitutionRule;

#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("substitution rule #{index} has an empty pattern")]
    EmptyPattern { index: usize },

    #[error("failed to compile substitution automaton: {0}")]
    Build(#[from] aho_corasick::BuildError),
}

/// One selected occurrence: rule index and byte span in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule:  usize,
    pub start: usize,
    pub end:   usize,
}

/// A compiled, read-only substitution matcher.
#[derive(Debug)]
pub struct Matcher {
    automaton:    AhoCorasick,
    replacements: Vec<String>,
}

impl Matcher {
    /// Compile all rules into one automaton.
    pub fn new(rules: &[SubstitutionRule]) -> Result<Self, MatcherError> {
        if let Some(index) = rules.iter().position(|r| r.pattern.is_empty()) {
            return Err(MatcherError::EmptyPattern { index });
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(rules.iter().map(|r| r.pattern.as_str()))?;

        let replacements = rules.iter().map(|r| r.replacement.clone()).collect();

        tracing::debug!("Compiled substitution matcher over {} patterns", rules.len());
        Ok(Self { automaton, replacements })
    }

    /// Number of compiled patterns.
    #[cfg(test)]
    pub fn pattern_count(&self) -> usize {
        self.replacements.len()
    }

    /// The non-overlapping, boundary-respecting matches that
    /// `replace_all` would rewrite, in text order.
    pub fn find(&self, text: &str) -> Vec<RuleMatch> {
        let mut candidates: Vec<RuleMatch> = self
            .automaton
            .find_overlapping_iter(text)
            .filter(|m| on_token_boundary(text, m.start(), m.end()))
            .map(|m| RuleMatch {
                rule:  m.pattern().as_usize(),
                start: m.start(),
                end:   m.end(),
            })
            .collect();

        // Leftmost first; at equal starts, longest first
        candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut selected = Vec::with_capacity(candidates.len());
        let mut cursor   = 0usize;
        for m in candidates {
            if m.start >= cursor {
                cursor = m.end;
                selected.push(m);
            }
        }
        selected
    }

    /// Rewrite every selected match with its replacement.
    pub fn replace_all(&self, text: &str) -> String {
        let matches = self.find(text);
        if matches.is_empty() {
            return text.to_string();
        }

        let mut out  = String::with_capacity(text.len() + matches.len() * 8);
        let mut last = 0usize;
        for m in matches {
            out.push_str(&text[last..m.start]);
            out.push_str(&self.replacements[m.rule]);
            last = m.end;
        }
        out.push_str(&text[last..]);
        out
    }
}

/// True when neither neighbour of `text[start..end]` is a word character.
fn on_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after  = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
