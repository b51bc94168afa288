// ============================================================
// Layer 3 — SubstitutionRule Domain Type
// ============================================================
// One lexical substitution: an informal surface form (a
// contraction, a piece of platform slang, an abbreviation)
// and the canonical text it expands to.
//
// Example:
//   pattern:     "can't"
//   replacement: "can not"
//
// Patterns are matched case-insensitively and only as whole
// tokens; the matching itself lives in data::matcher.

use serde::{Deserialize, Serialize};

/// An immutable (pattern → replacement) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    /// Lowercased surface form; may contain apostrophes, `/`, or spaces
    pub pattern: String,

    /// Canonical expansion written in place of the pattern
    pub replacement: String,
}

impl SubstitutionRule {
    /// Create a rule. The pattern is stored lowercased so that the
    /// rule table can detect keys that differ only by case.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern:     pattern.into().to_lowercase(),
            replacement: replacement.into(),
        }
    }
}
