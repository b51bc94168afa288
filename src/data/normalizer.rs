// ============================================================
// Layer 4 — Normalizer
// ============================================================
// Turns one raw text blob into its canonical sentence by running
// the eleven stages in data::stages in strict order.
//
// A single pass is not always a fixed point: removing a char in
// a late stage can bring two fragments together into a new
// substitution key ("he would*'ve" → "he would've"). `normalize`
// therefore repeats the pass until the text stops changing. Each
// extra pass only fires on keys formed that way, so real input
// settles in two or three passes.
//
//   normalize("RT @foo: I'm SO happy!!! https://x.co #ai")
//     → "retweet : i am so happy"
//
// The Normalizer owns nothing mutable after construction and is
// shared by reference across worker threads.

use crate::data::encoding::repair_encoding;
use crate::data::matcher::{Matcher, MatcherError};
use crate::data::rules::RuleTable;
use crate::data::stages;
use crate::domain::record::{CanonicalRecord, RawRecord};

/// Upper bound on repeated passes before giving up on a fixed point.
pub const MAX_PASSES: usize = 8;

/// The text canonicalization pipeline.
#[derive(Debug)]
pub struct Normalizer {
    matcher: Matcher,
}

impl Normalizer {
    /// Compile the substitution matcher for `rules`.
    pub fn new(rules: &RuleTable) -> Result<Self, MatcherError> {
        Ok(Self {
            matcher: Matcher::new(rules.rules())?,
        })
    }

    /// Normalizer over the built-in rule table.
    #[cfg(test)]
    pub fn builtin() -> Result<Self, MatcherError> {
        Self::new(&RuleTable::builtin())
    }

    /// One run of all eleven stages.
    pub fn pass(&self, text: &str) -> String {
        let text = stages::lowercase_and_join_lines(text);
        let text = repair_encoding(&text);
        let text = self.matcher.replace_all(&text);
        let text = stages::unescape_html(&text);
        let text = stages::strip_entities(&text);
        let text = stages::space_punctuation(&text);
        let text = stages::remove_disallowed(&text);
        let text = stages::drop_degenerate_tokens(&text);
        let text = stages::trim_edges(&text);
        let text = stages::collapse_punctuation_runs(&text);
        stages::collapse_whitespace(&text)
    }

    /// Canonical form of `text`. Idempotent: normalizing the result
    /// again returns it unchanged.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
        tracing::warn!(
            "Text did not settle after {} passes; emitting last result",
            MAX_PASSES
        );
        current
    }

    /// Normalize a record's text; a missing value yields `""`.
    pub fn normalize_record(&self, record: &RawRecord) -> String {
        match record.text.as_deref() {
            Some(text) if !text.is_empty() => self.normalize(text),
            _ => String::new(),
        }
    }

    /// Normalize a record and keep its row number.
    pub fn canonicalize(&self, record: &RawRecord) -> CanonicalRecord {
        CanonicalRecord::new(record.row, self.normalize_record(record))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::rules::EMOJI_RE;
    use crate::domain::rule::SubstitutionRule;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn normalizer() -> Normalizer {
        Normalizer::builtin().unwrap()
    }

    #[test]
    fn canonicalizes_a_retweet() {
        let n = normalizer();
        assert_eq!(
            n.normalize("RT @foo: I'm SO happy!!! https://x.co #ai"),
            "retweet : i am so happy"
        );
    }

    #[test]
    fn collapses_punctuation_runs() {
        let n = normalizer();
        assert_eq!(n.normalize("Hello,,,world!!"), "hello ; world");
        assert_eq!(n.normalize("wait,2023,ok"), "wait ; ok");
        assert_eq!(n.normalize("Well... ok!"), "well ; ok !");
    }

    #[test]
    fn keeps_only_ascii_letters_and_digits() {
        let n = normalizer();
        assert_eq!(n.normalize("café 日本語 ok"), "caf ok");
        assert_eq!(n.normalize("über cool"), "ber cool");
    }

    #[test]
    fn expands_contractions() {
        let n = normalizer();
        assert_eq!(n.normalize("I can't go"), "i can not go");
        assert_eq!(n.normalize("I'd've KNOWN"), "i would have known");
    }

    #[test]
    fn substitution_respects_word_boundaries() {
        let n = normalizer();
        assert_eq!(n.normalize("said hello"), "said hello");

        let rules = RuleTable::from_rules([SubstitutionRule::new("ai", "artificial intelligence")]);
        let n = Normalizer::new(&rules).unwrap();
        assert_eq!(n.normalize("said hello"), "said hello");
        assert_eq!(n.normalize("AI rocks"), "artificial intelligence rocks");
    }

    #[test]
    fn empty_and_missing_text_give_empty_output() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \n\t "), "");
        assert_eq!(n.normalize("@foo #bar https://x.co 😀"), "");
        assert_eq!(n.normalize_record(&RawRecord::new(1, None)), "");
        assert_eq!(n.canonicalize(&RawRecord::with_text(4, "")).sentence, "");
    }

    #[test]
    fn repairs_mojibake_and_entities() {
        let n = normalizer();
        assert_eq!(n.normalize("donâ€™t worry"), "do not worry");
        assert_eq!(n.normalize("Tom &amp; Jerry"), "tom and jerry");
        assert_eq!(n.normalize("1 &lt; 2"), "1 2");
    }

    #[test]
    fn joins_fragments_across_passes() {
        let n = normalizer();
        // the '*' is only dropped after substitution has run once
        assert_eq!(n.normalize("he'd*'ve"), "he would have");
    }

    #[test]
    fn canonicalize_keeps_row_number() {
        let n = normalizer();
        let c = n.canonicalize(&RawRecord::with_text(42, "Gonna WIN"));
        assert_eq!(c, CanonicalRecord::new(42, "going to win"));
    }

    // ─── Property checks over noisy generated text ────────────────────────────

    const FRAGMENTS: &[&str] = &[
        "RT", "rt", "I'm", "i'd", "'ve", "can't", "w/", "w/o", "u", "Gonna", "hello", "World",
        "AI", "said", "#ai", "#GenAI", "@user", "https://t.co/xyz", "www.site.org", "&amp;",
        "&lt;", "&#39;", "😀", "👍🏽", "donâ€™t", "cafÃ©", "café", "naïve", "2023", "!", "!!",
        "?", "...", ",", ",,", ";", ":", "-", "--", "'", "\"", "/", "*", "(", ")", "_", "~",
        "\u{201c}", "\u{2019}", "\u{7}", "\u{a0}",
    ];

    const JOINERS: &[&str] = &["", " ", "  ", "\n", "\r\n", "\t"];

    fn noisy_text(rng: &mut StdRng) -> String {
        let len = rng.gen_range(0..16);
        let mut s = String::new();
        for _ in 0..len {
            s.push_str(FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())]);
            s.push_str(JOINERS[rng.gen_range(0..JOINERS.len())]);
        }
        s
    }

    #[test]
    fn normalize_is_idempotent() {
        let n   = normalizer();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2_000 {
            let input = noisy_text(&mut rng);
            let once  = n.normalize(&input);
            let twice = n.normalize(&once);
            assert_eq!(once, twice, "input: {input:?}");
        }
    }

    #[test]
    fn normalize_is_deterministic() {
        let a = normalizer();
        let b = normalizer();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let input = noisy_text(&mut rng);
            assert_eq!(a.normalize(&input), b.normalize(&input));
        }
    }

    #[test]
    fn output_is_single_line_lowercase_and_entity_free() {
        let n = normalizer();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1_000 {
            let input = noisy_text(&mut rng);
            let out   = n.normalize(&input);

            assert_eq!(out, out.to_lowercase(), "input: {input:?}");
            assert_eq!(out, out.trim());
            assert!(!out.contains("  "), "double space in {out:?}");
            assert!(!out.contains(['\n', '\r', '\t', '#', '@', '&', '"']), "{out:?}");
            assert!(!out.contains("://"), "{out:?}");
            assert!(!EMOJI_RE.is_match(&out), "{out:?}");
            assert!(out.is_ascii(), "{out:?}");
            if let Some(first) = out.chars().next() {
                assert!(first.is_ascii_alphanumeric(), "{out:?}");
            }
            if let Some(last) = out.chars().last() {
                assert!(last.is_ascii_alphanumeric() || "!?.".contains(last), "{out:?}");
            }
        }
    }
}
