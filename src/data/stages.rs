// ============================================================
// Layer 4 — Normalizer Stages
// ============================================================
// Each stage is a pure `&str → String` function. The normalizer
// chains them in this exact order:
//
//    1. lowercase_and_join_lines
//    2. repair_encoding            (data::encoding)
//    3. lexical substitution       (data::matcher)
//    4. unescape_html
//    5. strip_entities
//    6. space_punctuation
//    7. remove_disallowed
//    8. drop_degenerate_tokens
//    9. trim_edges
//   10. collapse_punctuation_runs
//   11. collapse_whitespace
//
// Stages 7 to 9 treat only ASCII letters and digits as content.
//
// Stages 8 and 10 interact (8 decides which lone marks survive,
// 10 folds what is left into separators), so they are kept as
// separate functions with their own tests.

use unicode_normalization::UnicodeNormalization;

use crate::data::rules::{
    is_allowed_char, is_allowed_punct, is_sentence_final, is_spaced_punct, EMOJI_RE, HASHTAG_RE,
    KEPT_SINGLE_TOKENS, LINE_BREAKS_RE, MENTION_RE, RUN_SEPARATOR, URL_RE,
};

// ─── Stage 1 ──────────────────────────────────────────────────────────────────
/// Lowercase, fold every run of line breaks into "; ", then strip
/// one pair of wrapping double quotes.
pub fn lowercase_and_join_lines(text: &str) -> String {
    let lowered = text.to_lowercase();
    let joined  = LINE_BREAKS_RE.replace_all(&lowered, RUN_SEPARATOR);
    strip_wrapping_quotes(&joined).to_string()
}

fn strip_wrapping_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

// ─── Stage 4 ──────────────────────────────────────────────────────────────────
/// Decode named and numeric character references.
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

// ─── Stage 5 ──────────────────────────────────────────────────────────────────
/// Delete URLs, then hashtags, then mentions, then emoji.
pub fn strip_entities(text: &str) -> String {
    let text = URL_RE.replace_all(text, "");
    let text = HASHTAG_RE.replace_all(&text, "");
    let text = MENTION_RE.replace_all(&text, "");
    EMOJI_RE.replace_all(&text, "").into_owned()
}

// ─── Stage 6 ──────────────────────────────────────────────────────────────────
/// Put whitespace on both sides of every spaced punctuation mark,
/// inserting only where it is missing.
///
/// This departs from the preceding-space-only rule: a mark that
/// already has whitespace before it still gets a space after it
/// ("a -b" → "a - b"), so every mark ends up a standalone token.
pub fn space_punctuation(text: &str) -> String {
    let mut out   = String::with_capacity(text.len() + text.len() / 4);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !is_spaced_punct(c) {
            out.push(c);
            continue;
        }
        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        out.push(c);
        if chars.peek().is_some_and(|next| !next.is_whitespace()) {
            out.push(' ');
        }
    }
    out
}

// ─── Stage 7 ──────────────────────────────────────────────────────────────────
/// Keep only ASCII letters, ASCII digits, whitespace and allowed
/// punctuation.
pub fn remove_disallowed(text: &str) -> String {
    text.chars().filter(|&c| is_allowed_char(c)).collect()
}

// ─── Stage 8 ──────────────────────────────────────────────────────────────────
/// Drop one-character tokens that are neither alphanumeric nor
/// one of `. , - ? ! ; :`. Tokens are re-joined with single spaces.
pub fn drop_degenerate_tokens(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| !is_degenerate(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_degenerate(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => !c.is_ascii_alphanumeric() && !KEPT_SINGLE_TOKENS.contains(&c),
        _ => false,
    }
}

// ─── Stage 9 ──────────────────────────────────────────────────────────────────
/// Strip the leading run of chars that are not ASCII alphanumeric
/// and the trailing run of chars that are neither ASCII alphanumeric
/// nor `! ? .`.
pub fn trim_edges(text: &str) -> String {
    text.trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
        .trim_end_matches(|c: char| !(c.is_ascii_alphanumeric() || is_sentence_final(c)))
        .to_string()
}

// ─── Stage 10 ─────────────────────────────────────────────────────────────────
/// Collapse punctuation runs into one separator. A run starts at a
/// mark and spans everything up to the next ASCII letter (digits and
/// whitespace included); it is folded only when it holds two or
/// more marks.
///
///   "great , , , fun"   → "great ; fun"
///   "wait , 2023 , ok"  → "wait ; ok"
///   "happy ! ! !"       → "happy ; "
///   "it''s"             → "it ; s"
///
/// A run that reaches the end of the text also becomes a separator;
/// the next pass of stage 9 trims it.
pub fn collapse_punctuation_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i   = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if !is_allowed_punct(c) {
            out.push(c);
            i += 1;
            continue;
        }

        let end   = run_end(&chars, i);
        let marks = chars[i..end].iter().filter(|&&d| is_allowed_punct(d)).count();
        if marks < 2 {
            out.push(c);
            i += 1;
            continue;
        }

        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        out.push_str(RUN_SEPARATOR);
        i = end;
    }
    out
}

/// Index of the first ASCII letter at or after `start`.
fn run_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| c.is_ascii_alphabetic())
        .map_or(chars.len(), |offset| start + offset)
}

// ─── Stage 11 ─────────────────────────────────────────────────────────────────
/// Single spaces, trimmed ends, lowercase, NFC.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .nfc()
        .collect()
}
