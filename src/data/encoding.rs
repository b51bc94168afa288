// ============================================================
// Layer 4 — Encoding Repair
// ============================================================
// Undoes the damage done when UTF-8 bytes were decoded as
// Latin-1 / Windows-1252 ("mojibake"), then tidies the result:
//
//   "donâ€™t"   → "don’t"  → "don't"
//   "cafã©"     → "café"
//   "ðÿ˜€"      → "😀"
//
// Steps (applied in order):
//   1. Mojibake repair — map each char back to the single byte
//      it was decoded from and re-decode maximal multi-byte
//      UTF-8 sequences
//   2. Uncurl typographic quotes to ASCII ' and "
//   3. Unicode NFC
//   4. Drop control characters other than whitespace
//
// The text has already been lowercased when this runs, so a
// sequence lead like 'Ã' arrives as 'ã'. Every char is therefore
// tried both as itself and as its single-char uppercase form.
//
// A sequence is only rewritten when at least one of its trailing
// chars is not alphanumeric. Real mojibake almost always has a
// symbol or control char in the tail ('©', '€', '™', '\u{9d}');
// two adjacent accented letters are left alone, which also keeps
// already-clean text unchanged by a second repair.

use std::collections::HashMap;

use encoding_rs::WINDOWS_1252;
use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;

/// char → the byte it decodes from under Windows-1252 or Latin-1.
static BYTE_OF: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(160);
    for byte in 0x80u8..=0xFF {
        let bytes        = [byte];
        let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
        if let Some(c) = decoded.chars().next() {
            map.insert(c, byte);
        }
        // Latin-1 reading of the same byte (C1 controls for 0x80..0x9F)
        map.entry(char::from(byte)).or_insert(byte);
    }
    map
});

/// Full encoding-repair stage.
pub fn repair_encoding(text: &str) -> String {
    let repaired = repair_mojibake(text);
    let uncurled = uncurl_quotes(&repaired);
    uncurled
        .nfc()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect()
}

/// Re-decode mis-decoded UTF-8 sequences. Text without any
/// Latin-1-range characters is returned unchanged.
pub fn repair_mojibake(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i   = 0usize;

    while i < chars.len() {
        match decode_sequence(&chars[i..]) {
            Some((repaired, consumed)) => {
                out.extend(repaired.to_lowercase());
                i += consumed;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

/// Replace typographic single/double quotes with ASCII ones.
pub fn uncurl_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{02BC}'
            | '\u{FF07}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{FF02}' => '"',
            c => c,
        })
        .collect()
}

/// Try to decode one mis-decoded UTF-8 sequence at the start of
/// `chars`. Returns the repaired char and how many chars it replaces.
fn decode_sequence(chars: &[char]) -> Option<(char, usize)> {
    byte_candidates(chars[0])
        .into_iter()
        .flatten()
        .find_map(|lead| decode_with_lead(lead, chars))
}

fn decode_with_lead(lead: u8, chars: &[char]) -> Option<(char, usize)> {
    let width = utf8_width(lead)?;
    if chars.len() < width {
        return None;
    }

    let mut bytes    = Vec::with_capacity(width);
    let mut symbolic = false;
    bytes.push(lead);

    for &c in &chars[1..width] {
        let byte = byte_candidates(c)
            .into_iter()
            .flatten()
            .find(|b| (0x80..=0xBF).contains(b))?;
        symbolic |= !c.is_alphanumeric();
        bytes.push(byte);
    }

    if !symbolic {
        return None;
    }

    let decoded = std::str::from_utf8(&bytes).ok()?;
    decoded.chars().next().map(|c| (c, width))
}

/// The byte `c` decodes from, and the byte its uppercase form decodes from.
fn byte_candidates(c: char) -> [Option<u8>; 2] {
    let own = BYTE_OF.get(&c).copied();

    let mut upper = c.to_uppercase();
    let upper = match (upper.next(), upper.next()) {
        (Some(u), None) if u != c => BYTE_OF.get(&u).copied(),
        _ => None,
    };

    [own, upper]
}

/// Length of the UTF-8 sequence introduced by a lead byte.
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Produce mojibake the way a Windows-1252 reader would.
    fn garble(s: &str) -> String {
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(s.as_bytes());
        text.into_owned()
    }

    #[test]
    fn byte_table_covers_every_high_byte() {
        assert_eq!(BYTE_OF.get(&'\u{20ac}'), Some(&0x80));
        assert_eq!(BYTE_OF.get(&'\u{80}'), Some(&0x80));
        assert_eq!(BYTE_OF.get(&'\u{9d}'), Some(&0x9d));
        assert_eq!(BYTE_OF.get(&'\u{e9}'), Some(&0xe9));
        for byte in 0x80u8..=0xFF {
            assert!(BYTE_OF.values().any(|&b| b == byte), "byte {byte:#x} unmapped");
        }
    }

    #[test]
    fn repairs_curly_apostrophe() {
        let broken = garble("don\u{2019}t");
        assert_eq!(broken, "don\u{e2}\u{20ac}\u{2122}t");
        assert_eq!(repair_encoding(&broken), "don't");
    }

    #[test]
    fn repairs_after_lowercasing() {
        let broken = garble("café").to_lowercase();
        assert_eq!(repair_mojibake(&broken), "café");
    }

    #[test]
    fn repairs_latin1_decoded_c1_bytes() {
        // U+201D read as Latin-1 leaves a C1 control in the tail
        let broken = "\u{e2}\u{80}\u{9d}";
        assert_eq!(repair_mojibake(broken), "\u{201d}");
        assert_eq!(repair_encoding(broken), "\"");
    }

    #[test]
    fn repairs_four_byte_emoji() {
        let broken = garble("😀").to_lowercase();
        assert_eq!(repair_mojibake(&broken), "😀");
    }

    #[test]
    fn leaves_clean_text_alone() {
        for s in ["plain ascii", "café crème", "naïve façade", "日本語", "ñandú"] {
            assert_eq!(repair_encoding(s), s);
        }
    }

    #[test]
    fn leaves_letter_pairs_alone() {
        // 'ã' + 'ª' would decode to 'ê' but has no symbolic tail
        assert_eq!(repair_mojibake("ãª"), "ãª");
    }

    #[test]
    fn composes_and_strips_controls() {
        assert_eq!(repair_encoding("e\u{301}\u{7}x"), "éx");
        assert_eq!(repair_encoding("a\tb"), "a\tb");
    }
}
