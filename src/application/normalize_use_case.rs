// ============================================================
// Layer 2 — NormalizeUseCase
// ============================================================
// Canonicalizes ad-hoc text without building a corpus: a single
// string from the command line, or every line of a reader.
// Output is one canonical line per input line, empty lines
// included, so the result can be pasted next to the input.
// With `--unique` the lines are instead folded into a corpus:
// empties dropped, first occurrence of each sentence kept.

use anyhow::{Context, Result};
use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::data::{
    corpus::{CorpusBuilder, CorpusStats},
    loader::{LineSource, TextEncoding},
    normalizer::Normalizer,
};
use crate::infra::rules_store;

pub struct NormalizeUseCase {
    normalizer: Normalizer,
}

impl NormalizeUseCase {
    /// Build the normalizer, with optional rule overrides.
    pub fn new(rules: Option<&str>) -> Result<Self> {
        let table = rules_store::load_table(rules.map(Path::new))
            .context("Cannot load substitution rules")?;
        let normalizer = Normalizer::new(&table).context("Cannot compile substitution rules")?;
        Ok(Self { normalizer })
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Normalize every line of `input` into `output`. Returns the line count.
    pub fn normalize_lines<R, W>(&self, input: R, mut output: W, encoding: TextEncoding) -> Result<usize>
    where
        R: BufRead,
        W: Write,
    {
        let mut lines = 0usize;
        for record in LineSource::new(input, encoding) {
            writeln!(output, "{}", self.normalizer.normalize_record(&record))
                .context("Cannot write normalized line")?;
            lines += 1;
        }
        output.flush()?;

        tracing::debug!("Normalized {} lines", lines);
        Ok(lines)
    }

    /// Normalize every line of `input` and write only the unique,
    /// non-empty sentences, in first-seen order.
    pub fn unique_lines<R, W>(&self, input: R, mut output: W, encoding: TextEncoding) -> Result<CorpusStats>
    where
        R: BufRead,
        W: Write,
    {
        let corpus = CorpusBuilder::build(&self.normalizer, LineSource::new(input, encoding));
        for sentence in &corpus.sentences {
            writeln!(output, "{}", sentence).context("Cannot write normalized line")?;
        }
        output.flush()?;

        tracing::debug!(
            "Kept {} of {} lines ({} empty, {} duplicates)",
            corpus.stats.emitted, corpus.stats.rows_read, corpus.stats.empty, corpus.stats.duplicates
        );
        Ok(corpus.stats)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn normalizes_single_text() {
        let uc = NormalizeUseCase::new(None).unwrap();
        assert_eq!(uc.normalize("I can't go"), "i can not go");
    }

    #[test]
    fn one_output_line_per_input_line() {
        let uc    = NormalizeUseCase::new(None).unwrap();
        let input = Cursor::new("Hello,,,world!!\n\n@only #tags\nGonna WIN\n");
        let mut out = Vec::new();

        let n = uc.normalize_lines(input, &mut out, TextEncoding::Auto).unwrap();
        assert_eq!(n, 4);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "hello ; world\n\n\ngoing to win\n"
        );
    }

    #[test]
    fn unique_lines_drop_empties_and_repeats() {
        let uc    = NormalizeUseCase::new(None).unwrap();
        let input = Cursor::new("Gonna WIN\n\n@only\ngoing to win\nHi!\n");
        let mut out = Vec::new();

        let stats = uc.unique_lines(input, &mut out, TextEncoding::Auto).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "going to win\nhi !\n");
        assert_eq!(stats.rows_read, 5);
        assert_eq!(stats.empty, 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.emitted, 2);
    }

    #[test]
    fn missing_rule_file_is_reported() {
        let err = NormalizeUseCase::new(Some("/no/such/rules.json")).err().unwrap();
        assert!(format!("{err:#}").contains("Cannot load substitution rules"));
    }
}
