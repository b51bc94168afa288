// ============================================================
// Layer 6 — Corpus Writer
// ============================================================
// Writes the final corpus as a one-column CSV file.
//
// Output format:
//   sentence
//   "retweet : i am so happy"
//   "hello ; world"
//
// The header is written bare; every data row is quoted, UTF-8,
// and terminated with a single '\n'.
//
// Reference: csv crate documentation (WriterBuilder, QuoteStyle)

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::traits::CorpusSink;

/// Header line of the corpus file.
pub const HEADER: &str = "sentence";

/// Streams canonical sentences into a CSV writer.
pub struct CsvCorpusWriter<W: Write> {
    writer:  csv::Writer<W>,
    written: usize,
}

impl CsvCorpusWriter<BufWriter<File>> {
    /// Create (or truncate) `path`, creating parent directories as needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Cannot create output file '{}'", path.display()))?;

        tracing::debug!("Writing corpus to '{}'", path.display());
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> CsvCorpusWriter<W> {
    /// Write the header to `inner` and wrap it.
    pub fn new(mut inner: W) -> Result<Self> {
        writeln!(inner, "{HEADER}").context("Cannot write corpus header")?;

        let writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(inner);

        Ok(Self { writer, written: 0 })
    }

    /// Flush and hand back the underlying writer.
    #[cfg(test)]
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Cannot flush corpus output: {}", e.error()))
    }
}

impl<W: Write> CorpusSink for CsvCorpusWriter<W> {
    fn write_sentence(&mut self, sentence: &str) -> Result<()> {
        self.writer
            .write_record([sentence])
            .with_context(|| format!("Cannot write corpus row {}", self.written + 1))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Cannot flush corpus output")?;
        tracing::debug!("Flushed {} corpus rows", self.written);
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn render(sentences: &[&str]) -> String {
        let mut w = CsvCorpusWriter::new(Vec::new()).unwrap();
        for s in sentences {
            w.write_sentence(s).unwrap();
        }
        w.finish().unwrap();
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn header_is_bare_and_rows_quoted() {
        assert_eq!(
            render(&["hello ; world !", "i can not go"]),
            "sentence\n\"hello ; world !\"\n\"i can not go\"\n"
        );
    }

    #[test]
    fn empty_corpus_is_just_the_header() {
        assert_eq!(render(&[]), "sentence\n");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(render(&["say \"hi\""]), "sentence\n\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn create_makes_parent_directories() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut w = CsvCorpusWriter::create(&path).unwrap();
        w.write_sentence("café au lait").unwrap();
        w.finish().unwrap();
        drop(w);

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "sentence\n\"café au lait\"\n"
        );
    }
}
