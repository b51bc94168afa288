// ============================================================
// Layer 4 — Corpus Builder
// ============================================================
// Final step of the pipeline: drop empty sentences and keep only
// the first occurrence of every distinct sentence.
//
//   rows:    "Hi!"  ""  "HI !"  "Bye"  "hi!!"
//   canon:   "hi !" ""  "hi !"  "bye"  "hi"
//   corpus:  "hi !" "bye"  "hi"
//
// Order is first-seen order. Duplicates are exact string matches
// on the canonical form, so every later copy is dropped no matter
// which raw spelling it came from.
//
// The builder is a streaming filter. Memory grows with the number
// of distinct sentences, not with the size of the input.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::normalizer::Normalizer;
use crate::domain::record::{CanonicalRecord, RawRecord};

// ─── CorpusStats ──────────────────────────────────────────────────────────────
/// Counters collected while building a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Records seen by the builder (parsed rows)
    pub rows_read: usize,

    /// Rows the source could not parse and skipped
    pub malformed: usize,

    /// Records whose canonical form was empty
    pub empty: usize,

    /// Records dropped as repeats of an earlier sentence
    pub duplicates: usize,

    /// Sentences written to the corpus
    pub emitted: usize,
}

// ─── CorpusBuilder ────────────────────────────────────────────────────────────
/// Empty-filter and first-seen deduplicator.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    seen:  HashSet<String>,
    stats: CorpusStats,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one canonical record. Returns it back when it is
    /// non-empty and its sentence has not been seen before.
    pub fn admit(&mut self, record: CanonicalRecord) -> Option<CanonicalRecord> {
        self.stats.rows_read += 1;

        if record.is_empty() {
            self.stats.empty += 1;
            tracing::trace!("Row {} is empty after normalization", record.row);
            return None;
        }
        if self.seen.contains(&record.sentence) {
            self.stats.duplicates += 1;
            return None;
        }

        self.seen.insert(record.sentence.clone());
        self.stats.emitted += 1;
        Some(record)
    }

    /// Lazily filter a stream of canonical records.
    pub fn dedup<I>(self, records: I) -> CorpusStream<I::IntoIter>
    where
        I: IntoIterator<Item = CanonicalRecord>,
    {
        CorpusStream {
            inner:   records.into_iter(),
            builder: self,
        }
    }

    /// Normalize and deduplicate a whole record stream in one go.
    pub fn build<I>(normalizer: &Normalizer, records: I) -> Corpus
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut stream = Self::new().dedup(
            records
                .into_iter()
                .map(|record| normalizer.canonicalize(&record)),
        );
        let sentences: Vec<String> = stream.by_ref().map(|c| c.sentence).collect();

        Corpus {
            sentences,
            stats: stream.into_stats(),
        }
    }

    pub fn stats(&self) -> CorpusStats {
        self.stats
    }
}

// ─── CorpusStream ─────────────────────────────────────────────────────────────
/// Iterator adapter returned by [`CorpusBuilder::dedup`].
#[derive(Debug)]
pub struct CorpusStream<I> {
    inner:   I,
    builder: CorpusBuilder,
}

impl<I> CorpusStream<I> {
    /// Counters so far.
    pub fn stats(&self) -> CorpusStats {
        self.builder.stats()
    }

    /// Consume the stream and return the final counters.
    pub fn into_stats(self) -> CorpusStats {
        self.builder.stats()
    }
}

impl<I> Iterator for CorpusStream<I>
where
    I: Iterator<Item = CanonicalRecord>,
{
    type Item = CanonicalRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.inner.by_ref() {
            if let Some(kept) = self.builder.admit(record) {
                return Some(kept);
            }
        }
        None
    }
}

// ─── Corpus ───────────────────────────────────────────────────────────────────
/// An in-memory corpus: unique, non-empty sentences in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    pub sentences: Vec<String>,
    pub stats:     CorpusStats,
}
