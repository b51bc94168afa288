// ============================================================
// Layer 4 — Parallel Batcher
// ============================================================
// Normalization is a pure per-record function, so records can be
// canonicalized on many threads at once. Deduplication is not:
// "first seen" depends on input order. The work is split like so:
//
//   RecordSource ──► Batches (N records each)
//                       │
//                       ▼  rayon par_iter, order-preserving collect
//                 Vec<CanonicalRecord>
//                       │
//                       ▼  sequential
//                 CorpusBuilder::dedup
//
// Only one batch is in flight at a time, so memory stays bounded
// by `batch_size` records regardless of input size. The output is
// identical to a single-threaded run.
//
// Reference: rayon crate documentation (ThreadPoolBuilder, par_iter)

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

use crate::data::normalizer::Normalizer;
use crate::domain::record::{CanonicalRecord, RawRecord};

// ─── Batches ──────────────────────────────────────────────────────────────────
/// Groups an iterator into `Vec`s of at most `size` items.
#[derive(Debug)]
pub struct Batches<I> {
    inner: I,
    size:  usize,
}

impl<I: Iterator> Batches<I> {
    pub fn new(inner: I, size: usize) -> Self {
        Self { inner, size: size.max(1) }
    }
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.inner.by_ref().take(self.size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

// ─── ParallelCanonicalizer ────────────────────────────────────────────────────
/// Canonicalizes batches of records on a dedicated thread pool.
pub struct ParallelCanonicalizer<'n> {
    normalizer: &'n Normalizer,
    pool:       ThreadPool,
    batch_size: usize,
}

impl<'n> ParallelCanonicalizer<'n> {
    /// Build a pool with `jobs` worker threads (0 lets rayon decide).
    pub fn new(
        normalizer: &'n Normalizer,
        jobs: usize,
        batch_size: usize,
    ) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("normalize-{i}"))
            .build()?;

        tracing::debug!(
            "Parallel canonicalizer: {} threads, batch size {}",
            pool.current_num_threads(),
            batch_size.max(1)
        );

        Ok(Self {
            normalizer,
            pool,
            batch_size: batch_size.max(1),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Canonicalize one batch; output order matches input order.
    pub fn canonicalize_batch(&self, batch: &[RawRecord]) -> Vec<CanonicalRecord> {
        let normalizer = self.normalizer;
        self.pool.install(|| {
            batch
                .par_iter()
                .map(|record| normalizer.canonicalize(record))
                .collect()
        })
    }

    /// Lazily canonicalize a whole record stream, one batch at a time.
    pub fn canonicalize_all<I>(&self, records: I) -> CanonicalStream<'_, 'n, I::IntoIter>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        CanonicalStream {
            canonicalizer: self,
            batches:       Batches::new(records.into_iter(), self.batch_size),
            current:       Vec::new().into_iter(),
        }
    }
}

// ─── CanonicalStream ──────────────────────────────────────────────────────────
/// Iterator returned by [`ParallelCanonicalizer::canonicalize_all`].
pub struct CanonicalStream<'p, 'n, I> {
    canonicalizer: &'p ParallelCanonicalizer<'n>,
    batches:       Batches<I>,
    current:       std::vec::IntoIter<CanonicalRecord>,
}

impl<'p, 'n, I> Iterator for CanonicalStream<'p, 'n, I>
where
    I: Iterator<Item = RawRecord>,
{
    type Item = CanonicalRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(record);
            }
            let batch    = self.batches.next()?;
            self.current = self.canonicalizer.canonicalize_batch(&batch).into_iter();
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::corpus::CorpusBuilder;

    #[test]
    fn batches_split_and_keep_remainder() {
        let sizes: Vec<usize> = Batches::new(0..10, 4).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(Batches::new(0..3, 0).count(), 3);
        assert_eq!(Batches::new(std::iter::empty::<u8>(), 4).count(), 0);
    }

    #[test]
    fn parallel_output_matches_sequential() {
        let normalizer = Normalizer::builtin().unwrap();
        let inputs = [
            "RT @a: I'm happy!!!",
            "i am happy",
            "Hello,,,world!!",
            "",
            "hello ; world",
            "I can't go",
            "gonna win #ai",
            "i can not go",
            "😀😀",
            "Tom &amp; Jerry",
        ];
        let records: Vec<RawRecord> = inputs
            .iter()
            .cycle()
            .take(97)
            .enumerate()
            .map(|(i, t)| RawRecord::with_text(i + 1, *t))
            .collect();

        let sequential: Vec<CanonicalRecord> = CorpusBuilder::new()
            .dedup(records.iter().map(|r| normalizer.canonicalize(r)))
            .collect();

        let parallel = ParallelCanonicalizer::new(&normalizer, 4, 7).unwrap();
        let from_pool: Vec<CanonicalRecord> = CorpusBuilder::new()
            .dedup(parallel.canonicalize_all(records.clone()))
            .collect();

        assert_eq!(sequential, from_pool);
        assert_eq!(
            from_pool.iter().map(|c| c.sentence.as_str()).collect::<Vec<_>>(),
            vec![
                "retweet : i am happy",
                "i am happy",
                "hello ; world",
                "i can not go",
                "going to win",
                "tom and jerry",
            ]
        );
    }

    #[test]
    fn batch_preserves_order() {
        let normalizer = Normalizer::builtin().unwrap();
        let parallel   = ParallelCanonicalizer::new(&normalizer, 3, 2).unwrap();
        let batch: Vec<RawRecord> = (1..=50)
            .map(|i| RawRecord::with_text(i, format!("Item {i}")))
            .collect();
        let rows: Vec<usize> = parallel.canonicalize_batch(&batch).iter().map(|c| c.row).collect();
        assert_eq!(rows, (1..=50).collect::<Vec<_>>());
    }
}
