// ============================================================
// Layer 2 — BuildUseCase
// ============================================================
// Orchestrates a full corpus build in order:
//
//   Step 1: Load substitution rules       (Layer 6 - infra)
//   Step 2: Compile the normalizer        (Layer 4 - data)
//   Step 3: Open the input CSV            (Layer 4 - data)
//   Step 4: Create the output CSV         (Layer 6 - infra)
//   Step 5: Normalize + deduplicate       (Layer 4 - data)
//   Step 6: Write the run report          (Layer 6 - infra)
//
// Step 3 runs before step 4 so that a missing text column
// fails the run without touching the output file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Instant};

use crate::data::{
    batcher::ParallelCanonicalizer,
    corpus::{CorpusBuilder, CorpusStats, CorpusStream},
    loader::{CsvRecordSource, TextEncoding},
    normalizer::Normalizer,
};
use crate::domain::record::CanonicalRecord;
use crate::domain::traits::{CorpusSink, RecordSource};
use crate::infra::{
    corpus_writer::CsvCorpusWriter,
    report::BuildReport,
    rules_store,
};

/// Rows between progress messages.
const PROGRESS_EVERY: usize = 100_000;

// ─── Build Configuration ─────────────────────────────────────────────────────
// Everything a build needs. Serialisable so it can be embedded
// in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub input:       String,
    pub output:      String,
    pub text_column: String,
    pub encoding:    TextEncoding,
    /// Normalizer threads; 1 = sequential, 0 = one per core
    pub jobs:        usize,
    /// Records per parallel batch
    pub batch_size:  usize,
    /// Optional JSON object of substitution overrides
    pub rules:       Option<String>,
    /// Optional path for the JSON run report
    pub report:      Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input:       "shared_data/merged_tweets.csv".to_string(),
            output:      "shared_data/cleaned_tweets.csv".to_string(),
            text_column: "text".to_string(),
            encoding:    TextEncoding::Auto,
            jobs:        1,
            batch_size:  4096,
            rules:       None,
            report:      None,
        }
    }
}

// ─── BuildUseCase ─────────────────────────────────────────────────────────────
pub struct BuildUseCase {
    config: BuildConfig,
}

impl BuildUseCase {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run the build end to end and return the corpus counters.
    pub fn execute(&self) -> Result<CorpusStats> {
        let cfg     = &self.config;
        let started = Instant::now();

        // ── Step 1: Rule table ────────────────────────────────────────────────
        let table = rules_store::load_table(cfg.rules.as_deref().map(Path::new))
            .context("Cannot load substitution rules")?;

        // ── Step 2: Normalizer ────────────────────────────────────────────────
        let normalizer = Normalizer::new(&table).context("Cannot compile substitution rules")?;
        tracing::info!("Compiled {} substitution rules", table.len());

        // ── Step 3: Input ─────────────────────────────────────────────────────
        tracing::info!("Reading column '{}' from '{}'", cfg.text_column, cfg.input);
        let mut source = CsvRecordSource::open(&cfg.input, &cfg.text_column, cfg.encoding)?;

        // ── Step 4: Output ────────────────────────────────────────────────────
        let mut sink = CsvCorpusWriter::create(&cfg.output)?;

        // ── Step 5: Normalize and deduplicate ─────────────────────────────────
        let (mut stats, threads) = if cfg.jobs == 1 {
            let records = source.by_ref().map(|record| normalizer.canonicalize(&record));
            (write_corpus(CorpusBuilder::new().dedup(records), &mut sink)?, 1)
        } else {
            let parallel = ParallelCanonicalizer::new(&normalizer, cfg.jobs, cfg.batch_size)
                .context("Cannot start normalizer thread pool")?;
            let records  = parallel.canonicalize_all(source.by_ref());
            (write_corpus(CorpusBuilder::new().dedup(records), &mut sink)?, parallel.threads())
        };
        stats.malformed = source.skipped_rows();

        tracing::info!(
            "Corpus built: {} rows read, {} malformed, {} empty, {} duplicates",
            stats.rows_read,
            stats.malformed,
            stats.empty,
            stats.duplicates
        );
        tracing::info!("Wrote {} sentences to '{}'", stats.emitted, cfg.output);

        // ── Step 6: Report ────────────────────────────────────────────────────
        if let Some(path) = &cfg.report {
            let report = BuildReport {
                config:     cfg.clone(),
                stats,
                rules:      table.len(),
                threads,
                elapsed_ms: started.elapsed().as_millis() as u64,
            };
            report.save(path)?;
            tracing::info!("Run report saved to '{}'", path);
        }

        Ok(stats)
    }
}

/// Drain a corpus stream into `sink` and return its counters.
fn write_corpus<I, S>(mut stream: CorpusStream<I>, sink: &mut S) -> Result<CorpusStats>
where
    I: Iterator<Item = CanonicalRecord>,
    S: CorpusSink,
{
    let mut next_progress = PROGRESS_EVERY;
    while let Some(record) = stream.next() {
        sink.write_sentence(&record.sentence)?;

        let rows = stream.stats().rows_read;
        if rows >= next_progress {
            tracing::info!("Processed {} rows ({} kept)", rows, stream.stats().emitted);
            next_progress = rows + PROGRESS_EVERY;
        }
    }
    sink.finish()?;
    Ok(stream.into_stats())
}
