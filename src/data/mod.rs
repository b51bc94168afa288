// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw CSV bytes to the
// deduplicated corpus of canonical sentences.
//
// The pipeline flows in this order:
//
//   CSV file / stdin
//       │
//       ▼
//   CsvRecordSource   → reads rows, decodes the text column
//       │
//       ▼
//   Normalizer        → 11 canonicalization stages
//       │               (rules + matcher + encoding + stages)
//       ▼
//   ParallelCanonicalizer (optional) → same, on a rayon pool
//       │
//       ▼
//   CorpusBuilder     → drops empties, keeps first occurrences
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.

/// Reads RawRecords from CSV files and line-oriented readers
pub mod loader;

/// Static substitution table, character classes and entity patterns
pub mod rules;

/// Longest-match, whole-word substitution over the rule table
pub mod matcher;

/// Mojibake repair, quote uncurling and Unicode cleanup
pub mod encoding;

/// The individual normalizer stages
pub mod stages;

/// Runs the stages to a canonical sentence
pub mod normalizer;

/// Empty filter and first-seen deduplication
pub mod corpus;

/// Order-preserving parallel normalization in bounded batches
pub mod batcher;
