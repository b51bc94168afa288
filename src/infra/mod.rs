// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the file formats that sit at the edges of a run:
//
//   corpus_writer.rs — Corpus output
//                      Writes the deduplicated sentences as a
//                      one-column `sentence` CSV.
//
//   rules_store.rs   — Substitution overrides
//                      Loads a JSON object of extra or replacement
//                      rules and merges it over the built-in table.
//                      Can also export the effective table.
//
//   report.rs        — Run report
//                      Saves the build config and corpus counters
//                      as JSON after each run.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// CSV corpus writer
pub mod corpus_writer;

/// JSON rule override loading and saving
pub mod rules_store;

/// JSON run report
pub mod report;
