// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that name the core concepts
// of the corpus builder:
//
//   RawRecord        — one input text blob, possibly missing
//   CanonicalRecord  — the normalized sentence for that row
//   SubstitutionRule — one (pattern → replacement) pair
//
// Rules for this layer:
//   - NO regex, automaton or CSV types here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// Input and output records
pub mod record;

// Lexical substitution rules
pub mod rule;

// Source / sink abstractions implemented by the data and infra layers
pub mod traits;
