// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (building a corpus or normalizing some text).
//
// Rules for this layer:
//   - No text-processing logic here (that's Layer 4)
//   - No argument parsing or printing here (that's Layer 1)
//   - No direct file-format handling (that's Layer 4 and 6)
//   - Only workflow coordination

// CSV in, deduplicated corpus CSV out
pub mod build_use_case;

// Ad-hoc normalization of a string or a stream of lines
pub mod normalize_use_case;

// Export of the effective substitution table
pub mod rules_use_case;
