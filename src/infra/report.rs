// ============================================================
// Layer 6 — Run Report
// ============================================================
// Records what a corpus build did as a pretty JSON file:
//
//   {
//     "config":  { "input": "...", "text_column": "text", ... },
//     "stats":   { "rows_read": 120000, "empty": 310, ... },
//     "rules":   193,
//     "threads": 8,
//     "elapsed_ms": 5321
//   }
//
// Together with the config this is enough to reproduce a run.

use anyhow::{Context, Result};
use std::{fs, path::Path};
use serde::{Deserialize, Serialize};

use crate::application::build_use_case::BuildConfig;
use crate::data::corpus::CorpusStats;

/// Summary of one `build` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub config:     BuildConfig,
    pub stats:      CorpusStats,
    /// Substitution rules in effect (built-in plus overrides)
    pub rules:      usize,
    /// Normalizer threads used
    pub threads:    usize,
    pub elapsed_ms: u64,
}

impl BuildReport {
    /// Write the report as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write report to '{}'", path.display()))?;

        tracing::debug!("Saved run report to '{}'", path.display());
        Ok(())
    }

    /// Read a report written by [`BuildReport::save`].
    #[cfg(test)]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read report '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_survives_a_save_and_load() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");

        let report = BuildReport {
            config: BuildConfig::default(),
            stats: CorpusStats {
                rows_read:  10,
                malformed:  1,
                empty:      2,
                duplicates: 3,
                emitted:    5,
            },
            rules:      193,
            threads:    4,
            elapsed_ms: 12,
        };
        report.save(&path).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"duplicates\": 3"));
        assert_eq!(BuildReport::load(&path).unwrap(), report);
    }
}
