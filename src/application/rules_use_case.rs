// ============================================================
// Layer 2 — RulesUseCase
// ============================================================
// Exports the substitution table that a build would use (the
// built-in table with any overrides merged in) as JSON, so the
// effective rules can be reviewed or used as a starting point
// for an override file.

use anyhow::{Context, Result};
use std::path::Path;

use crate::data::rules::RuleTable;
use crate::infra::rules_store;

pub struct RulesUseCase {
    table: RuleTable,
}

impl RulesUseCase {
    pub fn new(overrides: Option<&str>) -> Result<Self> {
        let table = rules_store::load_table(overrides.map(Path::new))
            .context("Cannot load substitution rules")?;
        Ok(Self { table })
    }

    pub fn rule_count(&self) -> usize {
        self.table.len()
    }

    /// The effective table as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        rules_store::to_json(&self.table).context("Cannot encode rule table")
    }

    /// Write the effective table to `path`.
    pub fn save(&self, path: &str) -> Result<()> {
        rules_store::save_table(&self.table, path)?;
        tracing::info!("Saved {} rules to '{}'", self.table.len(), path);
        Ok(())
    }
}
