// ============================================================
// Layer 6 — Rule Store
// ============================================================
// Loads user substitution overrides from a JSON object and
// saves a rule table back out in the same shape:
//
//   {
//     "llm": "large language model",
//     "rt":  "repost"
//   }
//
// Overrides are merged over the built-in table by
// RuleTable::with_overrides before the matcher is compiled.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::data::rules::RuleTable;
use crate::domain::rule::SubstitutionRule;

#[derive(Debug, Error)]
pub enum RuleStoreError {
    #[error("cannot read rule file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule file '{}' is not a JSON object of strings", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rule file '{}' contains an empty pattern", .path.display())]
    EmptyPattern { path: PathBuf },

    #[error("cannot encode rule table as JSON")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write rule file '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read `{ "pattern": "replacement", ... }` from `path`.
pub fn load_overrides(path: impl AsRef<Path>) -> Result<Vec<SubstitutionRule>, RuleStoreError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| RuleStoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let map: BTreeMap<String, String> =
        serde_json::from_str(&json).map_err(|source| RuleStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if map.keys().any(|k| k.trim().is_empty()) {
        return Err(RuleStoreError::EmptyPattern { path: path.to_path_buf() });
    }

    let rules: Vec<SubstitutionRule> = map
        .into_iter()
        .map(|(pattern, replacement)| SubstitutionRule::new(pattern, replacement))
        .collect();

    tracing::info!("Loaded {} rule overrides from '{}'", rules.len(), path.display());
    Ok(rules)
}

/// The built-in table with the overrides in `path` (if any) merged on top.
pub fn load_table(path: Option<&Path>) -> Result<RuleTable, RuleStoreError> {
    let table = RuleTable::builtin();
    match path {
        Some(path) => Ok(table.with_overrides(load_overrides(path)?)),
        None => Ok(table),
    }
}

/// Render a rule table as a pretty JSON object.
pub fn to_json(table: &RuleTable) -> serde_json::Result<String> {
    let map: BTreeMap<&str, &str> = table
        .rules()
        .iter()
        .map(|r| (r.pattern.as_str(), r.replacement.as_str()))
        .collect();
    serde_json::to_string_pretty(&map)
}

/// Write a rule table to `path` as a pretty JSON object.
pub fn save_table(table: &RuleTable, path: impl AsRef<Path>) -> Result<(), RuleStoreError> {
    let path = path.as_ref();
    let json = to_json(table).map_err(|source| RuleStoreError::Encode { source })?;
    fs::write(path, json).map_err(|source| RuleStoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Saved {} rules to '{}'", table.len(), path.display());
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_lowercases_patterns() {
        let file  = write_json(r#"{ "LLM": "large language model", "rt": "repost" }"#);
        let rules = load_overrides(file.path()).unwrap();
        assert_eq!(
            rules,
            vec![
                SubstitutionRule::new("llm", "large language model"),
                SubstitutionRule::new("rt", "repost"),
            ]
        );
    }

    #[test]
    fn merged_table_prefers_overrides() {
        let file  = write_json(r#"{ "rt": "repost" }"#);
        let table = load_table(Some(file.path())).unwrap();
        let rt    = table.rules().iter().find(|r| r.pattern == "rt").unwrap();
        assert_eq!(rt.replacement, "repost");
        assert_eq!(table.len(), RuleTable::builtin().len());
    }

    #[test]
    fn rejects_non_object_json() {
        let file = write_json(r#"["rt", "repost"]"#);
        assert!(matches!(
            load_overrides(file.path()),
            Err(RuleStoreError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_empty_pattern() {
        let file = write_json(r#"{ " ": "space" }"#);
        assert!(matches!(
            load_overrides(file.path()),
            Err(RuleStoreError::EmptyPattern { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            load_overrides("/no/such/rules.json"),
            Err(RuleStoreError::Read { .. })
        ));
    }

    #[test]
    fn saved_table_loads_back() {
        let dir   = tempfile::tempdir().unwrap();
        let path  = dir.path().join("rules.json");
        let table = RuleTable::builtin();

        save_table(&table, &path).unwrap();
        let reloaded = RuleTable::from_rules(load_overrides(&path).unwrap());
        assert_eq!(reloaded.len(), table.len());
    }
}
