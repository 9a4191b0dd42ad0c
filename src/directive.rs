//! Mapping from directive characters to vCard property names.
//!
//! The default table knows `%e` (EMAIL), `%n` (FN) and `%p` (TEL). More
//! entries can be added with `K=FIELD` definitions before a run starts.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, VcfError};

/// Directive character to property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveTable {
    fields: BTreeMap<char, String>,
}

impl Default for DirectiveTable {
    fn default() -> Self {
        let fields = [('e', "EMAIL"), ('n', "FN"), ('p', "TEL")]
            .into_iter()
            .map(|(k, f)| (k, f.to_string()))
            .collect();
        Self { fields }
    }
}

impl DirectiveTable {
    /// A table with the default `e`, `n` and `p` entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the property name for a directive character.
    pub fn resolve(&self, key: char) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }

    /// Add or replace a single entry.
    pub fn insert(&mut self, key: char, field: impl Into<String>) {
        self.fields.insert(key, field.into());
    }

    /// Apply a comma-separated list of `K=FIELD` definitions.
    ///
    /// Entries are applied in order, so a later entry for the same key wins.
    /// Nothing is applied if any entry is malformed.
    pub fn define(&mut self, definitions: &str) -> Result<()> {
        let parsed = definitions
            .split(',')
            .map(parse_definition)
            .collect::<Result<Vec<_>>>()?;
        for (key, field) in parsed {
            self.insert(key, field);
        }
        Ok(())
    }
}

impl fmt::Display for DirectiveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{}", entries.join(","))
    }
}

/// Parse one `K=FIELD` entry.
fn parse_definition(entry: &str) -> Result<(char, String)> {
    let malformed = || VcfError::MalformedDirectiveEntry(entry.to_string());

    let parts: Vec<&str> = entry.split('=').collect();
    if parts.len() != 2 || parts[1].is_empty() {
        return Err(malformed());
    }

    let mut key_chars = parts[0].chars();
    match (key_chars.next(), key_chars.next()) {
        (Some(key), None) => Ok((key, parts[1].to_string())),
        _ => Err(malformed()),
    }
}
