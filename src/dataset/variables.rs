//! Attribute (variable) payload parsing.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One row of the integrated-data API response. Values arrive as
/// decimal-comma strings.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableEntry {
    #[serde(rename = "UG")]
    pub ug: String,
    #[serde(rename = "V")]
    pub value: String,
}

/// Attribute values keyed by weighting area.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    values: HashMap<String, f64>,
}

impl AttributeTable {
    /// Parse a raw variable payload (JSON map of row id to entry) into
    /// UG-keyed floating-point values.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let raw: HashMap<String, VariableEntry> =
            serde_json::from_str(payload).context("Failed to parse variable payload")?;

        let mut values = HashMap::with_capacity(raw.len());
        for entry in raw.into_values() {
            let value = parse_decimal_comma(&entry.value)
                .with_context(|| format!("Bad value for UG {}", entry.ug))?;
            values.insert(entry.ug, value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, ug: &str) -> Option<f64> {
        self.values.get(ug).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs<I: IntoIterator<Item = (String, f64)>>(pairs: I) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }
}

/// Parse a decimal-comma formatted number, e.g. `"1234,56"` → `1234.56`.
fn parse_decimal_comma(s: &str) -> Result<f64> {
    s.replace(',', ".")
        .parse()
        .with_context(|| format!("not a decimal-comma number: `{s}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal_comma("1234,56").unwrap(), 1234.56);
        assert_eq!(parse_decimal_comma("0,5").unwrap(), 0.5);
        assert_eq!(parse_decimal_comma("42").unwrap(), 42.0);
        assert!(parse_decimal_comma("n/a").is_err());
    }

    #[test]
    fn test_from_payload() {
        let payload = r#"{
            "1": {"UG": "3550308001", "V": "1234,56"},
            "2": {"UG": "3550308002", "V": "987,1"}
        }"#;
        let table = AttributeTable::from_payload(payload).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("3550308001"), Some(1234.56));
        assert_eq!(table.get("3550308002"), Some(987.1));
        assert_eq!(table.get("missing"), None);
    }
}
