use std::path::Path;

use anyhow::{Context, Result};
use compact_str::{format_compact, CompactString};
use serde_json::Value;

/// A single field value as produced by tabular decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(CompactString),
    Number(f64),
}

impl FieldValue {
    /// String form used for grouping and filtering. Integral numbers print
    /// without a fractional part so `2020` and `"2020"` normalize identically.
    pub fn normalized(&self) -> CompactString {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format_compact!("{}", *n as i64)
                } else {
                    format_compact!("{}", n)
                }
            }
        }
    }
}

/// One flat input entity. Field order follows the source columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(CompactString, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, replaces an existing field of the same name.
    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_text(self, name: &str, value: &str) -> Self {
        self.with(name, FieldValue::Text(CompactString::new(value)))
    }

    pub fn with_number(self, name: &str, value: f64) -> Self {
        self.with(name, FieldValue::Number(value))
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| k.as_str() == name) {
            slot.1 = value;
        } else {
            self.fields.push((CompactString::new(name), value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Normalized string value, `None` when the field is absent or blank.
    pub fn normalized(&self, name: &str) -> Option<CompactString> {
        self.get(name)
            .map(FieldValue::normalized)
            .filter(|s| !s.trim().is_empty())
    }

    /// Optional display fields (image URL, location, ...) read as empty strings when absent.
    pub fn text_or_empty(&self, name: &str) -> CompactString {
        self.get(name).map(FieldValue::normalized).unwrap_or_default()
    }
}

/// Parse a JSON array of flat objects (the shape a sheet-to-JSON decoder emits).
pub fn records_from_json(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text).context("record file is not valid JSON")?;
    let rows = value
        .as_array()
        .context("record file must contain a JSON array of objects")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let Some(obj) = row.as_object() else {
            tracing::warn!("Skipping row {}: not an object", i);
            continue;
        };
        let mut record = Record::new();
        for (key, v) in obj {
            match v {
                Value::Null => {}
                Value::String(s) => record.set(key, FieldValue::Text(CompactString::new(s))),
                Value::Number(n) => match n.as_f64() {
                    Some(f) => record.set(key, FieldValue::Number(f)),
                    None => record.set(key, FieldValue::Text(format_compact!("{}", n))),
                },
                Value::Bool(b) => record.set(key, FieldValue::Text(format_compact!("{}", b))),
                other => record.set(key, FieldValue::Text(format_compact!("{}", other))),
            }
        }
        records.push(record);
    }

    tracing::debug!("Decoded {} records from {} rows", records.len(), rows.len());
    Ok(records)
}

/// Read records from a JSON file on disk.
pub fn load_records_json(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records = records_from_json(&text)?;
    tracing::info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
