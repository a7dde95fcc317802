use crate::types::MetadataMap;
use serde_json::Value;
use std::fmt;

/// Text report formatter for extracted metadata
pub struct TextReport<'a> {
    metadata: &'a MetadataMap,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(metadata: &'a MetadataMap) -> Self {
        Self { metadata }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DICOM Metadata")?;
        writeln!(f, "==============")?;
        writeln!(f)?;

        if self.metadata.is_empty() {
            writeln!(f, "(no fields)")?;
            return Ok(());
        }

        let width = self.metadata.keys().map(|k| k.len()).max().unwrap_or(0) + 1;
        for (key, value) in self.metadata.iter() {
            writeln!(
                f,
                "{:<width$} {}",
                format!("{}:", key),
                display_value(value),
                width = width
            )?;
        }
        Ok(())
    }
}

/// Plain rendering: strings unquoted, arrays joined
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "(empty)".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Text listing of field keywords, one per line
pub struct FieldList<'a> {
    fields: &'a [&'a str],
}

impl<'a> FieldList<'a> {
    pub fn new(fields: &'a [&'a str]) -> Self {
        Self { fields }
    }
}

impl<'a> fmt::Display for FieldList<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self.fields {
            writeln!(f, "{}", field)?;
        }
        Ok(())
    }
}
