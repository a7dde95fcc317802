//! Projection of decoded records into JSON-safe metadata

use crate::types::{FieldFilter, MetadataMap, RawValue, Record};
use serde_json::{Number, Value};

/// Builds the metadata map from decoded records
///
/// Bulk records are always dropped. With a filter, only records whose key
/// the filter contains are kept. Every surviving value is normalized with
/// [`normalize`]; on duplicate keys the last record wins.
///
/// # Example
///
/// ```
/// use dicometa_core::projection::project;
/// use dicometa_core::{FieldFilter, RawValue, Record};
/// use dicom_core::VR;
///
/// let records = vec![
///     Record::new("PatientID", VR::LO, RawValue::Text("123".to_string())),
///     Record::new("StudyDate", VR::DA, RawValue::Formatted("20230101".to_string())),
///     Record::new("PixelData", VR::OW, RawValue::Bulk { length: 1024 }),
/// ];
///
/// let all = project(&records, None);
/// assert_eq!(all.len(), 2);
///
/// let filter = FieldFilter::new(["PatientID"]);
/// let only_id = project(&records, Some(&filter));
/// assert_eq!(only_id.get("PatientID").unwrap(), "123");
/// assert!(!only_id.contains_key("StudyDate"));
/// ```
pub fn project(records: &[Record], filter: Option<&FieldFilter>) -> MetadataMap {
    let mut metadata = MetadataMap::new();

    for record in records {
        if record.bulk {
            continue;
        }
        if let Some(filter) = filter {
            if !filter.contains(&record.key) {
                continue;
            }
        }
        metadata.insert(record.key.clone(), normalize(&record.value));
    }

    metadata
}

/// Converts a raw value into a JSON-safe value
///
/// - bytes are decoded as UTF-8, replacing invalid sequences
/// - multi-valued fields become arrays of strings
/// - sequences become arrays holding the JSON text of each item
/// - scalars stay scalars; floats JSON cannot represent become strings
/// - structured values become their string rendering
pub fn normalize(value: &RawValue) -> Value {
    match value {
        RawValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        RawValue::Multi(values) => Value::Array(
            values
                .iter()
                .map(|v| Value::String(v.to_string()))
                .collect(),
        ),
        RawValue::Sequence(items) => Value::Array(
            items
                .iter()
                .map(|item| Value::String(Value::from(project(item, None)).to_string()))
                .collect(),
        ),
        RawValue::Empty => Value::Null,
        RawValue::Text(s) => Value::String(s.clone()),
        RawValue::Int(n) => Value::from(*n),
        RawValue::UInt(n) => Value::from(*n),
        RawValue::Float(n) => Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string())),
        RawValue::Formatted(_) | RawValue::Bulk { .. } => Value::String(value.to_string()),
    }
}
