use serde_json::{Map, Value};

/// Projected metadata of one DICOM object
///
/// Keys keep decode order. Values are JSON-safe: strings, numbers, null, or
/// arrays of strings. The map has no public mutators; it is built by the
/// projector and handed out as-is.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct MetadataMap(Map<String, Value>);

impl MetadataMap {
    pub(crate) fn new() -> Self {
        Self(Map::new())
    }

    /// Inserts a value, replacing any previous value for the key
    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }

    /// Returns the value stored for `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in decode order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Entries in decode order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the map, returning the underlying JSON object
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<MetadataMap> for Value {
    fn from(metadata: MetadataMap) -> Self {
        Value::Object(metadata.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_as_flat_object_in_insertion_order() {
        let mut metadata = MetadataMap::new();
        metadata.insert("StudyDate".to_string(), json!("20230101"));
        metadata.insert("Modality".to_string(), json!("CT"));
        metadata.insert("ImageType".to_string(), json!(["ORIGINAL", "PRIMARY"]));

        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(
            json,
            r#"{"StudyDate":"20230101","Modality":"CT","ImageType":["ORIGINAL","PRIMARY"]}"#
        );
    }

    #[test]
    fn test_last_write_wins() {
        let mut metadata = MetadataMap::new();
        metadata.insert("PatientID".to_string(), json!("1"));
        metadata.insert("PatientID".to_string(), json!("2"));

        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("PatientID"), Some(&json!("2")));
    }

    #[test]
    fn test_into_value() {
        let mut metadata = MetadataMap::new();
        metadata.insert("Rows".to_string(), json!(512));

        assert_eq!(Value::from(metadata), json!({"Rows": 512}));
    }
}
