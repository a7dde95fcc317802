use std::collections::HashSet;

/// Allow-list of metadata keys requested by a caller
///
/// Keeps the caller's order with duplicates collapsed. A filter that is
/// present but empty selects nothing; "no filter" is expressed with `None`
/// at the call site.
///
/// # Example
///
/// ```
/// use dicometa_core::FieldFilter;
///
/// let filter = FieldFilter::new(["PatientID", "Modality", "PatientID"]);
///
/// assert_eq!(filter.fields(), ["PatientID", "Modality"]);
/// assert!(filter.contains("Modality"));
/// assert!(!filter.contains("StudyDate"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FieldFilter {
    fields: Vec<String>,
    lookup: HashSet<String>,
}

impl FieldFilter {
    /// Creates a filter from requested keys
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        fields.into_iter().map(Into::into).collect()
    }

    /// Parses a comma separated list such as "PatientID, Modality"
    ///
    /// Blank entries are ignored.
    pub fn parse_list(s: &str) -> Self {
        s.split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Returns whether `key` was requested
    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains(key)
    }

    /// Requested keys in caller order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<String> for FieldFilter {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut filter = FieldFilter::default();
        for field in iter {
            if filter.lookup.insert(field.clone()) {
                filter.fields.push(field);
            }
        }
        filter
    }
}

impl From<Vec<String>> for FieldFilter {
    fn from(fields: Vec<String>) -> Self {
        fields.into_iter().collect()
    }
}

impl From<FieldFilter> for Vec<String> {
    fn from(filter: FieldFilter) -> Self {
        filter.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_order_and_dedupes() {
        let filter = FieldFilter::new(["StudyDate", "PatientID", "StudyDate"]);
        assert_eq!(filter.fields(), ["StudyDate", "PatientID"]);
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_empty_filter() {
        let filter = FieldFilter::new(Vec::<String>::new());
        assert!(filter.is_empty());
        assert!(!filter.contains("PatientID"));
    }

    #[test]
    fn test_parse_list() {
        let filter = FieldFilter::parse_list(" PatientID, Modality,,StudyDate ");
        assert_eq!(filter.fields(), ["PatientID", "Modality", "StudyDate"]);
    }

    #[test]
    fn test_membership_is_exact() {
        let filter = FieldFilter::new(["PatientID"]);
        assert!(filter.contains("PatientID"));
        assert!(!filter.contains("patientid"));
        assert!(!filter.contains("PatientIDs"));
    }

    #[test]
    fn test_deserialize_from_json_array() {
        let filter: FieldFilter = serde_json::from_str(r#"["PatientID","Modality"]"#).unwrap();
        assert_eq!(filter, FieldFilter::new(["PatientID", "Modality"]));
    }

    #[test]
    fn test_serialize_to_json_array() {
        let filter = FieldFilter::new(["PatientID", "Modality"]);
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"["PatientID","Modality"]"#);
    }
}
