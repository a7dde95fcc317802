use dicom_core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom_core::Tag;
use dicom_dictionary_std::StandardDataDictionary;

// Tags the pipeline refers to directly
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);

/// Keywords most callers ask for, in display order
///
/// Static configuration data offered to clients as a default selection;
/// it is not derived from any decoded object.
pub const COMMON_FIELDS: &[&str] = &[
    "PatientID",
    "PatientName",
    "PatientBirthDate",
    "PatientSex",
    "StudyDate",
    "StudyTime",
    "StudyDescription",
    "StudyInstanceUID",
    "SeriesDescription",
    "SeriesInstanceUID",
    "SOPInstanceUID",
    "AccessionNumber",
    "Modality",
    "BodyPartExamined",
    "InstitutionName",
    "Manufacturer",
    "Rows",
    "Columns",
];

/// Formats a tag as "(GGGG,EEEE)" in uppercase hex
pub fn format_tag(tag: Tag) -> String {
    format!("({:04X},{:04X})", tag.group(), tag.element())
}

/// Key used for a tag in projected metadata
///
/// The standard dictionary keyword when there is one, the formatted tag
/// otherwise.
pub fn tag_key(tag: Tag) -> String {
    StandardDataDictionary
        .by_tag(tag)
        .map(|entry| entry.alias())
        .filter(|alias| !alias.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format_tag(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_values() {
        assert_eq!(PIXEL_DATA, Tag(0x7FE0, 0x0010));
        assert_eq!(PATIENT_ID, Tag(0x0010, 0x0020));
        assert_eq!(MODALITY, Tag(0x0008, 0x0060));
    }

    #[test]
    fn test_format_tag_uppercase_hex() {
        assert_eq!(format_tag(Tag(0x0010, 0x0010)), "(0010,0010)");
        assert_eq!(format_tag(Tag(0x7fe0, 0x0010)), "(7FE0,0010)");
        assert_eq!(format_tag(Tag(0x0009, 0x10ab)), "(0009,10AB)");
    }

    #[test]
    fn test_tag_key_uses_dictionary_keyword() {
        assert_eq!(tag_key(PATIENT_ID), "PatientID");
        assert_eq!(tag_key(PATIENT_NAME), "PatientName");
        assert_eq!(tag_key(STUDY_DATE), "StudyDate");
        assert_eq!(tag_key(PIXEL_DATA), "PixelData");
    }

    #[test]
    fn test_tag_key_falls_back_for_private_tags() {
        assert_eq!(tag_key(Tag(0x0009, 0x1001)), "(0009,1001)");
    }

    #[test]
    fn test_common_fields_are_dictionary_keywords() {
        for field in COMMON_FIELDS {
            assert!(
                StandardDataDictionary.by_name(field).is_some(),
                "{} is not a standard keyword",
                field
            );
        }
    }
}
