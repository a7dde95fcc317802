use dicom_core::VR;
use std::fmt;

/// Keyword of the pixel data attribute, always treated as bulk data
pub const PIXEL_DATA_KEYWORD: &str = "PixelData";

/// Value representations whose payload is opaque binary data
///
/// Records with one of these VRs are never projected into metadata.
pub const BULK_VRS: [VR; 6] = [VR::OB, VR::OW, VR::OF, VR::OD, VR::OL, VR::OV];

/// Returns whether an element with this keyword and VR carries bulk data
pub fn is_bulk(key: &str, vr: VR) -> bool {
    key == PIXEL_DATA_KEYWORD || BULK_VRS.contains(&vr)
}

/// One decoded data element
///
/// `key` is the dictionary keyword (e.g. "PatientID") or, for tags the
/// dictionary does not know, the formatted tag such as "(0009,1001)".
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: String,
    pub vr: VR,
    pub value: RawValue,
    pub bulk: bool,
}

impl Record {
    /// Creates a record, marking it as bulk from its keyword and VR
    pub fn new(key: impl Into<String>, vr: VR, value: RawValue) -> Self {
        let key = key.into();
        let bulk = is_bulk(&key, vr);
        Self {
            key,
            vr,
            value,
            bulk,
        }
    }
}

/// Decoded value of a data element, before JSON normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Zero-length value
    Empty,
    /// Single textual value
    Text(String),
    /// Single signed integer
    Int(i64),
    /// Single unsigned integer that may exceed `i64`
    UInt(u64),
    /// Single floating point number
    Float(f64),
    /// Raw bytes that still need text decoding (e.g. VR UN)
    Bytes(Vec<u8>),
    /// Structured value that only has a textual rendering: person names,
    /// dates, times and attribute tags
    Formatted(String),
    /// Value multiplicity greater than one
    Multi(Vec<RawValue>),
    /// Nested sequence items
    Sequence(Vec<Vec<Record>>),
    /// Bulk payload left undecoded, with its length in bytes
    Bulk { length: usize },
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Empty => Ok(()),
            RawValue::Text(s) | RawValue::Formatted(s) => f.write_str(s),
            RawValue::Int(n) => write!(f, "{}", n),
            RawValue::UInt(n) => write!(f, "{}", n),
            RawValue::Float(n) => write!(f, "{}", n),
            RawValue::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            RawValue::Multi(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            RawValue::Sequence(items) => write!(f, "[{} items]", items.len()),
            RawValue::Bulk { length } => write!(f, "<{} bytes>", length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PixelData", VR::OW, true)]
    #[case("PixelData", VR::OB, true)]
    #[case("EncapsulatedDocument", VR::OB, true)]
    #[case("FloatPixelData", VR::OF, true)]
    #[case("DoubleFloatPixelData", VR::OD, true)]
    #[case("(0009,1010)", VR::OL, true)]
    #[case("(0009,1011)", VR::OV, true)]
    #[case("(0009,1012)", VR::UN, false)]
    #[case("PatientID", VR::LO, false)]
    #[case("Rows", VR::US, false)]
    fn test_bulk_marking(#[case] key: &str, #[case] vr: VR, #[case] expected: bool) {
        let record = Record::new(key, vr, RawValue::Empty);
        assert_eq!(record.bulk, expected);
    }

    #[test]
    fn test_display_multi_uses_backslash() {
        let value = RawValue::Multi(vec![
            RawValue::Text("ORIGINAL".to_string()),
            RawValue::Text("PRIMARY".to_string()),
        ]);
        assert_eq!(value.to_string(), "ORIGINAL\\PRIMARY");
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(RawValue::Empty.to_string(), "");
        assert_eq!(RawValue::Int(-3).to_string(), "-3");
        assert_eq!(RawValue::Float(0.5).to_string(), "0.5");
        assert_eq!(RawValue::Bytes(b"abc".to_vec()).to_string(), "abc");
        assert_eq!(RawValue::Bulk { length: 16 }.to_string(), "<16 bytes>");
        assert_eq!(RawValue::Sequence(vec![vec![], vec![]]).to_string(), "[2 items]");
    }
}
