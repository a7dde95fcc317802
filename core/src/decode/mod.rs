//! DICOM decoding into ordered records
//!
//! Parsing is delegated to `dicom-object`; this module only turns the parsed
//! data set into [`Record`]s the projector can consume without knowing about
//! the codec.

pub mod tags;

use crate::error::{ExtractionError, Result};
use crate::types::{is_bulk, RawValue, Record};
use dicom_core::value::{PrimitiveValue, Value};
use dicom_core::VR;
use dicom_object::InMemDicomObject;
use log::debug;
use std::io::{Cursor, Read};

pub use tags::{format_tag, tag_key, COMMON_FIELDS};

/// Length of the optional file preamble
const PREAMBLE_LEN: usize = 128;

/// Magic code that follows the preamble
const DICM_MAGIC: &[u8; 4] = b"DICM";

/// Decodes a DICOM file into records, in data set order
///
/// Accepts files with or without the 128-byte preamble. The file meta group
/// is not included. The source is consumed and dropped before returning,
/// whether decoding succeeds or not.
///
/// # Errors
///
/// Returns [`ExtractionError::DecodeFailure`] if the source cannot be read or
/// is not valid DICOM. No partial result is returned.
pub fn decode<R: Read>(source: R) -> Result<Vec<Record>> {
    let reader = skip_preamble(source).map_err(|e| {
        ExtractionError::DecodeFailure(format!("Failed to read DICOM data: {}", e))
    })?;
    let obj = dicom_object::from_reader(reader)?;
    let records = records_from_object(&obj);
    debug!("Decoded {} data elements", records.len());
    Ok(records)
}

/// Converts an in-memory data set into records
pub fn records_from_object(obj: &InMemDicomObject) -> Vec<Record> {
    obj.iter()
        .map(|elem| {
            let header = elem.header();
            let key = tag_key(header.tag);
            let value = match elem.value() {
                Value::Primitive(v) if is_bulk(&key, header.vr) => {
                    RawValue::Bulk {
                        length: v.calculate_byte_len(),
                    }
                }
                Value::Primitive(v) => raw_from_primitive(header.vr, v),
                Value::Sequence(seq) => {
                    RawValue::Sequence(seq.items().iter().map(records_from_object).collect())
                }
                Value::PixelSequence(seq) => RawValue::Bulk {
                    length: seq.fragments().iter().map(Vec::len).sum(),
                },
            };
            Record::new(key, header.vr, value)
        })
        .collect()
}

/// Reads past the preamble if the source starts with one
///
/// Leaves the reader positioned at the "DICM" magic code.
fn skip_preamble<R: Read>(mut source: R) -> std::io::Result<impl Read> {
    let mut head = Vec::with_capacity(PREAMBLE_LEN + DICM_MAGIC.len());
    (&mut source)
        .take((PREAMBLE_LEN + DICM_MAGIC.len()) as u64)
        .read_to_end(&mut head)?;

    if head.len() == PREAMBLE_LEN + DICM_MAGIC.len() && &head[PREAMBLE_LEN..] == DICM_MAGIC {
        head.drain(..PREAMBLE_LEN);
    }

    Ok(Cursor::new(head).chain(source))
}

/// Maps a primitive value onto the record value shapes
fn raw_from_primitive(vr: VR, value: &PrimitiveValue) -> RawValue {
    match value {
        PrimitiveValue::Empty => empty_value(vr),
        PrimitiveValue::U8(bytes) => RawValue::Bytes(bytes.to_vec()),
        PrimitiveValue::Str(s) => text_value(vr, s),
        PrimitiveValue::Strs(values) if values.is_empty() => empty_value(vr),
        PrimitiveValue::Strs(values) => collapse(values.iter().map(|s| text_value(vr, s))),
        PrimitiveValue::I16(values) => collapse(values.iter().map(|&n| RawValue::Int(n.into()))),
        PrimitiveValue::U16(values) => collapse(values.iter().map(|&n| RawValue::Int(n.into()))),
        PrimitiveValue::I32(values) => collapse(values.iter().map(|&n| RawValue::Int(n.into()))),
        PrimitiveValue::U32(values) => collapse(values.iter().map(|&n| RawValue::Int(n.into()))),
        PrimitiveValue::I64(values) => collapse(values.iter().map(|&n| RawValue::Int(n))),
        PrimitiveValue::U64(values) => collapse(values.iter().map(|&n| RawValue::UInt(n))),
        PrimitiveValue::F32(values) => {
            collapse(values.iter().map(|&n| RawValue::Float(f64::from(n))))
        }
        PrimitiveValue::F64(values) => collapse(values.iter().map(|&n| RawValue::Float(n))),
        // attribute tags, dates, times and date-times
        other => collapse(
            other
                .to_multi_str()
                .iter()
                .map(|s| RawValue::Formatted(trim_padding(s).to_string())),
        ),
    }
}

/// Zero-length value: an empty string for textual VRs, absent otherwise
fn empty_value(vr: VR) -> RawValue {
    if is_text_vr(vr) {
        RawValue::Text(String::new())
    } else {
        RawValue::Empty
    }
}

fn is_text_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::LT
            | VR::PN
            | VR::SH
            | VR::ST
            | VR::TM
            | VR::UC
            | VR::UI
            | VR::UR
            | VR::UT
    )
}

/// Wraps a textual value, keeping person names apart from plain text
fn text_value(vr: VR, s: &str) -> RawValue {
    let s = trim_padding(s).to_string();
    match vr {
        VR::PN | VR::DA | VR::TM | VR::DT | VR::AT => RawValue::Formatted(s),
        _ => RawValue::Text(s),
    }
}

/// Removes the trailing space/NUL padding used to reach even value lengths
fn trim_padding(s: &str) -> &str {
    s.trim_end_matches([' ', '\0'])
}

/// Single values stay scalar; multiplicity above one becomes `Multi`
fn collapse(values: impl Iterator<Item = RawValue>) -> RawValue {
    let mut values: Vec<RawValue> = values.collect();
    match values.len() {
        0 => RawValue::Empty,
        1 => values.remove(0),
        _ => RawValue::Multi(values),
    }
}
