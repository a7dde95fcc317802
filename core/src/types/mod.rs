//! Core types for DICOM metadata extraction
//!
//! This module contains the data structures passed between the decoder,
//! the projector and callers:
//! - `Record`/`RawValue`: one decoded data element
//! - `FieldFilter`: the set of keys a caller asks for
//! - `MetadataMap`: the JSON-ready result

mod filter;
mod metadata;
mod record;

pub use filter::FieldFilter;
pub use metadata::MetadataMap;
pub use record::{is_bulk, RawValue, Record, BULK_VRS, PIXEL_DATA_KEYWORD};
