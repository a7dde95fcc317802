use crate::decode::{decode, COMMON_FIELDS};
use crate::error::{ExtractionError, Result};
use crate::projection::project;
use crate::storage::StorageBackend;
use crate::types::{FieldFilter, MetadataMap};
use log::{debug, warn};
use std::sync::Arc;

/// Main entry point for DICOM metadata extraction
///
/// Composes the configured storage backend, the DICOM decoder and the
/// projector for one request at a time. Holds no per-request state, so one
/// instance can serve concurrent requests.
///
/// # Example
///
/// ```no_run
/// use dicometa_core::{FieldFilter, FilesystemBackend, MetadataExtractor};
/// use std::sync::Arc;
///
/// # async fn run() -> dicometa_core::Result<()> {
/// let backend = FilesystemBackend::new("/data/dicom").unwrap();
/// let extractor = MetadataExtractor::new(Arc::new(backend));
///
/// let filter = FieldFilter::new(["PatientID", "Modality"]);
/// let metadata = extractor
///     .extract("studies/ct/slice-001.dcm", Some(&filter))
///     .await?;
///
/// println!("{}", serde_json::to_string(&metadata).unwrap());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MetadataExtractor {
    backend: Arc<dyn StorageBackend>,
}

impl MetadataExtractor {
    /// Creates an extractor over a backend
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// The backend objects are fetched from
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// Extracts metadata of the object named by `identifier`
    ///
    /// The fetched stream is moved into the decoder, which runs on tokio's
    /// blocking pool, and is released before this returns on success and on
    /// failure alike.
    ///
    /// # Errors
    ///
    /// Backend errors (`InvalidInput`, `NotFound`, `BackendFailure`) are
    /// returned unchanged; invalid DICOM content yields `DecodeFailure`.
    pub async fn extract(
        &self,
        identifier: &str,
        filter: Option<&FieldFilter>,
    ) -> Result<MetadataMap> {
        debug!(
            "Extracting {} from {} backend (filter: {:?})",
            identifier,
            self.backend.name(),
            filter.map(FieldFilter::fields)
        );

        let stream = self.backend.fetch(identifier).await.inspect_err(|e| {
            warn!("Fetching {} failed ({}): {}", identifier, e.kind(), e);
        })?;

        let records = tokio::task::spawn_blocking(move || decode(stream))
            .await
            .map_err(|e| ExtractionError::BackendFailure(format!("Decoding task failed: {}", e)))
            .and_then(|decoded| decoded)
            .inspect_err(|e| {
                warn!("Decoding {} failed: {}", identifier, e);
            })?;

        let metadata = project(&records, filter);
        debug!("Extracted {} fields from {}", metadata.len(), identifier);
        Ok(metadata)
    }

    /// Keywords clients commonly select, independent of any object
    pub fn common_fields() -> &'static [&'static str] {
        COMMON_FIELDS
    }
}

impl std::fmt::Debug for MetadataExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataExtractor")
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ObjectStream;
    use async_trait::async_trait;
    use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
    use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
    use serde_json::{json, Value};
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Backend answering every fetch with the same canned result
    struct CannedBackend {
        result: std::result::Result<Vec<u8>, ExtractionError>,
        fetches: AtomicUsize,
    }

    impl CannedBackend {
        fn serving(bytes: Vec<u8>) -> Self {
            Self {
                result: Ok(bytes),
                fetches: AtomicUsize::new(0),
            }
        }

        fn failing(err: ExtractionError) -> Self {
            Self {
                result: Err(err),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StorageBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn fetch(&self, identifier: &str) -> Result<ObjectStream> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map(|bytes| ObjectStream::from_bytes(identifier, bytes))
        }
    }

    /// Reader that records when it is dropped
    struct TrackedReader {
        inner: Cursor<Vec<u8>>,
        released: Arc<AtomicBool>,
    }

    impl Read for TrackedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    /// Backend handing out tracked readers over fixed bytes
    struct TrackingBackend {
        bytes: Vec<u8>,
        released: Arc<AtomicBool>,
    }

    #[async_trait]
    impl StorageBackend for TrackingBackend {
        fn name(&self) -> &'static str {
            "tracking"
        }

        async fn fetch(&self, identifier: &str) -> Result<ObjectStream> {
            Ok(ObjectStream::new(
                identifier,
                TrackedReader {
                    inner: Cursor::new(self.bytes.clone()),
                    released: self.released.clone(),
                },
            ))
        }
    }

    fn tracking(bytes: Vec<u8>) -> (Arc<AtomicBool>, MetadataExtractor) {
        let released = Arc::new(AtomicBool::new(false));
        let backend = TrackingBackend {
            bytes,
            released: released.clone(),
        };
        (released, MetadataExtractor::new(Arc::new(backend)))
    }

    fn ct_file() -> Vec<u8> {
        let obj = InMemDicomObject::from_element_iter([
            DataElement::new(Tag(0x0010, 0x0020), VR::LO, PrimitiveValue::from("123")),
            DataElement::new(Tag(0x0008, 0x0020), VR::DA, PrimitiveValue::from("20230101")),
            DataElement::new(Tag(0x0008, 0x0060), VR::CS, PrimitiveValue::from("CT")),
            DataElement::new(
                Tag(0x7FE0, 0x0010),
                VR::OW,
                PrimitiveValue::U16(vec![1, 2, 3, 4].into()),
            ),
        ]);
        let file = obj
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax("1.2.840.10008.1.2.1")
                    .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.2")
                    .media_storage_sop_instance_uid("1.2.3.4"),
            )
            .unwrap();
        let mut bytes = Vec::new();
        file.write_all(&mut bytes).unwrap();
        bytes
    }

    fn extractor(backend: CannedBackend) -> (Arc<CannedBackend>, MetadataExtractor) {
        let backend = Arc::new(backend);
        let extractor = MetadataExtractor::new(backend.clone());
        (backend, extractor)
    }

    #[tokio::test]
    async fn test_extract_all_fields() {
        let (backend, extractor) = extractor(CannedBackend::serving(ct_file()));

        let metadata = extractor.extract("bucket/ct.dcm", None).await.unwrap();

        assert_eq!(
            Value::from(metadata),
            json!({"StudyDate": "20230101", "Modality": "CT", "PatientID": "123"})
        );
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extract_with_filter() {
        let (_, extractor) = extractor(CannedBackend::serving(ct_file()));
        let filter = FieldFilter::new(["PatientID"]);

        let metadata = extractor
            .extract("bucket/ct.dcm", Some(&filter))
            .await
            .unwrap();

        assert_eq!(Value::from(metadata), json!({"PatientID": "123"}));
    }

    #[tokio::test]
    async fn test_not_found_is_propagated_unchanged() {
        let err = ExtractionError::NotFound("S3 key not found: bucket/missing.dcm".to_string());
        let (_, extractor) = extractor(CannedBackend::failing(err.clone()));

        let result = extractor.extract("bucket/missing.dcm", None).await;

        match result {
            Err(ExtractionError::NotFound(msg)) => assert!(msg.contains("bucket/missing.dcm")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_propagated_unchanged() {
        let err = ExtractionError::BackendFailure("S3 error: AccessDenied".to_string());
        let (backend, extractor) = extractor(CannedBackend::failing(err.clone()));

        let result = extractor.extract("bucket/file.dcm", None).await;

        assert_eq!(result, Err(err));
        assert_eq!(backend.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_content_is_decode_failure() {
        let (_, extractor) = extractor(CannedBackend::serving(b"not a dicom file".to_vec()));

        let result = extractor.extract("bucket/file.dcm", None).await;

        assert!(matches!(result, Err(ExtractionError::DecodeFailure(_))));
    }

    #[tokio::test]
    async fn test_stream_released_after_decode_failure() {
        let (released, extractor) = tracking(b"not a dicom file".to_vec());

        let result = extractor.extract("bucket/file.dcm", None).await;

        assert!(matches!(result, Err(ExtractionError::DecodeFailure(_))));
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stream_released_after_success() {
        let (released, extractor) = tracking(ct_file());

        let metadata = extractor.extract("bucket/ct.dcm", None).await.unwrap();

        assert_eq!(metadata.get("Modality"), Some(&json!("CT")));
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_extractions() {
        let (_, extractor) = extractor(CannedBackend::serving(ct_file()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let extractor = extractor.clone();
                tokio::spawn(async move { extractor.extract("bucket/ct.dcm", None).await })
            })
            .collect();

        for handle in handles {
            let metadata = handle.await.unwrap().unwrap();
            assert_eq!(metadata.get("PatientID"), Some(&json!("123")));
        }
    }

    #[tokio::test]
    async fn test_repeated_extractions_are_equal() {
        let (_, extractor) = extractor(CannedBackend::serving(ct_file()));

        let first = extractor.extract("bucket/ct.dcm", None).await.unwrap();
        let second = extractor.extract("bucket/ct.dcm", None).await.unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_common_fields() {
        let fields = MetadataExtractor::common_fields();
        assert!(fields.contains(&"PatientID"));
        assert!(fields.contains(&"Modality"));
        assert_eq!(fields[0], "PatientID");
    }
}
