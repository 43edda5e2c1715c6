//! Metadata Index: the whole library as one serialized snapshot.

use crate::error::{GalleryError, Result};
use crate::models::PhotoRecord;
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::storage::SettingsStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ordered persistence of the library's persisted fields.
///
/// `save` replaces the stored snapshot in a single write; readers never see a
/// partial sequence.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MetadataIndex: PlatformSendSync {
    /// Load the stored sequence. First run yields an empty sequence.
    ///
    /// # Errors
    /// - [`GalleryError::IndexCorrupt`] when the stored value cannot be parsed
    /// - [`GalleryError::IndexReadFailed`] when the backing store fails
    async fn load(&self) -> Result<Vec<PhotoRecord>>;

    /// Overwrite the stored sequence with `records`.
    async fn save(&self, records: &[PhotoRecord]) -> Result<()>;
}

/// [`MetadataIndex`] stored as a JSON array under one settings key.
pub struct SettingsMetadataIndex {
    store: Arc<dyn SettingsStore>,
    key: String,
}

impl SettingsMetadataIndex {
    pub fn new(store: Arc<dyn SettingsStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parses a stored snapshot. `null` and blank values count as empty.
    pub fn decode(raw: &str) -> Result<Vec<PhotoRecord>> {
        Self::decode_normalized(raw).map(|(records, _)| records)
    }

    /// Like [`decode`](Self::decode), also reporting whether entries were dropped.
    fn decode_normalized(raw: &str) -> Result<(Vec<PhotoRecord>, bool)> {
        if raw.trim().is_empty() {
            return Ok((Vec::new(), false));
        }

        let records: Option<Vec<PhotoRecord>> =
            serde_json::from_str(raw).map_err(|e| GalleryError::IndexCorrupt(e.to_string()))?;

        let records = records.unwrap_or_default();
        let total = records.len();
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(total);
        for record in records {
            if record.filename.is_empty() {
                warn!("Dropping index entry without a filename");
                continue;
            }
            if !seen.insert(record.filename.clone()) {
                warn!(filename = %record.filename, "Dropping duplicate index entry");
                continue;
            }
            unique.push(record);
        }
        let dropped = unique.len() != total;
        Ok((unique, dropped))
    }

    pub fn encode(records: &[PhotoRecord]) -> Result<String> {
        serde_json::to_string(records).map_err(|e| GalleryError::Encoding(e.to_string()))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MetadataIndex for SettingsMetadataIndex {
    /// Entries dropped while decoding are also removed from the stored
    /// snapshot, so the loaded sequence and the stored one agree.
    async fn load(&self) -> Result<Vec<PhotoRecord>> {
        let raw = self
            .store
            .get_string(&self.key)
            .await
            .map_err(GalleryError::IndexReadFailed)?;

        match raw {
            Some(raw) => {
                let (records, dropped) = Self::decode_normalized(&raw)?;
                if dropped {
                    match self.save(&records).await {
                        Ok(()) => info!(key = %self.key, count = records.len(), "Rewrote normalized photo index"),
                        Err(err) => warn!(key = %self.key, error = %err, "Failed to rewrite normalized photo index"),
                    }
                }
                debug!(key = %self.key, count = records.len(), "Loaded photo index");
                Ok(records)
            }
            None => {
                debug!(key = %self.key, "No photo index yet");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[PhotoRecord]) -> Result<()> {
        let raw = Self::encode(records)?;
        self.store
            .set_string(&self.key, &raw)
            .await
            .map_err(GalleryError::IndexWriteFailed)?;
        debug!(key = %self.key, count = records.len(), "Saved photo index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_values() {
        assert!(SettingsMetadataIndex::decode("").unwrap().is_empty());
        assert!(SettingsMetadataIndex::decode("null").unwrap().is_empty());
        assert!(SettingsMetadataIndex::decode("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_corrupt() {
        assert!(matches!(
            SettingsMetadataIndex::decode("{not json"),
            Err(GalleryError::IndexCorrupt(_))
        ));
        assert!(matches!(
            SettingsMetadataIndex::decode(r#"{"filename":"1.jpeg"}"#),
            Err(GalleryError::IndexCorrupt(_))
        ));
    }

    #[test]
    fn test_decode_keeps_order_and_drops_duplicates() {
        let raw = r#"[
            {"filename":"3.jpeg","filepath":"3.jpeg"},
            {"filename":"2.jpeg","filepath":"2.jpeg"},
            {"filename":"3.jpeg","filepath":"stale"},
            {"filename":"","filepath":""}
        ]"#;
        let names: Vec<_> = SettingsMetadataIndex::decode(raw)
            .unwrap()
            .into_iter()
            .map(|r| (r.filename, r.filepath))
            .collect();
        assert_eq!(
            names,
            vec![
                ("3.jpeg".to_string(), "3.jpeg".to_string()),
                ("2.jpeg".to_string(), "2.jpeg".to_string()),
            ]
        );
    }

    #[test]
    fn test_encode_layout() {
        let raw = SettingsMetadataIndex::encode(&[
            PhotoRecord::new("2.png", "/d/photos/2.png").with_display_uri("ignored"),
            PhotoRecord::new("1.png", "/d/photos/1.png"),
        ])
        .unwrap();
        assert_eq!(
            raw,
            r#"[{"filename":"2.png","filepath":"/d/photos/2.png"},{"filename":"1.png","filepath":"/d/photos/1.png"}]"#
        );
    }
}
