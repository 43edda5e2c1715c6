//! # Library Manager
//!
//! Orchestrates capture, encoding, the Binary Store and the Metadata Index
//! behind `initialize`, `add_photo` and `delete_photo`, and keeps the
//! in-memory library equal to the persisted index after every mutation.
//!
//! ## Failure ordering
//!
//! - `add_photo` writes bytes first and the index last. If the index write
//!   fails the new blob is removed again, so the index never references
//!   missing bytes.
//! - `delete_photo` rewrites the index first and deletes bytes last. If the
//!   byte delete fails the blob is orphaned: wasted space, never a dangling
//!   reference. [`LibraryManager::reclaim_orphans`] cleans these up.
//!
//! ## Concurrency
//!
//! Mutations run one at a time through an async mutex, so two overlapping
//! `add_photo` calls cannot overwrite each other's index snapshot. Reads
//! (`photos`, `state`) take a separate lock and never wait on a pending
//! capture.
//!
//! ## Usage
//!
//! ```ignore
//! let manager = LibraryManager::new(config, store, index, camera, encoding, clock)
//!     .with_event_bus(event_bus);
//! manager.initialize().await?;
//!
//! if let Some(photo) = manager.add_photo().await? {
//!     render(&photo.display_uri);
//! }
//! ```

use crate::encoding::EncodingStrategy;
use crate::error::{GalleryError, Result};
use crate::index::MetadataIndex;
use crate::models::{DeleteOutcome, LibraryConfig, LibraryState, PhotoRecord};
use crate::store::BinaryStore;
use bridge_traits::capture::{CameraCapture, ImageFormat};
use bridge_traits::time::Clock;
use bytes::Bytes;
use core_runtime::events::{CaptureEvent, CoreEvent, EventBus, LibraryEvent};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
struct LibraryView {
    state: LibraryState,
    photos: Vec<PhotoRecord>,
}

pub struct LibraryManager {
    config: LibraryConfig,
    store: Arc<dyn BinaryStore>,
    index: Arc<dyn MetadataIndex>,
    camera: Arc<dyn CameraCapture>,
    encoding: Arc<dyn EncodingStrategy>,
    clock: Arc<dyn Clock>,
    event_bus: Option<EventBus>,
    view: RwLock<LibraryView>,
    /// Held for the whole of every mutation.
    mutation: Mutex<()>,
}

impl LibraryManager {
    pub fn new(
        config: LibraryConfig,
        store: Arc<dyn BinaryStore>,
        index: Arc<dyn MetadataIndex>,
        camera: Arc<dyn CameraCapture>,
        encoding: Arc<dyn EncodingStrategy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            index,
            camera,
            encoding,
            clock,
            event_bus: None,
            view: RwLock::new(LibraryView {
                state: LibraryState::Unloaded,
                photos: Vec::new(),
            }),
            mutation: Mutex::new(()),
        }
    }

    /// Publish library and capture events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub async fn state(&self) -> LibraryState {
        self.view.read().await.state
    }

    /// Current library, most recent first.
    pub async fn photos(&self) -> Vec<PhotoRecord> {
        self.view.read().await.photos.clone()
    }

    /// Load the library from the index and resolve display URIs.
    ///
    /// Safe to call again; each call reloads and replaces the in-memory
    /// sequence. A corrupt index yields an empty library.
    #[instrument(skip(self), fields(platform = %self.encoding.platform()))]
    pub async fn initialize(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;

        let (mut photos, recovered) = match self.index.load().await {
            Ok(photos) => (photos, false),
            Err(GalleryError::IndexCorrupt(reason)) => {
                warn!(%reason, "Photo index is corrupt, starting with an empty library");
                (Vec::new(), true)
            }
            Err(err) => return Err(err),
        };

        for photo in &mut photos {
            photo.display_uri = self.resolve_display_uri(photo).await;
        }

        let count = photos.len();
        {
            let mut view = self.view.write().await;
            view.photos = photos;
            view.state = LibraryState::Ready;
        }

        info!(count, "Library loaded");
        self.emit(CoreEvent::Library(LibraryEvent::Loaded {
            photo_count: count,
            recovered_from_corruption: recovered,
        }));
        Ok(())
    }

    /// Capture a photo and add it to the front of the library.
    ///
    /// The captured asset is handed back to the camera for release as soon
    /// as its bytes are encoded.
    ///
    /// # Returns
    /// - `Ok(Some(record))` once bytes and index are both persisted
    /// - `Ok(None)` if the capture was cancelled or no camera is available;
    ///   nothing is written in that case
    ///
    /// # Errors
    /// Store and index failures. When the index write fails the new blob is
    /// removed again and the library is unchanged.
    #[instrument(skip(self))]
    pub async fn add_photo(&self) -> Result<Option<PhotoRecord>> {
        let _guard = self.mutation.lock().await;
        self.ensure_ready().await?;

        let asset = match self.camera.capture(&self.config.capture).await {
            Ok(asset) => asset,
            Err(err) => {
                return match GalleryError::from_capture(err) {
                    GalleryError::CaptureCancelled(message) => {
                        info!(%message, "Capture cancelled");
                        self.emit(CoreEvent::Capture(CaptureEvent::Cancelled { message }));
                        Ok(None)
                    }
                    GalleryError::CaptureUnavailable(message) => {
                        warn!(%message, "Capture unavailable");
                        self.emit(CoreEvent::Capture(CaptureEvent::Unavailable { message }));
                        Ok(None)
                    }
                    other => Err(other),
                };
            }
        };

        let encoded = self.encoding.encode_for_store(&asset).await;
        if let Err(err) = self.camera.release(&asset).await {
            warn!(error = %err, "Failed to release captured asset");
        }
        let payload = encoded?;
        let current = self.photos().await;
        let filename = self.allocate_filename(&current, asset.format);

        let location = self.store.write(&filename, payload).await?;
        let mut record = PhotoRecord::new(
            filename.clone(),
            self.encoding.record_filepath(&filename, &location),
        );
        record.display_uri = self.resolve_display_uri(&record).await;

        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(record.clone());
        next.extend(current);

        if let Err(err) = self.index.save(&next).await {
            if let Err(cleanup) = self.store.delete(&filename).await {
                warn!(%filename, error = %cleanup, "Failed to remove blob after index write failure");
            }
            return Err(err);
        }

        self.view.write().await.photos = next;

        info!(%filename, format = %asset.format, "Photo added");
        self.emit(CoreEvent::Library(LibraryEvent::PhotoAdded { filename }));
        Ok(Some(record))
    }

    /// Remove `record` (matched by filename) from the library, then its bytes.
    ///
    /// Deleting a record that is not in the library leaves the index alone and
    /// still clears any leftover bytes under that filename.
    #[instrument(skip(self, record), fields(filename = %record.filename))]
    pub async fn delete_photo(&self, record: &PhotoRecord) -> Result<DeleteOutcome> {
        let _guard = self.mutation.lock().await;
        self.ensure_ready().await?;

        let current = self.photos().await;
        let remaining: Vec<PhotoRecord> = current
            .iter()
            .filter(|photo| photo.filename != record.filename)
            .cloned()
            .collect();
        let present = remaining.len() != current.len();

        if present {
            self.index.save(&remaining).await?;
            self.view.write().await.photos = remaining;
            self.emit(CoreEvent::Library(LibraryEvent::PhotoDeleted {
                filename: record.filename.clone(),
            }));
        }

        match self.store.delete(&record.filename).await {
            Ok(()) if present => {
                info!("Photo deleted");
                Ok(DeleteOutcome::Removed)
            }
            Ok(()) => {
                debug!("Photo not in library");
                Ok(DeleteOutcome::NotPresent)
            }
            Err(err) if present => {
                warn!(error = %err, "Photo removed from index but its bytes remain");
                self.emit(CoreEvent::Library(LibraryEvent::OrphanLeft {
                    filename: record.filename.clone(),
                    reason: err.to_string(),
                }));
                Ok(DeleteOutcome::Orphaned)
            }
            Err(err) => {
                debug!(error = %err, "Photo not in library and store delete failed");
                Ok(DeleteOutcome::NotPresent)
            }
        }
    }

    /// Delete every stored blob the library no longer references.
    ///
    /// Returns the filenames that were removed.
    #[instrument(skip(self))]
    pub async fn reclaim_orphans(&self) -> Result<Vec<String>> {
        let _guard = self.mutation.lock().await;
        self.ensure_ready().await?;

        let referenced: HashSet<String> = self
            .view
            .read()
            .await
            .photos
            .iter()
            .map(|photo| photo.filename.clone())
            .collect();

        let mut reclaimed = Vec::new();
        for key in self.store.list_keys().await? {
            if referenced.contains(&key) {
                continue;
            }
            match self.store.delete(&key).await {
                Ok(()) => reclaimed.push(key),
                Err(err) => warn!(%key, error = %err, "Failed to reclaim orphaned blob"),
            }
        }
        reclaimed.sort();

        if !reclaimed.is_empty() {
            info!(count = reclaimed.len(), "Reclaimed orphaned blobs");
            self.emit(CoreEvent::Library(LibraryEvent::OrphansReclaimed {
                filenames: reclaimed.clone(),
            }));
        }
        Ok(reclaimed)
    }

    /// The bytes originally captured for `record`.
    pub async fn read_photo_bytes(&self, record: &PhotoRecord) -> Result<Bytes> {
        self.ensure_ready().await?;
        let stored = self.store.read(&record.filename).await?;
        self.encoding.decode_payload(stored)
    }

    async fn ensure_ready(&self) -> Result<()> {
        match self.view.read().await.state {
            LibraryState::Ready => Ok(()),
            LibraryState::Unloaded => Err(GalleryError::NotReady),
        }
    }

    /// `<millis>.<ext>`, bumping the timestamp until no record uses it.
    fn allocate_filename(&self, current: &[PhotoRecord], format: ImageFormat) -> String {
        let taken: HashSet<&str> = current.iter().map(|p| p.filename.as_str()).collect();
        let mut millis = self.clock.unix_timestamp_millis();
        loop {
            let candidate = format!("{}.{}", millis, format.extension());
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
            millis += 1;
        }
    }

    async fn resolve_display_uri(&self, record: &PhotoRecord) -> String {
        match self
            .encoding
            .decode_for_display(record, self.store.as_ref())
            .await
        {
            Ok(uri) => uri,
            Err(err) => {
                warn!(filename = %record.filename, error = %err, "Could not resolve display URI");
                String::new()
            }
        }
    }

    fn emit(&self, event: CoreEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(event);
        }
    }
}
