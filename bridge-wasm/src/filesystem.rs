//! WebAssembly File System Implementation using IndexedDB
//!
//! Browsers have no reachable filesystem, so this module keeps a flat
//! path-keyed object store inside IndexedDB and exposes it through
//! `FileSystemAccess`.
//!
//! - **Database Name**: `{namespace}-filesystem`
//! - **Object Store**: `files`, keyed by normalized path
//!
//! File content is stored inline as base64 text. Photos written by the core
//! are already base64 encoded by the web encoding strategy; the extra layer
//! keeps this store byte-exact for any caller, at roughly 1.78 times the
//! captured size per photo.
//!
//! Paths are normalized to forward slashes with a leading `/`. Directories are
//! entries with `is_directory = true`. IndexedDB commits a request's
//! transaction before `onsuccess` resolves, so a completed `write_file` is
//! durable.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bridge_traits::{error::Result as BridgeResult, storage::FileSystemAccess};
use bytes::Bytes;
use js_sys::Array;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    IdbDatabase, IdbObjectStore, IdbObjectStoreParameters, IdbOpenDbRequest, IdbRequest,
    IdbTransactionMode, IdbVersionChangeEvent,
};

use crate::error::{js_message, WasmError, WasmResult};

const FILES_STORE: &str = "files";

/// File entry stored in IndexedDB
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    content: Option<String>,
    size: u64,
    modified_at: i64,
    is_directory: bool,
}

/// WebAssembly file system implementation using IndexedDB
pub struct WasmFileSystem {
    db: Rc<IdbDatabase>,
    data_dir: PathBuf,
}

impl WasmFileSystem {
    const DB_VERSION: u32 = 1;

    /// Open (or create) the filesystem database for `namespace`.
    ///
    /// # Errors
    ///
    /// Fails when IndexedDB is unavailable, e.g. in private browsing modes
    /// that disable it.
    pub async fn new(namespace: &str) -> WasmResult<Self> {
        let db = Self::open_database(namespace).await?;
        let fs = Self {
            db: Rc::new(db),
            data_dir: PathBuf::from("/data"),
        };

        let data_dir = fs.data_dir.clone();
        fs.ensure_directory_exists(&data_dir).await?;
        Ok(fs)
    }

    async fn open_database(namespace: &str) -> WasmResult<IdbDatabase> {
        let window = web_sys::window()
            .ok_or_else(|| WasmError::JavaScript("No window object available".to_string()))?;

        let idb_factory = window
            .indexed_db()?
            .ok_or_else(|| WasmError::IndexedDb("IndexedDB not available".to_string()))?;

        let db_name = format!("{}-filesystem", namespace);
        let open_request: IdbOpenDbRequest = idb_factory.open_with_u32(&db_name, Self::DB_VERSION)?;

        let onupgradeneeded = Closure::once(move |event: IdbVersionChangeEvent| {
            let db = event
                .target()
                .and_then(|target| target.dyn_into::<IdbOpenDbRequest>().ok())
                .and_then(|request| request.result().ok())
                .and_then(|result| result.dyn_into::<IdbDatabase>().ok());

            if let Some(db) = db {
                if !db.object_store_names().contains(FILES_STORE) {
                    let options = IdbObjectStoreParameters::new();
                    options.set_key_path(&JsValue::from_str("path"));
                    let _ = db.create_object_store_with_optional_parameters(FILES_STORE, &options);
                }
            }
        });
        open_request.set_onupgradeneeded(Some(onupgradeneeded.as_ref().unchecked_ref()));
        onupgradeneeded.forget();

        let result = JsFuture::from(request_to_promise(&open_request)).await?;
        result
            .dyn_into::<IdbDatabase>()
            .map_err(|_| WasmError::IndexedDb("Failed to cast result to IdbDatabase".to_string()))
    }

    fn store(&self, mode: IdbTransactionMode) -> WasmResult<IdbObjectStore> {
        let names = Array::new();
        names.push(&JsValue::from_str(FILES_STORE));
        let transaction = self.db.transaction_with_str_sequence_and_mode(&names, mode)?;
        Ok(transaction.object_store(FILES_STORE)?)
    }

    /// Normalize a path to use forward slashes and remove redundant separators
    fn normalize_path(path: &Path) -> String {
        let normalized = path.to_string_lossy().replace('\\', "/");
        let parts: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

        if parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", parts.join("/"))
        }
    }

    async fn get_entry(&self, path: &Path) -> WasmResult<Option<FileEntry>> {
        let key = Self::normalize_path(path);
        let request = self
            .store(IdbTransactionMode::Readonly)?
            .get(&JsValue::from_str(&key))?;
        let result = JsFuture::from(request_to_promise(&request)).await?;

        if result.is_undefined() || result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_wasm_bindgen::from_value(result)?))
    }

    async fn put_entry(&self, entry: &FileEntry) -> WasmResult<()> {
        let value = serde_wasm_bindgen::to_value(entry)?;
        let request = self.store(IdbTransactionMode::Readwrite)?.put(&value)?;
        JsFuture::from(request_to_promise(&request)).await?;
        Ok(())
    }

    async fn remove_entry(&self, path: &str) -> WasmResult<()> {
        let request = self
            .store(IdbTransactionMode::Readwrite)?
            .delete(&JsValue::from_str(path))?;
        JsFuture::from(request_to_promise(&request)).await?;
        Ok(())
    }

    async fn ensure_directory_exists(&self, path: &Path) -> WasmResult<()> {
        let mut pending = Vec::new();
        let mut cursor = path.to_path_buf();

        while !cursor.as_os_str().is_empty() && cursor != Path::new("/") {
            match self.get_entry(&cursor).await? {
                Some(entry) if entry.is_directory => break,
                Some(_) => return Err(WasmError::NotADirectory(cursor.display().to_string())),
                None => pending.push(cursor.clone()),
            }
            if !cursor.pop() {
                break;
            }
        }

        for dir in pending.iter().rev() {
            self.put_entry(&FileEntry {
                path: Self::normalize_path(dir),
                content: None,
                size: 0,
                modified_at: js_sys::Date::now() as i64,
                is_directory: true,
            })
            .await?;
        }
        Ok(())
    }

    async fn all_entries(&self) -> WasmResult<Vec<FileEntry>> {
        let request = self.store(IdbTransactionMode::Readonly)?.get_all()?;
        let result = JsFuture::from(request_to_promise(&request)).await?;
        Ok(serde_wasm_bindgen::from_value(result)?)
    }
}

/// Bridge an IDB request's success/error callbacks into a Promise.
fn request_to_promise(request: &IdbRequest) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, reject| {
        let success_request = request.clone();
        let onsuccess = Closure::once(move || {
            let result = success_request.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        onsuccess.forget();

        let error_request = request.clone();
        let onerror = Closure::once(move || {
            let error = match error_request.error() {
                Ok(Some(dom_error)) => JsValue::from(dom_error),
                Ok(None) => JsValue::from_str("unknown IndexedDB error"),
                Err(err) => JsValue::from_str(&js_message(&err)),
            };
            let _ = reject.call1(&JsValue::NULL, &error);
        });
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    })
}

#[async_trait(?Send)]
impl FileSystemAccess for WasmFileSystem {
    async fn get_data_directory(&self) -> BridgeResult<PathBuf> {
        Ok(self.data_dir.clone())
    }

    async fn exists(&self, path: &Path) -> BridgeResult<bool> {
        Ok(self.get_entry(path).await?.is_some())
    }

    async fn create_dir_all(&self, path: &Path) -> BridgeResult<()> {
        self.ensure_directory_exists(path).await?;
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> BridgeResult<Bytes> {
        let entry = self
            .get_entry(path)
            .await?
            .ok_or_else(|| WasmError::FileNotFound(path.display().to_string()))?;

        if entry.is_directory {
            return Err(WasmError::NotAFile(path.display().to_string()).into());
        }

        let data = match entry.content.as_deref() {
            Some(content) => BASE64
                .decode(content)
                .map_err(|e| WasmError::Decode(format!("{}: {}", entry.path, e)))?,
            None => Vec::new(),
        };
        debug!(path = %entry.path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()> {
        if let Some(parent) = path.parent() {
            self.ensure_directory_exists(parent).await?;
        }

        let entry = FileEntry {
            path: Self::normalize_path(path),
            content: Some(BASE64.encode(&data)),
            size: data.len() as u64,
            modified_at: js_sys::Date::now() as i64,
            is_directory: false,
        };
        self.put_entry(&entry).await?;

        debug!(path = %entry.path, size = entry.size, "Wrote file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> BridgeResult<()> {
        let entry = self
            .get_entry(path)
            .await?
            .ok_or_else(|| WasmError::FileNotFound(path.display().to_string()))?;

        if entry.is_directory {
            return Err(WasmError::NotAFile(path.display().to_string()).into());
        }

        self.remove_entry(&entry.path).await?;
        debug!(path = %entry.path, "Deleted file");
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> BridgeResult<Vec<PathBuf>> {
        match self.get_entry(path).await? {
            Some(entry) if entry.is_directory => {}
            Some(_) => return Err(WasmError::NotADirectory(path.display().to_string()).into()),
            None => return Err(WasmError::FileNotFound(path.display().to_string()).into()),
        }

        let dir = Self::normalize_path(path);
        let prefix = if dir == "/" { dir.clone() } else { format!("{dir}/") };

        let children = self
            .all_entries()
            .await?
            .into_iter()
            .filter_map(|entry| {
                let rest = entry.path.strip_prefix(&prefix)?;
                (!rest.is_empty() && !rest.contains('/')).then(|| PathBuf::from(entry.path))
            })
            .collect();
        Ok(children)
    }
}
