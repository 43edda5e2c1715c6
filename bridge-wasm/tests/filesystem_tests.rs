#![cfg(target_arch = "wasm32")]
//! Integration tests for WasmFileSystem
//!
//! Exercise the IndexedDB store the way the photo library uses it: a
//! namespace directory under the data root holding filename-keyed blobs.

use bridge_traits::storage::FileSystemAccess;
use bridge_wasm::WasmFileSystem;
use bytes::Bytes;
use std::path::PathBuf;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn test_initialization() {
    let fs = WasmFileSystem::new("gallery-test-init").await.unwrap();

    let data_dir = fs.get_data_directory().await.unwrap();
    assert_eq!(data_dir, PathBuf::from("/data"));
    assert!(fs.exists(&data_dir).await.unwrap());
}

#[wasm_bindgen_test]
async fn test_photo_write_read_delete() {
    let fs = WasmFileSystem::new("gallery-test-photos").await.unwrap();
    let photo = PathBuf::from("/data/photos/1700000000000.jpeg");

    let content = Bytes::from_static(b"/9j/4AAQSkZJRg==");
    fs.write_file(&photo, content.clone()).await.unwrap();

    assert!(fs.exists(&PathBuf::from("/data/photos")).await.unwrap());
    assert_eq!(fs.read_file(&photo).await.unwrap(), content);

    fs.delete_file(&photo).await.unwrap();
    assert!(!fs.exists(&photo).await.unwrap());

    let err = fs.read_file(&photo).await.unwrap_err();
    assert!(err.is_not_found());
}

#[wasm_bindgen_test]
async fn test_list_directory_returns_direct_children() {
    let fs = WasmFileSystem::new("gallery-test-list").await.unwrap();
    let dir = PathBuf::from("/data/photos");

    fs.write_file(&dir.join("1.jpeg"), Bytes::from("a")).await.unwrap();
    fs.write_file(&dir.join("2.png"), Bytes::from("b")).await.unwrap();
    fs.write_file(&dir.join("nested").join("3.gif"), Bytes::from("c"))
        .await
        .unwrap();

    let mut entries = fs.list_directory(&dir).await.unwrap();
    entries.sort();
    assert_eq!(
        entries,
        vec![dir.join("1.jpeg"), dir.join("2.png"), dir.join("nested")]
    );
}

#[wasm_bindgen_test]
async fn test_delete_missing_file_is_not_found() {
    let fs = WasmFileSystem::new("gallery-test-missing").await.unwrap();
    let err = fs
        .delete_file(&PathBuf::from("/data/photos/ghost.jpeg"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
