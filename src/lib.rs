//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `gallery-workspace` and
//! pick `desktop-shims` or `wasm` without wiring `core-service` themselves.
