//! recipebox-types - Shared data types for recipebox
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no async runtime - just serde-serializable types.
//!
//! Used by:
//! - recipebox-core (fetch/cache pipeline)
//! - recipebox (CLI renderer)

pub mod models;

pub use models::Record;
