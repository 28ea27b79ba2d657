//! Data models shared across recipebox crates

pub mod record;

pub use record::Record;
