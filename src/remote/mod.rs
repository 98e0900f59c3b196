//! Sheet sources: where the raw CSV text comes from.
//!
//! This module provides:
//! - `SheetSource` trait abstracting the fetch collaborator
//! - `HttpSheetSource` for published Google Sheet CSV exports
//! - `FileSheetSource` for a CSV file on disk

pub mod file;
pub mod http;

use thiserror::Error;

pub use file::FileSheetSource;
pub use http::HttpSheetSource;

/// Why a sheet could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch sheet: HTTP {code} {reason}")]
    Status { code: u16, reason: String },

    #[error("failed to fetch sheet: {0}")]
    Transport(String),

    #[error("failed to read sheet file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Something that can produce the CSV text of the sheet.
pub trait SheetSource: Send + Sync {
    /// Fetch the full CSV body.
    fn fetch(&self) -> Result<String, FetchError>;

    /// Human-readable origin, shown in the header and logs.
    fn describe(&self) -> String;
}
