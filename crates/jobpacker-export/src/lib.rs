//! Cleansheet "Job Opportunities" export of harvested postings.

pub mod cleansheet;
pub mod filename;

pub use cleansheet::{to_document, write_export, ExportDocument, ExportJob, EXPORT_TYPE};
pub use filename::{default_filename, sanitize_keywords};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no postings to export")]
    Empty,

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}
