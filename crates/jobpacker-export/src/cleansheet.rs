//! The JSON document Cleansheet imports into "Job Opportunities".
//!
//! Field names and nesting are fixed by the importer and must not change.

use std::path::{Path, PathBuf};

use jobpacker_core::JobPosting;
use serde::{Deserialize, Serialize};

use crate::ExportError;

/// Value of the top-level `exportType` tag.
pub const EXPORT_TYPE: &str = "jobspy_harvest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_type: String,
    pub jobs: Vec<ExportJob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub id: String,
    pub company: String,
    pub title: String,
    pub location: String,
    pub url: String,
    pub description: String,
    /// Empty when the board published no pay information.
    pub salary: String,
    /// `YYYY-MM-DD`, or null when the posting date is unknown.
    pub date_posted: Option<String>,
    pub source: String,
    pub status: String,
    pub tags: Vec<String>,
}

impl From<&JobPosting> for ExportJob {
    fn from(posting: &JobPosting) -> Self {
        Self {
            id: posting.id.clone(),
            company: posting.company.clone(),
            title: posting.title.clone(),
            location: posting.location.clone(),
            url: posting.url.clone(),
            description: posting.description.clone(),
            salary: posting.salary.clone().unwrap_or_default(),
            date_posted: posting
                .date_posted
                .map(|d| d.format("%Y-%m-%d").to_string()),
            source: posting.source.to_string(),
            status: posting.status.clone(),
            tags: posting.tags.clone(),
        }
    }
}

/// Build the export document, keeping the postings' order.
#[must_use]
pub fn to_document(postings: &[JobPosting]) -> ExportDocument {
    ExportDocument {
        export_type: EXPORT_TYPE.to_string(),
        jobs: postings.iter().map(ExportJob::from).collect(),
    }
}

/// Write `postings` to `path` as indented JSON, appending `.json` when the
/// path lacks it. Returns the path actually written.
///
/// # Errors
///
/// - [`ExportError::Empty`] when there is nothing to export.
/// - [`ExportError::Io`] when the file or its directory cannot be written.
pub fn write_export(path: &Path, postings: &[JobPosting]) -> Result<PathBuf, ExportError> {
    if postings.is_empty() {
        return Err(ExportError::Empty);
    }

    let path = with_json_extension(path);
    let body = serde_json::to_string_pretty(&to_document(postings))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    std::fs::write(&path, body).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::info!(path = %path.display(), count = postings.len(), "wrote export");
    Ok(path)
}

fn with_json_extension(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with(".json") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}
