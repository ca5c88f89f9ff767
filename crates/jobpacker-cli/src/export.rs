use std::path::{Path, PathBuf};

use chrono::Local;
use jobpacker_core::SessionStore;
use jobpacker_export::{default_filename, write_export};

/// Export the postings of the last saved search.
///
/// # Errors
///
/// Returns an error if the session file cannot be read or the export cannot
/// be written.
pub(crate) fn run_export(store: &SessionStore, output: Option<&Path>) -> anyhow::Result<()> {
    let Some(run) = store.load_last_run()? else {
        println!("no jobs to export; run `jobpacker search` first");
        return Ok(());
    };
    let postings = &run.result.postings;
    if postings.is_empty() {
        println!("no jobs to export; the last search found nothing");
        return Ok(());
    }

    let path = output.map_or_else(
        || PathBuf::from(default_filename(&run.keywords, &Local::now())),
        Path::to_path_buf,
    );
    let written = write_export(&path, postings)?;
    println!("exported {} jobs to {}", postings.len(), written.display());
    println!("import this file into Cleansheet Job Opportunities");
    Ok(())
}
