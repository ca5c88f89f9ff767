//! Plain-text tables for stdout.

use chrono::NaiveDate;
use jobpacker_core::{AppConfig, JobPosting, Preferences, SourceId, SourceOutcome};
use jobpacker_harvest::HarvestOptions;

/// Rows shown before the table is cut off; every posting is still exported.
pub(crate) const MAX_TABLE_ROWS: usize = 50;

const TITLE_WIDTH: usize = 30;
const COMPANY_WIDTH: usize = 25;
const LOCATION_WIDTH: usize = 20;
const SOURCE_WIDTH: usize = 12;

/// Cut `s` to at most `width` characters.
pub(crate) fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// `YYYY-MM-DD`, or a dash placeholder when unknown.
fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(
        || "\u{2014}".to_string(),
        |d| d.format("%Y-%m-%d").to_string(),
    )
}

pub(crate) fn print_postings(postings: &[JobPosting]) {
    if postings.is_empty() {
        println!("no jobs found");
        return;
    }

    println!(
        "{:<5}{:<31}{:<26}{:<21}{:<13}POSTED",
        "#", "TITLE", "COMPANY", "LOCATION", "SOURCE"
    );
    for (i, posting) in postings.iter().take(MAX_TABLE_ROWS).enumerate() {
        println!(
            "{:<5}{:<31}{:<26}{:<21}{:<13}{}",
            i + 1,
            truncate(&posting.title, TITLE_WIDTH),
            truncate(&posting.company, COMPANY_WIDTH),
            truncate(&posting.location, LOCATION_WIDTH),
            truncate(posting.source.as_str(), SOURCE_WIDTH),
            fmt_date(posting.date_posted),
        );
    }
    if postings.len() > MAX_TABLE_ROWS {
        println!(
            "...and {} more (all will be exported)",
            postings.len() - MAX_TABLE_ROWS
        );
    }
}

pub(crate) fn print_outcomes(outcomes: &[SourceOutcome]) {
    println!();
    println!("{:<15}{:<10}{:>7}{:>9}  ERROR", "BOARD", "STATUS", "FOUND", "SKIPPED");
    for outcome in outcomes {
        let error = outcome
            .error
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        println!(
            "{:<15}{:<10}{:>7}{:>9}  {}",
            outcome.source.as_str(),
            outcome.status.to_string(),
            outcome.count,
            outcome.skipped,
            error
        );
    }
}

pub(crate) fn print_boards(config: &AppConfig) {
    let options = HarvestOptions::from_config(config);
    println!("{:<15}{:<12}TIMEOUT", "BOARD", "ENDPOINT");
    for source in SourceId::ALL {
        let configured = config
            .board(source)
            .is_some_and(|b| b.endpoint.is_some());
        println!(
            "{:<15}{:<12}{}s",
            source.as_str(),
            if configured { "configured" } else { "missing" },
            options.timeout_for(source).as_secs()
        );
    }
}

pub(crate) fn print_preferences(prefs: &Preferences) {
    let boards = prefs
        .job_boards
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let job_type = prefs.job_type.map_or("any", |t| t.as_str());
    println!("{:<18}{}", "default_search", prefs.default_search);
    println!("{:<18}{}", "default_location", prefs.default_location);
    println!("{:<18}{}", "results_per_site", prefs.results_per_site);
    println!("{:<18}{}", "remote_only", prefs.remote_only);
    println!("{:<18}{}", "job_type", job_type);
    println!("{:<18}{}", "job_boards", boards);
}
