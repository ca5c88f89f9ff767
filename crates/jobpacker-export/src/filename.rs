use std::sync::LazyLock;

use chrono::{DateTime, TimeZone};
use regex::Regex;

const FALLBACK_STEM: &str = "jobs";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]").expect("valid regex"));
static UNDERSCORE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));

/// File-name-safe stem for a search term: lowercased, anything other than
/// word characters and `-` turned into `_`, runs collapsed, edges trimmed.
/// Falls back to `jobs`.
#[must_use]
pub fn sanitize_keywords(keywords: &str) -> String {
    let lowered = keywords.trim().to_lowercase();
    let replaced = UNSAFE_CHARS.replace_all(&lowered, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    let stem = collapsed.trim_matches('_');
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// `{stem}_{YYYYMMDD_HHMMSS}{±HHMM}.json`, stamped in `now`'s own offset.
#[must_use]
pub fn default_filename<Tz>(keywords: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.json",
        sanitize_keywords(keywords),
        now.format("%Y%m%d_%H%M%S%z")
    )
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn sanitize_replaces_and_collapses() {
        assert_eq!(sanitize_keywords("Senior Python Developer"), "senior_python_developer");
        assert_eq!(sanitize_keywords("C++ / Rust  (remote)"), "c_rust_remote");
        assert_eq!(sanitize_keywords("front-end"), "front-end");
    }

    #[test]
    fn sanitize_falls_back_to_jobs() {
        assert_eq!(sanitize_keywords(""), "jobs");
        assert_eq!(sanitize_keywords("   "), "jobs");
        assert_eq!(sanitize_keywords("!!!"), "jobs");
    }

    #[test]
    fn default_filename_includes_local_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2025, 1, 15, 9, 30, 5).unwrap();
        assert_eq!(
            default_filename("data engineer", &now),
            "data_engineer_20250115_093005-0500.json"
        );
    }

    #[test]
    fn default_filename_positive_offset() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let now = offset.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();
        assert_eq!(default_filename("", &now), "jobs_20250601_230000+0100.json");
    }
}
