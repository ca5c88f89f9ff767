//! Mapping from board-shaped [`RawResult`]s to canonical [`JobPosting`]s.
//!
//! Each board gets an explicit alias table; nothing is discovered at runtime.
//! Missing fields degrade to empty strings or `None`. A record with neither a
//! title nor a company is dropped.

use chrono::{DateTime, NaiveDate};
use jobpacker_core::{JobPosting, SourceId, DEFAULT_STATUS};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::adapter::RawResult;

/// Hex characters of the SHA-256 digest kept in derived ids.
const DERIVED_ID_HEX_LEN: usize = 16;

/// Field aliases for one board, most specific first.
struct FieldMap {
    id: &'static [&'static str],
    title: &'static [&'static str],
    company: &'static [&'static str],
    location: &'static [&'static str],
    url: &'static [&'static str],
    description: &'static [&'static str],
    salary: &'static [&'static str],
    min_amount: &'static [&'static str],
    max_amount: &'static [&'static str],
    date_posted: &'static [&'static str],
    is_remote: &'static [&'static str],
}

const INDEED: FieldMap = FieldMap {
    id: &["jobkey", "id"],
    title: &["title", "job_title"],
    company: &["company", "company_name"],
    location: &["location", "formatted_location"],
    url: &["job_url", "url", "job_url_direct"],
    description: &["description", "snippet"],
    salary: &["salary", "salary_text"],
    min_amount: &["min_amount"],
    max_amount: &["max_amount"],
    date_posted: &["date_posted", "pub_date"],
    is_remote: &["is_remote"],
};

const LINKEDIN: FieldMap = FieldMap {
    id: &["job_id", "id"],
    title: &["title", "job_title"],
    company: &["company", "company_name"],
    location: &["location"],
    url: &["job_url", "url"],
    description: &["description"],
    salary: &["salary"],
    min_amount: &["min_amount"],
    max_amount: &["max_amount"],
    date_posted: &["date_posted", "listed_at"],
    is_remote: &["is_remote", "workplace_remote"],
};

const GLASSDOOR: FieldMap = FieldMap {
    id: &["listing_id", "id"],
    title: &["title", "job_title"],
    company: &["company", "employer_name"],
    location: &["location", "location_name"],
    url: &["job_url", "url", "seo_job_link"],
    description: &["description"],
    salary: &["salary", "pay_text"],
    min_amount: &["min_amount", "pay_min"],
    max_amount: &["max_amount", "pay_max"],
    date_posted: &["date_posted"],
    is_remote: &["is_remote"],
};

const ZIP_RECRUITER: FieldMap = FieldMap {
    id: &["listing_key", "id"],
    title: &["title", "name"],
    company: &["company", "hiring_company"],
    location: &["location"],
    url: &["job_url", "url"],
    description: &["description", "job_description"],
    salary: &["salary"],
    min_amount: &["min_amount", "compensation_min"],
    max_amount: &["max_amount", "compensation_max"],
    date_posted: &["date_posted", "posted_time"],
    is_remote: &["is_remote"],
};

// Google Jobs identifiers are session-scoped, so none are reused.
const GOOGLE: FieldMap = FieldMap {
    id: &[],
    title: &["title"],
    company: &["company", "company_name"],
    location: &["location"],
    url: &["job_url", "share_link", "url"],
    description: &["description"],
    salary: &["salary"],
    min_amount: &["min_amount"],
    max_amount: &["max_amount"],
    date_posted: &["date_posted"],
    is_remote: &["is_remote"],
};

fn field_map(source: SourceId) -> &'static FieldMap {
    match source {
        SourceId::Indeed => &INDEED,
        SourceId::LinkedIn => &LINKEDIN,
        SourceId::Glassdoor => &GLASSDOOR,
        SourceId::ZipRecruiter => &ZIP_RECRUITER,
        SourceId::Google => &GOOGLE,
    }
}

/// Normalize one raw record. Returns `None` (and logs) for records with
/// neither a title nor a company.
#[must_use]
pub fn normalize(source: SourceId, raw: &RawResult) -> Option<JobPosting> {
    let map = field_map(source);

    let title = text_field(raw, map.title);
    let company = text_field(raw, map.company);
    if title.is_empty() && company.is_empty() {
        tracing::debug!(source = %source, "skipping record with neither title nor company");
        return None;
    }

    let mut location = raw.first(map.location).map(location_text).unwrap_or_default();
    if location.is_empty() && raw.first(map.is_remote).and_then(Value::as_bool) == Some(true) {
        location = "Remote".to_string();
    }

    let url = raw
        .first(map.url)
        .and_then(value_as_string)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let description = raw
        .first(map.description)
        .and_then(value_as_string)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let salary = raw
        .first(map.salary)
        .and_then(value_as_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            format_salary(
                raw.first(map.min_amount).and_then(value_as_amount),
                raw.first(map.max_amount).and_then(value_as_amount),
            )
        });

    let date_posted = raw.first(map.date_posted).and_then(parse_date);

    let natural_id = raw
        .first(map.id)
        .and_then(value_as_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let id = match natural_id {
        Some(natural) => format!("{source}-{natural}"),
        None => derive_id(source, &url, &title, &company, &location),
    };

    Some(JobPosting {
        id,
        title,
        company,
        location,
        url,
        description,
        salary,
        date_posted,
        source,
        status: DEFAULT_STATUS.to_string(),
        tags: Vec::new(),
        rank: 0,
    })
}

/// Normalize a board's whole response, recording each posting's relevance
/// rank. Returns the postings and the number of skipped records.
#[must_use]
pub fn normalize_all(source: SourceId, raws: &[RawResult]) -> (Vec<JobPosting>, usize) {
    let mut postings = Vec::with_capacity(raws.len());
    let mut skipped = 0usize;
    for (position, raw) in raws.iter().enumerate() {
        match normalize(source, raw) {
            Some(mut posting) => {
                posting.rank = u32::try_from(position).unwrap_or(u32::MAX);
                postings.push(posting);
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(source = %source, skipped, kept = postings.len(), "normalization skipped records");
    }
    (postings, skipped)
}

/// Deterministic id from the listing URL, or from title/company/location
/// when the URL is empty.
#[must_use]
pub fn derive_id(source: SourceId, url: &str, title: &str, company: &str, location: &str) -> String {
    let material = if url.is_empty() {
        format!(
            "{source}\u{1f}{}\u{1f}{}\u{1f}{}",
            fold(title),
            fold(company),
            fold(location)
        )
    } else {
        format!("{source}\u{1f}{url}")
    };
    let digest = format!("{:x}", Sha256::digest(material.as_bytes()));
    format!("{source}-{}", &digest[..DERIVED_ID_HEX_LEN])
}

/// Lowercase and collapse whitespace.
fn fold(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn text_field(raw: &RawResult, keys: &[&str]) -> String {
    raw.first(keys)
        .and_then(value_as_string)
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Strings as-is, numbers and booleans via their JSON text.
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Locations arrive either as text or as `{city, state, country}` objects.
fn location_text(value: &Value) -> String {
    match value {
        Value::Object(parts) => ["city", "state", "country"]
            .iter()
            .filter_map(|k| parts.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => value_as_string(other)
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default(),
    }
}

/// A finite, non-negative amount from a number or numeric string.
fn value_as_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// `$100,000 - $150,000`, `$80,000+`, or `Up to $120,000`.
#[must_use]
pub fn format_salary(min: Option<f64>, max: Option<f64>) -> Option<String> {
    match (min, max) {
        (Some(lo), Some(hi)) => Some(format!("${} - ${}", group_thousands(lo), group_thousands(hi))),
        (Some(lo), None) => Some(format!("${}+", group_thousands(lo))),
        (None, Some(hi)) => Some(format!("Up to ${}", group_thousands(hi))),
        (None, None) => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn group_thousands(amount: f64) -> String {
    let digits = (amount.trunc() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Accepts `YYYY-MM-DD`, RFC 3339, a string starting with `YYYY-MM-DD`, or
/// Unix epoch seconds/milliseconds.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(date);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.date_naive());
            }
            s.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything past year 5138 in seconds is treated as milliseconds.
            let secs = if raw.abs() >= 100_000_000_000 {
                raw / 1000
            } else {
                raw
            };
            DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawResult {
        RawResult::from_json(value).expect("fixture must be an object")
    }

    fn jobspy_record() -> RawResult {
        raw(json!({
            "title": "Senior Python Developer",
            "company": "Tech Corp",
            "location": "San Francisco, CA",
            "job_url": "https://example.com/job/123",
            "description": "Looking for a senior Python developer...",
            "date_posted": "2025-01-15",
            "min_amount": 120000,
            "max_amount": 180000
        }))
    }

    #[test]
    fn normalize_maps_common_fields() {
        let posting = normalize(SourceId::Indeed, &jobspy_record()).unwrap();
        assert_eq!(posting.title, "Senior Python Developer");
        assert_eq!(posting.company, "Tech Corp");
        assert_eq!(posting.location, "San Francisco, CA");
        assert_eq!(posting.url, "https://example.com/job/123");
        assert_eq!(posting.salary.as_deref(), Some("$120,000 - $180,000"));
        assert_eq!(posting.date_posted, NaiveDate::from_ymd_opt(2025, 1, 15));
        assert_eq!(posting.source, SourceId::Indeed);
        assert_eq!(posting.status, "Saved");
        assert!(posting.tags.is_empty());
    }

    #[test]
    fn normalize_uses_board_specific_aliases() {
        let record = raw(json!({
            "listing_id": 9931,
            "job_title": "Data Engineer",
            "employer_name": "Data Inc",
            "location_name": "Remote",
            "seo_job_link": "https://glassdoor.example/job/9931",
            "pay_min": "100,000",
            "pay_max": 150000.0
        }));
        let posting = normalize(SourceId::Glassdoor, &record).unwrap();
        assert_eq!(posting.id, "glassdoor-9931");
        assert_eq!(posting.company, "Data Inc");
        assert_eq!(posting.url, "https://glassdoor.example/job/9931");
        assert_eq!(posting.salary.as_deref(), Some("$100,000 - $150,000"));
    }

    #[test]
    fn normalize_drops_record_without_title_and_company() {
        let record = raw(json!({"location": "Austin, TX", "job_url": "https://x.test/1"}));
        assert!(normalize(SourceId::Indeed, &record).is_none());
    }

    #[test]
    fn normalize_keeps_record_with_only_company() {
        let record = raw(json!({"company": "StartupXYZ"}));
        let posting = normalize(SourceId::LinkedIn, &record).unwrap();
        assert_eq!(posting.title, "");
        assert_eq!(posting.location, "");
        assert_eq!(posting.url, "");
        assert!(posting.salary.is_none());
        assert!(posting.date_posted.is_none());
    }

    #[test]
    fn derived_id_is_stable_across_runs() {
        let record = jobspy_record();
        let first = normalize(SourceId::Google, &record).unwrap();
        let second = normalize(SourceId::Google, &record).unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.id.starts_with("google-"));
        assert_eq!(first.id.len(), "google-".len() + DERIVED_ID_HEX_LEN);
    }

    #[test]
    fn derived_id_depends_on_source_and_url() {
        let a = derive_id(SourceId::Indeed, "https://x.test/1", "", "", "");
        let b = derive_id(SourceId::LinkedIn, "https://x.test/1", "", "", "");
        let c = derive_id(SourceId::Indeed, "https://x.test/2", "", "", "");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn derived_id_without_url_ignores_case_and_spacing() {
        let a = derive_id(SourceId::Indeed, "", "Rust  Engineer", "Acme", "Austin, TX");
        let b = derive_id(SourceId::Indeed, "", "rust engineer", "ACME", "austin, tx");
        assert_eq!(a, b);
    }

    #[test]
    fn natural_id_wins_over_derived() {
        let record = raw(json!({"jobkey": "abc123", "title": "Engineer", "job_url": "https://x.test/1"}));
        assert_eq!(normalize(SourceId::Indeed, &record).unwrap().id, "indeed-abc123");
    }

    #[test]
    fn google_never_reuses_upstream_id() {
        let record = raw(json!({"id": "session-xyz", "title": "Engineer", "job_url": "https://x.test/1"}));
        let posting = normalize(SourceId::Google, &record).unwrap();
        assert_ne!(posting.id, "google-session-xyz");
    }

    #[test]
    fn structured_location_and_remote_flag() {
        let record = raw(json!({
            "title": "Engineer",
            "location": {"city": "Austin", "state": "TX", "country": ""}
        }));
        assert_eq!(
            normalize(SourceId::Indeed, &record).unwrap().location,
            "Austin, TX"
        );

        let remote = raw(json!({"title": "Engineer", "is_remote": true}));
        assert_eq!(normalize(SourceId::Indeed, &remote).unwrap().location, "Remote");
    }

    #[test]
    fn text_salary_wins_over_amounts() {
        let record = raw(json!({"title": "Engineer", "salary": " $50/hr ", "min_amount": 1}));
        assert_eq!(
            normalize(SourceId::Indeed, &record).unwrap().salary.as_deref(),
            Some("$50/hr")
        );
    }

    #[test]
    fn format_salary_variants() {
        assert_eq!(format_salary(Some(80_000.0), None).as_deref(), Some("$80,000+"));
        assert_eq!(
            format_salary(None, Some(120_000.0)).as_deref(),
            Some("Up to $120,000")
        );
        assert_eq!(format_salary(None, None), None);
        assert_eq!(
            format_salary(Some(999.0), Some(1_000_000.0)).as_deref(),
            Some("$999 - $1,000,000")
        );
    }

    #[test]
    fn non_numeric_amounts_are_ignored() {
        let record = raw(json!({"title": "Engineer", "min_amount": "NaN", "max_amount": "n/a"}));
        assert!(normalize(SourceId::Indeed, &record).unwrap().salary.is_none());
    }

    #[test]
    fn parse_date_accepts_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10);
        assert_eq!(parse_date(&json!("2025-01-10")), expected);
        assert_eq!(parse_date(&json!("2025-01-10T08:30:00Z")), expected);
        assert_eq!(parse_date(&json!("2025-01-10 08:30:00")), expected);
        assert_eq!(parse_date(&json!(1_736_500_000)), expected);
        assert_eq!(parse_date(&json!(1_736_500_000_000_i64)), expected);
        assert_eq!(parse_date(&json!("3 days ago")), None);
        assert_eq!(parse_date(&json!(null)), None);
    }

    #[test]
    fn normalize_all_counts_skips_and_assigns_rank() {
        let raws = vec![
            raw(json!({"title": "A"})),
            raw(json!({"location": "nowhere"})),
            raw(json!({"title": "C"})),
        ];
        let (postings, skipped) = normalize_all(SourceId::LinkedIn, &raws);
        assert_eq!(skipped, 1);
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].rank, 0);
        assert_eq!(postings[1].rank, 2);
    }
}
