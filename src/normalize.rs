use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::pager::ArticleRecord;
use crate::sitemap::SitemapEntry;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Default)]
pub struct Normalized {
    pub entries: Vec<SitemapEntry>,
    /// Records without a usable `html_url`.
    pub skipped: usize,
    pub duplicates: usize,
}

/// Calendar date of an ISO-8601 timestamp, or `today` when there is nothing parsable.
///
/// Timestamps with an offset keep the date in that offset; they are not shifted to UTC.
pub fn lastmod_for(updated_at: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(raw) = updated_at.filter(|s| !s.is_empty()) else {
        return today;
    };

    let value = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };

    parse_iso_date(&value).unwrap_or_else(|| {
        debug!(
            action = "fallback",
            component = "normalizer",
            updated_at = raw,
            "Unparsable timestamp, using today's date"
        );
        today
    })
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.date_naive());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn normalize_articles(records: &[ArticleRecord], today: NaiveDate) -> Normalized {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "normalizer",
        record_count = records.len(),
        "Normalizing article records"
    );

    let mut result = Normalized::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for record in records {
        let Some(url) = record.html_url.as_deref().filter(|u| !u.is_empty()) else {
            result.skipped += 1;
            continue;
        };

        // First occurrence wins
        if !seen.insert(url) {
            result.duplicates += 1;
            continue;
        }

        result.entries.push(SitemapEntry {
            url: url.to_string(),
            lastmod: lastmod_for(record.updated_at.as_deref(), today),
        });
    }

    info!(
        action = "complete",
        component = "normalizer",
        entry_count = result.entries.len(),
        skipped = result.skipped,
        duplicates = result.duplicates,
        duration_ms = start_time.elapsed().as_millis(),
        "Article records normalized"
    );

    result
}
