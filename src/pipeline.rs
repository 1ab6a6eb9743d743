use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::time::Instant;
use tracing::info;

use crate::{
    config::SitemapConfig,
    normalize, pager,
    pager::{HttpPageSource, PageSource},
    sitemap,
    stats::RunSummary,
};

/// Validates the configuration, then generates the sitemap over HTTP.
pub fn run(config: &SitemapConfig) -> Result<RunSummary> {
    config.validate()?;
    let source = HttpPageSource::new(config)?;
    generate_sitemap(config, &source)
}

/// Fetch, normalize and serialize in one pass. The output file is only written once
/// every listing page has been fetched and decoded.
pub fn generate_sitemap(config: &SitemapConfig, source: &dyn PageSource) -> Result<RunSummary> {
    generate_sitemap_on(config, source, Utc::now().date_naive())
}

pub fn generate_sitemap_on(
    config: &SitemapConfig,
    source: &dyn PageSource,
    today: NaiveDate,
) -> Result<RunSummary> {
    let total_start_time = Instant::now();
    info!(
        action = "start",
        component = "pipeline",
        base_url = %config.base_url,
        locale = %config.locale,
        output = ?config.output,
        "Starting sitemap generation"
    );

    let fetched = pager::fetch_all_articles(source, config)?;
    let normalized = normalize::normalize_articles(&fetched.articles, today);
    let urls_written = sitemap::write_sitemap(&config.output, &normalized.entries)?;

    info!(
        action = "complete",
        component = "pipeline",
        urls_written,
        duration_ms = total_start_time.elapsed().as_millis(),
        "Sitemap generation completed"
    );

    Ok(RunSummary {
        output: config.output.clone(),
        pages_fetched: fetched.pages_fetched,
        articles_seen: fetched.articles.len(),
        records_skipped: normalized.skipped,
        duplicates: normalized.duplicates,
        urls_written,
    })
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", summary.console_line());
}
