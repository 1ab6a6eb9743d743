//! Sitemap serialization.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://help.pie.me/hc/en-us/articles/1</loc>
//!     <lastmod>2025-06-29</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.6</priority>
//!   </url>
//! </urlset>
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tracing::info;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const CHANGEFREQ: &str = "weekly";
const PRIORITY: &str = "0.6";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub url: String,
    pub lastmod: NaiveDate,
}

/// Renders the full document in memory, entries ordered by URL.
pub fn render_sitemap(entries: &[SitemapEntry]) -> Result<Vec<u8>> {
    let mut sorted: Vec<&SitemapEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.url.cmp(&b.url));

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::with_capacity(4096)), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    writer
        .create_element("urlset")
        .with_attribute(("xmlns", SITEMAP_NS))
        .write_inner_content(|w| {
            for entry in &sorted {
                let lastmod = entry.lastmod.format("%Y-%m-%d").to_string();
                w.create_element("url").write_inner_content(|w| {
                    w.create_element("loc")
                        .write_text_content(BytesText::new(&entry.url))?;
                    w.create_element("lastmod")
                        .write_text_content(BytesText::new(&lastmod))?;
                    w.create_element("changefreq")
                        .write_text_content(BytesText::new(CHANGEFREQ))?;
                    w.create_element("priority")
                        .write_text_content(BytesText::new(PRIORITY))?;
                    Ok(())
                })?;
            }
            Ok(())
        })
        .context("Failed to write sitemap body")?;

    let mut xml = writer.into_inner().into_inner();
    xml.push(b'\n');
    Ok(xml)
}

/// Writes the sitemap and returns the number of URLs in it. Nothing touches `path`
/// until the document has been fully rendered.
pub fn write_sitemap(path: &Path, entries: &[SitemapEntry]) -> Result<usize> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "serializer",
        entry_count = entries.len(),
        "Rendering sitemap"
    );

    let xml = render_sitemap(entries)?;
    fs::write(path, &xml)
        .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

    info!(
        action = "complete",
        component = "serializer",
        file_path = ?path,
        bytes = xml.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Sitemap written"
    );

    Ok(entries.len())
}
