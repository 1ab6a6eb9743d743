use anyhow::{Context, Result};
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://help.pie.me";
pub const DEFAULT_LOCALE: &str = "en-us";
// The listing API caps page size at 100
pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_OUTPUT: &str = "help-center-sitemap.xml";
pub const DEFAULT_USER_AGENT: &str = "pie-sitemap-generator/1.0";
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Everything one sitemap run needs to know about where to read from and write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapConfig {
    pub base_url: String,
    pub locale: String,
    pub per_page: u32,
    pub output: PathBuf,
    pub user_agent: String,
    /// Upper bound on listing pages fetched in one run.
    pub max_pages: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            per_page: MAX_PER_PAGE,
            output: PathBuf::from(DEFAULT_OUTPUT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl SitemapConfig {
    /// First listing page. The locale is a single path segment, so any `/` in it is
    /// percent-encoded rather than changing the path.
    pub fn listing_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid help center base URL: {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| {
                anyhow::anyhow!("Help center base URL cannot have a path: {}", self.base_url)
            })?
            .pop_if_empty()
            .extend([
                "api",
                "v2",
                "help_center",
                self.locale.as_str(),
                "articles.json",
            ]);

        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string());
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            anyhow::bail!("--per-page must be greater than 0");
        }

        if self.per_page > MAX_PER_PAGE {
            anyhow::bail!("--per-page must be at most {}", MAX_PER_PAGE);
        }

        if self.max_pages == 0 {
            anyhow::bail!("--max-pages must be greater than 0");
        }

        if self.locale.trim().is_empty() {
            anyhow::bail!("--locale must not be empty");
        }

        if self.output.as_os_str().is_empty() {
            anyhow::bail!("--output must not be empty");
        }

        Ok(())
    }
}
