use clap::Parser;
use std::path::PathBuf;

use crate::config::{self, SitemapConfig};

#[derive(Parser, Debug)]
#[command(
    name = "pie-sitemap",
    about = "Build a sitemap of every public help center article",
    version,
    long_about = None
)]
pub struct Args {
    /// Help center base URL
    #[arg(long, default_value = config::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Help center locale to list articles for
    #[arg(short, long, default_value = config::DEFAULT_LOCALE)]
    pub locale: String,

    /// Articles requested per listing page
    #[arg(long, default_value_t = config::MAX_PER_PAGE)]
    pub per_page: u32,

    /// Sitemap file to write
    #[arg(short, long, default_value = config::DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Stop with an error after fetching this many listing pages
    #[arg(long, default_value_t = config::DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn to_config(&self) -> SitemapConfig {
        SitemapConfig {
            base_url: self.base_url.clone(),
            locale: self.locale.clone(),
            per_page: self.per_page,
            output: self.output.clone(),
            max_pages: self.max_pages,
            ..SitemapConfig::default()
        }
    }
}
