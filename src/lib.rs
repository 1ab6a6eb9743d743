pub mod args;
pub mod config;
pub mod normalize;
pub mod pager;
pub mod pipeline;
pub mod sitemap;
pub mod stats;
pub mod utils;

pub use args::Args;
pub use config::SitemapConfig;
pub use pager::{fetch_all_articles, ArticlePage, ArticleRecord, HttpPageSource, PageSource};
pub use pipeline::{generate_sitemap, print_summary, run};
pub use sitemap::SitemapEntry;
pub use stats::RunSummary;
