use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::SitemapConfig;

/// One article as returned by the listing API. Only the fields the sitemap needs are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticleRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub html_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrOther {
    Text(String),
    Other(IgnoredAny),
}

// Any non-string JSON value decodes as `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrOther>::deserialize(deserializer)? {
        Some(StringOrOther::Text(value)) => Some(value),
        Some(StringOrOther::Other(_)) | None => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArticlePage {
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
    pub next_page: Option<String>,
}

pub trait PageSource {
    fn fetch_page(&self, url: &str) -> Result<ArticlePage>;
}

pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(config: &SitemapConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    fn fetch_page(&self, url: &str) -> Result<ArticlePage> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Listing page {} returned an error status", url))?;

        response
            .json::<ArticlePage>()
            .with_context(|| format!("Failed to decode listing page {}", url))
    }
}

#[derive(Debug, Default)]
pub struct PagerOutcome {
    pub articles: Vec<ArticleRecord>,
    pub pages_fetched: usize,
}

/// Walks the listing from the first page, following `next_page` until the server stops
/// returning one. A `next_page` that was already fetched ends the walk early.
pub fn fetch_all_articles(source: &dyn PageSource, config: &SitemapConfig) -> Result<PagerOutcome> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "pager",
        "Fetching help center article listing"
    );

    let mut outcome = PagerOutcome::default();
    let mut fetched: HashSet<String> = HashSet::new();
    let mut next_url = Some(config.listing_url()?.to_string());

    while let Some(url) = next_url.take() {
        if outcome.pages_fetched >= config.max_pages {
            anyhow::bail!(
                "Listing did not end after {} pages (next page: {})",
                config.max_pages,
                url
            );
        }

        let page_start = Instant::now();
        let page = source.fetch_page(&url)?;
        outcome.pages_fetched += 1;

        info!(
            action = "fetch",
            component = "pager",
            page = outcome.pages_fetched,
            article_count = page.articles.len(),
            url = %url,
            duration_ms = page_start.elapsed().as_millis(),
            "Fetched listing page"
        );

        outcome.articles.extend(page.articles);
        fetched.insert(url);

        next_url = match page.next_page {
            Some(next) if next.is_empty() => None,
            Some(next) if fetched.contains(&next) => {
                warn!(
                    action = "stop",
                    component = "pager",
                    next_page = %next,
                    "Listing pointed back to a page already fetched"
                );
                None
            }
            other => other,
        };
    }

    info!(
        action = "complete",
        component = "pager",
        pages_fetched = outcome.pages_fetched,
        article_count = outcome.articles.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Article listing fetched"
    );

    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory listing keyed by page URL. Records every URL requested.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pages: HashMap<String, ArticlePage>,
        pub(crate) requested: RefCell<Vec<String>>,
    }

    impl FakeSource {
        pub(crate) fn with_page(mut self, url: &str, page: ArticlePage) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }
    }

    impl PageSource for FakeSource {
        fn fetch_page(&self, url: &str) -> Result<ArticlePage> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .with_context(|| format!("no such page: {}", url))
        }
    }

    pub(crate) fn article(url: &str, updated_at: Option<&str>) -> ArticleRecord {
        ArticleRecord {
            html_url: Some(url.to_string()),
            updated_at: updated_at.map(str::to_string),
        }
    }

    pub(crate) fn first_page_url() -> String {
        SitemapConfig::default().listing_url().unwrap().to_string()
    }

    #[test]
    fn test_follows_next_page_until_exhausted() {
        let first = first_page_url();
        let source = FakeSource::default()
            .with_page(
                &first,
                ArticlePage {
                    articles: vec![article("https://h/1", None), article("https://h/2", None)],
                    next_page: Some("https://h/page/2".to_string()),
                },
            )
            .with_page(
                "https://h/page/2",
                ArticlePage {
                    articles: vec![article("https://h/3", None)],
                    next_page: Some("https://h/page/3".to_string()),
                },
            )
            .with_page(
                "https://h/page/3",
                ArticlePage {
                    articles: vec![article("https://h/4", None)],
                    next_page: None,
                },
            );

        let outcome = fetch_all_articles(&source, &SitemapConfig::default()).unwrap();

        assert_eq!(outcome.pages_fetched, 3);
        let urls: Vec<_> = outcome
            .articles
            .iter()
            .map(|a| a.html_url.as_deref().unwrap())
            .collect();
        assert_eq!(urls, ["https://h/1", "https://h/2", "https://h/3", "https://h/4"]);
        assert_eq!(
            *source.requested.borrow(),
            [first, "https://h/page/2".to_string(), "https://h/page/3".to_string()]
        );
    }

    #[test]
    fn test_empty_next_page_ends_listing() {
        let source = FakeSource::default().with_page(
            &first_page_url(),
            ArticlePage {
                articles: vec![article("https://h/1", None)],
                next_page: Some(String::new()),
            },
        );

        let outcome = fetch_all_articles(&source, &SitemapConfig::default()).unwrap();
        assert_eq!(outcome.pages_fetched, 1);
        assert_eq!(outcome.articles.len(), 1);
    }

    #[test]
    fn test_self_referential_next_page_stops() {
        let first = first_page_url();
        let source = FakeSource::default().with_page(
            &first,
            ArticlePage {
                articles: vec![article("https://h/1", None)],
                next_page: Some(first.clone()),
            },
        );

        let outcome = fetch_all_articles(&source, &SitemapConfig::default()).unwrap();
        assert_eq!(outcome.pages_fetched, 1);
        assert_eq!(source.requested.borrow().len(), 1);
    }

    #[test]
    fn test_cycle_back_to_earlier_page_stops() {
        let first = first_page_url();
        let source = FakeSource::default()
            .with_page(
                &first,
                ArticlePage {
                    articles: vec![article("https://h/1", None)],
                    next_page: Some("https://h/page/2".to_string()),
                },
            )
            .with_page(
                "https://h/page/2",
                ArticlePage {
                    articles: vec![article("https://h/2", None)],
                    next_page: Some(first.clone()),
                },
            );

        let outcome = fetch_all_articles(&source, &SitemapConfig::default()).unwrap();
        assert_eq!(outcome.pages_fetched, 2);
        assert_eq!(outcome.articles.len(), 2);
    }

    #[test]
    fn test_page_bound_is_an_error() {
        let first = first_page_url();
        let source = FakeSource::default()
            .with_page(
                &first,
                ArticlePage {
                    articles: vec![],
                    next_page: Some("https://h/page/2".to_string()),
                },
            )
            .with_page(
                "https://h/page/2",
                ArticlePage {
                    articles: vec![],
                    next_page: Some("https://h/page/3".to_string()),
                },
            );
        let config = SitemapConfig {
            max_pages: 2,
            ..SitemapConfig::default()
        };

        let err = fetch_all_articles(&source, &config).unwrap_err();
        assert!(err.to_string().contains("did not end after 2 pages"));
        assert_eq!(source.requested.borrow().len(), 2);
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let source = FakeSource::default();
        assert!(fetch_all_articles(&source, &SitemapConfig::default()).is_err());
    }

    #[test]
    fn test_page_decoding() {
        let page: ArticlePage = serde_json::from_str(
            r#"{
                "articles": [
                    {"id": 1, "html_url": "https://h/a", "updated_at": "2025-06-29T11:32:51Z", "title": "A"},
                    {"id": 2, "html_url": null},
                    {"id": 3}
                ],
                "next_page": null,
                "page_count": 1
            }"#,
        )
        .unwrap();

        assert_eq!(page.articles.len(), 3);
        assert_eq!(page.articles[0], article("https://h/a", Some("2025-06-29T11:32:51Z")));
        assert_eq!(page.articles[1], ArticleRecord::default());
        assert_eq!(page.articles[2], ArticleRecord::default());
        assert_eq!(page.next_page, None);

        let empty: ArticlePage = serde_json::from_str("{}").unwrap();
        assert!(empty.articles.is_empty());
    }

    #[test]
    fn test_page_decoding_tolerates_wrong_field_types() {
        let page: ArticlePage = serde_json::from_str(
            r#"{
                "articles": [
                    {"html_url": "https://h/a", "updated_at": 12345},
                    {"html_url": false, "updated_at": "2025-06-29T11:32:51Z"},
                    {"html_url": {"nested": true}, "updated_at": ["2025-06-29"]}
                ],
                "next_page": null
            }"#,
        )
        .unwrap();

        assert_eq!(page.articles.len(), 3);
        assert_eq!(page.articles[0], article("https://h/a", None));
        assert_eq!(page.articles[1].html_url, None);
        assert_eq!(
            page.articles[1].updated_at.as_deref(),
            Some("2025-06-29T11:32:51Z")
        );
        assert_eq!(page.articles[2], ArticleRecord::default());
    }
}
