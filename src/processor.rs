//! Per-URL units of work, as strategies the engine is generic over.

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;

use crate::filter::{UrlFilter, get_product_url};
use crate::fetcher::dynamic::DynamicFetcher;
use crate::models::{DataSource, PageData, UrlQueueItem};
use crate::parser::Parser;

/// What one processed URL produced: items for the sink and new links for
/// the worklist.
#[derive(Debug, Clone)]
pub struct ProcessOutcome<T> {
    pub items: Vec<T>,
    pub outbound: Vec<String>,
}

/// Strategy for crawling a single page.
pub trait Processor<T>: Send + Sync {
    fn process(&self, url: &str) -> impl Future<Output = Result<ProcessOutcome<T>>> + Send;
}

/// Full-page scraping: parse the page, keep its snapshot, follow the
/// links the filter admits (typically the seed's registrable domain).
pub struct PageProcessor<D, F> {
    parser: Arc<Parser<D>>,
    filter: F,
}

impl<D, F> PageProcessor<D, F> {
    pub fn new(parser: Arc<Parser<D>>, filter: F) -> Self {
        Self { parser, filter }
    }
}

impl<D: DynamicFetcher, F: UrlFilter> Processor<PageData> for PageProcessor<D, F> {
    async fn process(&self, url: &str) -> Result<ProcessOutcome<PageData>> {
        let data = self.parser.parse(url).await?;

        let outbound = data
            .outbound_links
            .iter()
            .filter(|link| self.filter.filter(DataSource::from_url(link), link))
            .cloned()
            .collect();

        Ok(ProcessOutcome {
            items: vec![data],
            outbound,
        })
    }
}

/// Product scouting: only extract links; product-detail URLs become queue
/// items (canonicalized), every link keeps the crawl going.
pub struct ScoutProcessor<D, F> {
    parser: Arc<Parser<D>>,
    filter: F,
}

impl<D, F> ScoutProcessor<D, F> {
    pub fn new(parser: Arc<Parser<D>>, filter: F) -> Self {
        Self { parser, filter }
    }
}

impl<D: DynamicFetcher, F: UrlFilter> Processor<UrlQueueItem> for ScoutProcessor<D, F> {
    async fn process(&self, url: &str) -> Result<ProcessOutcome<UrlQueueItem>> {
        let links = self.parser.outbound_links(url).await?;

        let mut items = Vec::new();
        for link in &links {
            // Each link is classified and filtered on its own merits; the
            // referring page URL plays no part.
            let source = DataSource::from_url(link);
            if self.filter.filter(source, link) {
                let url = get_product_url(source, link).unwrap_or_else(|| link.clone());
                items.push(UrlQueueItem {
                    url,
                    domain: source.to_string(),
                });
            }
        }

        Ok(ProcessOutcome {
            items,
            outbound: links,
        })
    }
}
