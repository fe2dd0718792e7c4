//! Polite concurrent web crawler.
//!
//! Given one or more seed URLs, the engine performs a best-effort
//! breadth-first traversal of the reachable web graph, extracting page
//! metadata and/or scouting product-detail URLs, and persists results in
//! batches to a durable store.
//!
//! The moving parts:
//! - a generic worker pool consuming a shared worklist ([`engine`])
//! - a per-host politeness layer combining a robots.txt cache with a
//!   token-bucket rate limiter ([`domain_manager`])
//! - a visited set deduplicating URLs under concurrent access ([`visited`])
//! - a two-tier fetcher that prefers static HTTP and escalates to a
//!   headless browser when JavaScript is required ([`fetcher`], [`parser`])
//! - a batching sink that amortizes storage writes ([`engine`], [`storage`])

pub mod config;
pub mod domain_manager;
pub mod engine;
pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod models;
pub mod parser;
pub mod processor;
pub mod storage;
pub mod urlutil;
pub mod visited;

pub use config::Config;
pub use domain_manager::DomainManager;
pub use engine::{Engine, EngineConfig};
pub use extractor::{extract, extract_outbound_links};
pub use fetcher::decision::{FetchAction, decide_action};
pub use fetcher::dynamic::{BrowserFetcher, DynamicFetcher};
pub use fetcher::static_client::StaticFetcher;
pub use filter::{AlwaysFilter, InDomainFilter, ProductFilter, UrlFilter};
pub use models::{DataSource, PageData, UrlQueueItem};
pub use parser::Parser;
pub use processor::{PageProcessor, ProcessOutcome, Processor, ScoutProcessor};
pub use storage::{PageSink, ScoutSink, Sink, connect_with_retry};
pub use visited::VisitedSet;
