//! Batched persistence.
//!
//! The engine only knows the [`Sink`] contract; the Postgres sinks here
//! are the default implementations. Both upsert-if-absent keyed on URL
//! and expect their tables to exist already (schema migration is outside
//! this crate).

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{PageData, UrlQueueItem};

/// Batched persistence endpoint. Atomicity per batch is expected; the
/// engine tolerates (logs and drops) a failed batch.
pub trait Sink<T>: Send + Sync {
    fn save(&self, batch: &[T]) -> impl Future<Output = Result<()>> + Send;
}

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Connect to Postgres, retrying while the store comes up. Gives up after
/// [`CONNECT_ATTEMPTS`]; callers treat that as a fatal setup failure.
pub async fn connect_with_retry(database_url: &str) -> Result<PgPool> {
    for attempt in 1..=CONNECT_ATTEMPTS {
        match PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                info!("connected to database");
                return Ok(pool);
            }
            Err(e) => {
                warn!(attempt, error = %e, "waiting for database");
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
    bail!("could not connect to database after {CONNECT_ATTEMPTS} attempts")
}

/// Persists full page snapshots into `pages`.
#[derive(Debug, Clone)]
pub struct PageSink {
    pool: PgPool,
}

impl PageSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Sink<PageData> for PageSink {
    async fn save(&self, batch: &[PageData]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;
        for page in batch {
            sqlx::query(
                "INSERT INTO pages (url, title, content_text, status_code, load_time_ms, crawled_at) \
                 VALUES ($1, $2, $3, $4, $5, now()) \
                 ON CONFLICT (url) DO NOTHING",
            )
            .bind(&page.url)
            .bind(&page.title)
            .bind(&page.text_content)
            .bind(i32::from(page.status_code))
            .bind(i64::try_from(page.load_time.as_millis()).unwrap_or(i64::MAX))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert page {}", page.url))?;
        }
        tx.commit().await.context("failed to commit page batch")
    }
}

/// Persists scouted product URLs into `product_queue` with status
/// `'pending'` for the downstream per-site scrapers.
#[derive(Debug, Clone)]
pub struct ScoutSink {
    pool: PgPool,
}

impl ScoutSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Sink<UrlQueueItem> for ScoutSink {
    async fn save(&self, batch: &[UrlQueueItem]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("failed to open transaction")?;
        for item in batch {
            sqlx::query(
                "INSERT INTO product_queue (url, domain, status) \
                 VALUES ($1, $2, 'pending') \
                 ON CONFLICT (url) DO NOTHING",
            )
            .bind(&item.url)
            .bind(&item.domain)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert product URL {}", item.url))?;
        }
        tx.commit().await.context("failed to commit product batch")
    }
}
