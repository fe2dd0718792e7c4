//! Plain HTTP fetching.

use std::time::Duration;

use super::FetchError;

/// Total deadline for one static GET, connect through body.
const STATIC_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper over a pre-configured `reqwest::Client`.
///
/// One instance is built per crawler and shared across workers; reqwest
/// pools connections internally.
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: reqwest::Client,
}

impl StaticFetcher {
    /// Build a client that identifies itself as `user_agent` on every
    /// request and gives up after [`STATIC_FETCH_TIMEOUT`].
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(STATIC_FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Single GET. Redirects follow reqwest's default policy. The caller
    /// owns the response and its body stream.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        Ok(self.client.get(url).send().await?)
    }
}
