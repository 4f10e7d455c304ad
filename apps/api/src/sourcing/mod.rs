//! Job Sourcing: fetches postings from the configured provider and normalizes them.
//!
//! Provider trouble is never the caller's problem: a missing key, a network
//! error or a bad payload all end in the curated sample set. The only error a
//! caller can see is its own malformed query.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::job::{JobPosting, JobQuery};

pub mod country;
pub mod fallback;
pub mod handlers;
pub mod jsearch;

#[derive(Debug, Error)]
pub enum SourcingError {
    #[error("Job title is required")]
    MissingTitle,

    /// Internal only; `JobSource` turns this into the sample fallback.
    #[error("Job search provider unavailable: {0}")]
    ProviderUnavailable(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// One request to the provider, results already normalized.
    async fn search(&self, query: &JobQuery) -> Result<Vec<JobPosting>, SourcingError>;
}

#[derive(Clone)]
pub struct JobSource {
    provider: Option<Arc<dyn SearchProvider>>,
}

impl JobSource {
    pub fn new(provider: Option<Arc<dyn SearchProvider>>) -> Self {
        Self { provider }
    }

    /// Enables JSearch only when it is the selected provider and a key is set.
    pub fn from_config(config: &Config) -> Self {
        let provider: Option<Arc<dyn SearchProvider>> = match (
            config.job_search_provider.as_str(),
            config.job_search_api_key.as_ref(),
        ) {
            ("jsearch", Some(key)) => match jsearch::JSearchClient::new(
                key.clone(),
                config.job_search_host.clone(),
                Duration::from_secs(config.job_search_timeout_secs),
            ) {
                Ok(client) => Some(Arc::new(client) as Arc<dyn SearchProvider>),
                Err(e) => {
                    warn!("JSearch client could not be built, using sample postings: {e}");
                    None
                }
            },
            _ => None,
        };

        match &provider {
            Some(p) => info!("Job search provider: {}", p.name()),
            None => info!("No job search provider configured; serving sample postings"),
        }
        Self::new(provider)
    }

    pub async fn fetch_postings(&self, query: &JobQuery) -> Result<Vec<JobPosting>, SourcingError> {
        if query.title.trim().is_empty() {
            return Err(SourcingError::MissingTitle);
        }

        let mut postings = match &self.provider {
            Some(provider) => match provider.search(query).await {
                Ok(postings) => {
                    info!(
                        "{} returned {} postings for '{}'",
                        provider.name(),
                        postings.len(),
                        query.title
                    );
                    postings
                }
                Err(e) => {
                    warn!("{} failed, falling back to sample postings: {e}", provider.name());
                    fallback::sample_postings(query)
                }
            },
            None => fallback::sample_postings(query),
        };

        // Scoring is a separate step.
        for posting in &mut postings {
            posting.match_score = None;
        }
        Ok(postings)
    }
}
