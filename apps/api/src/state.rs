use std::sync::Arc;

use crate::config::Config;
use crate::credentials::google::GoogleOAuthClient;
use crate::export::DocumentStore;
use crate::llm_client::LlmClient;
use crate::sourcing::JobSource;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub llm: LlmClient,
    pub job_source: JobSource,
    /// Also the refresher behind every exported credential.
    pub oauth: Arc<GoogleOAuthClient>,
    pub documents: Arc<dyn DocumentStore>,
    pub config: Config,
}
