//! Shared application state

use crate::config::ServerConfig;
use crate::sentiment::{HfSentimentClient, SentimentBackend};
use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{info, warn};
use vidpulse_classifiers::{CommitClassifier, ModelBundle};
use vidpulse_youtube::YouTubeClient;

/// Application state shared across all requests.
///
/// Everything here is populated once at startup and never mutated; concurrent
/// handlers only ever read through the `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Prediction artifacts (best-effort loaded)
    pub bundle: Arc<ModelBundle>,

    /// Keyword commit classifier
    pub commit_classifier: Arc<CommitClassifier>,

    /// Remote sentiment backend, absent without a token
    pub sentiment: Option<Arc<dyn SentimentBackend>>,

    /// YouTube Data API client, absent without an API key
    pub youtube: Option<Arc<YouTubeClient>>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!(models_dir = %config.models_dir, "loading prediction artifacts");
        let bundle = ModelBundle::load(&config.models_dir);
        let status = bundle.status();
        info!(
            vectorizer = status.vectorizer,
            classifier = status.classifier,
            label_decoder = status.label_decoder,
            "artifact load complete"
        );
        if !status.ready() {
            warn!("prediction pipeline is not ready; comment analysis will fail until restart");
        }

        let commit_classifier = CommitClassifier::new()?;

        let sentiment: Option<Arc<dyn SentimentBackend>> = match &config.inference.token {
            Some(token) => {
                let client = HfSentimentClient::with_api_base(
                    token.as_str(),
                    config.inference.model.as_str(),
                    config.inference.api_base.as_str(),
                )?;
                Some(Arc::new(client))
            }
            None => {
                warn!("no inference token configured; sentiment endpoints will be unavailable");
                None
            }
        };

        let youtube = match &config.youtube.api_key {
            Some(key) if !key.is_empty() => Some(Arc::new(YouTubeClient::new(key.as_str())?)),
            _ => {
                warn!("no YouTube API key configured; video endpoints will be unavailable");
                None
            }
        };

        Ok(Self {
            config: Arc::new(config),
            bundle: Arc::new(bundle),
            commit_classifier: Arc::new(commit_classifier),
            sentiment,
            youtube,
            metrics_handle,
        })
    }
}
