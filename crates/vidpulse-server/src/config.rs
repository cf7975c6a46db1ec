//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the prediction artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// YouTube Data API settings
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Remote sentiment-inference settings
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl ServerConfig {
    /// Load configuration from file, then apply CLI and environment overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(models_dir) = &cli.models_dir {
            config.models_dir = models_dir.clone();
        }

        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            if !key.is_empty() {
                config.youtube.api_key = Some(key);
            }
        }
        if let Ok(token) = std::env::var("HF_TOKEN") {
            if !token.is_empty() {
                config.inference.token = Some(token);
            }
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            models_dir: default_models_dir(),
            youtube: YouTubeConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

/// YouTube Data API configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// API key; `YOUTUBE_API_KEY` in the environment takes precedence
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Remote sentiment-inference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Inference API base URL
    #[serde(default = "default_inference_base")]
    pub api_base: String,

    /// Model id used for sentiment analysis
    #[serde(default = "default_sentiment_model")]
    pub model: String,

    /// Bearer token; `HF_TOKEN` in the environment takes precedence
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: default_inference_base(),
            model: default_sentiment_model(),
            token: None,
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_inference_base() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_sentiment_model() -> String {
    "piyushcoderhack/Commit_analysis".to_string()
}
