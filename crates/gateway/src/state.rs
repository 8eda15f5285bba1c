use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Shared gateway state.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub http: reqwest::Client,
}

impl GatewayState {
    /// Build the state with a pooled upstream client bounded by
    /// `upstream_timeout_secs`.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// `{upstream}/{path}`, or [`GatewayError::NotConfigured`].
    pub fn upstream(&self, path: &str) -> Result<String, GatewayError> {
        let base = self
            .config
            .upstream_url
            .as_deref()
            .ok_or(GatewayError::NotConfigured)?;
        Ok(format!("{base}/{}", path.trim_start_matches('/')))
    }
}
