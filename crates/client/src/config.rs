use std::time::Duration;

/// Per-request timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delays between scan submission attempts after a transport failure.
pub const DEFAULT_SCAN_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_millis(500),
    Duration::from_secs(1),
    Duration::from_secs(2),
];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base including the `/api` prefix, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    pub request_timeout: Duration,
    pub scan_retry_delays: Vec<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            scan_retry_delays: DEFAULT_SCAN_RETRY_DELAYS.to_vec(),
        }
    }

    /// `VOCATRACK_API_URL` (default `http://localhost:3000/api`) and
    /// `VOCATRACK_REQUEST_TIMEOUT_SECS` (default `10`).
    pub fn from_env() -> Self {
        let base_url = std::env::var("VOCATRACK_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api".into());
        let mut config = Self::new(base_url);
        if let Some(secs) = std::env::var("VOCATRACK_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_scan_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.scan_retry_delays = delays;
        self
    }
}
