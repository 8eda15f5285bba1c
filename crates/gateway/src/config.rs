use std::path::PathBuf;

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Base URL of the REST API, e.g. `http://localhost:3000/api`.
    /// `None` makes every proxied request fail with 500.
    pub upstream_url: Option<String>,
    /// `APP_ENV`; `production` marks the session cookie `Secure`.
    pub app_env: String,
    /// Directory of the built front-end served behind the page guard.
    pub static_dir: PathBuf,
    /// Timeout for one upstream call in seconds (default: `30`).
    pub upstream_timeout_secs: u64,
    /// Overall request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
}

impl GatewayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                          |
    /// |-------------------------|----------------------------------|
    /// | `HOST`                  | `0.0.0.0`                        |
    /// | `PORT`                  | `3001`                           |
    /// | `UPSTREAM_API_URL`      | value of `NEXT_PUBLIC_API_URL`   |
    /// | `APP_ENV`               | `development`                    |
    /// | `STATIC_DIR`            | `./public`                       |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                             |
    /// | `REQUEST_TIMEOUT_SECS`  | `60`                             |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let upstream_url = std::env::var("UPSTREAM_API_URL")
            .or_else(|_| std::env::var("NEXT_PUBLIC_API_URL"))
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        let static_dir = std::env::var("STATIC_DIR")
            .unwrap_or_else(|_| "./public".into())
            .into();

        let upstream_timeout_secs: u64 = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("UPSTREAM_TIMEOUT_SECS must be a valid u64");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            upstream_url,
            app_env,
            static_dir,
            upstream_timeout_secs,
            request_timeout_secs,
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}
