use vocatrack_core::attendance::{validate_required_count, DEFAULT_REQUIRED_SCANS};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub attendance: AttendanceConfig,
    pub qr: QrConfig,
    /// Minimum accepted password length at registration (default: `8`).
    pub password_min_length: usize,
}

/// Attendance rules applied when a group has no explicit requirement row.
#[derive(Debug, Clone)]
pub struct AttendanceConfig {
    pub default_required_scans: i32,
}

/// QR token issuance limits.
#[derive(Debug, Clone)]
pub struct QrConfig {
    pub default_validity_mins: i64,
    pub max_validity_mins: i64,
    /// HMAC key for signed QR payloads. Falls back to `JWT_SECRET`.
    pub signing_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `3000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:3001`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                       |
    /// | `ATTENDANCE_REQUIRED_SCANS` | `3`                        |
    /// | `QR_DEFAULT_VALIDITY_MINS`  | `60`                       |
    /// | `QR_MAX_VALIDITY_MINS`      | `1440`                     |
    /// | `QR_SIGNING_SECRET`         | value of `JWT_SECRET`      |
    /// | `PASSWORD_MIN_LENGTH`       | `8`                        |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let default_required_scans: i32 = std::env::var("ATTENDANCE_REQUIRED_SCANS")
            .unwrap_or_else(|_| DEFAULT_REQUIRED_SCANS.to_string())
            .parse()
            .expect("ATTENDANCE_REQUIRED_SCANS must be a valid i32");
        if let Err(msg) = validate_required_count(default_required_scans) {
            panic!("ATTENDANCE_REQUIRED_SCANS is out of range: {msg}");
        }

        let default_validity_mins: i64 = std::env::var("QR_DEFAULT_VALIDITY_MINS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("QR_DEFAULT_VALIDITY_MINS must be a valid i64");

        let max_validity_mins: i64 = std::env::var("QR_MAX_VALIDITY_MINS")
            .unwrap_or_else(|_| "1440".into())
            .parse()
            .expect("QR_MAX_VALIDITY_MINS must be a valid i64");
        assert!(
            default_validity_mins > 0 && default_validity_mins <= max_validity_mins,
            "QR_DEFAULT_VALIDITY_MINS must be positive and at most QR_MAX_VALIDITY_MINS"
        );

        let password_min_length: usize = std::env::var("PASSWORD_MIN_LENGTH")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("PASSWORD_MIN_LENGTH must be a valid usize");

        let jwt = JwtConfig::from_env();

        let signing_secret = std::env::var("QR_SIGNING_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| jwt.secret.clone());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            attendance: AttendanceConfig {
                default_required_scans,
            },
            qr: QrConfig {
                default_validity_mins,
                max_validity_mins,
                signing_secret,
            },
            password_min_length,
        }
    }
}
