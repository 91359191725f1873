use std::time::Duration;

/// Base URL used when `SUBTITLER_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Chunk size used to stream upload bodies when not overridden.
pub const DEFAULT_UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Gateway configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the subtitle service, without a trailing slash.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
    /// Upload bodies are streamed in chunks of this size; progress is
    /// reported once per chunk.
    pub upload_chunk_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            upload_chunk_bytes: DEFAULT_UPLOAD_CHUNK_BYTES,
        }
    }
}

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `SUBTITLER_API_URL`              | `http://localhost:8000` |
    /// | `SUBTITLER_REQUEST_TIMEOUT_SECS` | unset (no timeout)      |
    /// | `SUBTITLER_UPLOAD_CHUNK_BYTES`   | `65536`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("SUBTITLER_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout = match lookup("SUBTITLER_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_var(
                "SUBTITLER_REQUEST_TIMEOUT_SECS",
                &raw,
                "a whole number of seconds",
            )?)),
            None => None,
        };

        let upload_chunk_bytes = match lookup("SUBTITLER_UPLOAD_CHUNK_BYTES") {
            Some(raw) => {
                let bytes: usize =
                    parse_var("SUBTITLER_UPLOAD_CHUNK_BYTES", &raw, "a positive byte count")?;
                if bytes == 0 {
                    return Err(ConfigError {
                        var: "SUBTITLER_UPLOAD_CHUNK_BYTES",
                        value: raw,
                        expected: "a positive byte count",
                    });
                }
                bytes
            }
            None => DEFAULT_UPLOAD_CHUNK_BYTES,
        };

        Ok(Self {
            base_url,
            request_timeout,
            upload_chunk_bytes,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    raw: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError {
        var,
        value: raw.to_string(),
        expected,
    })
}
