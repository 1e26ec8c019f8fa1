/// Configuration for Serving
///
/// The transport a server runs on is chosen from environment variables:
///
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "stdio")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker threads (default: CPU count, max 16)
/// - MAX_IN_FLIGHT: Concurrent invocations on stdio (default: 64)
///
/// Values are read through a lookup function so the parsing can be exercised
/// without touching the process environment.

use crate::core::error::{Result, ToolServerError};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: default_workers(),
        }
    }
}

/// Channel a server is served on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// Newline-delimited JSON on stdin/stdout
    Stdio { max_in_flight: usize },
    /// JSON-RPC over HTTP POST
    Http(HttpConfig),
    /// Stdio in the background, HTTP in the foreground
    Both {
        max_in_flight: usize,
        http: HttpConfig,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Stdio {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl TransportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a transport configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = lookup("MCP_TRANSPORT_MODE").unwrap_or_else(|| "stdio".to_string());
        let max_in_flight = parse_var(&lookup, "MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT)?;
        if max_in_flight == 0 {
            return Err(ToolServerError::Configuration(
                "MAX_IN_FLIGHT must be at least 1".to_string(),
            ));
        }

        match mode.as_str() {
            "stdio" => Ok(Self::Stdio { max_in_flight }),
            "http" => Ok(Self::Http(http_from_lookup(&lookup)?)),
            "both" => Ok(Self::Both {
                max_in_flight,
                http: http_from_lookup(&lookup)?,
            }),
            other => Err(ToolServerError::Configuration(format!(
                "invalid transport mode '{}'. Must be 'stdio', 'http', or 'both'",
                other
            ))),
        }
    }
}

fn http_from_lookup<F>(lookup: &F) -> Result<HttpConfig>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(HttpConfig {
        host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: parse_var(lookup, "PORT", DEFAULT_PORT)?,
        workers: parse_var(lookup, "WORKER_THREADS", default_workers())?.max(1),
    })
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            ToolServerError::Configuration(format!("{} has an invalid value: {:?}", key, raw))
        }),
    }
}

/// Worker thread count: CPU count, capped at 16 to avoid excessive context
/// switching.
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, 16)
}

/// Get environment variable value with a default fallback.
pub fn get_env_var(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
