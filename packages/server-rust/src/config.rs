//! Process configuration, read from flags or `FIELDKIT_*` environment
//! variables.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::network::NetworkConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "fieldkit-server", version, about = "Serves list filters and item validation over HTTP")]
pub struct ServerConfig {
    #[arg(long, env = "FIELDKIT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "FIELDKIT_PORT", default_value_t = 8080)]
    pub port: u16,

    /// JSON document describing every list and its fields.
    #[arg(long, env = "FIELDKIT_SCHEMA")]
    pub schema: PathBuf,

    /// GraphQL endpoint of the item backend. Item endpoints answer 503
    /// without it.
    #[arg(long, env = "FIELDKIT_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Applies to inbound requests and to backend calls.
    #[arg(long, env = "FIELDKIT_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "FIELDKIT_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,

    #[arg(
        long,
        env = "FIELDKIT_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "*"
    )]
    pub cors_origins: Vec<String>,

    #[arg(long, env = "FIELDKIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn network(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            request_timeout: self.request_timeout(),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let config = ServerConfig::try_parse_from(["fieldkit-server", "--schema", "lists.json"]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.schema, PathBuf::from("lists.json"));
        assert!(config.backend_url.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);

        let network = config.network();
        assert_eq!(network.host, "0.0.0.0");
        assert_eq!(network.cors_origins, vec!["*"]);
        assert_eq!(network.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "fieldkit-server",
            "--schema",
            "lists.json",
            "--port",
            "9000",
            "--backend-url",
            "http://localhost:3000/api/graphql",
            "--cors-origins",
            "http://a.test,http://b.test",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:3000/api/graphql"));
        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn schema_is_required() {
        assert!(ServerConfig::try_parse_from(["fieldkit-server"]).is_err());
    }
}
