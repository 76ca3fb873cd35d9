use lexrelay_core::DEFAULT_MODEL;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    pub upstream_api_key: Option<String>,
    pub default_model: String,
    pub rate_limit_per_minute: Option<u64>,
    pub api_keys: Vec<String>,
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    upstream: UpstreamSection,
    #[serde(default)]
    rate_limit: RateLimitSection,
    #[serde(default)]
    auth: AuthSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Model provider the relay forwards to.
///
/// The provider must answer with the `data: {"type":"text-delta","delta":...}`
/// line stream clients decode; the relay passes its body through unchanged.
/// An OpenAI-style `choices[].delta` stream would reach clients as an empty
/// reply.
#[derive(Debug, Deserialize)]
struct UpstreamSection {
    #[serde(default = "default_upstream_url")]
    url: String,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default = "default_model")]
    model: String,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RateLimitSection {
    #[serde(default)]
    requests_per_minute: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct AuthSection {
    #[serde(default)]
    api_keys: Vec<String>,
    #[serde(default)]
    jwt_secret: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_upstream_url() -> String {
    "http://127.0.0.1:8081/v1/chat/stream".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        match config_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::from_env()),
        }
    }

    /// Read and parse a `lexrelay.toml` file.
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
        Self::from_toml(&contents)
            .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))
    }

    /// Parse a TOML document in the `lexrelay.toml` layout.
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let parsed: FileConfig = toml::from_str(contents)?;
        Ok(Self::from_file(parsed))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn from_file(file_config: FileConfig) -> Self {
        Self {
            host: file_config.server.host,
            port: file_config.server.port,
            upstream_url: file_config.upstream.url,
            upstream_api_key: non_empty(file_config.upstream.api_key),
            default_model: file_config.upstream.model,
            rate_limit_per_minute: file_config.rate_limit.requests_per_minute,
            api_keys: clean_keys(file_config.auth.api_keys),
            jwt_secret: non_empty(file_config.auth.jwt_secret),
        }
    }

    fn from_env() -> Self {
        let host = env::var("LEXRELAY_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("LEXRELAY_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let upstream_url =
            env::var("LEXRELAY_UPSTREAM_URL").unwrap_or_else(|_| default_upstream_url());
        let upstream_api_key = non_empty(env::var("LEXRELAY_UPSTREAM_API_KEY").ok());
        let default_model = env::var("LEXRELAY_MODEL").unwrap_or_else(|_| default_model());
        let rate_limit_per_minute = env::var("LEXRELAY_RATE_LIMIT_RPM")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());
        let api_keys = env::var("LEXRELAY_API_KEYS")
            .map(|raw| clean_keys(raw.split(',').map(str::to_string).collect()))
            .unwrap_or_default();
        let jwt_secret = non_empty(env::var("LEXRELAY_JWT_SECRET").ok());

        Self {
            host,
            port,
            upstream_url,
            upstream_api_key,
            default_model,
            rate_limit_per_minute,
            api_keys,
            jwt_secret,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn clean_keys(keys: Vec<String>) -> Vec<String> {
    keys.into_iter()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}

fn config_path() -> Option<String> {
    if let Ok(path) = env::var("LEXRELAY_SERVER_CONFIG") {
        return Some(path);
    }
    Path::new("lexrelay.toml")
        .exists()
        .then(|| "lexrelay.toml".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.default_model, "gpt-5-nano");
        assert!(config.api_keys.is_empty());
        assert!(config.rate_limit_per_minute.is_none());
    }

    #[test]
    fn test_full_file() {
        let config = ServerConfig::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [upstream]
            url = "https://models.example.com/stream"
            api_key = "sk-upstream"
            model = "gpt-5"

            [rate_limit]
            requests_per_minute = 30

            [auth]
            api_keys = ["key-one", "  ", " key-two "]
            jwt_secret = ""
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.upstream_url, "https://models.example.com/stream");
        assert_eq!(config.upstream_api_key.as_deref(), Some("sk-upstream"));
        assert_eq!(config.default_model, "gpt-5");
        assert_eq!(config.rate_limit_per_minute, Some(30));
        assert_eq!(config.api_keys, vec!["key-one", "key-two"]);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ServerConfig::from_toml("[server\nport = 1").is_err());
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexrelay.toml");
        std::fs::write(&path, "[upstream]\nmodel = \"gpt-5\"\n").unwrap();

        let config = ServerConfig::from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(config.default_model, "gpt-5");
        assert_eq!(config.upstream_url, "http://127.0.0.1:8081/v1/chat/stream");
    }

    #[test]
    fn test_from_path_names_the_file_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexrelay.toml");
        std::fs::write(&path, "[rate_limit]\nrequests_per_minute = \"many\"\n").unwrap();
        let err = ServerConfig::from_path(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config"));
        assert!(err.to_string().contains("lexrelay.toml"));

        let missing = dir.path().join("absent.toml");
        let err = ServerConfig::from_path(missing.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config"));
    }
}
