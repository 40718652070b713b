use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Mock resource store listener.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Where the mock store keeps its JSON collections.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Load the bundled seed users/records into empty collections.
    #[serde(default = "default_true")]
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), seed: true }
    }
}

impl StoreConfig {
    pub fn records_path(&self) -> String { format!("{}/records.json", self.data_dir.trim_end_matches('/')) }
    pub fn users_path(&self) -> String { format!("{}/users.json", self.data_dir.trim_end_matches('/')) }
}

/// Settings for the `tracker` front end talking to the resource store.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_session_file")]
    pub session_file: String,
    #[serde(default = "default_profile_poll_ms")]
    pub profile_poll_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            session_file: default_session_file(),
            profile_poll_ms: default_profile_poll_ms(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3001 }
fn default_data_dir() -> String { "data".into() }
fn default_true() -> bool { true }
fn default_base_url() -> String { "http://localhost:3001".into() }
fn default_session_file() -> String { "data/session.json".into() }
fn default_profile_poll_ms() -> u64 { 1000 }
fn default_request_timeout() -> u64 { 30 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file if present, otherwise defaults; env overrides applied either way.
    pub fn load_or_default() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.store.normalize();
        self.client.normalize_from_env();
        self.client.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StoreConfig {
    fn normalize(&mut self) {
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
    }
}

impl ClientConfig {
    pub fn normalize_from_env(&mut self) {
        // 环境变量优先于 TOML，便于在脚本里临时指向另一个 store
        if let Ok(url) = std::env::var("TRACKER_API_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(path) = std::env::var("TRACKER_SESSION_FILE") {
            if !path.trim().is_empty() {
                self.session_file = path;
            }
        }
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(anyhow!("client.base_url is empty; set it in config.toml or TRACKER_API_URL"));
        }
        let lower = self.base_url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("client.base_url must start with http:// or https://"));
        }
        if self.session_file.trim().is_empty() {
            return Err(anyhow!("client.session_file is empty"));
        }
        if self.profile_poll_ms == 0 {
            return Err(anyhow!("client.profile_poll_ms must be a positive number of milliseconds"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("client.request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = load_from_str("").unwrap();
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.client.base_url, "http://localhost:3001");
        assert_eq!(cfg.client.profile_poll_ms, 1000);
        assert!(cfg.store.seed);
        assert_eq!(cfg.store.records_path(), "data/records.json");
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let cfg = load_from_str("[server]\nport = 4000\n[store]\ndata_dir = \"/tmp/x/\"\nseed = false\n").unwrap();
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.store.users_path(), "/tmp/x/users.json");
        assert!(!cfg.store.seed);
    }

    #[test]
    fn client_validation_rejects_bad_values() {
        let mut c = ClientConfig { base_url: "ftp://host".into(), ..ClientConfig::default() };
        assert!(c.validate().is_err());
        c.base_url = "http://host".into();
        assert!(c.validate().is_ok());
        c.profile_poll_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_port_rejected_and_workers_defaulted() {
        let mut s = ServerConfig { host: " ".into(), port: 0, worker_threads: Some(0) };
        assert!(s.normalize().is_err());
        s.port = 8080;
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
    }
}
