use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default user id seeded into fresh settings.
pub const DEFAULT_USER_ID: &str = "alice";
/// Default agent id seeded into fresh settings.
pub const DEFAULT_AGENT_ID: &str = "haruka";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the remote memory API
    #[arg(long, env = "MEMORY_API_URL")]
    pub remote_url: Option<String>,

    /// Where credentials entered in the playground are persisted
    #[arg(long, env = "SETTINGS_PATH")]
    pub settings_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub defaults: DefaultsConfig,
    pub settings: SettingsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
}

/// Credential fallbacks used when nothing has been persisted yet.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DefaultsConfig {
    pub user_id: String,
    pub agent_id: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    pub path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("remote.base_url", "http://127.0.0.1:8000")?
            .set_default("defaults.user_id", DEFAULT_USER_ID)?
            .set_default("defaults.agent_id", DEFAULT_AGENT_ID)?
            .set_default("settings.path", "playground-settings.json")?;

        // 2. Config file: explicit path must exist, ./config.* is optional
        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(Path::new(path)).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // 3. Environment, e.g. PLAYGROUND_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("PLAYGROUND")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI flags (and their env fallbacks) win over everything else
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.remote_url {
            builder = builder.set_override("remote.base_url", url)?;
        }
        if let Some(path) = cli.settings_path {
            builder = builder.set_override("settings.path", path)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Socket address the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
