use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/nexus.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the persisted collections.
    pub data_dir: String,
    /// Base URL of the remote snapshot store; empty disables sync.
    pub remote_url: String,
    /// Opaque identity keying the remote snapshot; empty disables sync.
    pub identity: String,
    /// Log level filter.
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "./nexus-data".to_string(),
            remote_url: String::new(),
            identity: String::new(),
            level: "info".to_string(),
        }
    }
}

/// Merge order: config file, then `NEXUS_*` environment, then CLI overrides.
pub struct Overrides {
    pub config_path: Option<String>,
    pub data_dir: Option<String>,
    pub remote_url: Option<String>,
    pub identity: Option<String>,
}

pub fn load(overrides: Overrides) -> Result<AppConfig, config::ConfigError> {
    let config_path = overrides
        .config_path
        .as_deref()
        .unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("NEXUS"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(data_dir) = overrides.data_dir {
        settings.data_dir = data_dir;
    }
    if let Some(remote_url) = overrides.remote_url {
        settings.remote_url = remote_url;
    }
    if let Some(identity) = overrides.identity {
        settings.identity = identity;
    }

    Ok(settings)
}
