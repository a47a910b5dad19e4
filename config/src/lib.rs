#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod connection;

use app_config::PROJECT_NAME;
pub use app_config::get_config_dir;
pub use args::Args;
pub use connection::{
    ConfigError,
    Connection,
    JellyfinSettings,
    ResolveConnection,
};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    net::SocketAddr,
};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub jellyfin: JellyfinSettings,
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    pub activity_days: u32,
    /// Per-collector overrides of the built-in enabled/disabled default.
    #[serde(default)]
    pub collectors: BTreeMap<String, bool>,
    pub log_level: String,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    /// Layers built-in defaults, the config file, `JELLYFIN_EXPORTER_*` environment variables
    /// and finally the command-line arguments.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let file = match &args.config {
            Some(path) => config::File::from(path.clone()).required(true),
            None => config::File::from(get_config_dir().join("config.yaml")).required(false),
        };
        builder = builder.add_source(file.format(config::FileFormat::Yaml));

        builder = builder.add_source(
            config::Environment::with_prefix(PROJECT_NAME.as_str())
                .prefix_separator("_")
                .separator("__"),
        );

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(listen_address = %cfg.listen_address, collectors = ?cfg.collectors, "configuration loaded");

        Ok(cfg)
    }

    pub fn metrics_path(&self) -> String {
        if self.metrics_path.starts_with('/') {
            self.metrics_path.clone()
        } else {
            format!("/{}", self.metrics_path)
        }
    }
}
