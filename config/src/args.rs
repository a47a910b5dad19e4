use clap::Parser;
use std::path::PathBuf;

/// Prometheus exporter for Jellyfin
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Optional YAML configuration file. Defaults to `config.yaml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the Jellyfin server, e.g. `http://localhost:8096`.
    #[arg(long, value_name = "URL")]
    pub jellyfin_url: Option<String>,

    /// Jellyfin API key.
    #[arg(long, value_name = "TOKEN")]
    pub jellyfin_token: Option<String>,

    /// File containing the Jellyfin API key. Re-read on every scrape.
    #[arg(long, value_name = "FILE")]
    pub jellyfin_token_file: Option<PathBuf>,

    /// Timeout for a single Jellyfin API request (e.g. "10s", "1m").
    #[arg(long, value_name = "DURATION")]
    pub jellyfin_timeout: Option<String>,

    /// Address the metrics endpoint listens on.
    #[arg(long, value_name = "ADDRESS")]
    pub listen_address: Option<String>,

    /// Path under which metrics are exposed.
    #[arg(long, value_name = "PATH")]
    pub metrics_path: Option<String>,

    /// Playback Reporting search window in days.
    #[arg(long, value_name = "DAYS")]
    pub activity_days: Option<u32>,

    /// Enable a collector that is disabled by default. Can be repeated.
    #[arg(long = "enable-collector", value_name = "NAME")]
    pub enable_collectors: Vec<String>,

    /// Disable a collector that is enabled by default. Can be repeated.
    #[arg(long = "disable-collector", value_name = "NAME")]
    pub disable_collectors: Vec<String>,

    /// Log filter, e.g. "debug" or "jellyfin_exporter_collector=debug".
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print the available collectors and their default state, then exit.
    #[arg(long, action)]
    pub list_collectors: bool,

    /// Run a single scrape, print the exposition to stdout and exit.
    #[arg(long, action)]
    pub once: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(url) = &self.jellyfin_url {
                cache.insert("jellyfin.url".to_string(), url.clone().into());
            }
            if let Some(token) = &self.jellyfin_token {
                cache.insert("jellyfin.token".to_string(), token.clone().into());
            }
            if let Some(path) = &self.jellyfin_token_file {
                cache.insert(
                    "jellyfin.token_file".to_string(),
                    path.display().to_string().into(),
                );
            }
            if let Some(timeout) = &self.jellyfin_timeout {
                cache.insert("jellyfin.timeout".to_string(), timeout.clone().into());
            }
            if let Some(address) = &self.listen_address {
                cache.insert("listen_address".to_string(), address.clone().into());
            }
            if let Some(path) = &self.metrics_path {
                cache.insert("metrics_path".to_string(), path.clone().into());
            }
            if let Some(days) = self.activity_days {
                cache.insert("activity_days".to_string(), (days as u64).into());
            }
            // Disables are inserted last so they win over an enable of the same name.
            for name in &self.enable_collectors {
                cache.insert(format!("collectors.{name}"), true.into());
            }
            for name in &self.disable_collectors {
                cache.insert(format!("collectors.{name}"), false.into());
            }
            if let Some(level) = &self.log_level {
                cache.insert("log_level".to_string(), level.clone().into());
            }
            Ok(cache)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Source as _;

    #[test]
    fn collector_flags_become_overrides() {
        let args = Args::parse_from([
            "jellyfin-exporter",
            "--enable-collector",
            "activity",
            "--disable-collector",
            "users",
            "--enable-collector",
            "users",
        ]);
        let values = args.collect().unwrap();

        assert!(values["collectors.activity"].clone().into_bool().unwrap());
        assert!(!values["collectors.users"].clone().into_bool().unwrap());
    }

    #[test]
    fn unset_flags_are_not_collected() {
        let values = Args::parse_from(["jellyfin-exporter"]).collect().unwrap();
        assert!(values.is_empty());
    }
}
