// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.10: `AppConfig` is loaded from a YAML file (path given on the CLI or
//! `GRAYLOGIC_CONFIG`) and overlaid with environment variables for every
//! secret — the YAML never carries a password or token directly, only the
//! name of the environment variable that holds it.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

/// Thin top-level CLI: almost everything lives in the YAML file — the
/// flags only locate it and optionally override the log format.
#[derive(Debug, Parser)]
#[command(name = "graylogic", version, about = "KNX/MQTT home-automation control plane")]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, env = "GRAYLOGIC_CONFIG")]
    pub config: PathBuf,

    /// Overrides the config file's `log_format` (`pretty` or `json`).
    #[arg(long, env = "GRAYLOGIC_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonSection {
    /// `tcp` or `unix`.
    pub transport: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
    /// This bridge's own KNX individual address, e.g. `1.1.250`.
    pub source_address: String,
    #[serde(default = "default_daemon_binary")]
    pub binary: PathBuf,
    #[serde(default)]
    pub usb_device_path: Option<PathBuf>,
    #[serde(default)]
    pub reset_utility: Option<PathBuf>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_daemon_binary() -> PathBuf {
    PathBuf::from("knxd")
}
fn default_poll_interval_secs() -> u64 {
    2
}

impl DaemonSection {
    pub fn target(&self) -> anyhow::Result<daemon_client::DaemonTarget> {
        match self.transport.as_str() {
            "tcp" => Ok(daemon_client::DaemonTarget::Tcp {
                host: self.host.clone().ok_or_else(|| anyhow::anyhow!("daemon.host required for tcp transport"))?,
                port: self.port.ok_or_else(|| anyhow::anyhow!("daemon.port required for tcp transport"))?,
            }),
            "unix" => Ok(daemon_client::DaemonTarget::Unix {
                path: self
                    .socket_path
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("daemon.socket_path required for unix transport"))?,
            }),
            other => anyhow::bail!("unknown daemon transport {other:?}, expected tcp or unix"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MqttSection {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    pub bridge_id: String,
    /// Names of environment variables carrying broker credentials, never
    /// the credentials themselves.
    #[serde(default)]
    pub username_env: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

fn default_mqtt_port() -> u16 {
    1883
}
fn default_keep_alive_secs() -> u64 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeseriesSection {
    pub endpoint: String,
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_interval_secs")]
    pub batch_interval_secs: u64,
}

fn default_batch_size() -> usize {
    500
}
fn default_batch_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    pub catalogue_path: PathBuf,
    pub daemon: DaemonSection,
    pub mqtt: MqttSection,
    /// Name of the environment variable carrying the JWT signing secret.
    pub jwt_secret_env: String,
    #[serde(default)]
    pub timeseries: Option<TimeseriesSection>,
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_owned()
}
fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl AppConfig {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
        let config: Self = serde_yaml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing config file {}: {e}", path.display()))?;
        Ok(config)
    }

    pub fn jwt_secret(&self) -> anyhow::Result<String> {
        env_var(&self.jwt_secret_env)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.daemon.poll_interval_secs)
    }
}

fn env_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("environment variable {name} is not set"))
}

impl MqttSection {
    pub fn username(&self) -> anyhow::Result<Option<String>> {
        self.username_env.as_deref().map(env_var).transpose()
    }

    pub fn password(&self) -> anyhow::Result<Option<String>> {
        self.password_env.as_deref().map(env_var).transpose()
    }
}

impl TimeseriesSection {
    pub fn token(&self) -> anyhow::Result<Option<String>> {
        self.token_env.as_deref().map(env_var).transpose()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
