// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use super::{AppConfig, DaemonSection};

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(yaml.as_bytes()).expect("write config");
    file
}

const MINIMAL_YAML: &str = r#"
catalogue_path: /var/lib/graylogic/catalogue.db
jwt_secret_env: GRAYLOGIC_TEST_JWT_SECRET
daemon:
  transport: tcp
  host: 127.0.0.1
  port: 6720
  source_address: "1.1.250"
mqtt:
  host: localhost
  bridge_id: knx-bridge-1
"#;

#[test]
fn loads_minimal_config_with_defaults() {
    let file = write_config(MINIMAL_YAML);
    let config = AppConfig::load(file.path()).expect("parse config");

    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.mqtt.port, 1883);
    assert_eq!(config.mqtt.keep_alive_secs, 20);
    assert_eq!(config.daemon.poll_interval_secs, 2);
    assert!(config.timeseries.is_none());
}

#[test]
fn rejects_missing_required_field() {
    let file = write_config("catalogue_path: /tmp/x.db\n");
    let err = AppConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("parsing config file"));
}

#[test]
fn tcp_transport_requires_host_and_port() {
    let section = DaemonSection {
        transport: "tcp".to_owned(),
        host: None,
        port: None,
        socket_path: None,
        source_address: "1.1.250".to_owned(),
        binary: "knxd".into(),
        usb_device_path: None,
        reset_utility: None,
        poll_interval_secs: 2,
    };
    let err = section.target().unwrap_err();
    assert!(err.to_string().contains("daemon.host"));
}

#[test]
fn unix_transport_resolves_to_socket_path() {
    let section = DaemonSection {
        transport: "unix".to_owned(),
        host: None,
        port: None,
        socket_path: Some("/run/knxd.sock".into()),
        source_address: "1.1.250".to_owned(),
        binary: "knxd".into(),
        usb_device_path: None,
        reset_utility: None,
        poll_interval_secs: 2,
    };
    let target = section.target().expect("valid unix target");
    assert!(matches!(target, daemon_client::DaemonTarget::Unix { path } if path == std::path::Path::new("/run/knxd.sock")));
}

#[test]
#[serial]
fn jwt_secret_reads_named_env_var() {
    std::env::set_var("GRAYLOGIC_TEST_JWT_SECRET", "super-secret");
    let file = write_config(MINIMAL_YAML);
    let config = AppConfig::load(file.path()).expect("parse config");
    assert_eq!(config.jwt_secret().expect("jwt secret"), "super-secret");
    std::env::remove_var("GRAYLOGIC_TEST_JWT_SECRET");
}

#[test]
#[serial]
fn jwt_secret_missing_env_var_errors() {
    std::env::remove_var("GRAYLOGIC_TEST_JWT_SECRET");
    let file = write_config(MINIMAL_YAML);
    let config = AppConfig::load(file.path()).expect("parse config");
    assert!(config.jwt_secret().is_err());
}
