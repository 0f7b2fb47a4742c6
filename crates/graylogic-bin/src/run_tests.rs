// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use catalogue_store::CatalogueStore;

use super::*;

#[test]
fn exit_codes_match_the_documented_scheme() {
    assert_eq!(RunError::Config(anyhow::anyhow!("x")).exit_code(), 1);
    assert_eq!(RunError::Migration(anyhow::anyhow!("x")).exit_code(), 2);
    assert_eq!(RunError::Dependency(anyhow::anyhow!("x")).exit_code(), 3);
}

#[tokio::test]
async fn ensure_site_creates_a_default_once() {
    let store = CatalogueStore::open_in_memory().await.expect("open store");

    ensure_site(&store).await.expect("create default site");
    let site = store.get_site().await.expect("query site").expect("site present");
    assert_eq!(site.name, "graylogic");
    assert_eq!(site.mode, "home");

    // Calling again must not clobber an existing site with a fresh one.
    let first_id = site.id;
    ensure_site(&store).await.expect("idempotent on existing site");
    let site = store.get_site().await.expect("query site").expect("site present");
    assert_eq!(site.id, first_id);
}

#[test]
fn build_timeseries_sink_defaults_to_null_when_unconfigured() {
    let cancel = CancellationToken::new();
    let config_yaml = "\
catalogue_path: /tmp/unused.db
jwt_secret_env: GRAYLOGIC_UNUSED_SECRET
daemon:
  transport: tcp
  host: 127.0.0.1
  port: 6720
  source_address: \"1.1.250\"
mqtt:
  host: localhost
  bridge_id: knx-bridge-1
";
    let config: AppConfig = serde_yaml::from_str(config_yaml).expect("parse test config");
    assert!(build_timeseries_sink(&config, cancel).is_ok());
}
