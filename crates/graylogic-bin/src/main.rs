// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use graylogic_bin::config::AppConfig;
use graylogic_bin::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e:#}");
            std::process::exit(1);
        }
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    graylogic_bin::run::init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        graylogic_bin::run::log_fatal(&e);
        std::process::exit(e.exit_code());
    }
}
