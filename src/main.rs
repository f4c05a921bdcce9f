// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the JWT signing service
use anyhow::Result;
use clap::Parser;
use log::info;
use rust_jwt_signer::config::{output_config_schema, validate_specific_rules, Config};
use rust_jwt_signer::server::{build_figment, build_rocket};
use std::path::PathBuf;

/// HTTP service signing JSON claim sets into compact JWS tokens
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (created with defaults when missing)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Server port, overrides the configuration file
    #[arg(short, long)]
    port: Option<u16>,

    /// Server address, overrides the configuration file
    #[arg(short, long)]
    address: Option<String>,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,
}

#[rocket::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.show_config_schema {
        return output_config_schema();
    }

    let mut config = Config::from_file(&args.config)?;
    config.apply_args(args.port, args.address);
    validate_specific_rules(&config)?;

    info!(
        "Starting signing server on {}:{}",
        config.server.address, config.server.port
    );

    let figment = build_figment(&config.server)?;
    let rocket = build_rocket(figment, &config.server);
    let ignited = rocket.ignite().await?;
    ignited.launch().await?;

    Ok(())
}
