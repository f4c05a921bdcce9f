// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use base64::Engine;
use log::debug;

use super::{Config, CONFIG_SCHEMA};

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./rust_jwt_signer --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;

    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;

    println!("{}", formatted_schema);

    Ok(())
}

/// Check if a string is a valid IP address
///
/// Accepts any IPv4 or IPv6 address and the special value `localhost`.
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    matches!(addr, "localhost")
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// # Validation Rules
///
/// - **TLS pair**: `cert` and `key` are both present or both absent
/// - **Base64 Encoding**: both TLS members decode as standard base64
/// - **Port Range**: the port is within 1-65534
/// - **Address**: an IP address or `localhost`
/// - **Timeouts**: the request timeout is at least one second
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");
    let server = &config.server;

    match (&server.cert, &server.key) {
        (Some(cert), Some(key)) => {
            base64::engine::general_purpose::STANDARD
                .decode(cert)
                .context("SSL certificate is not valid base64")?;
            base64::engine::general_purpose::STANDARD
                .decode(key)
                .context("SSL key is not valid base64")?;
        }
        (Some(_), None) => anyhow::bail!("SSL certificate provided without a key"),
        (None, Some(_)) => anyhow::bail!("SSL key provided without a certificate"),
        (None, None) => {}
    }

    if server.port < 1 || server.port > 65534 {
        anyhow::bail!("Invalid port number: {}", server.port);
    }

    if !is_valid_ip_address(&server.address) {
        anyhow::bail!("Invalid server address: {}", server.address);
    }

    if server.request_timeout_secs == 0 {
        anyhow::bail!("Request timeout must be at least one second");
    }

    Ok(())
}
