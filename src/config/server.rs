// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Signing server configuration
//!
//! This module defines the structure for configuring the HTTP endpoint that
//! exposes the signer.

use serde::{Deserialize, Serialize};

/// Configuration for the signing web server.
///
/// ### TLS Configuration
///
/// For HTTPS, both `cert` and `key` must be provided as Base64-encoded PEM
/// files. When both are absent the server listens in plain HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The network address the server will bind to.
    ///
    /// Can be an IPv4/IPv6 address or `localhost`. Default is "127.0.0.1".
    #[serde(default = "default_address")]
    pub address: String,

    /// The TCP port the server will listen on.
    ///
    /// Valid range is 1-65534. Default value is 8080.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The server name reported in the `Server` HTTP header.
    #[serde(default = "default_name")]
    pub name: String,

    /// SSL/TLS certificate chain in PEM format, Base64 encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,

    /// SSL/TLS private key in PEM format, Base64 encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Seconds a signing request may take before the client gets a 503
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Keep-alive timeout for idle connections, in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u32,

    /// Maximum accepted request body, in KiB
    #[serde(default = "default_body_limit")]
    pub body_limit_kib: u64,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// `JwtSignerServer/` followed by the package version
fn default_name() -> String {
    format!("JwtSignerServer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    15
}

fn default_idle_timeout() -> u32 {
    30
}

fn default_body_limit() -> u64 {
    2048
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            name: default_name(),
            cert: None,
            key: None,
            request_timeout_secs: default_request_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            body_limit_kib: default_body_limit(),
        }
    }
}

impl ServerConfig {
    /// Base64 certificate and key, only when both halves are configured
    pub fn tls_pair(&self) -> Option<(&str, &str)> {
        self.cert.as_deref().zip(self.key.as_deref())
    }
}
