// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HTTP transport for the signer
//!
//! A Rocket server exposing a single endpoint, `POST /jwt/sign`. Other
//! methods on the same path are answered with an empty `400`.

pub mod sign;

use anyhow::{Context, Result};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use log::{debug, info};
use rocket::config::LogLevel;
use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use rocket::{routes, Build, Rocket};
use std::time::Duration;

use crate::config::ServerConfig;
pub use sign::{SignRequest, SignResponse, SignSettings, TIMEOUT_MESSAGE};

/// Build the Rocket figment for a server section.
///
/// Binding, ident, body limits, keep-alive and TLS all come from `config`.
/// TLS is only enabled when both the certificate and the key are present.
pub fn build_figment(config: &ServerConfig) -> Result<Figment> {
    let limit = config.body_limit_kib.kibibytes();
    let mut figment = rocket::Config::figment()
        .merge(("ident", config.name.clone()))
        .merge((
            "limits",
            Limits::default().limit("json", limit).limit("bytes", limit),
        ))
        .merge(("address", config.address.clone()))
        .merge(("port", config.port))
        .merge(("keep_alive", config.idle_timeout_secs))
        .merge(("log_level", LogLevel::Normal));

    if let Some((cert, key)) = config.tls_pair() {
        debug!("SSL certificates found in configuration, enabling TLS");

        let cert_data = BASE64_STANDARD
            .decode(cert)
            .context("SSL certificate is not valid base64")?;
        let key_data = BASE64_STANDARD
            .decode(key)
            .context("SSL key is not valid base64")?;

        figment = figment
            .merge(("tls.certs", cert_data))
            .merge(("tls.key", key_data));

        info!("TLS enabled for web server");
    }

    Ok(figment)
}

/// Assemble the signing server on top of `figment`
pub fn build_rocket(figment: Figment, config: &ServerConfig) -> Rocket<Build> {
    let settings = SignSettings {
        request_timeout: Duration::from_secs(config.request_timeout_secs),
        body_limit_kib: config.body_limit_kib,
    };

    rocket::custom(figment)
        .mount(
            "/",
            routes![
                sign::sign,
                sign::sign_get,
                sign::sign_put,
                sign::sign_delete,
                sign::sign_patch,
                sign::sign_options,
            ],
        )
        .manage(settings)
}
