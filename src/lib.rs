// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust JWT signer library
//!
//! Turns a private key (JSON Web Key, RSA PEM or EC PEM), a claim set and
//! optional header fields into a compact JWS token, and exposes that as an
//! HTTP service.

pub mod config;
pub mod jwt;
pub mod server;

pub use jwt::{sign, Header, SignError};
