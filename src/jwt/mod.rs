// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # JWT Signing
//!
//! Produces compact JWS tokens from a private key, a claim set and optional
//! header fields.
//!
//! The module is split in three layers:
//!
//! - [`keys`]: resolves raw key bytes (structured key record, RSA PEM, EC PEM)
//!   into a [`KeyHandle`]
//! - [`signer`]: picks the effective algorithm for a handle and exposes the
//!   [`OpaqueSigner`] seam for keys held in an HSM or KMS
//! - [`compact`]: merges the header and runs the signing primitive
//!
//! ## Example
//!
//! ```rust,no_run
//! use rust_jwt_signer::jwt::{self, Header};
//! use serde_json::json;
//!
//! let pem = std::fs::read("private.pem").unwrap();
//! let mut header = Header::new();
//! header.insert("kid".to_string(), json!("signing-key-1"));
//!
//! let token = jwt::sign(&pem, &json!({"sub": "peter"}), Some(&header)).unwrap();
//! println!("{}", token);
//! ```
//!
//! Signing holds no shared mutable state; every call can run on any thread.

pub mod compact;
pub mod error;
pub mod keys;
pub mod record;
pub mod signer;

use log::debug;
use serde_json::Value;

pub use compact::{generate_token, merge_header, SigningKey};
pub use error::SignError;
pub use keys::{resolve, EcPrivateKey, KeyHandle};
pub use record::{KeyMaterial, KeyRecord};
pub use signer::{
    sign_with_key, OpaqueSigner, PublicKeyType, DEFAULT_EC_ALGORITHM, DEFAULT_RSA_ALGORITHM,
};

/// Caller supplied JOSE header fields
pub type Header = serde_json::Map<String, Value>;

/// Resolve `private_key` and sign `claims` with it.
///
/// `header` may carry an `alg` hint and any extra fields (`kid`, `cty`...).
/// The returned token's header is the caller's fields plus `typ` and the
/// effective `alg`.
pub fn sign(
    private_key: &[u8],
    claims: &Value,
    header: Option<&Header>,
) -> Result<String, SignError> {
    let key = resolve(private_key)?;
    let token = sign_with_key(&key, claims, header)?;
    debug!("Signed token with {}", key.kind());
    Ok(token)
}
