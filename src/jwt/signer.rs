// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Token Signer
//!
//! Chooses the effective algorithm for a [`KeyHandle`] and drives the
//! compact serializer.
//!
//! | Key handle | Effective algorithm |
//! |---|---|
//! | structured record | the record's `alg`, the caller hint is ignored |
//! | RSA key | the caller hint, else `RS256` |
//! | EC key | the caller hint, else `ES256` |
//! | opaque signer (RSA or EC) | first declared algorithm when there is no hint, else the hint, else the family default |
//!
//! Hints are never checked against the key family here. A mismatched hint is
//! forwarded as-is and the signing primitive rejects it.

use jsonwebtoken::Algorithm;
use log::debug;
use serde_json::Value;
use std::fmt;

use super::compact::{algorithm_name, generate_token, SigningKey};
use super::error::SignError;
use super::keys::KeyHandle;
use super::Header;

/// Algorithm used for RSA keys when the caller gives no hint
pub const DEFAULT_RSA_ALGORITHM: &str = "RS256";

/// Algorithm used for EC keys when the caller gives no hint
pub const DEFAULT_EC_ALGORITHM: &str = "ES256";

/// Public key family behind an opaque signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyType {
    Rsa,
    Ec,
    /// Anything else, by name (e.g. `Ed448`)
    Other(String),
}

impl fmt::Display for PublicKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKeyType::Rsa => write!(f, "RSA"),
            PublicKeyType::Ec => write!(f, "EC"),
            PublicKeyType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A signer backed by key material that never leaves its home
/// (hardware security module, cloud KMS...).
///
/// Implementations must be usable from several threads at once.
pub trait OpaqueSigner: Send + Sync {
    /// Name of the implementation, used in error messages
    fn type_name(&self) -> &str;

    /// Family of the public key matching the hidden private key
    fn public_key_type(&self) -> PublicKeyType;

    /// Algorithms this signer supports, preferred one first. May be empty.
    fn algorithms(&self) -> Vec<Algorithm>;

    /// Sign the JWS signing input and return the raw signature bytes
    fn sign(
        &self,
        algorithm: Algorithm,
        signing_input: &[u8],
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Sign `claims` with an already resolved key.
///
/// `header` is the caller's header, possibly absent; it is read, never
/// modified. The produced token header always carries `typ` (unless the
/// caller overrides it) and the `alg` actually used.
pub fn sign_with_key(
    key: &KeyHandle,
    claims: &Value,
    header: Option<&Header>,
) -> Result<String, SignError> {
    let empty = Header::new();
    let header = header.unwrap_or(&empty);

    let hint = header
        .get("alg")
        .and_then(Value::as_str)
        .filter(|alg| !alg.is_empty());

    let (algorithm, signing_key) = select_algorithm(key, hint)?;
    debug!(
        "Signing with {} using algorithm {}",
        key.kind(),
        algorithm
    );

    generate_token(Some(claims), Some(header), &algorithm, signing_key)
}

/// Pick the effective algorithm and the signing primitive for a key handle
fn select_algorithm<'k>(
    key: &'k KeyHandle,
    hint: Option<&str>,
) -> Result<(String, SigningKey<'k>), SignError> {
    match key {
        KeyHandle::Record(record) => {
            let signing_key = SigningKey::from_material(&record.material)?;
            Ok((record.algorithm.clone(), signing_key))
        }
        KeyHandle::Rsa(rsa) => Ok((
            hint.unwrap_or(DEFAULT_RSA_ALGORITHM).to_string(),
            SigningKey::Rsa(rsa),
        )),
        KeyHandle::Ec(ec) => Ok((
            hint.unwrap_or(DEFAULT_EC_ALGORITHM).to_string(),
            SigningKey::Ec(ec),
        )),
        KeyHandle::Opaque(signer) => {
            let default = match signer.public_key_type() {
                PublicKeyType::Rsa => DEFAULT_RSA_ALGORITHM,
                PublicKeyType::Ec => DEFAULT_EC_ALGORITHM,
                PublicKeyType::Other(public_key) => {
                    return Err(SignError::UnsupportedKeyPair {
                        signer: signer.type_name().to_string(),
                        public_key,
                    })
                }
            };

            let algorithm = match (hint, signer.algorithms().first()) {
                (None, Some(preferred)) => algorithm_name(*preferred).to_string(),
                (Some(hint), _) => hint.to_string(),
                (None, None) => default.to_string(),
            };
            Ok((algorithm, SigningKey::Opaque(&**signer)))
        }
    }
}
