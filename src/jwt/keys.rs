// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Key Resolver
//!
//! Turns raw, caller supplied key bytes into a typed [`KeyHandle`].
//!
//! Resolution tries a fixed list of formats and the first one that parses wins:
//!
//! 1. a structured key record (JSON Web Key with an explicit `alg`)
//! 2. a PEM encoded RSA private key (PKCS#1 or PKCS#8)
//! 3. a PEM encoded EC private key (SEC1 or PKCS#8, P-256, P-384 or P-521)
//!
//! There is no sniffing beyond "does it parse". When nothing matches the
//! caller gets [`SignError::KeyParse`] and none of the individual errors.
//!
//! ```rust
//! use rust_jwt_signer::jwt::resolve;
//!
//! let err = resolve(b"definitely not a key").unwrap_err();
//! assert_eq!(err.to_string(), "unable to parse the private key");
//! ```

use log::debug;
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::RsaPrivateKey;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

use super::error::SignError;
use super::record::KeyRecord;
use super::signer::OpaqueSigner;

/// Elliptic curve private key on one of the supported curves
#[derive(Clone)]
pub enum EcPrivateKey {
    /// NIST P-256 (secp256r1)
    P256(p256::SecretKey),
    /// NIST P-384 (secp384r1)
    P384(p384::SecretKey),
    /// NIST P-521 (secp521r1)
    P521(p521::SecretKey),
}

impl EcPrivateKey {
    /// Curve name as used in JWK `crv`
    pub fn curve_name(&self) -> &'static str {
        match self {
            EcPrivateKey::P256(_) => "P-256",
            EcPrivateKey::P384(_) => "P-384",
            EcPrivateKey::P521(_) => "P-521",
        }
    }

    /// PKCS#8 DER encoding of the key, as expected by the signing primitive
    pub(crate) fn to_pkcs8_der(&self) -> Result<Zeroizing<Vec<u8>>, SignError> {
        let document = match self {
            EcPrivateKey::P256(key) => key.to_pkcs8_der(),
            EcPrivateKey::P384(key) => key.to_pkcs8_der(),
            EcPrivateKey::P521(key) => key.to_pkcs8_der(),
        }
        .map_err(SignError::primitive)?;
        Ok(Zeroizing::new(document.as_bytes().to_vec()))
    }

    /// Parse a SEC1 or PKCS#8 PEM document on any supported curve
    fn from_pem(pem: &str) -> Option<Self> {
        p256::SecretKey::from_sec1_pem(pem)
            .ok()
            .or_else(|| p256::SecretKey::from_pkcs8_pem(pem).ok())
            .map(EcPrivateKey::P256)
            .or_else(|| {
                p384::SecretKey::from_sec1_pem(pem)
                    .ok()
                    .or_else(|| p384::SecretKey::from_pkcs8_pem(pem).ok())
                    .map(EcPrivateKey::P384)
            })
            .or_else(|| {
                p521::SecretKey::from_sec1_pem(pem)
                    .ok()
                    .or_else(|| p521::SecretKey::from_pkcs8_pem(pem).ok())
                    .map(EcPrivateKey::P521)
            })
    }
}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcPrivateKey({})", self.curve_name())
    }
}

/// Resolved, typed representation of a private key.
///
/// Exactly one variant is active. Raw RSA and EC keys carry no algorithm;
/// the signer picks one from the caller's hint or the family default.
pub enum KeyHandle {
    /// Structured key record carrying its own algorithm
    Record(KeyRecord),
    /// Raw RSA private key
    Rsa(RsaPrivateKey),
    /// Raw elliptic curve private key
    Ec(EcPrivateKey),
    /// External signer that never reveals its key material
    Opaque(Arc<dyn OpaqueSigner>),
}

impl KeyHandle {
    /// Wrap an external signer (HSM, KMS...) into a key handle
    pub fn opaque(signer: impl OpaqueSigner + 'static) -> Self {
        KeyHandle::Opaque(Arc::new(signer))
    }

    /// Short description of the active variant, never the key material
    pub fn kind(&self) -> String {
        match self {
            KeyHandle::Record(record) => format!("key record ({})", record.material.describe()),
            KeyHandle::Rsa(_) => "RSA private key".to_string(),
            KeyHandle::Ec(key) => format!("EC private key ({})", key.curve_name()),
            KeyHandle::Opaque(signer) => format!("opaque signer ({})", signer.type_name()),
        }
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyHandle").field(&self.kind()).finish()
    }
}

/// Resolve raw key bytes into a [`KeyHandle`]
pub fn resolve(raw: &[u8]) -> Result<KeyHandle, SignError> {
    if let Ok(record) = KeyRecord::from_json(raw) {
        debug!("Private key resolved as structured key record");
        return Ok(KeyHandle::Record(record));
    }

    let pem = std::str::from_utf8(raw)
        .map_err(|_| SignError::KeyParse)?
        .trim();

    if let Some(key) = parse_rsa_pem(pem) {
        debug!("Private key resolved as PEM encoded RSA key");
        return Ok(KeyHandle::Rsa(key));
    }

    if let Some(key) = EcPrivateKey::from_pem(pem) {
        debug!(
            "Private key resolved as PEM encoded EC key on {}",
            key.curve_name()
        );
        return Ok(KeyHandle::Ec(key));
    }

    Err(SignError::KeyParse)
}

fn parse_rsa_pem(pem: &str) -> Option<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .ok()
        .or_else(|| RsaPrivateKey::from_pkcs8_pem(pem).ok())
}
