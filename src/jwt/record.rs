// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Structured key records (JSON Web Keys)
//!
//! A structured key record is a JWK (RFC 7517) that carries its own `alg`
//! alongside the key parameters. Parsing is strict: any missing or malformed
//! member makes the whole record fail, so the resolver can fall through to
//! the PEM formats instead of returning a half-decoded key.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rsa::{BigUint, RsaPrivateKey};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use super::keys::EcPrivateKey;

/// Smallest RSA modulus accepted from a record
pub const MIN_RSA_MODULUS_BITS: usize = 1024;

/// Reasons a JSON document is not a usable structured key record
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("not a JSON web key: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required member '{0}'")]
    MissingMember(&'static str),

    #[error("member '{0}' is not valid base64url")]
    InvalidEncoding(&'static str),

    #[error("unsupported key type '{0}'")]
    UnsupportedKty(String),

    #[error("unsupported curve '{0}'")]
    UnsupportedCurve(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

/// Wire shape of a JWK, every member optional except the ones we insist on
#[derive(Debug, Deserialize)]
struct RawJwk {
    kty: String,
    alg: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default, rename = "use")]
    key_use: Option<String>,
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    #[serde(default)]
    d: Option<String>,
    #[serde(default)]
    p: Option<String>,
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
    #[serde(default)]
    k: Option<String>,
}

/// Key material embedded in a structured record
pub enum KeyMaterial {
    /// RSA private key
    Rsa(RsaPrivateKey),
    /// Elliptic curve private key
    Ec(EcPrivateKey),
    /// Shared secret (`kty: oct`)
    Symmetric(Zeroizing<Vec<u8>>),
    /// Ed25519 private key (`kty: OKP`)
    Ed25519(Ed25519SigningKey),
    /// Public half only; parses, but cannot sign. Holds the key type name.
    Public(String),
}

impl KeyMaterial {
    /// Short human readable description used in logs and errors
    pub fn describe(&self) -> String {
        match self {
            KeyMaterial::Rsa(_) => "RSA private key".to_string(),
            KeyMaterial::Ec(key) => format!("EC private key ({})", key.curve_name()),
            KeyMaterial::Symmetric(_) => "symmetric key".to_string(),
            KeyMaterial::Ed25519(_) => "Ed25519 private key".to_string(),
            KeyMaterial::Public(kty) => format!("public {} key", kty),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.describe())
    }
}

/// A key bundle carrying an explicit algorithm identifier and key material
#[derive(Debug)]
pub struct KeyRecord {
    /// Algorithm declared by the record; always wins over a caller hint
    pub algorithm: String,
    /// Key identifier declared by the record (informational)
    pub key_id: Option<String>,
    /// Intended key use declared by the record (informational)
    pub key_use: Option<String>,
    /// Decoded key material
    pub material: KeyMaterial,
}

impl KeyRecord {
    /// Parse a JWK document into a structured key record
    pub fn from_json(raw: &[u8]) -> Result<Self, RecordError> {
        let jwk: RawJwk = serde_json::from_slice(raw)?;
        if jwk.alg.is_empty() {
            return Err(RecordError::MissingMember("alg"));
        }

        let material = match jwk.kty.as_str() {
            "RSA" => rsa_material(&jwk)?,
            "EC" => ec_material(&jwk)?,
            "oct" => {
                let k = member(&jwk.k, "k")?;
                if k.is_empty() {
                    return Err(RecordError::InvalidKey("empty symmetric key".to_string()));
                }
                KeyMaterial::Symmetric(k)
            }
            "OKP" => okp_material(&jwk)?,
            other => return Err(RecordError::UnsupportedKty(other.to_string())),
        };

        Ok(Self {
            algorithm: jwk.alg,
            key_id: jwk.kid,
            key_use: jwk.key_use,
            material,
        })
    }
}

/// Decode a required base64url member
fn member(value: &Option<String>, name: &'static str) -> Result<Zeroizing<Vec<u8>>, RecordError> {
    let encoded = value.as_deref().ok_or(RecordError::MissingMember(name))?;
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map(Zeroizing::new)
        .map_err(|_| RecordError::InvalidEncoding(name))
}

fn big_uint(value: &Option<String>, name: &'static str) -> Result<BigUint, RecordError> {
    member(value, name).map(|bytes| BigUint::from_bytes_be(&bytes))
}

fn rsa_material(jwk: &RawJwk) -> Result<KeyMaterial, RecordError> {
    let n = big_uint(&jwk.n, "n")?;
    let e = big_uint(&jwk.e, "e")?;
    if jwk.d.is_none() {
        return Ok(KeyMaterial::Public("RSA".to_string()));
    }
    let d = big_uint(&jwk.d, "d")?;
    check_rsa_components(&n, &e, &d)?;

    // p and q travel together; without them the primes are recovered from d
    let primes = match (&jwk.p, &jwk.q) {
        (Some(_), Some(_)) => vec![big_uint(&jwk.p, "p")?, big_uint(&jwk.q, "q")?],
        (None, None) => Vec::new(),
        (None, Some(_)) => return Err(RecordError::MissingMember("p")),
        (Some(_), None) => return Err(RecordError::MissingMember("q")),
    };

    RsaPrivateKey::from_components(n, e, d, primes)
        .map(KeyMaterial::Rsa)
        .map_err(|e| RecordError::InvalidKey(e.to_string()))
}

/// Reject components no RSA key can have before the primes are touched
fn check_rsa_components(n: &BigUint, e: &BigUint, d: &BigUint) -> Result<(), RecordError> {
    let problem = if n.bits() < MIN_RSA_MODULUS_BITS {
        format!(
            "modulus is {} bits, at least {} are required",
            n.bits(),
            MIN_RSA_MODULUS_BITS
        )
    } else if e < &BigUint::from(3u8) {
        "public exponent is smaller than 3".to_string()
    } else if d.bits() == 0 || d >= n {
        "private exponent is out of range".to_string()
    } else {
        return Ok(());
    };
    Err(RecordError::InvalidKey(problem))
}

fn ec_material(jwk: &RawJwk) -> Result<KeyMaterial, RecordError> {
    let crv = jwk.crv.as_deref().ok_or(RecordError::MissingMember("crv"))?;
    let x = member(&jwk.x, "x")?;
    let y = member(&jwk.y, "y")?;
    if jwk.d.is_none() {
        return Ok(KeyMaterial::Public("EC".to_string()));
    }
    let d = member(&jwk.d, "d")?;

    let key = match crv {
        "P-256" => {
            let secret = p256::SecretKey::from_slice(&d)
                .map_err(|e| RecordError::InvalidKey(e.to_string()))?;
            let point = secret.public_key().to_encoded_point(false);
            check_point(point.x().map(|v| &v[..]), point.y().map(|v| &v[..]), &x, &y)?;
            EcPrivateKey::P256(secret)
        }
        "P-384" => {
            let secret = p384::SecretKey::from_slice(&d)
                .map_err(|e| RecordError::InvalidKey(e.to_string()))?;
            let point = secret.public_key().to_encoded_point(false);
            check_point(point.x().map(|v| &v[..]), point.y().map(|v| &v[..]), &x, &y)?;
            EcPrivateKey::P384(secret)
        }
        "P-521" => {
            let secret = p521::SecretKey::from_slice(&d)
                .map_err(|e| RecordError::InvalidKey(e.to_string()))?;
            let point = secret.public_key().to_encoded_point(false);
            check_point(point.x().map(|v| &v[..]), point.y().map(|v| &v[..]), &x, &y)?;
            EcPrivateKey::P521(secret)
        }
        other => return Err(RecordError::UnsupportedCurve(other.to_string())),
    };

    Ok(KeyMaterial::Ec(key))
}

/// The declared public point must be the one derived from `d`
fn check_point(
    derived_x: Option<&[u8]>,
    derived_y: Option<&[u8]>,
    x: &[u8],
    y: &[u8],
) -> Result<(), RecordError> {
    if derived_x == Some(x) && derived_y == Some(y) {
        Ok(())
    } else {
        Err(RecordError::InvalidKey(
            "public point does not match private scalar".to_string(),
        ))
    }
}

fn okp_material(jwk: &RawJwk) -> Result<KeyMaterial, RecordError> {
    let crv = jwk.crv.as_deref().ok_or(RecordError::MissingMember("crv"))?;
    if crv != "Ed25519" {
        return Err(RecordError::UnsupportedCurve(crv.to_string()));
    }
    let x = member(&jwk.x, "x")?;
    if jwk.d.is_none() {
        return Ok(KeyMaterial::Public("OKP".to_string()));
    }
    let d = member(&jwk.d, "d")?;

    let seed: [u8; 32] = d
        .as_slice()
        .try_into()
        .map_err(|_| RecordError::InvalidKey("Ed25519 seed must be 32 bytes".to_string()))?;
    let signing_key = Ed25519SigningKey::from_bytes(&seed);
    if signing_key.verifying_key().as_bytes().as_slice() != x.as_slice() {
        return Err(RecordError::InvalidKey(
            "public key does not match private seed".to_string(),
        ));
    }

    Ok(KeyMaterial::Ed25519(signing_key))
}
