// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Compact Serializer
//!
//! Builds `BASE64URL(header) "." BASE64URL(claims) "." BASE64URL(signature)`
//! from a claim set, the caller's header fields, an algorithm name and a
//! signing primitive.
//!
//! The header is assembled from a fixed base, the caller's fields and the
//! effective algorithm, in that order, and serialized with its keys sorted.
//! Identical inputs therefore produce identical header and payload segments.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::pkcs8::EncodePrivateKey as _;
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use jsonwebtoken::{crypto, Algorithm, EncodingKey};
use p521::ecdsa::signature::Signer;
use p521::ecdsa::{Signature as P521Signature, SigningKey as P521SigningKey};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::RsaPrivateKey;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::error::SignError;
use super::keys::EcPrivateKey;
use super::record::KeyMaterial;
use super::signer::OpaqueSigner;
use super::Header;

/// Borrowed signing primitive handed to the serializer
pub enum SigningKey<'k> {
    Rsa(&'k RsaPrivateKey),
    Ec(&'k EcPrivateKey),
    Symmetric(&'k [u8]),
    Ed25519(&'k Ed25519SigningKey),
    Opaque(&'k dyn OpaqueSigner),
}

impl<'k> SigningKey<'k> {
    /// Borrow the signing primitive behind structured key material.
    ///
    /// Public-only material cannot sign and is rejected here.
    pub fn from_material(material: &'k KeyMaterial) -> Result<Self, SignError> {
        match material {
            KeyMaterial::Rsa(key) => Ok(SigningKey::Rsa(key)),
            KeyMaterial::Ec(key) => Ok(SigningKey::Ec(key)),
            KeyMaterial::Symmetric(secret) => Ok(SigningKey::Symmetric(secret.as_slice())),
            KeyMaterial::Ed25519(key) => Ok(SigningKey::Ed25519(key)),
            KeyMaterial::Public(_) => Err(SignError::UnsupportedKeyType(material.describe())),
        }
    }

    fn family(&self) -> &'static str {
        match self {
            SigningKey::Rsa(_) => "RSA",
            SigningKey::Ec(_) => "EC",
            SigningKey::Symmetric(_) => "oct",
            SigningKey::Ed25519(_) => "OKP",
            SigningKey::Opaque(_) => "opaque",
        }
    }

    fn incompatible(&self, algorithm: &str) -> SignError {
        SignError::SigningPrimitive(format!(
            "invalid algorithm {} for {} key",
            algorithm,
            self.family()
        ))
    }

    /// Reject algorithms the key family cannot produce
    fn check_algorithm(&self, algorithm: JwsAlgorithm) -> Result<(), SignError> {
        use Algorithm::*;

        let compatible = match (self, algorithm) {
            (SigningKey::Ec(EcPrivateKey::P521(_)), algorithm) => algorithm == JwsAlgorithm::Es512,
            (_, JwsAlgorithm::Es512) => false,
            (SigningKey::Rsa(_), JwsAlgorithm::Standard(algorithm)) => {
                matches!(algorithm, RS256 | RS384 | RS512 | PS256 | PS384 | PS512)
            }
            (SigningKey::Ec(EcPrivateKey::P256(_)), JwsAlgorithm::Standard(algorithm)) => {
                algorithm == ES256
            }
            (SigningKey::Ec(EcPrivateKey::P384(_)), JwsAlgorithm::Standard(algorithm)) => {
                algorithm == ES384
            }
            (SigningKey::Symmetric(_), JwsAlgorithm::Standard(algorithm)) => {
                matches!(algorithm, HS256 | HS384 | HS512)
            }
            (SigningKey::Ed25519(_), JwsAlgorithm::Standard(algorithm)) => algorithm == EdDSA,
            (SigningKey::Opaque(signer), JwsAlgorithm::Standard(algorithm)) => {
                let declared = signer.algorithms();
                declared.is_empty() || declared.contains(&algorithm)
            }
        };

        if compatible {
            Ok(())
        } else {
            Err(self.incompatible(algorithm.name()))
        }
    }

    /// Sign the JWS signing input and return the base64url signature segment
    fn sign(&self, algorithm: JwsAlgorithm, signing_input: &[u8]) -> Result<String, SignError> {
        let algorithm = match (self, algorithm) {
            (SigningKey::Ec(EcPrivateKey::P521(secret)), JwsAlgorithm::Es512) => {
                return sign_es512(secret, signing_input);
            }
            (_, JwsAlgorithm::Es512) => return Err(self.incompatible("ES512")),
            (_, JwsAlgorithm::Standard(algorithm)) => algorithm,
        };

        let key = match self {
            SigningKey::Rsa(key) => {
                let der = key.to_pkcs1_der().map_err(SignError::primitive)?;
                EncodingKey::from_rsa_der(der.as_bytes())
            }
            SigningKey::Ec(key) => EncodingKey::from_ec_der(&key.to_pkcs8_der()?),
            SigningKey::Symmetric(secret) => EncodingKey::from_secret(secret),
            SigningKey::Ed25519(key) => {
                let der = key.to_pkcs8_der().map_err(SignError::primitive)?;
                EncodingKey::from_ed_der(der.as_bytes())
            }
            SigningKey::Opaque(signer) => {
                let signature = signer
                    .sign(algorithm, signing_input)
                    .map_err(SignError::primitive)?;
                return Ok(URL_SAFE_NO_PAD.encode(signature));
            }
        };

        Ok(crypto::sign(signing_input, &key, algorithm)?)
    }
}

/// ECDSA on P-521 with SHA-512; the signature is the fixed size `r || s` pair
fn sign_es512(secret: &p521::SecretKey, signing_input: &[u8]) -> Result<String, SignError> {
    let key = P521SigningKey::from_bytes(&secret.to_bytes()).map_err(SignError::primitive)?;
    let signature: P521Signature = key.try_sign(signing_input).map_err(SignError::primitive)?;
    Ok(URL_SAFE_NO_PAD.encode(signature.to_bytes()))
}

/// Algorithm named in the token header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JwsAlgorithm {
    /// Signed through `jsonwebtoken`
    Standard(Algorithm),
    /// ECDSA P-521, which `jsonwebtoken` does not implement
    Es512,
}

impl JwsAlgorithm {
    fn parse(name: &str) -> Result<Self, SignError> {
        if name == "ES512" {
            return Ok(JwsAlgorithm::Es512);
        }
        Algorithm::from_str(name)
            .map(JwsAlgorithm::Standard)
            .map_err(|_| {
                SignError::SigningPrimitive(format!("unknown/unsupported algorithm {}", name))
            })
    }

    fn name(self) -> &'static str {
        match self {
            JwsAlgorithm::Standard(algorithm) => algorithm_name(algorithm),
            JwsAlgorithm::Es512 => "ES512",
        }
    }
}

/// Registered JWS name of an algorithm
pub fn algorithm_name(algorithm: Algorithm) -> &'static str {
    match algorithm {
        Algorithm::HS256 => "HS256",
        Algorithm::HS384 => "HS384",
        Algorithm::HS512 => "HS512",
        Algorithm::ES256 => "ES256",
        Algorithm::ES384 => "ES384",
        Algorithm::RS256 => "RS256",
        Algorithm::RS384 => "RS384",
        Algorithm::RS512 => "RS512",
        Algorithm::PS256 => "PS256",
        Algorithm::PS384 => "PS384",
        Algorithm::PS512 => "PS512",
        Algorithm::EdDSA => "EdDSA",
    }
}

/// Header that ends up in the token: `typ`, then the caller's fields, then `alg`
pub fn merge_header(caller: &Header, algorithm: &str) -> BTreeMap<String, Value> {
    let mut merged = BTreeMap::new();
    merged.insert("typ".to_string(), Value::String("JWT".to_string()));
    merged.extend(caller.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged.insert("alg".to_string(), Value::String(algorithm.to_string()));
    merged
}

/// Produce a compact JWS token.
///
/// Absent claims (or a JSON `null`) and an absent header are rejected before
/// any cryptography happens.
pub fn generate_token(
    claims: Option<&Value>,
    header: Option<&Header>,
    algorithm: &str,
    key: SigningKey<'_>,
) -> Result<String, SignError> {
    let (claims, header) = match (claims, header) {
        (Some(claims), Some(header)) if !claims.is_null() => (claims, header),
        _ => return Err(SignError::MissingInput),
    };
    let claims = claims.as_object().ok_or_else(|| {
        SignError::SigningPrimitive("expected claims to be a JSON object".to_string())
    })?;

    let parsed = JwsAlgorithm::parse(algorithm)?;
    key.check_algorithm(parsed)?;

    let header_json = serde_json::to_vec(&merge_header(header, algorithm))?;
    let sorted_claims: BTreeMap<&String, &Value> = claims.iter().collect();
    let claims_json = serde_json::to_vec(&sorted_claims)?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = key.sign(parsed, signing_input.as_bytes())?;

    Ok(format!("{}.{}", signing_input, signature))
}
