// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error taxonomy for key resolution and token signing
//!
//! Every failure is terminal: parsing and cryptographic errors are never
//! transient, so callers get the error back as-is and nothing is retried.

use thiserror::Error;

/// Errors produced while resolving a key or signing a token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// None of the supported key formats matched the input bytes.
    ///
    /// The individual parser errors are discarded on purpose: callers only
    /// learn that no supported format matched.
    #[error("unable to parse the private key")]
    KeyParse,

    /// The resolved key cannot be used for signing
    #[error("unsupported private key type: {0}")]
    UnsupportedKeyType(String),

    /// An opaque signer is backed by a public key that is neither RSA nor EC
    #[error("unsupported private / public key pairs: {signer}, {public_key}")]
    UnsupportedKeyPair { signer: String, public_key: String },

    /// Claims (or header) were absent when the token was generated
    #[error("either claims or header is nil")]
    MissingInput,

    /// The signing primitive or the compact serializer failed.
    ///
    /// The primitive's message is kept verbatim.
    #[error("{0}")]
    SigningPrimitive(String),
}

impl SignError {
    /// Wrap any primitive-level failure, preserving its message
    pub fn primitive(err: impl std::fmt::Display) -> Self {
        SignError::SigningPrimitive(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for SignError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        SignError::primitive(err)
    }
}

impl From<serde_json::Error> for SignError {
    fn from(err: serde_json::Error) -> Self {
        SignError::primitive(err)
    }
}
