// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! `/jwt/sign` endpoint
//!
//! Accepts `{"key": "...", "payload": {...}, "header": {...}}` and answers
//! `{"jwt": "..."}`. Every failure is a 400 with `{"error": "..."}`.

use log::{debug, warn};
use rocket::data::{Data, ToByteUnit};
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::{delete, get, options, patch, post, put, Request, Response, State};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::Instant;

use crate::jwt::{self, Header};

/// Body returned when signing did not finish within the request timeout
pub const TIMEOUT_MESSAGE: &str = "Your request timed out.";

/// Per-server settings shared by the signing routes
#[derive(Debug, Clone)]
pub struct SignSettings {
    /// Deadline for reading, parsing and signing one request
    pub request_timeout: Duration,
    /// Largest body accepted, in KiB
    pub body_limit_kib: u64,
}

/// Request body of `POST /jwt/sign`
///
/// Missing members take their empty value: an empty key, an absent payload
/// and an absent header. The signer reports what is wrong with them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignRequest {
    pub key: String,
    pub payload: Value,
    pub header: Option<Header>,
}

/// Outcome of one signing request
#[derive(Debug)]
pub enum SignResponse {
    /// 200 with `{"jwt": ...}`
    Signed(String),
    /// 400 with `{"error": ...}`
    Rejected(String),
    /// 503 with a plain text body
    TimedOut,
}

impl SignResponse {
    fn rejected(context: &str, err: impl std::fmt::Display) -> Self {
        let message = format!("{}; err={}", context, err);
        warn!("Rejecting signing request: {}", message);
        SignResponse::Rejected(message)
    }
}

/// JSON document terminated by a newline
fn json_line(value: &Value) -> Vec<u8> {
    let mut body = value.to_string().into_bytes();
    body.push(b'\n');
    body
}

impl<'r> Responder<'r, 'static> for SignResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, content_type, body) = match self {
            SignResponse::Signed(token) => {
                (Status::Ok, ContentType::JSON, json_line(&json!({ "jwt": token })))
            }
            SignResponse::Rejected(message) => (
                Status::BadRequest,
                ContentType::JSON,
                json_line(&json!({ "error": message })),
            ),
            SignResponse::TimedOut => (
                Status::ServiceUnavailable,
                ContentType::Plain,
                TIMEOUT_MESSAGE.as_bytes().to_vec(),
            ),
        };

        Response::build()
            .status(status)
            .header(content_type)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

/// Sign a payload with the key supplied in the request
#[post("/jwt/sign", data = "<body>")]
pub async fn sign(body: Data<'_>, settings: &State<SignSettings>) -> SignResponse {
    let limit = settings.body_limit_kib.kibibytes();
    let handle = async move {
        let raw = match body.open(limit).into_bytes().await {
            Ok(raw) if raw.is_complete() => raw.into_inner(),
            Ok(_) => {
                return SignResponse::rejected(
                    "unable to read the request body",
                    format!("body exceeds {} KiB", settings.body_limit_kib),
                )
            }
            Err(err) => return SignResponse::rejected("unable to read the request body", err),
        };

        let request: SignRequest = match serde_json::from_slice(&raw) {
            Ok(request) => request,
            Err(err) => {
                return SignResponse::rejected("request body contains invalid input", err)
            }
        };

        let signed = tokio::task::spawn_blocking(move || {
            jwt::sign(
                request.key.as_bytes(),
                &request.payload,
                request.header.as_ref(),
            )
        })
        .await;

        match signed {
            Ok(Ok(token)) => {
                debug!("Signed payload, token is {} bytes long", token.len());
                SignResponse::Signed(token)
            }
            Ok(Err(err)) => SignResponse::rejected("unable to sign the payload", err),
            Err(err) => SignResponse::rejected("unable to sign the payload", err),
        }
    };

    let started = Instant::now();
    match tokio::time::timeout(settings.request_timeout, handle).await {
        // Finishing on the deadline still counts as late
        Ok(response) if started.elapsed() < settings.request_timeout => response,
        _ => {
            warn!(
                "Signing request exceeded {:?}, answering 503",
                settings.request_timeout
            );
            SignResponse::TimedOut
        }
    }
}

#[get("/jwt/sign")]
pub fn sign_get() -> (Status, ()) {
    method_not_accepted("GET")
}

#[put("/jwt/sign")]
pub fn sign_put() -> (Status, ()) {
    method_not_accepted("PUT")
}

#[delete("/jwt/sign")]
pub fn sign_delete() -> (Status, ()) {
    method_not_accepted("DELETE")
}

#[patch("/jwt/sign")]
pub fn sign_patch() -> (Status, ()) {
    method_not_accepted("PATCH")
}

#[options("/jwt/sign")]
pub fn sign_options() -> (Status, ()) {
    method_not_accepted("OPTIONS")
}

/// 400 with an empty body for anything but POST
fn method_not_accepted(method: &str) -> (Status, ()) {
    warn!("HTTP method is '{}' but expected 'POST'", method);
    (Status::BadRequest, ())
}
