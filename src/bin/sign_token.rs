// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-jwt-signer project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rust_jwt_signer::jwt::{self, Header};
use serde_json::Value;

/// Sign a JSON claim set with a private key and print the compact JWT
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Private key file: JSON Web Key, RSA PEM or EC PEM
    #[clap(long)]
    key: PathBuf,

    /// Claims JSON file, `-` reads standard input
    #[clap(long, default_value = "-")]
    claims: String,

    /// Optional JSON file with extra header fields (`alg`, `kid`...)
    #[clap(long)]
    header: Option<PathBuf>,

    /// Only print the token
    #[clap(long, short)]
    quiet: bool,
}

/// Claims from the file at `source`, or from `stdin` when `source` is `-`
fn read_claims(source: &str, mut stdin: impl Read) -> Result<Value> {
    let contents = if source == "-" {
        let mut buffer = String::new();
        stdin
            .read_to_string(&mut buffer)
            .context("Failed to read claims from standard input")?;
        buffer
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("Failed to read claims file at {:?}", source))?
    };
    serde_json::from_str(&contents).context("Claims are not valid JSON")
}

fn read_header(path: &Path) -> Result<Header> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read header file at {:?}", path))?;
    serde_json::from_str(&contents).context("Header must be a JSON object")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let key = fs::read(&args.key)
        .with_context(|| format!("Failed to read private key file at {:?}", args.key))?;
    let claims = read_claims(&args.claims, std::io::stdin())?;
    let header = args.header.as_deref().map(read_header).transpose()?;

    let token = jwt::sign(&key, &claims, header.as_ref()).context("Failed to sign the claims")?;

    if args.quiet {
        println!("{}", token);
    } else {
        println!("Signed with key from {:?}", args.key);
        println!();
        println!("{}", token);
    }

    Ok(())
}
