//! `encode` / `decode`: the server's path-segment encoding

use crate::output::Outputter;
use anyhow::Result;
use are_rest_core::encoding;
use clap::Args;
use serde::Serialize;

#[derive(Args)]
pub struct EncodeArgs {
    /// Text to encode
    pub text: String,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Encoded segment, e.g. `65-66-`
    pub token: String,
}

#[derive(Serialize)]
struct Conversion<'a> {
    input: &'a str,
    output: &'a str,
}

pub fn encode(args: EncodeArgs, out: &Outputter) -> Result<()> {
    let encoded = encoding::encode(&args.text);
    out.emit(
        &encoded,
        &Conversion {
            input: &args.text,
            output: &encoded,
        },
    )
}

pub fn decode(args: DecodeArgs, out: &Outputter) -> Result<()> {
    let decoded = encoding::decode(&args.token)?;
    out.emit(
        &decoded,
        &Conversion {
            input: &args.token,
            output: &decoded,
        },
    )
}
