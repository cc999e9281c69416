//! Error types for the RPC layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Transport error: {0}")]
    Transport(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
