use std::io;

use habitdoku_common::models::SuccessCode;
use habitdoku_common::protocol::ProtocolShapeError;
use habitdoku_common::wire::WireError;
use thiserror::Error;

/// Errors surfaced by the client.
///
/// Transport failures, malformed replies, and server rejection of a
/// retrieval are distinct variants; application-level failure of a
/// mutating operation is reported through its [`SuccessCode`] return
/// value instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("failed to connect to {endpoint}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("transport error")]
    Io(#[from] io::Error),
    #[error("connection closed before a reply arrived")]
    ConnectionClosed,
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Shape(#[from] ProtocolShapeError),
    #[error("reply is missing the `{0}` field")]
    MissingReplyField(&'static str),
    #[error("server rejected the request (code {code:?})")]
    Server {
        code: SuccessCode,
        message: Option<String>,
    },
    #[error("habit has no server id yet")]
    HabitNotSynced,
}
