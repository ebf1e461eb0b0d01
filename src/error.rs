use thiserror::Error;

use crate::proto::ErrorCode;

#[derive(Debug, Error)]
pub enum Error {
    /// Opening or configuring the underlying port failed. Nothing was
    /// partially initialized.
    #[error("transport: {0}")]
    Transport(String),

    /// The peer did not produce the requested bytes within the read
    /// timeout window.
    #[error("timeout: no response from instrument")]
    Timeout,

    /// The peer rejected a request with an explicit error code.
    #[error("instrument reported {0:?}")]
    Protocol(ErrorCode),

    /// A frame body failed to parse. The byte stream should be treated as
    /// desynchronized; reconnecting is the only safe recovery.
    #[error("malformed frame: {0}")]
    Decode(#[from] prost::DecodeError),

    /// An encoded body too large for the 16-bit length prefix.
    #[error("frame body of {0} bytes exceeds the length prefix")]
    Oversize(usize),

    /// The reply carried a payload variant the request does not pair with.
    #[error("unexpected reply payload, wanted {0}")]
    UnexpectedReply(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serial(#[from] serialport::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
