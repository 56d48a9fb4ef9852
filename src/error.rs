use std::io;
use thiserror::Error;

/// type alias for all fallible operations of the server, client and thread pools
pub type Result<T> = std::result::Result<T, KvsError>;

/// The Error variants used by the kvsrv transport and executables.
///
/// The [`KvStore`](crate::KvStore) itself never fails, so every variant here comes from
/// networking, (de)serialization or command line parsing.
#[derive(Error, Debug)]
pub enum KvsError {
    /// variant for errors caused from socket or file IO
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// a request or response could not be (de)serialized
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// a command line parameter could not be parsed
    #[error("parsing error: {0}")]
    Parsing(String),

    /// an error message reported by the server
    #[error("{0}")]
    StringErr(String),

    /// the client gave up on a call before it observed a reply
    #[error("no reply from the server after {attempts} attempt(s)")]
    RetriesExhausted {
        /// number of times the request was sent
        attempts: u32,
    },
}
