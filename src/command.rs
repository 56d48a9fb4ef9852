use serde::{Deserialize, Serialize};

/// These are the request "commands" that a client sends to the kv server.
///
/// Every request carries the `client_id` of the sender and the `op_id` of the logical call it
/// belongs to. A retransmission of a call re-sends the exact same request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// get a value from the store
    Get {
        /// the client that issued the call
        client_id: String,
        /// identifier of the logical call
        op_id: u64,
        /// the key to read
        key: String,
    },
    /// overwrite the value of a key
    Put {
        /// the client that issued the call
        client_id: String,
        /// identifier of the logical call
        op_id: u64,
        /// the key to write
        key: String,
        /// the new value
        value: String,
    },
    /// concatenate a value onto the existing value of a key
    Append {
        /// the client that issued the call
        client_id: String,
        /// identifier of the logical call
        op_id: u64,
        /// the key to append to
        key: String,
        /// the value to append
        value: String,
    },
}

impl Request {
    /// the operation id carried by this request
    pub fn op_id(&self) -> u64 {
        match self {
            Request::Get { op_id, .. }
            | Request::Put { op_id, .. }
            | Request::Append { op_id, .. } => *op_id,
        }
    }
}

/// The Response types that can be returned for any kv [`Request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// the request was applied (or recognized as a duplicate). Holds the value for a `Get`,
    /// or the value that was stored before the call for a `Put` / `Append`
    Ok(String),
    /// the request could not be decoded. The server closes the connection after sending this
    Err(String),
}
