use crate::command::{Request, Response};
use crate::{KvsError, Result};
use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::Deserializer;
use std::io::{BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry and timeout settings of a [`KvsClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// how many times a request is sent before giving up. `0` retries forever
    pub max_attempts: u32,
    /// pause between two attempts
    pub retry_interval: Duration,
    /// how long to wait for a reply before treating it as lost
    pub reply_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            max_attempts: 0,
            retry_interval: Duration::from_millis(100),
            reply_timeout: Some(Duration::from_secs(1)),
        }
    }
}

/// an open connection to the server
struct Connection {
    reader: Deserializer<IoRead<BufReader<TcpStream>>>,
    writer: BufWriter<TcpStream>,
}

impl Connection {
    fn open(addr: &SocketAddr, reply_timeout: Option<Duration>) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        tcp_reader.set_read_timeout(reply_timeout)?;
        let tcp_writer = tcp_reader.try_clone()?;
        Ok(Connection {
            reader: Deserializer::from_reader(BufReader::new(tcp_reader)),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// sends `req` and waits for its response
    fn call(&mut self, req: &Request) -> Result<Response> {
        serde_json::to_writer(&mut self.writer, req)?;
        self.writer.flush()?;
        Ok(Response::deserialize(&mut self.reader)?)
    }
}

/// `KvsClient` contains the functionality for communication with a [`KvsServer`](crate::KvsServer).
///
/// Every call made through the client is one logical operation with its own operation id.
/// If the request or its reply gets lost, the client reconnects and re-sends the identical
/// request until it observes a reply, and the server makes sure the operation is applied only
/// once. Methods take `&mut self`, so a client never has more than one call in flight.
///
/// Every client picks a random client id of its own. Operation ids are only unique within one
/// client instance, so two instances never present themselves as the same client.
pub struct KvsClient {
    addr: SocketAddr,
    client_id: String,
    next_op_id: u64,
    config: ClientConfig,
    conn: Option<Connection>,
}

impl KvsClient {
    /// creates a client for the server at the given `addr`, using the default [`ClientConfig`]
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Self::with_config(addr, ClientConfig::default())
    }

    /// creates a client for the server at the given `addr`.
    /// The first connection attempt is made eagerly, but failing it is not an error since
    /// every call retries the connection anyway
    pub fn with_config<A: ToSocketAddrs>(addr: A, config: ClientConfig) -> Result<Self> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| KvsError::Parsing("no socket address to connect to".to_owned()))?;
        // op ids restart at 1 for every client, so the id must never be shared with another
        // client instance
        let client_id = format!("{:016x}", rand::random::<u64>());
        let conn = match Connection::open(&addr, config.reply_timeout) {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!("could not connect to {}: {}", addr, e);
                None
            }
        };

        Ok(KvsClient {
            addr,
            client_id,
            next_op_id: 1,
            config,
            conn,
        })
    }

    /// the identifier this client sends with every request
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// gets the value of the specified `key` from the server.
    /// Returns an empty string if the key was never written
    pub fn get(&mut self, key: String) -> Result<String> {
        let req = Request::Get {
            client_id: self.client_id.clone(),
            op_id: self.next_op_id(),
            key,
        };
        self.call(req)
    }

    /// sets `key` to `value` on the server.
    /// Returns the value that was stored at `key` before the call
    pub fn put(&mut self, key: String, value: String) -> Result<String> {
        let req = Request::Put {
            client_id: self.client_id.clone(),
            op_id: self.next_op_id(),
            key,
            value,
        };
        self.call(req)
    }

    /// appends `value` to the value of `key` on the server.
    /// Returns the value that was stored at `key` before the call
    pub fn append(&mut self, key: String, value: String) -> Result<String> {
        let req = Request::Append {
            client_id: self.client_id.clone(),
            op_id: self.next_op_id(),
            key,
            value,
        };
        self.call(req)
    }

    fn next_op_id(&mut self) -> u64 {
        let op_id = self.next_op_id;
        self.next_op_id += 1;
        op_id
    }

    /// sends `req` until a reply is observed or the attempts are used up
    ///
    /// # Errors
    /// `KvsError::StringErr` if the server rejected the request,
    /// `KvsError::RetriesExhausted` if no reply arrived within `max_attempts`
    fn call(&mut self, req: Request) -> Result<String> {
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            match self.try_call(&req) {
                Ok(Response::Ok(value)) => return Ok(value),
                Ok(Response::Err(msg)) => {
                    self.conn = None;
                    return Err(KvsError::StringErr(msg));
                }
                Err(e) => {
                    let op_id = req.op_id();
                    warn!("attempt {} of operation {} failed: {}", attempts, op_id, e);
                }
            }
            if self.config.max_attempts != 0 && attempts >= self.config.max_attempts {
                return Err(KvsError::RetriesExhausted { attempts });
            }
            thread::sleep(self.config.retry_interval);
        }
    }

    /// makes one attempt at `req`. The connection is only kept if the attempt succeeded
    fn try_call(&mut self, req: &Request) -> Result<Response> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                debug!("connecting to {}", self.addr);
                Connection::open(&self.addr, self.config.reply_timeout)?
            }
        };
        let resp = conn.call(req)?;
        self.conn = Some(conn);
        Ok(resp)
    }
}
