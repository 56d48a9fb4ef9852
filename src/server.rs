use crate::command::{Request, Response};
use crate::thread_pool::ThreadPool;
use crate::{KvsEngine, KvsError, Result};
use crossbeam::channel;
use serde_json::Deserializer;
use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// A TCP socket server implementation over a key value storage engine.
/// It listens for incoming [`Request`]s on a
/// [`SocketAddr`](https://doc.rust-lang.org/std/net/enum.SocketAddr.html).
///
/// Every connection gets a lightweight reader thread that decodes requests and writes
/// responses. The requests themselves are executed as jobs on the [`ThreadPool`], so pool
/// workers are only busy while a request runs and an idle connection never holds one.
///
/// A request that is retransmitted by a client is simply handed to the engine again; the
/// engine decides whether it is a duplicate.
///
/// # Example
/// Create a new server with 4 threads running on a Rayon Thread Pool
/// ```rust
/// use kvsrv::{KvStore, KvsServer};
/// use kvsrv::thread_pool::{RayonThreadPool, ThreadPool};
/// # fn main() -> kvsrv::Result<()> {
/// let pool = RayonThreadPool::new(4)?;
/// let server = KvsServer::new(KvStore::new(), pool);
/// // server.run("127.0.0.1:4000")?;
/// # Ok(())
/// # }
/// ```
pub struct KvsServer<E: KvsEngine, P: ThreadPool> {
    /// the kvs engine to use
    engine: E,
    /// a pool of threads that executes requests using a handle to the engine
    pool: Arc<P>,
}

impl<E: KvsEngine, P: ThreadPool + Send + Sync + 'static> KvsServer<E, P> {
    /// Create a new `KvsServer` using the given [`KvsEngine`] and [`ThreadPool`] implementation.
    pub fn new(engine: E, pool: P) -> Self {
        KvsServer {
            engine,
            pool: Arc::new(pool),
        }
    }

    /// binds to the given address and serves connections on it forever.
    ///
    /// # Errors
    /// returns [`KvsError::Io`](crate::KvsError::Io) if the address could not be bound
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        self.serve_on(listener)
    }

    /// serves connections arriving on an already bound `listener`.
    pub fn serve_on(self, listener: TcpListener) -> Result<()> {
        info!("serving on {}", listener.local_addr()?);
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let engine = self.engine.clone();
                    let pool = Arc::clone(&self.pool);
                    let spawned = thread::Builder::new()
                        .name("kvsrv-conn".to_owned())
                        .spawn(move || {
                            if let Err(e) = serve(engine, pool, stream) {
                                error!("Error on serving client: {}", e);
                            }
                        });
                    if let Err(e) = spawned {
                        error!("could not start a connection thread: {}", e);
                    }
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }
        Ok(())
    }
}

/// Processes kv [`Request`]s coming over the given `tcp` stream until the client closes it.
/// Every request is run on the `pool` and answered with a [`Response`] on the same stream,
/// in the order the requests arrived.
///
/// A request that cannot be decoded is answered with [`Response::Err`] and ends the connection,
/// since the rest of the stream can no longer be framed.
fn serve<E, P>(engine: E, pool: Arc<P>, tcp: TcpStream) -> Result<()>
where
    E: KvsEngine,
    P: ThreadPool,
{
    let peer_addr = tcp.peer_addr()?;
    let stream_reader = BufReader::new(&tcp);
    let mut stream_writer = BufWriter::new(&tcp);
    let req_reader = Deserializer::from_reader(stream_reader).into_iter::<Request>();

    let mut send_resp = move |resp: Response| -> Result<()> {
        serde_json::to_writer(&mut stream_writer, &resp)?;
        stream_writer.flush()?;
        debug!("Response sent to {}: {:?}", peer_addr, resp);
        Ok(())
    };

    for req in req_reader {
        let req = match req {
            Ok(req) => req,
            Err(e) => {
                warn!("could not decode request from {}: {}", peer_addr, e);
                send_resp(Response::Err(format!("invalid request: {}", e)))?;
                break;
            }
        };
        debug!("Receive request from {}: {:?}", peer_addr, req);

        let (tx, rx) = channel::bounded(1);
        let engine = engine.clone();
        pool.spawn(move || {
            // the receiver only goes away if the connection thread died
            let _ = tx.send(execute(&engine, req));
        });
        let value = rx
            .recv()
            .map_err(|_| KvsError::StringErr("request was dropped by the thread pool".to_owned()))?;
        send_resp(Response::Ok(value))?;
    }
    debug!("connection from {} closed", peer_addr);
    Ok(())
}

/// applies one request to the engine and returns the value to reply with
fn execute<E: KvsEngine>(engine: &E, req: Request) -> String {
    match req {
        Request::Get { client_id, op_id, key } => engine.get(&client_id, op_id, &key),
        Request::Put { client_id, op_id, key, value } => {
            engine.put(&client_id, op_id, &key, &value)
        }
        Request::Append { client_id, op_id, key, value } => {
            engine.append(&client_id, op_id, &key, &value)
        }
    }
}
