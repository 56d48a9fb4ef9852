//! this binary starts the kvsrv server
//! to see the list of commands, type: `kvs-server --help`

use clap::{arg_enum, crate_version, value_t, App, Arg};
use kvsrv::{
    KvStore, KvsError, KvsServer, RayonThreadPool, Result, SharedQueueThreadPool, ThreadPool,
};
use std::net::SocketAddr;
use std::process::exit;
use std::str::FromStr;
use std::thread;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Pool {
        shared,
        rayon
    }
}

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";
const DEFAULT_POOL: Pool = Pool::shared;
const DEFAULT_LOG_LEVEL: &str = "info";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    pool: Pool,
    threads: u32,
}

impl Opt {
    /// validates the `addr` and `threads` parameters
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`KvsError::Parsing`] if one of the parameters is invalid
    ///
    fn build(addr: &str, pool: Pool, threads: Option<&str>) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            KvsError::Parsing(format!("could not parse {} into an IP address and port", &addr))
        })?;

        let threads = match threads {
            Some(threads) => match threads.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(KvsError::Parsing(format!(
                        "{} is not a valid number of threads",
                        threads
                    )))
                }
            },
            None => default_threads(),
        };

        Ok(Opt { addr, pool, threads })
    }
}

fn main() {
    // parse command line args
    let matches = App::new("kvs-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("an in-memory key-value server with exactly-once put and append")
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT that the server listens on")
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("pool")
            .long("pool")
            .value_name("POOL")
            .help("sets the thread pool that runs requests, either 'shared' or 'rayon'")
            .possible_values(&Pool::variants())
            .default_value("shared"))
        .arg(Arg::with_name("threads")
            .long("threads")
            .value_name("N")
            .help("number of threads in the pool, defaults to the number of CPUs"))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("sets the maximum level of log messages written to STDERR")
            .possible_values(&["trace", "debug", "info", "warn", "error"])
            .default_value(DEFAULT_LOG_LEVEL))
        .get_matches();

    // set up a tracing subscriber to log to STDERR
    subscriber_config(matches.value_of("log-level").unwrap_or(DEFAULT_LOG_LEVEL));

    // validate command line options, store them in Opt
    let addr = matches.value_of("addr").unwrap_or(DEFAULT_ADDRESS);
    let pool = value_t!(matches, "pool", Pool).unwrap_or(DEFAULT_POOL);
    let opt = match Opt::build(addr, pool, matches.value_of("threads")) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // start the server
    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("kvs-server {}", env!("CARGO_PKG_VERSION"));
    info!("Thread pool: {} with {} threads", opt.pool, opt.threads);
    info!("Listening on {}", opt.addr);

    let engine = KvStore::new();
    match opt.pool {
        Pool::shared => {
            KvsServer::new(engine, SharedQueueThreadPool::new(opt.threads)?).run(opt.addr)
        }
        Pool::rayon => KvsServer::new(engine, RayonThreadPool::new(opt.threads)?).run(opt.addr),
    }
}

/// the number of CPUs available to this process, or 4 if that can not be determined
fn default_threads() -> u32 {
    thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(4)
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(level: &str) {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        // all spans/events with a level higher than `level` are discarded
        .with_max_level(level)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
