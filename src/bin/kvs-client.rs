//! The kvs-client executable supports the following command line arguments:
//!
//! `kvs-client get <KEY> [--addr IP-PORT]`
//!
//!     Print the string value of a given string key, or an empty line if it was never written.
//!
//! `kvs-client put <KEY> <VALUE> [--addr IP-PORT]`
//!
//!     Set the value of a string key to a string. Prints the value the key held before.
//!
//! `kvs-client append <KEY> <VALUE> [--addr IP-PORT]`
//!
//!     Append a string to the value of a string key. Prints the value the key held before.
//!
//! --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT.
//! If --addr is not specified then connect on 127.0.0.1:4000.
//! A lost request or reply is retried `--retries` times (0 retries forever), waiting
//! `--retry-interval-ms` between attempts.
//! Print an error and return a non-zero exit code on server error, if the server could not be
//! reached, or if an argument does not parse.
//!
//! `kvs-client -V`
//!
//!     Print the version.

use clap::{crate_version, App, Arg, ArgMatches, SubCommand};
use kvsrv::{ClientConfig, KvsClient, KvsError, Result};
use std::net::SocketAddr;
use std::process::exit;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:4000";
const DEFAULT_RETRIES: &str = "10";
const DEFAULT_RETRY_INTERVAL_MS: &str = "100";
const DEFAULT_LOG_LEVEL: &str = "info";

/// the call to make on the server
#[derive(Debug)]
enum Call {
    Get { key: String },
    Put { key: String, value: String },
    Append { key: String, value: String },
}

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    config: ClientConfig,
    call: Call,
}

fn main() {
    let key_arg = || Arg::with_name("KEY").required(true).index(1);
    let value_arg = || Arg::with_name("VALUE").required(true).index(2);

    let matches = App::new("kvs-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a client for the kvsrv in-memory key-value server")
        .subcommands(vec![
            SubCommand::with_name("get")
                .about("Get the string value of a given string key")
                .arg(key_arg()),
            SubCommand::with_name("put")
                .about("Set the value of a string key to a string")
                .arg(key_arg())
                .arg(value_arg()),
            SubCommand::with_name("append")
                .about("Append a string to the value of a string key")
                .arg(key_arg())
                .arg(value_arg()),
        ])
        .arg(Arg::with_name("addr")
            .long("addr")
            .value_name("IP_ADDR:PORT")
            .help("sets the IP_ADDR:PORT of the server to connect to")
            .global(true)
            .default_value(DEFAULT_ADDRESS))
        .arg(Arg::with_name("retries")
            .long("retries")
            .value_name("N")
            .help("how many times the request is sent before giving up, 0 retries forever")
            .global(true)
            .default_value(DEFAULT_RETRIES))
        .arg(Arg::with_name("retry-interval-ms")
            .long("retry-interval-ms")
            .value_name("MS")
            .help("milliseconds to wait between two attempts")
            .global(true)
            .default_value(DEFAULT_RETRY_INTERVAL_MS))
        .arg(Arg::with_name("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .help("sets the maximum level of log messages written to STDERR")
            .possible_values(&["trace", "debug", "info", "warn", "error"])
            .global(true)
            .default_value(DEFAULT_LOG_LEVEL))
        .get_matches();

    // configure a subscriber that will log messages to STDERR
    let log_level = matches
        .subcommand()
        .1
        .and_then(|args| args.value_of("log-level"))
        .or_else(|| matches.value_of("log-level"))
        .unwrap_or(DEFAULT_LOG_LEVEL);
    subscriber_config(log_level);

    // parse commands into an Opt struct, then run it
    if let Err(e) = parse_options(&matches).and_then(run) {
        eprintln!("{}", e);
        exit(1);
    }
}

/// runs the specified call on a [`KvsClient`] and prints the returned value
fn run(opt: Opt) -> Result<()> {
    let mut client = KvsClient::with_config(opt.addr, opt.config)?;
    let value = match opt.call {
        Call::Get { key } => client.get(key)?,
        Call::Put { key, value } => client.put(key, value)?,
        Call::Append { key, value } => client.append(key, value)?,
    };
    println!("{}", value);
    Ok(())
}

/// parses the matches from the command line into an [`Opt`] struct
///
/// # Errors
/// returns [`KvsError::Parsing`] if one of the parameters is invalid
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    let (name, args) = matches.subcommand();
    let args =
        args.ok_or_else(|| KvsError::Parsing("a command is required, see --help".to_owned()))?;

    let addr = args.value_of("addr").unwrap_or(DEFAULT_ADDRESS);
    let addr: SocketAddr = addr.parse().map_err(|_| {
        KvsError::Parsing(format!("could not parse {} into an IP address and port", &addr))
    })?;

    let retry_interval_ms: u64 =
        parse_number(args, "retry-interval-ms", DEFAULT_RETRY_INTERVAL_MS)?;
    let config = ClientConfig {
        max_attempts: parse_number(args, "retries", DEFAULT_RETRIES)?,
        retry_interval: Duration::from_millis(retry_interval_ms),
        ..ClientConfig::default()
    };

    let key = args.value_of("KEY").map(String::from).unwrap_or_default();
    let value = args.value_of("VALUE").map(String::from).unwrap_or_default();
    let call = match name {
        "get" => Call::Get { key },
        "put" => Call::Put { key, value },
        "append" => Call::Append { key, value },
        other => return Err(KvsError::Parsing(format!("unknown command: {}", other))),
    };

    Ok(Opt { addr, config, call })
}

/// parses the value of the `name` argument into a number of type `T`, rejecting values that do
/// not fit into `T`
fn parse_number<T: FromStr>(args: &ArgMatches, name: &str, default: &str) -> Result<T> {
    let raw = args.value_of(name).unwrap_or(default);
    raw.parse::<T>()
        .map_err(|_| KvsError::Parsing(format!("--{} expects a number, got {}", name, raw)))
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(level: &str) {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
