#![deny(missing_docs)]
//! An in-memory key-value store (kvsrv) server, that maps [`String`] keys to [`String`] values
//! and applies every mutating call exactly once, even when clients retransmit it.
//!
//! This crate provides the [`KvStore`] engine itself, the [`KvsServer`] and [`KvsClient`] that
//! carry calls over TCP, and a `kvs-client` and `kvs-server` executable built on top of them.
//!
//! ## Supported Operations
//! The store supports three types of operations (a.k.a "commands"):
//!
//! - `GET` the value associated with a key (a key that was never written reads as `""`)
//! - `PUT` a key/value pair, returning the value that was there before
//! - `APPEND` a value onto the value of a key, returning the value that was there before
//!
//! See the [`KvsEngine`] trait and the [`Request`] and [`Response`] types for more information
//! on the structure of these operations.
//!
//! ## Duplicate Detection
//! Clients may send the same call more than once, for example when a reply got lost and the
//! client retried. Every request therefore carries a `client_id` and the `op_id` of the logical
//! call it belongs to. [`KvStore`] remembers the `op_id` of the last call processed for each
//! client and treats a request carrying that same `op_id` as a duplicate:
//!
//! - a duplicate `PUT` or `APPEND` is not applied again, but still replies with the value that is
//!   currently stored
//! - a duplicate `GET` behaves exactly like a fresh one
//!
//! Only the last call of each client is remembered. This is enough as long as a client has at
//! most one call in flight and never reuses an `op_id`, which is what [`KvsClient`] does.
//!
//! All data lives behind a single lock, so every operation (the duplicate check, the
//! read and the write) is atomic with respect to every other operation.
//!
//! ## Custom Protocol
//! The custom protocol is used to exchange data between the client and server. It is simply a
//! [`Request`] encoded to/from a JSON string and sent over a `TcpStream`. The server answers
//! every request with an `Ok` [`Response`] holding the resulting value, or with an `Err`
//! response if the request could not be decoded.
//!
//! [`String`]: https://doc.rust-lang.org/std/string/struct.String.html

pub use client::{ClientConfig, KvsClient};
pub use command::{Request, Response};
pub use engine::{KvStore, KvsEngine};
pub use error::{KvsError, Result};
pub use server::KvsServer;
pub use thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};

mod client;
mod command;
mod engine;
mod error;
mod server;
pub mod thread_pool;
