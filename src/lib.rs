//! httpwire - incremental HTTP/1.1 request parser and minimal server
//!
//! Core library for parsing requests off a byte stream, writing responses,
//! and serving connections.

pub mod config;
pub mod http;
pub mod proxy;
pub mod server;
