//! Reverse proxy functionality
//!
//! Relays responses from a single configured upstream, re-framing the body
//! with chunked transfer encoding.

pub mod upstream;

pub use upstream::Upstream;
