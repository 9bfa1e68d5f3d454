//! HTTP/1.1 request parsing and response writing.
//!
//! # Architecture
//!
//! - **`tokens`**: Literal bytes of the request grammar
//! - **`headers`**: Case-insensitive, comma-joining header collection
//! - **`parser`**: Incremental request parser fed from a growable buffer
//! - **`request`**: The parsed, read-only request handed to handlers
//! - **`response`**: Status table and default response headers
//! - **`writer`**: Ordered response writer with fixed-length and chunked bodies
//! - **`handler`**: The application callback and its error type
//! - **`connection`**: Per-connection driver tying the pieces together
//!
//! # Parser State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │   Initialized    │ ← Wait for the request line
//!        └──────┬───────────┘
//!               │ METHOD SP TARGET SP HTTP/1.1 CRLF
//!               ▼
//!        ┌──────────────────┐
//!        │  ParsingHeaders  │ ← One header line per step
//!        └──────┬───────────┘
//!               │ empty line
//!               ├─ no Content-Length, or "0" ─────────┐
//!               ▼                                     │
//!        ┌──────────────────┐                         │
//!        │   ParsingBody    │ ← Accumulate body bytes │
//!        └──────┬───────────┘                         │
//!               │ Content-Length bytes received       │
//!               ▼                                     │
//!        ┌──────────────────┐                         │
//!        │       Done       │ ◀───────────────────────┘
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use httpwire::http::connection::{Connection, Limits};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         tokio::spawn(async move {
//!             let conn = Connection::new(socket, Limits::default());
//!             if let Err(e) = conn.run(&MyHandler).await {
//!                 tracing::warn!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod handler;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod tokens;
pub mod writer;

pub use handler::{Handler, HandlerError};
pub use headers::Headers;
pub use request::{Request, RequestLine};
pub use response::{StatusCode, default_headers};
pub use writer::ResponseWriter;
