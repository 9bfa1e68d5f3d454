use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::time::timeout;

use crate::config::ServerConfig;
use crate::http::handler::{Handler, HandlerError};
use crate::http::parser::{ParseError, ParserState, RequestParser};
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::{ResponseWriter, WriteError};

/// Spare capacity reserved before each read.
const READ_CHUNK: usize = 1024;

pub const DEFAULT_MAX_HEAD_SIZE: usize = 64 * 1024;

/// Per-connection limits.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Most bytes accepted before the header section completes
    pub max_head_size: usize,
    /// Deadline for each read while the request is incomplete
    pub read_timeout: Option<Duration>,
    /// Deadline for the handler to produce its whole response
    pub write_timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_head_size: DEFAULT_MAX_HEAD_SIZE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl From<&ServerConfig> for Limits {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            max_head_size: cfg.max_head_size,
            read_timeout: cfg.read_timeout_secs.map(Duration::from_secs),
            write_timeout: cfg.write_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("malformed request: {0}")]
    Parse(#[from] ParseError),

    #[error("connection closed before the request was complete ({0:?})")]
    Truncated(ParserState),

    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("timed out waiting for request bytes")]
    ReadTimeout,

    #[error("timed out writing the response")]
    WriteTimeout,

    #[error("handler failed after part of the response was sent: {0}")]
    Handler(HandlerError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConnectionError {
    /// Status of the best-effort response to send for this failure, `None`
    /// when the connection should just be closed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ConnectionError::Parse(_) | ConnectionError::Truncated(_) => {
                Some(StatusCode::BadRequest)
            }
            ConnectionError::HeadTooLarge(_) => Some(StatusCode::HeaderFieldsTooLarge),
            ConnectionError::ReadTimeout => Some(StatusCode::RequestTimeout),
            _ => None,
        }
    }
}

pub enum ConnectionState {
    Reading,
    Handling(Request),
    Closed,
}

/// Drives a single request/response exchange over `stream`.
///
/// ```text
///   Reading ──request──▶ Handling ──response──▶ Closed
///      │
///      └──malformed / eof / limit──▶ error page ──▶ Closed
/// ```
///
/// There is no keep-alive: every response is sent with `connection: close`
/// and the connection ends after it.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    limits: Limits,
    state: ConnectionState,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, limits: Limits) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            limits,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run<H: Handler>(mut self, handler: &H) -> Result<(), ConnectionError> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(request) => {
                        self.state = ConnectionState::Handling(request);
                    }
                    Err(err) => {
                        self.reject(&err).await;
                        return Err(err);
                    }
                },

                ConnectionState::Handling(request) => {
                    self.handle(handler, &request).await?;
                }

                ConnectionState::Closed => break,
            }
        }

        // the peer may already be gone
        let _ = self.stream.shutdown().await;
        Ok(())
    }

    /// Reads from the stream until one full request has been parsed.
    pub async fn read_request(&mut self) -> Result<Request, ConnectionError> {
        let mut parser = RequestParser::new();
        let mut received = self.buffer.len();

        loop {
            if parser.feed(&mut self.buffer)? {
                break;
            }

            if !parser.is_head_complete() && received > self.limits.max_head_size {
                return Err(ConnectionError::HeadTooLarge(self.limits.max_head_size));
            }

            self.buffer.reserve(READ_CHUNK);
            let read = self.stream.read_buf(&mut self.buffer);
            let n = match self.limits.read_timeout {
                Some(limit) => timeout(limit, read)
                    .await
                    .map_err(|_| ConnectionError::ReadTimeout)??,
                None => read.await?,
            };

            if n == 0 {
                return Err(ConnectionError::Truncated(parser.state()));
            }
            received += n;
            tracing::debug!(
                read = n,
                buffered = self.buffer.len(),
                capacity = self.buffer.capacity(),
                "read request bytes"
            );
        }

        parser
            .finish()
            .ok_or(ConnectionError::Parse(ParseError::AlreadyDone))
    }

    async fn handle<H: Handler>(
        &mut self,
        handler: &H,
        request: &Request,
    ) -> Result<(), ConnectionError> {
        let mut writer = ResponseWriter::new(BufWriter::new(Wire::new(&mut self.stream)));

        let handled = handler.handle(request, &mut writer);
        let outcome = match self.limits.write_timeout {
            Some(limit) => timeout(limit, handled)
                .await
                .map_err(|_| ConnectionError::WriteTimeout)?,
            None => handled.await,
        };

        let mut writer = match outcome {
            Ok(()) => {
                if writer.is_untouched() {
                    tracing::debug!(path = request.target(), "handler wrote nothing, sending empty 200");
                    write_error_page(&mut writer, StatusCode::Ok, "").await?;
                }
                writer
            }
            Err(err) => {
                tracing::warn!(
                    method = request.method(),
                    path = request.target(),
                    status = err.status.as_u16(),
                    message = %err.message,
                    "handler returned an error"
                );

                // unwrapping the BufWriter discards whatever the handler left unflushed
                let wire = writer.into_inner().into_inner();
                if wire.sent() > 0 {
                    return Err(ConnectionError::Handler(err));
                }

                let mut page = ResponseWriter::new(BufWriter::new(wire));
                write_error_page(&mut page, err.status, &err.message).await?;
                page
            }
        };

        writer.flush().await?;
        tracing::info!(
            method = request.method(),
            path = request.target(),
            "request handled"
        );
        Ok(())
    }

    /// Best-effort error page for a request that could not be read.
    async fn reject(&mut self, err: &ConnectionError) {
        let Some(status) = err.status() else {
            return;
        };

        let mut writer = ResponseWriter::new(BufWriter::new(&mut self.stream));
        let message = format!("{err}\n");
        let sent = match write_error_page(&mut writer, status, &message).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            tracing::debug!(error = %e, "could not send error response");
        }
        let _ = self.stream.shutdown().await;
    }
}

/// Write half of the connection that counts bytes handed to the socket.
struct Wire<W> {
    inner: W,
    sent: usize,
}

impl<W> Wire<W> {
    fn new(inner: W) -> Self {
        Self { inner, sent: 0 }
    }

    fn sent(&self) -> usize {
        self.sent
    }
}

impl<W: AsyncWrite + Unpin> AsyncWrite for Wire<W> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let poll = Pin::new(&mut self.inner).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = poll {
            self.sent += n;
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Writes a complete plain-text response carrying `message` as its body.
pub async fn write_error_page<W>(
    writer: &mut ResponseWriter<W>,
    status: StatusCode,
    message: &str,
) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_status_line(status).await?;
    writer.write_headers(&default_headers(message.len())).await?;
    writer.write_body(message.as_bytes()).await
}
