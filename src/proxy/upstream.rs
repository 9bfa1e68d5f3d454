//! Upstream connection and response relaying
//!
//! Forwards a request path to a fixed upstream and streams the upstream
//! response back to the client with chunked framing, whatever framing the
//! upstream used.

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

use crate::config::ProxyConfig;
use crate::http::headers::Headers;
use crate::http::response::StatusCode;
use crate::http::tokens::{self, CRLF, HTTP_VERSION_PREFIX, SP};
use crate::http::writer::ResponseWriter;

/// Default buffer size for streaming
const BUFFER_SIZE: usize = 8192;

/// Largest upstream response head accepted
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// A fixed upstream server requests are forwarded to.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: Url,
    connect_timeout: Duration,
}

/// Status line and headers of an upstream response.
#[derive(Debug)]
pub struct UpstreamHead {
    pub code: u16,
    pub headers: Headers,
}

impl Upstream {
    pub fn new(base: &str, connect_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base).context("Invalid upstream URL")?;
        if base.scheme() != "http" {
            anyhow::bail!("Unsupported upstream scheme {}", base.scheme());
        }
        base.host_str().context("Upstream URL missing host")?;

        Ok(Self {
            base,
            connect_timeout,
        })
    }

    pub fn from_config(cfg: &ProxyConfig) -> Result<Self> {
        Self::new(&cfg.upstream, Duration::from_secs(cfg.connect_timeout_secs))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `Host` header value for the upstream, with the port when explicit.
    fn host_header(&self) -> String {
        let host = self.base.host_str().unwrap_or_default();
        match self.base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Builds the bytes of a `GET` for `path` on the upstream.
    ///
    /// HTTP/1.0 is used so the upstream answers with a fixed length or a
    /// close-delimited body, never a chunked one.
    pub fn build_request(&self, path: &str) -> Vec<u8> {
        let prefix = self.base.path().trim_end_matches('/');
        let path = if path.starts_with('/') {
            format!("{}{}", prefix, path)
        } else {
            format!("{}/{}", prefix, path)
        };

        format!(
            "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
            path,
            self.host_header()
        )
        .into_bytes()
    }

    /// Fetches `path` from the upstream and relays the response through
    /// `writer` as a chunked body. Returns the number of body bytes relayed.
    pub async fn relay<W>(&self, path: &str, writer: &mut ResponseWriter<W>) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let mut stream = self.connect().await?;
        stream.write_all(&self.build_request(path)).await?;
        stream.flush().await?;

        let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
        let head = read_head(&mut stream, &mut buffer).await?;
        let declared = head
            .headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok());

        // parse_status_line only admits three digits, so this is 000..=099
        let status = StatusCode::from_u16(head.code).unwrap_or(StatusCode::BadGateway);
        let mut headers = head.headers;
        headers.delete("content-length");
        headers.replace("connection", "close");
        headers.replace("transfer-encoding", "chunked");

        writer.write_status_line(status).await?;
        writer.write_headers(&headers).await?;

        let mut relayed = 0;
        loop {
            if let Some(limit) = declared {
                buffer.truncate(limit.saturating_sub(relayed));
            }
            if !buffer.is_empty() {
                relayed += writer.write_chunked_body(&buffer).await?;
                buffer.clear();
            }
            if declared.is_some_and(|limit| relayed >= limit) {
                break;
            }

            buffer.reserve(BUFFER_SIZE);
            if stream.read_buf(&mut buffer).await? == 0 {
                if let Some(limit) = declared.filter(|&limit| relayed < limit) {
                    anyhow::bail!(
                        "Upstream closed after {} of {} body bytes",
                        relayed,
                        limit
                    );
                }
                break;
            }
        }

        writer.write_chunked_body_done().await?;
        tracing::debug!(
            upstream = %self.base,
            path,
            status = head.code,
            relayed,
            "Relayed upstream response"
        );
        Ok(relayed)
    }

    async fn connect(&self) -> Result<TcpStream> {
        let host = self.base.host_str().context("Upstream URL missing host")?;
        let port = self.base.port_or_known_default().unwrap_or(80);

        let stream = timeout(self.connect_timeout, TcpStream::connect((host, port)))
            .await
            .context("Connection timeout")?
            .context("Failed to connect to upstream")?;

        tracing::trace!(upstream = %self.base, "Connected to upstream");
        Ok(stream)
    }
}

/// Reads the upstream status line and headers, leaving any body bytes that
/// arrived with them in `buffer`.
async fn read_head(stream: &mut TcpStream, buffer: &mut BytesMut) -> Result<UpstreamHead> {
    let mut code = None;
    let mut headers = Headers::new();

    loop {
        if code.is_none() {
            if let Some((parsed, consumed)) = parse_status_line(buffer)? {
                code = Some(parsed);
                buffer.advance(consumed);
            }
        }

        if let Some(code) = code {
            loop {
                let (consumed, done) = headers
                    .parse(buffer)
                    .context("Invalid upstream response header")?;
                buffer.advance(consumed);
                if done {
                    return Ok(UpstreamHead { code, headers });
                }
                if consumed == 0 {
                    break;
                }
            }
        }

        if buffer.len() > MAX_HEAD_SIZE {
            anyhow::bail!("Upstream response headers too large");
        }

        buffer.reserve(BUFFER_SIZE);
        if stream.read_buf(buffer).await? == 0 {
            anyhow::bail!("Connection closed before complete response received");
        }
    }
}

/// Parses `HTTP/x.y SP CODE SP REASON CRLF`, returning the code and the
/// bytes consumed. `Ok(None)` means the line is not complete yet.
pub fn parse_status_line(buf: &[u8]) -> Result<Option<(u16, usize)>> {
    let Some(line_end) = tokens::find_crlf(buf) else {
        return Ok(None);
    };
    let line = &buf[..line_end];

    let mut parts = line.splitn(3, |&b| b == SP);
    let version = parts.next().unwrap_or_default();
    if !version.starts_with(HTTP_VERSION_PREFIX) {
        anyhow::bail!("Invalid status line: {}", String::from_utf8_lossy(line));
    }

    let code = parts
        .next()
        .filter(|c| c.len() == 3)
        .and_then(|c| std::str::from_utf8(c).ok())
        .and_then(|c| c.parse::<u16>().ok())
        .with_context(|| format!("Invalid status code in {}", String::from_utf8_lossy(line)))?;

    Ok(Some((code, line_end + CRLF.len())))
}
