use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";

const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("cannot write {attempted} while {state:?}")]
    OutOfOrder {
        attempted: &'static str,
        state: WriterState,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which part of the response comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    StatusLine,
    Headers,
    Body,
    Chunked,
    Done,
}

/// Writes one response, in order, straight to the connection.
///
/// The status line comes first, then the header block, then either a single
/// fixed-length body or a run of chunks ended by the terminator chunk. Calls
/// made out of that order fail with [`WriteError::OutOfOrder`] and write
/// nothing.
pub struct ResponseWriter<W> {
    inner: W,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            state: WriterState::StatusLine,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// True until the status line has been written.
    pub fn is_untouched(&self) -> bool {
        self.state == WriterState::StatusLine
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.require_state(WriterState::StatusLine, "status line")?;
        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.inner.write_all(line.as_bytes()).await?;
        self.state = WriterState::Headers;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.require_state(WriterState::Headers, "headers")?;

        let mut block = Vec::new();
        for (name, value) in headers.iter() {
            block.extend_from_slice(name.as_bytes());
            block.extend_from_slice(b": ");
            block.extend_from_slice(value.as_bytes());
            block.extend_from_slice(b"\r\n");
        }
        block.extend_from_slice(b"\r\n");

        self.inner.write_all(&block).await?;
        self.state = WriterState::Body;
        Ok(())
    }

    /// Writes a fixed-length body. The matching `content-length` must already
    /// be in the header block.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<(), WriteError> {
        self.require_state(WriterState::Body, "body")?;
        self.inner.write_all(body).await?;
        self.state = WriterState::Done;
        Ok(())
    }

    /// Writes `data` as one `<hex-len>\r\n<data>\r\n` chunk.
    ///
    /// An empty slice writes nothing: a zero-length chunk is the terminator.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if self.state != WriterState::Chunked {
            self.require_state(WriterState::Body, "chunk")?;
            self.state = WriterState::Chunked;
        }
        if data.is_empty() {
            return Ok(0);
        }

        let mut frame = Vec::with_capacity(data.len() + 12);
        frame.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
        frame.extend_from_slice(data);
        frame.extend_from_slice(b"\r\n");
        self.inner.write_all(&frame).await?;

        tracing::debug!(len = data.len(), "wrote chunk");
        Ok(data.len())
    }

    /// Writes the terminating zero-length chunk.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        if self.state != WriterState::Chunked {
            self.require_state(WriterState::Body, "last chunk")?;
        }
        self.inner.write_all(LAST_CHUNK).await?;
        self.state = WriterState::Done;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.inner.flush().await?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn require_state(&self, state: WriterState, attempted: &'static str) -> Result<(), WriteError> {
        if self.state == state {
            Ok(())
        } else {
            Err(WriteError::OutOfOrder {
                attempted,
                state: self.state,
            })
        }
    }
}
