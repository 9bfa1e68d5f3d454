use std::future::Future;

use tokio::io::AsyncWrite;

use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::{ResponseWriter, WriteError};

/// Application callback invoked once per fully parsed request.
///
/// The handler writes its response through `writer`. Returning an error
/// before anything was written makes the connection send an error page built
/// from it instead.
///
/// ```ignore
/// struct Hello;
///
/// impl Handler for Hello {
///     async fn handle<W>(&self, _req: &Request, w: &mut ResponseWriter<W>) -> Result<(), HandlerError>
///     where
///         W: AsyncWrite + Unpin + Send,
///     {
///         w.write_status_line(StatusCode::Ok).await?;
///         w.write_headers(&default_headers(6)).await?;
///         w.write_body(b"hello\n").await?;
///         Ok(())
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        request: &Request,
        writer: &mut ResponseWriter<W>,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// Failure reported by a handler, turned into a response by the connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<WriteError> for HandlerError {
    fn from(err: WriteError) -> Self {
        HandlerError::new(StatusCode::InternalServerError, err.to_string())
    }
}
