use tokio::io::AsyncWrite;

use httpwire::http::{Handler, HandlerError, Request, ResponseWriter, StatusCode, default_headers};
use httpwire::proxy::Upstream;

const PROXY_PREFIX: &str = "/httpbin";

/// Demo routes served by the binary.
pub struct Routes {
    upstream: Option<Upstream>,
}

impl Routes {
    pub fn new(upstream: Option<Upstream>) -> Self {
        Self { upstream }
    }
}

impl Handler for Routes {
    async fn handle<W>(
        &self,
        request: &Request,
        writer: &mut ResponseWriter<W>,
    ) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = request.target();

        if target == "/yourproblem" {
            return Err(HandlerError::new(
                StatusCode::BadRequest,
                "Your problem is not my problem\n",
            ));
        }
        if target == "/myproblem" {
            return Err(HandlerError::new(
                StatusCode::InternalServerError,
                "Woopsie, my bad\n",
            ));
        }

        if let (Some(rest), Some(upstream)) = (target.strip_prefix(PROXY_PREFIX), &self.upstream) {
            let path = if rest.is_empty() { "/" } else { rest };
            upstream
                .relay(path, writer)
                .await
                .map_err(|e| HandlerError::new(StatusCode::BadGateway, format!("{:#}\n", e)))?;
            return Ok(());
        }

        let body = b"All good\n";
        writer.write_status_line(StatusCode::Ok).await?;
        writer.write_headers(&default_headers(body.len())).await?;
        writer.write_body(body).await?;
        Ok(())
    }
}
