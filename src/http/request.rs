use crate::http::headers::Headers;

/// The first line of a request: `METHOD SP TARGET SP HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// One or more uppercase ASCII letters, e.g. "GET"
    pub method: String,
    /// Origin-form target, kept as received (e.g. "/search?q=rust")
    pub target: String,
    /// Version without the "HTTP/" prefix; always "1.1"
    pub version: String,
}

/// A fully received HTTP request.
///
/// Only [`RequestParser`](crate::http::parser::RequestParser) builds one, and
/// only after the whole body has arrived. Handlers get it by shared reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub(crate) line: RequestLine,
    pub(crate) headers: Headers,
    pub(crate) body: Vec<u8>,
}

impl Request {
    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    pub fn method(&self) -> &str {
        &self.line.method
    }

    pub fn target(&self) -> &str {
        &self.line.target
    }

    pub fn version(&self) -> &str {
        &self.line.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Declared body length, 0 when the header is absent.
    ///
    /// The parser rejects requests whose `Content-Length` is not a number, so
    /// this never fails on a parsed request.
    pub fn content_length(&self) -> usize {
        self.header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}
