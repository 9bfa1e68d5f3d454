use bytes::{Buf, BytesMut};

use crate::http::headers::Headers;
use crate::http::request::{Request, RequestLine};
use crate::http::tokens::{self, CRLF, HTTP_VERSION_PREFIX, SP, SUPPORTED_VERSION};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("request line has {0} fields, expected 3")]
    WrongFieldCount(usize),

    #[error("method must be one or more uppercase letters")]
    InvalidMethod,

    #[error("invalid request target")]
    InvalidTarget,

    #[error("version must start with HTTP/")]
    InvalidVersionName,

    #[error("unsupported http version {0}")]
    UnsupportedVersion(String),

    #[error("malformed header line")]
    MalformedHeader,

    #[error("invalid character in header name")]
    InvalidHeaderName,

    #[error("invalid content length")]
    InvalidContentLength,

    #[error("body longer than declared content length")]
    BodyTooLong,

    #[error("parser invoked after the request was complete")]
    AlreadyDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody { declared: usize },
    Done,
}

/// Incremental request parser.
///
/// Each call to [`parse`](Self::parse) looks at the bytes not consumed so far
/// and makes at most one step of progress: the request line, one header line,
/// or everything offered as body. Consumed bytes must be dropped by the caller
/// before the next call.
///
/// Calling `parse` once the request is complete is a contract violation and
/// returns [`ParseError::AlreadyDone`] without touching the input.
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    line: Option<RequestLine>,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Initialized,
            line: None,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// Whether the request line and header section have been fully parsed.
    pub fn is_head_complete(&self) -> bool {
        matches!(
            self.state,
            ParserState::ParsingBody { .. } | ParserState::Done
        )
    }

    /// Advances the state machine over `buf`, returning how many bytes were
    /// consumed. Zero means no progress is possible without more input.
    pub fn parse(&mut self, buf: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some((line, consumed)) = parse_request_line(buf)? else {
                    return Ok(0);
                };
                tracing::trace!(
                    method = %line.method,
                    path = %line.target,
                    "request line parsed"
                );
                self.line = Some(line);
                self.state = ParserState::ParsingHeaders;
                Ok(consumed)
            }

            ParserState::ParsingHeaders => {
                let (consumed, done) = self.headers.parse(buf)?;
                if done {
                    self.state = match declared_length(&self.headers)? {
                        0 => ParserState::Done,
                        declared => ParserState::ParsingBody { declared },
                    };
                    tracing::trace!(state = ?self.state, "header section complete");
                }
                Ok(consumed)
            }

            ParserState::ParsingBody { declared } => {
                if buf.is_empty() {
                    return Ok(0);
                }
                if self.body.len() + buf.len() > declared {
                    return Err(ParseError::BodyTooLong);
                }
                self.body.extend_from_slice(buf);
                tracing::trace!(received = self.body.len(), declared, "body bytes");
                if self.body.len() == declared {
                    self.state = ParserState::Done;
                }
                Ok(buf.len())
            }

            ParserState::Done => Err(ParseError::AlreadyDone),
        }
    }

    /// Runs `parse` over `buf` until the request is complete or no further
    /// progress can be made, discarding consumed bytes from the front of
    /// `buf` after each step. Returns whether the request is complete.
    pub fn feed(&mut self, buf: &mut BytesMut) -> Result<bool, ParseError> {
        while !self.is_done() {
            let consumed = self.parse(buf)?;
            if consumed == 0 {
                return Ok(false);
            }
            buf.advance(consumed);
        }
        Ok(true)
    }

    /// Hands out the finished request, or `None` if parsing is not done.
    pub fn finish(self) -> Option<Request> {
        if !self.is_done() {
            return None;
        }
        Some(Request {
            line: self.line?,
            headers: self.headers,
            body: self.body,
        })
    }
}

/// Parses `METHOD SP TARGET SP HTTP/1.1 CRLF` from the start of `buf`.
///
/// `Ok(None)` means no CRLF has arrived yet.
pub fn parse_request_line(buf: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(line_end) = tokens::find_crlf(buf) else {
        return Ok(None);
    };
    let line = &buf[..line_end];

    let parts: Vec<&[u8]> = line.split(|&b| b == SP).collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::WrongFieldCount(parts.len()));
    };

    if method.is_empty() || !method.iter().all(u8::is_ascii_uppercase) {
        return Err(ParseError::InvalidMethod);
    }

    if target.is_empty() {
        return Err(ParseError::InvalidTarget);
    }
    let target = std::str::from_utf8(target).map_err(|_| ParseError::InvalidTarget)?;

    let version = version
        .strip_prefix(HTTP_VERSION_PREFIX)
        .ok_or(ParseError::InvalidVersionName)?;
    if version != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion(
            String::from_utf8_lossy(version).into_owned(),
        ));
    }

    let line = RequestLine {
        // uppercase letters only
        method: String::from_utf8_lossy(method).into_owned(),
        target: target.to_string(),
        version: String::from_utf8_lossy(version).into_owned(),
    };
    Ok(Some((line, line_end + CRLF.len())))
}

fn declared_length(headers: &Headers) -> Result<usize, ParseError> {
    match headers.get("content-length") {
        None => Ok(0),
        Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => {
            v.parse().map_err(|_| ParseError::InvalidContentLength)
        }
        Some(_) => Err(ParseError::InvalidContentLength),
    }
}
