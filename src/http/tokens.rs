//! Literal bytes of the request grammar.

pub const CRLF: &[u8] = b"\r\n";
pub const SP: u8 = b' ';
pub const COLON: u8 = b':';
pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';

pub const HTTP_VERSION_PREFIX: &[u8] = b"HTTP/";
pub const SUPPORTED_VERSION: &[u8] = b"1.1";

/// Returns the offset of the first CRLF in `buf`.
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w[0] == CR && w[1] == LF)
}

/// Whether `b` belongs to the RFC 9110 `tchar` set allowed in field names.
pub fn is_token_byte(b: u8) -> bool {
    matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
        | b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+'
        | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}
