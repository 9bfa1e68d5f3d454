use bytes::BytesMut;
use httpwire::http::parser::RequestParser;
use httpwire::http::request::Request;

fn parse(raw: &[u8]) -> Request {
    let mut parser = RequestParser::new();
    let mut buf = BytesMut::from(raw);
    assert!(parser.feed(&mut buf).unwrap());
    parser.finish().unwrap()
}

#[test]
fn test_request_accessors() {
    let req = parse(b"POST /api?x=1 HTTP/1.1\r\nHost: example.com\r\nContent-Length: 2\r\n\r\nhi");

    assert_eq!(req.method(), "POST");
    assert_eq!(req.target(), "/api?x=1");
    assert_eq!(req.version(), "1.1");
    assert_eq!(req.request_line().method, "POST");
    assert_eq!(req.body(), b"hi");
    assert_eq!(req.headers().len(), 2);
}

#[test]
fn test_request_header_retrieval() {
    let req = parse(b"GET / HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/json\r\n\r\n");

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_content_length() {
    let req = parse(b"POST / HTTP/1.1\r\nContent-Length: 4\r\n\r\nbody");
    assert_eq!(req.content_length(), 4);

    let req = parse(b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_clone_and_eq() {
    let req = parse(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
    let copy = req.clone();

    assert_eq!(req, copy);
}
