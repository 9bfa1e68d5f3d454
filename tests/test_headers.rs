use httpwire::http::headers::Headers;
use httpwire::http::parser::ParseError;

#[test]
fn test_parse_single_header() {
    let mut headers = Headers::new();
    let data = b"Host: localhost:8080\r\n\r\n";
    let (n, done) = headers.parse(data).unwrap();

    assert_eq!(headers.get("Host"), Some("localhost:8080"));
    assert_eq!(n, 22);
    assert!(!done);
}

#[test]
fn test_parse_header_with_extra_whitespace() {
    let mut headers = Headers::new();
    let data = b"  Content-Type:   text/html  \r\n\r\n";
    let (n, done) = headers.parse(data).unwrap();

    assert_eq!(headers.get("content-type"), Some("text/html"));
    assert_eq!(n, 31);
    assert!(!done);
}

#[test]
fn test_parse_two_headers_keeps_existing() {
    let mut headers = Headers::new();
    headers.set("Connection", "keep-alive");
    let data = b"Host: example.com\r\nUser-Agent: curl/8.1\r\n\r\n";

    let (n1, done) = headers.parse(data).unwrap();
    assert!(!done);
    assert_eq!(headers.get("host"), Some("example.com"));

    let (n2, done) = headers.parse(&data[n1..]).unwrap();
    assert!(!done);
    assert_eq!(headers.get("user-agent"), Some("curl/8.1"));

    let (n3, done) = headers.parse(&data[n1 + n2..]).unwrap();
    assert!(done);
    assert_eq!(n3, 2);
    assert_eq!(n1 + n2 + n3, data.len());
    assert_eq!(headers.get("connection"), Some("keep-alive"));
    assert_eq!(headers.len(), 3);
}

#[test]
fn test_parse_end_of_headers_only() {
    let mut headers = Headers::new();
    let (n, done) = headers.parse(b"\r\n").unwrap();

    assert_eq!(n, 2);
    assert!(done);
    assert!(headers.is_empty());
}

#[test]
fn test_parse_partial_line_consumes_nothing() {
    let mut headers = Headers::new();

    assert_eq!(headers.parse(b"Host: localh").unwrap(), (0, false));
    assert_eq!(headers.parse(b"Host: localhost\r").unwrap(), (0, false));
    assert_eq!(headers.parse(b"").unwrap(), (0, false));
    assert!(headers.is_empty());
}

#[test]
fn test_parse_space_before_colon_is_rejected() {
    let mut headers = Headers::new();
    let data = b"       Host : localhost:8080       \r\n\r\n";

    assert_eq!(headers.parse(data), Err(ParseError::MalformedHeader));
    assert!(headers.is_empty());

    assert_eq!(
        headers.parse(b"Host : x\r\n\r\n"),
        Err(ParseError::MalformedHeader)
    );
}

#[test]
fn test_parse_missing_or_leading_colon_is_rejected() {
    let mut headers = Headers::new();

    assert_eq!(
        headers.parse(b"BrokenHeader\r\n\r\n"),
        Err(ParseError::MalformedHeader)
    );
    assert_eq!(
        headers.parse(b": no-name\r\n\r\n"),
        Err(ParseError::MalformedHeader)
    );
}

#[test]
fn test_parse_invalid_name_character() {
    let mut headers = Headers::new();

    assert_eq!(
        headers.parse("H©st: localhost:8080\r\n\r\n".as_bytes()),
        Err(ParseError::InvalidHeaderName)
    );
    assert_eq!(
        headers.parse(b"X(Bad): 1\r\n\r\n"),
        Err(ParseError::InvalidHeaderName)
    );
    assert_eq!(
        headers.parse(b"\t: 1\r\n\r\n"),
        Err(ParseError::InvalidHeaderName)
    );
}

#[test]
fn test_parse_accepts_non_utf8_value() {
    let mut headers = Headers::new();

    assert_eq!(headers.parse(b"X-Name: caf\xe9\r\n\r\n"), Ok((16, false)));
    assert_eq!(headers.get("x-name"), Some("caf\u{fffd}"));

    assert_eq!(headers.parse(b"\r\n"), Ok((2, true)));
}

#[test]
fn test_parse_repeated_header_is_comma_joined() {
    let mut headers = Headers::new();
    headers.set("set-person", "alice");

    let (n, done) = headers.parse(b"Set-Person: bob\r\n\r\n").unwrap();
    assert_eq!(n, 17);
    assert!(!done);
    assert_eq!(headers.get("Set-Person"), Some("alice, bob"));

    headers.parse(b"SET-PERSON: carol\r\n").unwrap();
    assert_eq!(headers.get("set-person"), Some("alice, bob, carol"));
    assert_eq!(headers.len(), 1);
}

#[test]
fn test_parse_empty_value() {
    let mut headers = Headers::new();
    headers.parse(b"X-Empty:\r\n").unwrap();

    assert_eq!(headers.get("x-empty"), Some(""));
}

#[test]
fn test_get_is_case_insensitive_and_absent_is_none() {
    let mut headers = Headers::new();
    headers.set("Content-Type", "text/plain");

    assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    assert_eq!(headers.get("content-type"), Some("text/plain"));
    assert_eq!(headers.get("Missing"), None);
    assert!(headers.contains("Content-type"));
}

#[test]
fn test_set_replace_delete() {
    let mut headers = Headers::new();
    headers.set("Content-Length", "12");
    headers.set("Content-Type", "text/plain");

    headers.replace("content-length", "99");
    assert_eq!(headers.get("Content-Length"), Some("99"));

    headers.delete("CONTENT-LENGTH");
    assert_eq!(headers.get("content-length"), None);

    headers.replace("Transfer-Encoding", "chunked");
    assert_eq!(headers.get("transfer-encoding"), Some("chunked"));
    assert_eq!(headers.len(), 2);

    // deleting something absent is fine
    headers.delete("x-nothing");
    assert_eq!(headers.len(), 2);
}

#[test]
fn test_iteration_order_is_insertion_order() {
    let mut headers = Headers::new();
    headers.set("B", "2");
    headers.set("A", "1");
    headers.set("C", "3");
    headers.set("b", "4");

    let pairs: Vec<_> = headers.iter().collect();
    assert_eq!(pairs, vec![("b", "2, 4"), ("a", "1"), ("c", "3")]);
}
