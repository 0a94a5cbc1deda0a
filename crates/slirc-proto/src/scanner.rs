//! HTTP detection on the chat port.
//!
//! A browser or `curl` pointed at the chat port sends a request line such
//! as `GET /healthz HTTP/1.1`. It parses as an ordinary message whose verb is
//! an HTTP method; these helpers decide whether to hand the stream over.

/// HTTP methods recognised before registration.
pub const HTTP_METHODS: &[&str] = &["GET", "HEAD", "OPTIONS", "POST"];

/// Whether an (upper-cased) verb is one of [`HTTP_METHODS`].
pub fn is_http_verb(verb: &str) -> bool {
    HTTP_METHODS.contains(&verb)
}

/// Whether the parameters of an HTTP-verb message end in an HTTP/1.x
/// protocol token, i.e. whether it is a real request line.
///
/// ```
/// use slirc_proto::scanner::is_http_request;
///
/// assert!(is_http_request(&["/", "HTTP/1.1"]));
/// assert!(!is_http_request(&["/"]));
/// assert!(!is_http_request(&["/", "HTTP/2"]));
/// ```
pub fn is_http_request(params: &[&str]) -> bool {
    params
        .last()
        .is_some_and(|p| p.len() > "HTTP/1.".len() && p.starts_with("HTTP/1."))
}
