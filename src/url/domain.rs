use url::Url;

/// Returns the network location of a URL: lowercase host plus explicit port
///
/// Two links on `example.com` and `example.com:8080` are different hosts for
/// classification purposes, so the port is kept when present.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkscape::url::host_with_port;
///
/// let url = Url::parse("https://EXAMPLE.com/path").unwrap();
/// assert_eq!(host_with_port(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://example.com:8080/").unwrap();
/// assert_eq!(host_with_port(&url), Some("example.com:8080".to_string()));
/// ```
pub fn host_with_port(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    if host.is_empty() {
        return None;
    }
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Lowercases a host and drops a leading `www.`
pub fn strip_www(host: &str) -> String {
    let lower = host.trim().to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}
