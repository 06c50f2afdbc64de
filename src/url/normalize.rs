use crate::UrlError;
use url::Url;

/// Upgrades a plain-HTTP URL to HTTPS
///
/// Only a leading, lowercase `http://` is rewritten. Any other URL is returned
/// unchanged, including URLs with other schemes.
///
/// # Examples
///
/// ```
/// use linkscape::url::upgrade_scheme;
///
/// assert_eq!(upgrade_scheme("http://example.com/a"), "https://example.com/a");
/// assert_eq!(upgrade_scheme("https://example.com/a"), "https://example.com/a");
/// ```
pub fn upgrade_scheme(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Reduces a site URL or bare host to its `scheme://host[:port]` root
///
/// Input that does not start with `http` is treated as a bare host and gets
/// an `https://` prefix. Path, query and fragment are dropped.
///
/// # Arguments
///
/// * `input` - A full URL (`https://example.com/blog`) or a host (`example.com`)
///
/// # Returns
///
/// * `Ok(String)` - The site root without a trailing slash
/// * `Err(UrlError)` - The input cannot be parsed or has no host
///
/// # Examples
///
/// ```
/// use linkscape::url::site_root;
///
/// assert_eq!(site_root("example.com").unwrap(), "https://example.com");
/// assert_eq!(site_root("http://example.com:8080/blog/").unwrap(), "http://example.com:8080");
/// ```
pub fn site_root(input: &str) -> Result<String, UrlError> {
    let trimmed = input.trim();
    let candidate = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| UrlError::MissingHost(input.to_string()))?;

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Joins a root-relative path onto a site root
pub fn join_root(root: &str, path: &str) -> String {
    format!("{}{}", root.trim_end_matches('/'), path)
}
