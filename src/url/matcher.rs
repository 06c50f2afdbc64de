use crate::url::domain::strip_www;

/// Checks whether a link host falls under any excluded domain
///
/// Both sides are lowercased and lose a leading `www.`. A host is excluded
/// when either string contains the other, so `cdn.facebook.com` matches
/// `facebook.com` and `facebook.com` matches `m.facebook.com`. Empty
/// entries never match.
///
/// Matching is by substring only, so `t.co` also excludes
/// `microsoft.com`.
///
/// # Examples
///
/// ```
/// use linkscape::url::is_excluded_host;
///
/// let excluded = vec!["facebook.com".to_string()];
/// assert!(is_excluded_host("www.facebook.com", &excluded));
/// assert!(is_excluded_host("cdn.facebook.com", &excluded));
/// assert!(!is_excluded_host("example.org", &excluded));
/// ```
pub fn is_excluded_host(host: &str, excluded_domains: &[String]) -> bool {
    let host = strip_www(host);
    if host.is_empty() {
        return false;
    }

    excluded_domains.iter().any(|entry| {
        let entry = strip_www(entry);
        !entry.is_empty() && (host.contains(&entry) || entry.contains(&host))
    })
}
