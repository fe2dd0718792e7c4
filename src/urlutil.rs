//! Small URL helpers used by the politeness layer and filters.

use url::Url;

/// Lowercased authority of a URL, the key for all per-host politeness state.
///
/// Returns `None` for unparseable URLs or URLs without a host.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let normalized = match parsed.port() {
        Some(port) => format!("{}:{port}", host.to_lowercase()),
        None => host.to_lowercase(),
    };
    Some(normalized)
}

/// Registrable portion of a host: the lowercased host with a leading
/// `www.` stripped. Used by the in-domain filter.
#[must_use]
pub fn registrable_domain(host: &str) -> String {
    let host = host.to_lowercase();
    host.strip_prefix("www.").map_or(host.clone(), str::to_string)
}

/// Resolve `href` against `base`, returning the normalized absolute URL.
///
/// Fragment-only, malformed or otherwise unresolvable hrefs yield `None`.
#[must_use]
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    Some(joined.into())
}
