use url::Url;

/// Host part of a `Referer` value.
///
/// Protocol-relative values (`//host/path`) keep their host. Path-relative or
/// otherwise unparsable referers have none, which keeps the bypass from ever
/// triggering on them.
pub fn referer_host(referer: &str) -> Option<String> {
    let parsed = match referer.strip_prefix("//") {
        Some(rest) if !rest.starts_with('/') => Url::parse(&format!("http://{rest}")),
        _ => Url::parse(referer),
    };
    parsed
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
}

/// Strip the port from a `Host` header value, keeping IPv6 brackets intact.
pub fn request_host(host: &str) -> Option<String> {
    let host = host.trim();
    let name = if host.starts_with('[') {
        host.find(']').map(|end| &host[..=end]).unwrap_or(host)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

/// True when both hosts are known and the referer points elsewhere.
pub fn is_external_referer(referer: Option<&str>, host: Option<&str>) -> bool {
    let Some(referer_host) = referer.and_then(referer_host) else {
        return false;
    };
    let Some(current_host) = host.and_then(request_host) else {
        return false;
    };
    referer_host != current_host
}
