use std::net::IpAddr;

use http::header::{HeaderMap, USER_AGENT};

/// Header checked for the referring page.
pub const DEFAULT_REFERRER_HEADER: &str = "Referer";

/// Headers that may carry the originating client address, highest priority first.
pub const DEFAULT_IP_HEADERS: [&str; 6] = [
    "X-Real-IP",
    "Client-IP",
    "X-Forwarded-For",
    "X-Forwarded",
    "Forwarded-For",
    "Forwarded",
];

/// Supplies the request-scoped inputs the classifier needs.
///
/// Implement this for whatever request type your server exposes; the
/// classifier never reads ambient state itself.
pub trait RequestInfo {
    /// Value of a request header, looked up case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Whether the header was sent at all, even if its value is not
    /// readable as text.
    fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Address of the directly connected peer.
    fn remote_addr(&self) -> Option<IpAddr>;

    fn user_agent(&self) -> Option<&str> {
        self.header(USER_AGENT.as_str())
    }
}

/// [`RequestInfo`] over an `http::HeaderMap` and the connection's peer address.
#[derive(Debug, Clone, Default)]
pub struct HeaderRequest {
    headers: HeaderMap,
    peer: Option<IpAddr>,
}

impl HeaderRequest {
    pub fn new(headers: HeaderMap, peer: Option<IpAddr>) -> Self {
        Self { headers, peer }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl RequestInfo for HeaderRequest {
    /// Values are decoded as UTF-8; `HeaderValue::to_str` would reject any
    /// non-ASCII byte.
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    fn remote_addr(&self) -> Option<IpAddr> {
        self.peer
    }
}

/// Resolve the client IP from `headers` in priority order.
///
/// Rules:
/// - The first header that is present wins, even when blank; its value is
///   returned verbatim (a forwarded-for list is not split).
/// - Otherwise fall back to the peer address.
pub fn resolve_client_ip<R, S>(request: &R, headers: &[S]) -> Option<String>
where
    R: RequestInfo + ?Sized,
    S: AsRef<str>,
{
    headers
        .iter()
        .find_map(|name| request.header(name.as_ref()))
        .map(str::to_string)
        .or_else(|| request.remote_addr().map(|addr| addr.to_string()))
}
