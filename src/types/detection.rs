/// Classification of one user-agent string plus request metadata.
///
/// Labels borrow from the parser's rule tables.  `user_agent` and
/// `browser_version` borrow from the classified string when the caller
/// supplied it, and are owned when it was read from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detection<'a> {
    pub user_agent: Option<::std::borrow::Cow<'a, str>>,
    pub os: Option<&'a str>,
    pub os_version: Option<&'a str>,
    pub browser: Option<&'a str>,
    pub browser_version: Option<::std::borrow::Cow<'a, str>>,
    pub device_type: Option<&'a str>,
    pub device_brand: Option<&'a str>,
    /// Client address from the request provider.  Never computed from the UA.
    pub ip: Option<String>,
    /// Referrer header value, if the request carried one.
    pub referrer: Option<String>,
    pub is_referred: bool,
}

impl<'a> Detection<'a> {
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
    pub fn os(&self) -> Option<&'a str> {
        self.os
    }
    pub fn os_version(&self) -> Option<&'a str> {
        self.os_version
    }
    pub fn browser(&self) -> Option<&'a str> {
        self.browser
    }
    pub fn browser_version(&self) -> Option<&str> {
        self.browser_version.as_deref()
    }
    pub fn device_type(&self) -> Option<&'a str> {
        self.device_type
    }
    pub fn device_brand(&self) -> Option<&'a str> {
        self.device_brand
    }
    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }
    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }
    pub fn is_referred(&self) -> bool {
        self.is_referred
    }

    /// True when none of the six classification fields matched.
    pub fn is_empty(&self) -> bool {
        self.os.is_none()
            && self.os_version.is_none()
            && self.browser.is_none()
            && self.browser_version.is_none()
            && self.device_type.is_none()
            && self.device_brand.is_none()
    }
}
