use super::browser_version::BrowserVersionExtractor;
use super::config::ParserConfig;
use super::db::{self, RuleSet};
use super::error::{Error, Result};
use super::os_version::OsVersionDispatcher;
use super::parser::{build_label_parser, CompiledParser};
use super::request::{resolve_client_ip, RequestInfo};
use super::types::Detection;
use rayon::prelude::*;
use std::borrow::Cow;
use std::path::Path;

/// Classifies user-agent strings against the compiled rule tables.
///
/// All tables are compiled once at construction; afterwards the parser is
/// immutable and can be shared across threads freely.
pub struct UserAgentParser {
    os_parser: CompiledParser<String>,
    os_versions: OsVersionDispatcher,
    browser_parser: CompiledParser<String>,
    browser_versions: BrowserVersionExtractor,
    device_type_parser: CompiledParser<String>,
    device_brand_parser: CompiledParser<String>,
    ip_headers: Vec<String>,
    referrer_header: String,
}

impl UserAgentParser {
    /// Build the parser from the rule set compiled into the crate.
    pub fn embedded() -> Result<Self> {
        let rules = load_rules(|name| {
            db::EMBEDDED
                .iter()
                .find(|(file, _)| *file == name)
                .map(|(_, content)| Cow::Borrowed(*content))
                .ok_or(Error::MissingTable(name))
        })?;
        Self::build(rules, &ParserConfig::default())
    }

    /// Load the YAML rule files from `dir` and build the parser.
    ///
    /// `dir` must contain `oss.yml`, `os_versions.yml`, `browsers.yml`,
    /// `device_types.yml` and `device_brands.yml`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(&ParserConfig {
            regexes_dir: Some(dir.as_ref().to_path_buf()),
            ..ParserConfig::default()
        })
    }

    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        let Some(dir) = &config.regexes_dir else {
            let embedded = Self::embedded()?;
            return Ok(Self {
                ip_headers: config.ip_headers.clone(),
                referrer_header: config.referrer_header.clone(),
                ..embedded
            });
        };

        tracing::debug!(dir = %dir.display(), "loading rule tables");
        let rules = load_rules(|name| Ok(Cow::Owned(std::fs::read_to_string(dir.join(name))?)))?;
        Self::build(rules, config)
    }

    fn build(rules: RuleSet, config: &ParserConfig) -> Result<Self> {
        let RuleSet {
            oss,
            os_versions,
            browsers,
            device_types,
            device_brands,
        } = rules;

        // Tables are independent, so compile them concurrently.
        let (os_result, (browser_result, device_result)) = rayon::join(
            || -> Result<_> {
                Ok((
                    build_label_parser(oss)?,
                    OsVersionDispatcher::build(os_versions)?,
                ))
            },
            || {
                rayon::join(
                    || -> Result<_> {
                        let browser_parser = build_label_parser(browsers)?;
                        let browser_versions =
                            BrowserVersionExtractor::build(browser_parser.data())?;
                        Ok((browser_parser, browser_versions))
                    },
                    || -> Result<_> {
                        Ok((
                            build_label_parser(device_types)?,
                            build_label_parser(device_brands)?,
                        ))
                    },
                )
            },
        );

        let (os_parser, os_versions) = os_result?;
        let (browser_parser, browser_versions) = browser_result?;
        let (device_type_parser, device_brand_parser) = device_result?;

        Ok(Self {
            os_parser,
            os_versions,
            browser_parser,
            browser_versions,
            device_type_parser,
            device_brand_parser,
            ip_headers: config.ip_headers.clone(),
            referrer_header: config.referrer_header.clone(),
        })
    }

    /// Classify a user-agent string.
    ///
    /// The returned `Detection` borrows from both `self` (rule labels) and
    /// `ua`.  Request metadata (`ip`, `referrer`) is left empty.
    pub fn parse<'a>(&'a self, ua: &'a str) -> Detection<'a> {
        self.detect(ua, Cow::Borrowed)
    }

    /// Run every rule table over `ua`.  `keep` decides whether the strings
    /// taken from `ua` are borrowed or copied into the result.
    fn detect<'s, 'u>(
        &'s self,
        ua: &'u str,
        keep: fn(&'u str) -> Cow<'s, str>,
    ) -> Detection<'s> {
        if ua.is_empty() {
            return Detection::default();
        }

        // OS version and browser version depend on the resolved label;
        // every other lookup is independent.
        let os = self.os_parser.match_first(ua).map(String::as_str);
        let os_version = self.os_versions.resolve(ua, os);
        let browser = self.browser_parser.match_first(ua).map(String::as_str);
        let browser_version = self.browser_versions.extract(ua, browser).map(keep);
        let device_type = self.device_type_parser.match_first(ua).map(String::as_str);
        let device_brand = self.device_brand_parser.match_first(ua).map(String::as_str);

        Detection {
            user_agent: Some(keep(ua)),
            os,
            os_version,
            browser,
            browser_version,
            device_type,
            device_brand,
            ..Detection::default()
        }
    }

    /// Classify an optional user-agent string.  A missing string yields a
    /// detection with every field absent.
    pub fn classify<'a>(&'a self, ua: Option<&'a str>) -> Detection<'a> {
        ua.map(|ua| self.parse(ua)).unwrap_or_default()
    }

    /// Classify the user agent of `request` and attach its client IP and
    /// referrer.  Strings read from the request are copied, so the result
    /// does not borrow `request`.
    pub fn parse_request<'a, R>(&'a self, request: &R) -> Detection<'a>
    where
        R: RequestInfo + ?Sized,
    {
        self.classify_with_override(None, request)
    }

    /// Like [`parse_request`](Self::parse_request), but an explicit
    /// `user_agent` takes precedence over the request's header.  When one is
    /// given the referrer is not reported, since the string did not
    /// necessarily arrive with this request.
    pub fn classify_with_override<'a, R>(
        &'a self,
        user_agent: Option<&'a str>,
        request: &R,
    ) -> Detection<'a>
    where
        R: RequestInfo + ?Sized,
    {
        let mut detection = match user_agent {
            Some(ua) => self.parse(ua),
            None => request
                .user_agent()
                .map(|ua| self.detect(ua, |s| Cow::Owned(s.to_owned())))
                .unwrap_or_default(),
        };
        detection.ip = resolve_client_ip(request, self.ip_headers.as_slice());

        if user_agent.is_none() {
            detection.is_referred = request.has_header(&self.referrer_header);
            detection.referrer = request.header(&self.referrer_header).map(str::to_string);
        }

        detection
    }

    /// Classify many user-agent strings in parallel.  Output order follows
    /// input order.
    pub fn parse_batch<'a>(&'a self, uas: &[&'a str]) -> Vec<Detection<'a>> {
        uas.par_iter().map(|ua| self.parse(*ua)).collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_yaml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    Ok(serde_yaml::from_str(content)?)
}

/// Deserialize every rule file, reading each one through `read`.
fn load_rules<F>(read: F) -> Result<RuleSet>
where
    F: Fn(&'static str) -> Result<Cow<'static, str>>,
{
    Ok(RuleSet {
        oss: load_yaml(&read(db::OSS_FILE)?)?,
        os_versions: load_yaml(&read(db::OS_VERSIONS_FILE)?)?,
        browsers: load_yaml(&read(db::BROWSERS_FILE)?)?,
        device_types: load_yaml(&read(db::DEVICE_TYPES_FILE)?)?,
        device_brands: load_yaml(&read(db::DEVICE_BRANDS_FILE)?)?,
    })
}
