use indexmap::IndexMap;

use crate::db::{OsVersionMap, DEFAULT_OS_FAMILY};
use crate::error::{Error, Result};
use crate::parser::{build_label_parser, CompiledParser};

/// Picks the version table for an already-resolved OS and scans it.
pub(crate) struct OsVersionDispatcher {
    /// Per-OS tables keyed by the OS label from `oss.yml`.
    families: IndexMap<String, CompiledParser<String>>,
    /// Table for every OS without its own entry in `families`.
    fallback: CompiledParser<String>,
}

impl OsVersionDispatcher {
    pub fn build(mut map: OsVersionMap) -> Result<Self> {
        let fallback = map
            .shift_remove(DEFAULT_OS_FAMILY)
            .ok_or(Error::MissingTable(DEFAULT_OS_FAMILY))?;
        let fallback = build_label_parser(fallback)?;

        let families = map
            .into_iter()
            .map(|(os, rules)| -> Result<_> { Ok((os, build_label_parser(rules)?)) })
            .collect::<Result<IndexMap<_, _>>>()?;

        Ok(Self { families, fallback })
    }

    /// Unresolved OS → no version.  Every fallback rule implies a resolvable
    /// OS token, so skipping the scan loses nothing.
    pub fn resolve<'a>(&'a self, ua: &str, os: Option<&str>) -> Option<&'a str> {
        let os = os?;
        self.families
            .get(os)
            .unwrap_or(&self.fallback)
            .match_first(ua)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RuleEntry;

    fn rules(pairs: &[(&str, &str)]) -> Vec<RuleEntry> {
        pairs
            .iter()
            .map(|(r, n)| RuleEntry {
                regex: r.to_string(),
                name: n.to_string(),
            })
            .collect()
    }

    fn dispatcher() -> OsVersionDispatcher {
        let mut map = OsVersionMap::new();
        map.insert("Windows".into(), rules(&[("windows nt 10.0", "Windows 10")]));
        map.insert(DEFAULT_OS_FAMILY.into(), rules(&[("linux i686", "Linux 32-Bit")]));
        OsVersionDispatcher::build(map).unwrap()
    }

    #[test]
    fn branches_on_resolved_os() {
        let d = dispatcher();
        assert_eq!(d.resolve("Windows NT 10.0", Some("Windows")), Some("Windows 10"));
        // The Windows table is not consulted for other operating systems.
        assert_eq!(d.resolve("Windows NT 10.0", Some("Linux")), None);
        assert_eq!(d.resolve("X11; Linux i686", Some("Linux")), Some("Linux 32-Bit"));
    }

    #[test]
    fn absent_os_gives_absent_version() {
        let d = dispatcher();
        assert_eq!(d.resolve("X11; Linux i686", None), None);
    }

    #[test]
    fn missing_default_table_is_an_error() {
        let mut map = OsVersionMap::new();
        map.insert("Windows".into(), rules(&[("windows nt 10.0", "Windows 10")]));
        assert!(matches!(
            OsVersionDispatcher::build(map),
            Err(Error::MissingTable("default"))
        ));
    }
}
