use indexmap::IndexMap;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Flat tables  (regexes/oss.yml, browsers.yml, device_types.yml, device_brands.yml)
// ---------------------------------------------------------------------------

/// One `(pattern, label)` rule.  Sequence position is priority.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RuleEntry {
    pub regex: String,
    pub name: String,
}

pub(crate) type RuleList = Vec<RuleEntry>;

// ---------------------------------------------------------------------------
// OS versions  (regexes/os_versions.yml)
//
// Format: top-level mapping  os_name → [RuleEntry, ...]
// ---------------------------------------------------------------------------

/// Key of the fallback version table used for every OS without its own.
pub(crate) const DEFAULT_OS_FAMILY: &str = "default";

/// Uses IndexMap to keep the YAML order stable for logging and iteration.
pub(crate) type OsVersionMap = IndexMap<String, RuleList>;

// ---------------------------------------------------------------------------
// Embedded rule set
// ---------------------------------------------------------------------------

pub(crate) const OSS_FILE: &str = "oss.yml";
pub(crate) const OS_VERSIONS_FILE: &str = "os_versions.yml";
pub(crate) const BROWSERS_FILE: &str = "browsers.yml";
pub(crate) const DEVICE_TYPES_FILE: &str = "device_types.yml";
pub(crate) const DEVICE_BRANDS_FILE: &str = "device_brands.yml";

/// The rule files compiled into the crate, as `(file name, contents)`.
pub(crate) const EMBEDDED: [(&str, &str); 5] = [
    (OSS_FILE, include_str!("../regexes/oss.yml")),
    (OS_VERSIONS_FILE, include_str!("../regexes/os_versions.yml")),
    (BROWSERS_FILE, include_str!("../regexes/browsers.yml")),
    (DEVICE_TYPES_FILE, include_str!("../regexes/device_types.yml")),
    (DEVICE_BRANDS_FILE, include_str!("../regexes/device_brands.yml")),
];

/// All rule tables, deserialized but not yet compiled.
#[derive(Debug)]
pub(crate) struct RuleSet {
    pub oss: RuleList,
    pub os_versions: OsVersionMap,
    pub browsers: RuleList,
    pub device_types: RuleList,
    pub device_brands: RuleList,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded(name: &str) -> &'static str {
        EMBEDDED.iter().find(|(f, _)| *f == name).unwrap().1
    }

    #[test]
    fn embedded_tables_deserialize() {
        let oss: RuleList = serde_yaml::from_str(embedded(OSS_FILE)).unwrap();
        assert_eq!(oss.len(), 9);
        assert_eq!(oss[0].name, "Android");

        let brands: RuleList = serde_yaml::from_str(embedded(DEVICE_BRANDS_FILE)).unwrap();
        assert_eq!(brands.first().map(|e| e.name.as_str()), Some("Apple"));
        assert_eq!(brands.last().map(|e| e.name.as_str()), Some("ZTE"));
    }

    #[test]
    fn os_versions_keep_family_order() {
        let map: OsVersionMap = serde_yaml::from_str(embedded(OS_VERSIONS_FILE)).unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Android", "iOS", "Windows", DEFAULT_OS_FAMILY]);
        assert_eq!(map["Android"][0].name, "Android 12");
        assert_eq!(map["Windows"].len(), 12);
    }
}
