use indexmap::IndexMap;

use crate::error::Result;
use crate::helpers::rfind_ignore_ascii_case;

/// Literal token that introduces a vendor-declared version (`Version/14.0.3`).
const VERSION_TOKEN: &str = "version";
const OTHER_TOKEN: &str = "other";

/// Build the token regex for one browser label:
/// `version|<label>|other`, then separators, then the version characters.
fn token_pattern(browser: &str) -> String {
    format!(
        r"(?i)({}|{}|{})[/ ]+([0-9A-Za-z.]*)",
        VERSION_TOKEN,
        regex_syntax::escape(browser),
        OTHER_TOKEN
    )
}

/// Resolves the browser version by token adjacency.
///
/// When a user agent carries both a `Version/x` token and a `<Browser>/y`
/// token, the value next to whichever of the two literals occurs last in the
/// string is preferred.  This tracks Safari-style and Chrome-style strings
/// but is a heuristic: with three or more tokens only the first two
/// occurrences are ever considered.
pub(crate) struct BrowserVersionExtractor {
    /// Browser label → compiled token regex.
    extractors: IndexMap<String, fancy_regex::Regex>,
}

impl BrowserVersionExtractor {
    /// Compile one extractor per distinct browser label.
    pub fn build<'a>(labels: impl IntoIterator<Item = &'a String>) -> Result<Self> {
        let mut extractors = IndexMap::new();
        for label in labels {
            if !extractors.contains_key(label) {
                let re = fancy_regex::Regex::new(&token_pattern(label))?;
                extractors.insert(label.clone(), re);
            }
        }
        tracing::debug!(browsers = extractors.len(), "compiled version extractors");
        Ok(Self { extractors })
    }

    pub fn extract<'a>(&self, ua: &'a str, browser: Option<&str>) -> Option<&'a str> {
        let browser = browser?;
        let re = self.extractors.get(browser)?;

        let versions: Vec<&'a str> = re
            .captures_iter(ua)
            .filter_map(|caps| {
                caps.map_err(|err| {
                    tracing::warn!(browser, error = %err, "version token failed to match")
                })
                .ok()
            })
            .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
            .collect();

        let picked = match versions.len() {
            0 => None,
            1 => versions.first(),
            _ => {
                // None orders before Some, so a missing "version" literal
                // selects the first occurrence.
                let version_pos = rfind_ignore_ascii_case(ua, VERSION_TOKEN);
                let browser_pos = rfind_ignore_ascii_case(ua, browser);
                if version_pos <= browser_pos {
                    versions.first()
                } else {
                    versions.get(1)
                }
            }
        };

        picked.copied().filter(|v| !v.is_empty())
    }
}
