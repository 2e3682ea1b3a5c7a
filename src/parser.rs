use aho_corasick::AhoCorasick;
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::db::RuleEntry;
use crate::error::Result;
use crate::literal::extract_literals;

/// Shortest literal worth feeding to the prefilter.  Rule tables contain
/// two-letter tokens such as `BB` and `LG`.
const MIN_LITERAL_LEN: usize = 2;

/// Build the full case-insensitive regex string for a rule pattern.
pub(crate) fn full_pattern(pattern: &str) -> String {
    format!("(?i)(?:{})", pattern)
}

/// Helper: compile a rule pattern case-insensitively with fancy_regex.
pub(crate) fn compile_regex(pattern: &str) -> Result<fancy_regex::Regex> {
    Ok(fancy_regex::Regex::new(&full_pattern(pattern))?)
}

/// A compiled entry: one fancy_regex rule plus its associated data.
pub(crate) struct CompiledEntry<T> {
    pub regex: fancy_regex::Regex,
    pub data: T,
}

// ---------------------------------------------------------------------------
// CompiledParser — ordered first-match scanning over one rule table
// ---------------------------------------------------------------------------

/// Core matching engine: Aho-Corasick literal prefilter + fancy-regex
/// confirmation, preserving table order.
///
/// `T` is the associated data for each entry (usually the output label).
pub(crate) struct CompiledParser<T> {
    /// Entries in table order.
    entries: Vec<CompiledEntry<T>>,
    /// Case-insensitive automaton over every extracted literal.  `None` when
    /// no entry produced literals.
    prefilter: Option<AhoCorasick>,
    /// Maps automaton pattern index → entry indices containing that literal.
    literal_to_entries: Vec<Vec<usize>>,
    /// Entries that must be tried on every input, in ascending order.
    always: Vec<usize>,
}

impl<T> CompiledParser<T> {
    /// Build a CompiledParser from an iterator of (regex_pattern, data) pairs.
    pub fn build(items: impl IntoIterator<Item = (String, T)>) -> Result<Self>
    where
        T: Send,
    {
        let items: Vec<(String, T)> = items.into_iter().collect();

        // Phase 1: literal extraction, in table order.
        let literals: Vec<Option<Vec<String>>> = items
            .iter()
            .map(|(pattern, _)| extract_literals(pattern, MIN_LITERAL_LEN))
            .collect();

        // Phase 2: compile every pattern in parallel; order is preserved by collect.
        let entries: Vec<CompiledEntry<T>> = items
            .into_par_iter()
            .map(|(pattern, data)| -> Result<CompiledEntry<T>> {
                Ok(CompiledEntry {
                    regex: compile_regex(&pattern)?,
                    data,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Phase 3: group literals so each distinct one is a single automaton pattern.
        let mut by_literal: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut always: Vec<usize> = Vec::new();
        for (idx, lits) in literals.into_iter().enumerate() {
            match lits {
                Some(lits) => {
                    for lit in lits {
                        by_literal.entry(lit).or_default().push(idx);
                    }
                }
                None => always.push(idx),
            }
        }

        let prefilter = if by_literal.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build(by_literal.keys())?,
            )
        };

        tracing::debug!(
            entries = entries.len(),
            literals = by_literal.len(),
            always = always.len(),
            "compiled rule table"
        );

        Ok(Self {
            entries,
            prefilter,
            literal_to_entries: by_literal.into_values().collect(),
            always,
        })
    }

    pub fn data(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.data)
    }

    /// Find the first matching entry (preserving table order).
    ///
    /// An empty input never matches.
    pub fn match_first(&self, ua: &str) -> Option<&T> {
        if ua.is_empty() {
            return None;
        }

        // Rules fold case with Unicode semantics (`ſ` matches `s`, `K` matches
        // `k`) while the automaton folds ASCII only, so it may only rule out
        // entries for ASCII input.
        let prefilter = self.prefilter.as_ref().filter(|_| ua.is_ascii());
        let mut candidate = vec![prefilter.is_none(); self.entries.len()];
        if let Some(ac) = prefilter {
            for &idx in &self.always {
                candidate[idx] = true;
            }
            for m in ac.find_overlapping_iter(ua) {
                for &idx in &self.literal_to_entries[m.pattern().as_usize()] {
                    candidate[idx] = true;
                }
            }
        }

        (0..self.entries.len())
            .filter(|&idx| candidate[idx])
            .map(|idx| &self.entries[idx])
            .find(|entry| is_match(&entry.regex, entry.regex.is_match(ua)))
            .map(|entry| &entry.data)
    }
}

/// A regex that fails at match time (e.g. backtrack limit) counts as no
/// match for that entry; scanning continues with the next one.
fn is_match(regex: &fancy_regex::Regex, result: fancy_regex::Result<bool>) -> bool {
    match result {
        Ok(matched) => matched,
        Err(err) => {
            tracing::warn!(pattern = regex.as_str(), error = %err, "rule failed to match");
            false
        }
    }
}

/// Compile a deserialized table whose data is the entry label.
pub(crate) fn build_label_parser(entries: Vec<RuleEntry>) -> Result<CompiledParser<String>> {
    CompiledParser::build(entries.into_iter().map(|e| (e.regex, e.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rules: &[(&str, &str)]) -> CompiledParser<String> {
        CompiledParser::build(
            rules
                .iter()
                .map(|(p, l)| (p.to_string(), l.to_string())),
        )
        .unwrap()
    }

    /// Reference scan without the prefilter.
    fn naive<'a>(rules: &'a [(&str, &str)], ua: &str) -> Option<&'a str> {
        rules
            .iter()
            .find(|(p, _)| compile_regex(p).unwrap().is_match(ua).unwrap())
            .map(|(_, l)| *l)
    }

    #[test]
    fn table_order_beats_input_order() {
        let t = table(&[("mobile", "Generic"), ("blackberry", "BlackBerry")]);
        // "BlackBerry" occurs first in the input, but "mobile" is earlier in the table.
        assert_eq!(
            t.match_first("BlackBerry9700 Mobile").map(String::as_str),
            Some("Generic")
        );
    }

    #[test]
    fn case_insensitive_substring() {
        let t = table(&[("firefox", "Firefox")]);
        assert_eq!(
            t.match_first("Mozilla/5.0 FIREFOX/89.0").map(String::as_str),
            Some("Firefox")
        );
        assert!(t.match_first("curl/7.64.1").is_none());
    }

    #[test]
    fn empty_input_is_absent() {
        let t = table(&[(r"\d*", "Anything")]);
        assert!(t.match_first("").is_none());
    }

    #[test]
    fn dot_is_a_wildcard() {
        let t = table(&[("android 9.0", "9.0 Pie"), ("android 9", "9 Pie")]);
        assert_eq!(t.match_first("Android 9x0").map(String::as_str), Some("9.0 Pie"));
        assert_eq!(t.match_first("Android 9;").map(String::as_str), Some("9 Pie"));
    }

    #[test]
    fn prefilter_agrees_with_plain_scan() {
        let rules = [
            ("safari", "Safari"),
            ("kindle", "Kindle"),
            ("mobile", "Handheld Browser"),
            ("blackberry|BB", "Phone"),
            ("android", "Phone"),
            ("iphone", "iPhone"),
            (r"\bx\d+", "Digits"),
            ("tablet", "Tablet"),
            ("linux|unix", "Computer"),
        ];
        let t = table(&rules);
        for ua in [
            "Mozilla/5.0 (Linux; Android 10)",
            "BB10 Touch",
            "Mozilla/5.0 (X11; Linux x86_64)",
            "some x64 tablet",
            "nothing here",
            "IPHONE",
            "Mozilla/5.0 \u{17f}afari/604.1 Mobile",
            "\u{212a}indle Mobile",
            "Android é Mobile",
        ] {
            assert_eq!(t.match_first(ua).map(String::as_str), naive(&rules, ua), "{ua}");
        }
    }

    #[test]
    fn unicode_case_folding_reaches_the_rule() {
        let t = table(&[("safari", "Safari"), ("mobile", "Handheld Browser")]);
        assert_eq!(
            t.match_first("Mozilla/5.0 \u{17f}afari/604.1 Mobile").map(String::as_str),
            Some("Safari")
        );
    }

    #[test]
    fn runtime_error_counts_as_no_match() {
        let re = compile_regex("safari").unwrap();
        let err = fancy_regex::Error::RuntimeError(fancy_regex::RuntimeError::BacktrackLimitExceeded);
        assert!(!is_match(&re, Err(err)));
        assert!(is_match(&re, Ok(true)));
    }

    #[test]
    fn invalid_pattern_is_a_build_error() {
        let result = CompiledParser::build(vec![("(unclosed".to_string(), ())]);
        assert!(matches!(result, Err(crate::Error::Regex(_))));
    }
}
