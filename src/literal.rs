use regex_syntax::{hir::literal::Extractor, parse};

/// Extract literal prefixes from a rule pattern for use as Aho-Corasick
/// pre-filter candidates.
///
/// Returns `None` when the pattern has no finite literal set or when any
/// alternative yields a literal shorter than `min_len`: such an entry can
/// match without any of the returned literals being present, so it must be
/// tried on every input.  Patterns that regex_syntax cannot parse, and
/// literals outside ASCII (the automaton folds ASCII case only), are
/// treated the same way.
pub(crate) fn extract_literals(pattern: &str, min_len: usize) -> Option<Vec<String>> {
    let hir = parse(pattern).ok()?;

    let mut extractor = Extractor::new();
    extractor.kind(regex_syntax::hir::literal::ExtractKind::Prefix);

    let seq = extractor.extract(&hir);
    let mut literals: Vec<String> = Vec::new();
    for lit in seq.literals()? {
        let s = std::str::from_utf8(lit.as_bytes()).ok()?;
        if s.len() < min_len || !s.is_ascii() {
            return None;
        }
        let s = s.to_lowercase();
        if !literals.contains(&s) {
            literals.push(s);
        }
    }

    if literals.is_empty() {
        None
    } else {
        Some(literals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_literal() {
        let lits = extract_literals("Firefox", 2).unwrap();
        assert_eq!(lits, vec!["firefox"]);
    }

    #[test]
    fn alternation() {
        let lits = extract_literals("iPhone|iPod|iPad|iOS", 2).unwrap();
        for expected in ["iphone", "ipod", "ipad", "ios"] {
            assert!(lits.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn wildcard_keeps_prefix() {
        let lits = extract_literals("android 9.0", 2).unwrap();
        assert_eq!(lits, vec!["android 9"]);
    }

    #[test]
    fn short_alternative_disables_prefilter() {
        assert!(extract_literals("blackberry|B", 2).is_none());
    }

    #[test]
    fn non_ascii_literal_disables_prefilter() {
        assert!(extract_literals("\u{212a}indle", 2).is_none());
    }

    #[test]
    fn no_literal_returns_none() {
        assert!(extract_literals(r"\d+\.\d+", 2).is_none());
    }
}
