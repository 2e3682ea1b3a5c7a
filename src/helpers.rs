/// Byte offset of the last occurrence of `needle` in `haystack`, comparing
/// ASCII case-insensitively.  An empty needle is never found.
pub(crate) fn rfind_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.is_empty() || n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len())
        .rev()
        .find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_last_occurrence() {
        assert_eq!(rfind_ignore_ascii_case("Version/1 version/2", "VERSION"), Some(10));
        assert_eq!(rfind_ignore_ascii_case("Safari", "safari"), Some(0));
    }

    #[test]
    fn missing_or_empty_needle() {
        assert_eq!(rfind_ignore_ascii_case("Chrome/91", "version"), None);
        assert_eq!(rfind_ignore_ascii_case("Chrome/91", ""), None);
        assert_eq!(rfind_ignore_ascii_case("", "x"), None);
    }
}
