//! Dotted field path classification
//!
//! Paths use the same dotted notation as filters and projections, so
//! `a.b.c` descends from both `a` and `a.b`. Segment boundaries matter:
//! `ab` does not descend from `a`.

/// Returns true if `candidate` is a strict dotted descendant of `ancestor`.
pub fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate.as_bytes()[ancestor.len()] == b'.'
}

/// Returns true if `path` equals, or descends from, any of `ancestors`.
pub fn is_descendant_of_any<'a, I>(path: &str, ancestors: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    ancestors
        .into_iter()
        .any(|ancestor| path == ancestor || is_descendant(path, ancestor))
}

/// Returns true if `path` may never be projected under `private_fields`.
pub fn is_private<'a, I>(path: &str, private_fields: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    is_descendant_of_any(path, private_fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_descendant_requires_dot_boundary() {
        assert!(is_descendant("a.b", "a"));
        assert!(is_descendant("a.b.c", "a"));
        assert!(is_descendant("a.b.c", "a.b"));
        assert!(!is_descendant("ab", "a"));
        assert!(!is_descendant("a", "a"));
        assert!(!is_descendant("a", "a.b"));
    }

    #[test]
    fn test_private_includes_self_and_descendants() {
        let private = set(&["secret", "contact.email"]);

        assert!(is_private("secret", &private));
        assert!(is_private("secret.x", &private));
        assert!(is_private("contact.email.domain", &private));
        assert!(!is_private("contact", &private));
        assert!(!is_private("contact.phone", &private));
        assert!(!is_private("secretary", &private));
    }

    #[test]
    fn test_empty_private_set() {
        assert!(!is_private("anything", &BTreeSet::new()));
    }
}
