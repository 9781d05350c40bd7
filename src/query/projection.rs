//! Projection sanitization
//!
//! Reduces a caller-supplied projection to a safe, inclusion-only one.
//! Each step narrows the previous result and the order is fixed:
//!
//! 1. drop everything that is not a plain inclusion
//! 2. drop private paths and their descendants
//! 3. drop the identity field
//! 4. force every compulsory path on, even a private one
//!
//! The store cannot mix inclusion and exclusion entries, so step 1 has to
//! run first. Identity suppression is expressed by absence: an
//! inclusion-only projection never returns unlisted fields.

use crate::config::QueryConfig;

use super::descriptor::Projection;
use super::path::{is_descendant_of_any, is_private};

/// Sanitizes projections against a fixed field policy
#[derive(Debug, Clone, Copy)]
pub struct ProjectionSanitizer<'a> {
    config: &'a QueryConfig,
}

impl<'a> ProjectionSanitizer<'a> {
    pub fn new(config: &'a QueryConfig) -> Self {
        Self { config }
    }

    /// Run all four steps over a copy of `raw`
    pub fn sanitize(&self, raw: &Projection) -> Projection {
        let mut projection = raw.clone();
        retain_inclusions(&mut projection);
        self.redact_private(&mut projection);
        self.suppress_identity(&mut projection);
        self.force_compulsory(&mut projection);
        projection
    }

    /// Step 2
    pub fn redact_private(&self, projection: &mut Projection) {
        let private = &self.config.private_fields;
        projection.retain(|path, _| !is_private(path, private));
    }

    /// Step 3: the identity field and any of its sub-paths
    pub fn suppress_identity(&self, projection: &mut Projection) {
        let identity = [&self.config.identity_field];
        projection.retain(|path, _| !is_descendant_of_any(path, identity));
    }

    /// Step 4
    pub fn force_compulsory(&self, projection: &mut Projection) {
        for path in &self.config.compulsory_fields {
            projection.include(path.as_str());
        }
    }
}

/// Step 1
pub fn retain_inclusions(projection: &mut Projection) {
    projection.retain(|_, value| value.is_include());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::descriptor::{MetaClause, ProjectionValue};
    use serde_json::json;

    fn config() -> QueryConfig {
        QueryConfig::default()
            .with_private_fields(["secret"])
            .with_compulsory_fields(["id", "name"])
    }

    #[test]
    fn test_mixed_projection_example() {
        let config = config();
        let mut raw = Projection::new();
        raw.include("a");
        raw.exclude("b");
        raw.include("secret.x");

        let sanitized = ProjectionSanitizer::new(&config).sanitize(&raw);

        assert_eq!(
            serde_json::to_value(&sanitized).unwrap(),
            json!({"a": 1, "id": 1, "name": 1})
        );
    }

    #[test]
    fn test_identity_never_projected() {
        let config = config();
        let mut raw = Projection::new();
        raw.include("_id");

        let sanitized = ProjectionSanitizer::new(&config).sanitize(&raw);
        assert!(!sanitized.contains("_id"));
    }

    #[test]
    fn test_identity_sub_paths_never_projected() {
        let config = config();
        let mut raw = Projection::new();
        raw.include("_id.oid");
        raw.include("_id.x.y");
        raw.include("_idx");

        let sanitized = ProjectionSanitizer::new(&config).sanitize(&raw);
        assert!(!sanitized.contains("_id.oid"));
        assert!(!sanitized.contains("_id.x.y"));
        // shares a prefix but is a different field
        assert!(sanitized.contains("_idx"));
    }

    #[test]
    fn test_compulsory_beats_private() {
        let config = QueryConfig::default()
            .with_private_fields(["name"])
            .with_compulsory_fields(["name"]);

        let sanitized = ProjectionSanitizer::new(&config).sanitize(&Projection::new());
        assert_eq!(sanitized.get("name"), Some(&ProjectionValue::Include));
    }

    #[test]
    fn test_compulsory_beats_exclusion() {
        let config = config();
        let mut raw = Projection::new();
        raw.exclude("name");

        let sanitized = ProjectionSanitizer::new(&config).sanitize(&raw);
        assert_eq!(sanitized.get("name"), Some(&ProjectionValue::Include));
    }

    #[test]
    fn test_raw_meta_entries_dropped() {
        let config = config();
        let mut raw = Projection::new();
        raw.insert("score", ProjectionValue::Meta(MetaClause::TextScore));

        let sanitized = ProjectionSanitizer::new(&config).sanitize(&raw);
        assert!(!sanitized.contains("score"));
    }

    #[test]
    fn test_sanitize_leaves_input_untouched() {
        let config = config();
        let mut raw = Projection::new();
        raw.exclude("b");

        let _ = ProjectionSanitizer::new(&config).sanitize(&raw);
        assert_eq!(raw.get("b"), Some(&ProjectionValue::Exclude));
    }
}
