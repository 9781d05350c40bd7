//! Pagination bounds
//!
//! Total functions: any requested value, including none, maps to a valid
//! page window.

/// Clamps page size and normalizes offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationBounder {
    default_limit: u64,
    max_limit: u64,
}

impl PaginationBounder {
    pub fn new(default_limit: u64, max_limit: u64) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Page size in `(0, max_limit]`. Oversized requests clamp to the
    /// maximum; missing or non-positive ones fall back to the default.
    pub fn limit(&self, requested: Option<i64>) -> u64 {
        match requested {
            Some(limit) if limit > 0 => (limit as u64).min(self.max_limit),
            _ => self.default_limit,
        }
    }

    /// Offset `>= 0`. Missing or negative offsets become 0.
    pub fn skip(&self, requested: Option<i64>) -> u64 {
        match requested {
            Some(skip) if skip >= 0 => skip as u64,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_policy() {
        let bounder = PaginationBounder::new(10, 50);

        assert_eq!(bounder.limit(Some(1000)), 50);
        assert_eq!(bounder.limit(Some(50)), 50);
        assert_eq!(bounder.limit(Some(20)), 20);
        assert_eq!(bounder.limit(Some(1)), 1);
        assert_eq!(bounder.limit(Some(0)), 10);
        assert_eq!(bounder.limit(Some(-5)), 10);
        assert_eq!(bounder.limit(None), 10);
        assert_eq!(bounder.limit(Some(i64::MAX)), 50);
    }

    #[test]
    fn test_skip_policy() {
        let bounder = PaginationBounder::new(10, 50);

        assert_eq!(bounder.skip(Some(-1)), 0);
        assert_eq!(bounder.skip(Some(i64::MIN)), 0);
        assert_eq!(bounder.skip(None), 0);
        assert_eq!(bounder.skip(Some(0)), 0);
        assert_eq!(bounder.skip(Some(20)), 20);
    }
}
