//! Pagination clamping shared by the repository layer.

/// Default page size when the caller omits `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Upper bound on a single page regardless of what the caller asks for.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a user-provided limit into `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_when_missing() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
    }

    #[test]
    fn limit_clamped_to_max() {
        assert_eq!(clamp_limit(Some(5000), 20, 100), 100);
    }

    #[test]
    fn limit_floor_is_one() {
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(-3), 20, 100), 1);
    }

    #[test]
    fn offset_never_negative() {
        assert_eq!(clamp_offset(Some(-1)), 0);
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
