//! # Cache Keys
//!
//! Deterministic cache keys for this component. Every key starts with
//! the `modH5PActivity` root, so invalidation stays inside the
//! component's namespace and never touches other plugins' entries.

use site_ws::CacheKey;

/// Root of every cache key owned by this component
const CACHE_KEY_ROOT: &str = "modH5PActivity";

/// Key of the cached access information of one activity.
pub fn access_info_key(activity_id: i64) -> CacheKey {
    CacheKey::new(format!("{CACHE_KEY_ROOT}:accessInfo:{activity_id}"))
}

/// Key of the cached activity listing of one course.
pub fn course_activities_key(course_id: i64) -> CacheKey {
    CacheKey::new(format!("{CACHE_KEY_ROOT}:h5pactivity:{course_id}"))
}
