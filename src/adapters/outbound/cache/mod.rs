mod sqlite_cache;

pub use sqlite_cache::{CacheInfo, SqliteLicenseCache, DEFAULT_TTL_DAYS, MAX_TTL_DAYS};
