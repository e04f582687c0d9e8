use crate::license_resolution::domain::{LicenseReference, PackageIdentifier, PackageKey};
use crate::ports::outbound::{CachedLicenses, LicenseCacheRepository};
use crate::shared::error::LicenseTrackerError;
use crate::shared::Result;
use anyhow::Context;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TTL_DAYS: u32 = 30;

/// Largest accepted TTL (about a century)
pub const MAX_TTL_DAYS: u32 = 36_500;

/// Stays under SQLite's default bound-parameter limit
const QUERY_CHUNK_SIZE: usize = 900;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS license_cache (
        package_name TEXT NOT NULL,
        package_version TEXT NOT NULL,
        license_data TEXT NOT NULL,
        resolved_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        PRIMARY KEY (package_name, package_version)
    );
    CREATE INDEX IF NOT EXISTS idx_expires ON license_cache(expires_at);
"#;

const UPSERT: &str = "REPLACE INTO license_cache \
     (package_name, package_version, license_data, resolved_at, expires_at) \
     VALUES (?1, ?2, ?3, ?4, ?5)";

/// Cache statistics reported by `cache show`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub path: PathBuf,
    pub count: usize,
    pub size_bytes: u64,
}

/// SqliteLicenseCache adapter: persistent (name, version) -> licenses cache
///
/// Records carry `resolved_at` and `expires_at = resolved_at + ttl` as
/// RFC 3339 UTC timestamps. A record is valid while `now < expires_at`.
/// Expired or undecodable records read as misses and are left in place
/// until [`SqliteLicenseCache::purge_expired`] or a later write replaces them.
pub struct SqliteLicenseCache {
    conn: Connection,
    path: PathBuf,
    ttl: chrono::Duration,
}

impl SqliteLicenseCache {
    /// `<user cache dir>/license-tracker/cache.db`
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("license-tracker")
            .join("cache.db")
    }

    /// Opens (creating if needed) the cache database at `path`
    ///
    /// # Errors
    /// Returns [`LicenseTrackerError::CacheError`] if `ttl_days` is outside
    /// `1..=MAX_TTL_DAYS`, or if the directory or the database cannot be
    /// created or initialised.
    pub fn open(path: impl Into<PathBuf>, ttl_days: u32) -> Result<Self> {
        let path = path.into();
        let cache_error = |details: String| LicenseTrackerError::CacheError {
            path: path.clone(),
            details,
        };

        if !(1..=MAX_TTL_DAYS).contains(&ttl_days) {
            return Err(cache_error(format!(
                "ttl of {} days is outside 1..={}",
                ttl_days, MAX_TTL_DAYS
            ))
            .into());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| cache_error(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(|e| cache_error(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(10))
            .map_err(|e| cache_error(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| cache_error(format!("failed to initialize schema: {}", e)))?;

        tracing::debug!(path = %path.display(), ttl_days, "Opened license cache");

        Ok(Self {
            conn,
            path,
            ttl: chrono::Duration::days(i64::from(ttl_days)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path(), DEFAULT_TTL_DAYS)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str, version: &str) -> Result<Option<Vec<LicenseReference>>> {
        self.get_at(name, version, Utc::now())
    }

    /// Lookup evaluated at `now`
    pub fn get_at(
        &self,
        name: &str,
        version: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<LicenseReference>>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT license_data, expires_at FROM license_cache \
             WHERE package_name = ?1 AND package_version = ?2",
        )?;
        let mut rows = stmt.query(params![name, version])?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let data: String = row.get(0)?;
        let expires_at: String = row.get(1)?;

        if !is_fresh(&expires_at, now) {
            return Ok(None);
        }
        Ok(decode_licenses(name, version, &data))
    }

    pub fn set(&self, name: &str, version: &str, licenses: &[LicenseReference]) -> Result<()> {
        self.set_at(name, version, licenses, Utc::now())
    }

    /// Upsert stamped as resolved at `now`
    pub fn set_at(
        &self,
        name: &str,
        version: &str,
        licenses: &[LicenseReference],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let data = serde_json::to_string(licenses).context("failed to serialize licenses")?;
        let (resolved_at, expires_at) = self.stamps(now)?;
        self.conn
            .execute(UPSERT, params![name, version, data, resolved_at, expires_at])
            .with_context(|| format!("failed to cache {}=={}", name, version))?;
        Ok(())
    }

    /// Batch lookup evaluated at `now`.
    ///
    /// Distinct package names are queried in chunks; identifiers that share
    /// a name and version share one `Arc`, and identical payloads are
    /// decoded once.
    pub fn get_batch_at(
        &self,
        ids: &[PackageIdentifier],
        now: DateTime<Utc>,
    ) -> Result<HashMap<PackageIdentifier, Option<CachedLicenses>>> {
        let wanted: HashSet<PackageKey> = ids.iter().map(PackageIdentifier::key).collect();
        let names: Vec<&str> = ids
            .iter()
            .map(PackageIdentifier::name)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut hits: HashMap<PackageKey, CachedLicenses> = HashMap::new();
        let mut decoded: HashMap<String, CachedLicenses> = HashMap::new();

        for chunk in names.chunks(QUERY_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "SELECT package_name, package_version, license_data, expires_at \
                 FROM license_cache WHERE package_name IN ({})",
                placeholders
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            for (name, version, data, expires_at) in rows {
                let key = PackageKey { name, version };
                if !wanted.contains(&key) || !is_fresh(&expires_at, now) {
                    continue;
                }

                let licenses = match decoded.get(&data) {
                    Some(licenses) => licenses.clone(),
                    None => match decode_licenses(&key.name, &key.version, &data) {
                        Some(licenses) => {
                            let licenses = Arc::new(licenses);
                            decoded.insert(data, licenses.clone());
                            licenses
                        }
                        None => continue,
                    },
                };
                hits.insert(key, licenses);
            }
        }

        Ok(ids
            .iter()
            .map(|id| (id.clone(), hits.get(&id.key()).cloned()))
            .collect())
    }

    /// Batch upsert in one transaction, stamped as resolved at `now`.
    ///
    /// Identical license lists are serialized once.
    pub fn set_batch_at(
        &self,
        entries: &HashMap<PackageKey, Vec<LicenseReference>>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        if entries.is_empty() {
            return Ok(0);
        }

        let (resolved_at, expires_at) = self.stamps(now)?;
        let mut serialized: HashMap<&[LicenseReference], String> = HashMap::new();

        let tx = self
            .conn
            .unchecked_transaction()
            .context("failed to start license cache transaction")?;
        {
            let mut stmt = tx.prepare_cached(UPSERT)?;
            for (key, licenses) in entries {
                let data = match serialized.entry(licenses.as_slice()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => entry.insert(
                        serde_json::to_string(licenses).context("failed to serialize licenses")?,
                    ),
                };
                stmt.execute(params![key.name, key.version, data.as_str(), resolved_at, expires_at])?;
            }
        }
        tx.commit().context("failed to commit license cache batch")?;

        tracing::debug!(count = entries.len(), "Cached license results");
        Ok(entries.len())
    }

    /// Removes every record, every version of `package`, or one exact key.
    ///
    /// `version` is ignored without `package`. Returns the number removed.
    pub fn clear(&self, package: Option<&str>, version: Option<&str>) -> Result<usize> {
        let removed = match (package, version) {
            (None, _) => self.conn.execute("DELETE FROM license_cache", [])?,
            (Some(package), None) => self.conn.execute(
                "DELETE FROM license_cache WHERE package_name = ?1",
                params![package],
            )?,
            (Some(package), Some(version)) => self.conn.execute(
                "DELETE FROM license_cache WHERE package_name = ?1 AND package_version = ?2",
                params![package, version],
            )?,
        };
        Ok(removed)
    }

    /// Deletes records whose `expires_at <= now` and returns how many went
    pub fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM license_cache WHERE expires_at <= ?1",
            params![format_timestamp(now)],
        )?;
        Ok(removed)
    }

    pub fn info(&self) -> Result<CacheInfo> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM license_cache", [], |row| row.get(0))?;
        let size_bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(CacheInfo {
            path: self.path.clone(),
            count: usize::try_from(count).unwrap_or_default(),
            size_bytes,
        })
    }

    /// Expiry must stay within four-digit years to keep the text ordering
    fn stamps(&self, now: DateTime<Utc>) -> Result<(String, String)> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .filter(|at| at.year() <= 9999)
            .ok_or_else(|| LicenseTrackerError::CacheError {
                path: self.path.clone(),
                details: format!("expiry of a record resolved at {} is out of range", now),
            })?;
        Ok((format_timestamp(now), format_timestamp(expires_at)))
    }
}

impl LicenseCacheRepository for SqliteLicenseCache {
    fn get_batch(
        &self,
        ids: &[PackageIdentifier],
    ) -> Result<HashMap<PackageIdentifier, Option<CachedLicenses>>> {
        self.get_batch_at(ids, Utc::now())
    }

    fn set_batch(&self, entries: &HashMap<PackageKey, Vec<LicenseReference>>) -> Result<usize> {
        self.set_batch_at(entries, Utc::now())
    }
}

/// Fixed-width RFC 3339 so stored timestamps also order correctly as text
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_fresh(expires_at: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(expires_at) => now < expires_at.with_timezone(&Utc),
        Err(_) => false,
    }
}

fn decode_licenses(name: &str, version: &str, data: &str) -> Option<Vec<LicenseReference>> {
    match serde_json::from_str(data) {
        Ok(licenses) => Some(licenses),
        Err(e) => {
            tracing::debug!(package = name, version, error = %e, "Ignoring corrupt cache entry");
            None
        }
    }
}
