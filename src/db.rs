// 🗄️ BIN Cache - hashed BIN → issuer record, SQLite
//
// One table, keyed by SHA-256 of the BIN prefix. Records are written with
// INSERT OR REPLACE and never deleted. Each operation opens its own
// connection and drops it on every exit path.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Issuer data for one BIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRecord {
    pub bank_name: String,
    pub country: String,
    pub card_level: String,
    pub card_category: String,
    pub issuer_phone: String,
}

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS bin_data (
            bin_hash TEXT PRIMARY KEY,
            bank_name TEXT,
            country TEXT,
            card_level TEXT,
            card_category TEXT,
            issuer_phone TEXT,
            cached_at TEXT
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// CACHE STORE
// ============================================================================

enum Backend {
    /// Connection opened per operation
    File(PathBuf),
    /// Single connection kept alive (the database dies with it)
    Memory(Connection),
}

pub struct BinCache {
    backend: Backend,
}

impl BinCache {
    /// Open (creating if needed) the cache at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        let cache = BinCache {
            backend: Backend::File(path.as_ref().to_path_buf()),
        };
        cache.with_connection(setup_database)?;
        Ok(cache)
    }

    pub fn in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(BinCache {
            backend: Backend::Memory(conn),
        })
    }

    /// Database location, `None` for in-memory caches
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File(path) => Some(path),
            Backend::Memory(_) => None,
        }
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        match &self.backend {
            Backend::File(path) => {
                let conn = Connection::open(path)?;
                op(&conn)
            }
            Backend::Memory(conn) => op(conn),
        }
    }

    pub fn get(&self, bin_hash: &str) -> rusqlite::Result<Option<BinRecord>> {
        let record = self.with_connection(|conn| {
            conn.query_row(
                "SELECT bank_name, country, card_level, card_category, issuer_phone
                 FROM bin_data WHERE bin_hash = ?1",
                params![bin_hash],
                |row| {
                    Ok(BinRecord {
                        bank_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                        country: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        card_level: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        card_category: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        issuer_phone: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    })
                },
            )
            .optional()
        })?;

        debug!(
            bin_hash = short_hash(bin_hash),
            hit = record.is_some(),
            "BIN cache read"
        );
        Ok(record)
    }

    /// Insert or replace: every column is overwritten.
    pub fn put(&self, bin_hash: &str, record: &BinRecord) -> rusqlite::Result<()> {
        let now = Utc::now();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO bin_data
                 (bin_hash, bank_name, country, card_level, card_category, issuer_phone, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bin_hash,
                    record.bank_name,
                    record.country,
                    record.card_level,
                    record.card_category,
                    record.issuer_phone,
                    now,
                ],
            )
        })?;

        debug!(bin_hash = short_hash(bin_hash), "BIN cache write");
        Ok(())
    }

    /// When the record for `bin_hash` was last written
    pub fn cached_at(&self, bin_hash: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
        let cached_at = self.with_connection(|conn| {
            conn.query_row(
                "SELECT cached_at FROM bin_data WHERE bin_hash = ?1",
                params![bin_hash],
                |row| row.get::<_, Option<DateTime<Utc>>>(0),
            )
            .optional()
        })?;
        Ok(cached_at.flatten())
    }

    pub fn count(&self) -> rusqlite::Result<i64> {
        self.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM bin_data", [], |row| row.get(0))
        })
    }
}

/// Enough of a hash to correlate log lines (first 12 chars, any key shape)
pub(crate) fn short_hash(bin_hash: &str) -> &str {
    match bin_hash.char_indices().nth(12) {
        Some((end, _)) => &bin_hash[..end],
        None => bin_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(bank: &str) -> BinRecord {
        BinRecord {
            bank_name: bank.to_string(),
            country: "United States of America".to_string(),
            card_level: "Classic".to_string(),
            card_category: "credit".to_string(),
            issuer_phone: "+1 800 000 0000".to_string(),
        }
    }

    fn temp_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("bin_cache_test_{}.db", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_get_missing_returns_none() {
        let cache = BinCache::in_memory().unwrap();
        assert_eq!(cache.get("deadbeef").unwrap(), None);
        assert_eq!(cache.cached_at("deadbeef").unwrap(), None);
        assert_eq!(cache.count().unwrap(), 0);
    }

    #[test]
    fn test_put_then_get() {
        let cache = BinCache::in_memory().unwrap();
        let record = sample_record("JPMORGAN CHASE BANK");
        cache.put("abc123", &record).unwrap();

        assert_eq!(cache.get("abc123").unwrap(), Some(record));
        assert!(cache.cached_at("abc123").unwrap().is_some());
        assert_eq!(cache.count().unwrap(), 1);
    }

    #[test]
    fn test_insert_or_replace_overwrites_all_fields() {
        let cache = BinCache::in_memory().unwrap();
        cache.put("abc123", &sample_record("OLD BANK")).unwrap();

        let replacement = BinRecord {
            bank_name: "NEW BANK".to_string(),
            country: "Canada".to_string(),
            card_level: "Gold".to_string(),
            card_category: "debit".to_string(),
            issuer_phone: "No contact details available".to_string(),
        };
        cache.put("abc123", &replacement).unwrap();

        assert_eq!(cache.get("abc123").unwrap(), Some(replacement));
        assert_eq!(cache.count().unwrap(), 1);
    }

    #[test]
    fn test_file_backed_cache_persists_across_opens() {
        let path = temp_db_path();
        {
            let cache = BinCache::open(&path).unwrap();
            cache.put("feedface", &sample_record("PERSISTED BANK")).unwrap();
        }

        let reopened = BinCache::open(&path).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        assert_eq!(
            reopened.get("feedface").unwrap().map(|r| r.bank_name),
            Some("PERSISTED BANK".to_string())
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_storage_error_propagates() {
        // A directory cannot be opened as a database file
        let cache = BinCache {
            backend: Backend::File(std::env::temp_dir()),
        };
        assert!(cache.get("abc").is_err());
        assert!(cache.put("abc", &sample_record("X")).is_err());
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(short_hash(&crate::card::hash_bin("411111")).len(), 12);
        assert_eq!(short_hash("abc"), "abc");
        let cut = short_hash("aéééééééééééééé");
        assert_eq!(cut.chars().count(), 12);
        assert!(cut.starts_with('a'));
    }

    #[test]
    fn test_non_ascii_keys_with_debug_logging() {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let cache = BinCache::in_memory().unwrap();
            let key = "aéééééééé";
            assert_eq!(cache.get(key).unwrap(), None);
            cache.put(key, &sample_record("UNICODE BANK")).unwrap();
            assert_eq!(
                cache.get(key).unwrap().map(|r| r.bank_name),
                Some("UNICODE BANK".to_string())
            );
        });
    }

    #[test]
    fn test_null_columns_read_as_empty() {
        let cache = BinCache::in_memory().unwrap();
        cache
            .with_connection(|conn| {
                conn.execute("INSERT INTO bin_data (bin_hash) VALUES ('partial')", [])
            })
            .unwrap();

        let record = cache.get("partial").unwrap().unwrap();
        assert_eq!(record.bank_name, "");
        assert_eq!(cache.cached_at("partial").unwrap(), None);
    }
}
