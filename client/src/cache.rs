//! Ticket cache: a disk-backed mapping from a string key (`"tgt"`,
//! `"sgt:<IDv>"`) to the plaintext ticket-reply envelope it was issued with.
//! One file per key under the cache directory, written via a
//! temp-file-then-rename so a crash mid-write cannot corrupt a previously
//! valid entry.

use kerberos::error::{KerberosError, KerberosResult};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub struct TicketCache {
    dir: PathBuf,
}

impl TicketCache {
    pub fn open(dir: impl Into<PathBuf>) -> KerberosResult<TicketCache> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|err| KerberosError::ConfigurationFailure(err.to_string()))?;
        Ok(TicketCache { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(key)))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let raw = fs::read(path).ok()?;
        serde_json::from_slice(&raw).ok()
    }

    /// Writes `value` under `key`, atomically: serialize to a temp file
    /// beside the target, then rename over it.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> KerberosResult<()> {
        let path = self.entry_path(key);
        let tmp_path = self.dir.join(format!("{}.tmp", sanitize(key)));
        let raw = serde_json::to_vec(value)?;
        fs::write(&tmp_path, &raw)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Discards a cache entry, e.g. after discovering it has expired.
    pub fn evict(&self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key));
    }
}

fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

pub fn default_cache_dir() -> PathBuf {
    Path::new(".kerberos-cache").to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Dummy {
        a: u32,
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = std::env::temp_dir().join(format!("krb-cache-test-{}", std::process::id()));
        let cache = TicketCache::open(&dir).unwrap();
        cache.put("tgt", &Dummy { a: 7 }).unwrap();
        let value: Dummy = cache.get("tgt").unwrap();
        assert_eq!(value, Dummy { a: 7 });
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_key_returns_none() {
        let dir = std::env::temp_dir().join(format!("krb-cache-test-missing-{}", std::process::id()));
        let cache = TicketCache::open(&dir).unwrap();
        let value: Option<Dummy> = cache.get("sgt:mailsvc");
        assert!(value.is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn evict_removes_entry() {
        let dir = std::env::temp_dir().join(format!("krb-cache-test-evict-{}", std::process::id()));
        let cache = TicketCache::open(&dir).unwrap();
        cache.put("tgt", &Dummy { a: 1 }).unwrap();
        cache.evict("tgt");
        let value: Option<Dummy> = cache.get("tgt");
        assert!(value.is_none());
        let _ = fs::remove_dir_all(&dir);
    }
}
