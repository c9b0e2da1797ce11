//! Principal database: a TOML file guarded by an `RwLock`, read by every
//! connection handler and written only by the offline setup tool.

use crate::error::{KerberosError, KerberosResult};
use crate::types::PrincipalId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "K_c")]
    pub k_c: String,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(rename = "K_v")]
    pub k_v: String,
    pub port: u16,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgsRecord {
    #[serde(rename = "IDtgs")]
    pub id_tgs: PrincipalId,
    #[serde(rename = "K_tgs")]
    pub k_tgs: String,
    pub default_lifetime_tgt: u64,
    pub default_lifetime_st: u64,
    pub created_at: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrincipalTable {
    clients: HashMap<String, ClientRecord>,
    services: HashMap<String, ServiceRecord>,
    tgs: HashMap<String, TgsRecord>,
}

/// Read-mostly principal store, safe for concurrent reads from multiple
/// connection-handler threads. Writes only happen through the offline setup
/// tool (`util`), never from a
/// server handler.
pub struct PrincipalDb {
    path: PathBuf,
    table: RwLock<PrincipalTable>,
}

impl PrincipalDb {
    /// Loads a principal database from a TOML file, creating an empty one
    /// if it does not yet exist.
    pub fn open(path: impl Into<PathBuf>) -> KerberosResult<PrincipalDb> {
        let path = path.into();
        let table = if path.exists() {
            serdeconv::from_toml_file(&path).map_err(|err| {
                KerberosError::ConfigurationFailure(format!(
                    "could not parse principal database {}: {}",
                    path.display(),
                    err
                ))
            })?
        } else {
            PrincipalTable::default()
        };
        Ok(PrincipalDb {
            path,
            table: RwLock::new(table),
        })
    }

    pub fn get_client(&self, id_c: &PrincipalId) -> KerberosResult<ClientRecord> {
        self.table
            .read()
            .expect("principal database lock poisoned")
            .clients
            .get(id_c.as_str())
            .cloned()
            .ok_or_else(|| KerberosError::UnknownPrincipal(id_c.to_string()))
    }

    pub fn get_service(&self, id_v: &PrincipalId) -> KerberosResult<ServiceRecord> {
        self.table
            .read()
            .expect("principal database lock poisoned")
            .services
            .get(id_v.as_str())
            .cloned()
            .ok_or_else(|| KerberosError::UnknownPrincipal(id_v.to_string()))
    }

    pub fn get_tgs(&self) -> KerberosResult<TgsRecord> {
        let table = self.table.read().expect("principal database lock poisoned");
        table
            .tgs
            .values()
            .next()
            .cloned()
            .ok_or_else(|| KerberosError::ConfigurationFailure("no TGS record configured".into()))
    }

    pub fn get_tgs_by_id(&self, id_tgs: &PrincipalId) -> KerberosResult<TgsRecord> {
        self.table
            .read()
            .expect("principal database lock poisoned")
            .tgs
            .get(id_tgs.as_str())
            .cloned()
            .ok_or_else(|| KerberosError::UnknownPrincipal(id_tgs.to_string()))
    }

    pub fn add_client(&self, id_c: PrincipalId, record: ClientRecord) -> KerberosResult<()> {
        self.table
            .write()
            .expect("principal database lock poisoned")
            .clients
            .insert(id_c.0, record);
        self.persist()
    }

    pub fn add_service(&self, id_v: PrincipalId, record: ServiceRecord) -> KerberosResult<()> {
        self.table
            .write()
            .expect("principal database lock poisoned")
            .services
            .insert(id_v.0, record);
        self.persist()
    }

    pub fn add_tgs(&self, record: TgsRecord) -> KerberosResult<()> {
        let id = record.id_tgs.0.clone();
        self.table
            .write()
            .expect("principal database lock poisoned")
            .tgs
            .insert(id, record);
        self.persist()
    }

    fn persist(&self) -> KerberosResult<()> {
        let table = self.table.read().expect("principal database lock poisoned");
        serdeconv::to_toml_file(&*table, &self.path)
            .map_err(|err| KerberosError::ConfigurationFailure(err.to_string()))
    }
}

pub fn default_db_path() -> PathBuf {
    Path::new("principals.toml").to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kerberos-test-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn add_then_get_client() {
        let path = temp_path("clients");
        let _ = fs::remove_file(&path);
        let db = PrincipalDb::open(&path).unwrap();
        db.add_client(
            "alice".into(),
            ClientRecord {
                k_c: "pw".into(),
                created_at: 0,
            },
        )
        .unwrap();

        let record = db.get_client(&"alice".into()).unwrap();
        assert_eq!(record.k_c, "pw");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unknown_client_is_an_error() {
        let path = temp_path("unknown");
        let _ = fs::remove_file(&path);
        let db = PrincipalDb::open(&path).unwrap();
        assert!(matches!(
            db.get_client(&"nosuch".into()),
            Err(KerberosError::UnknownPrincipal(_))
        ));
        let _ = fs::remove_file(&path);
    }
}
