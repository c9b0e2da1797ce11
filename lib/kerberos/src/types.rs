//! Shared identifiers and session-key material.
//!
//! Principal identifiers are short printable strings (`IDc`, `IDv`,
//! `IDtgs`), not numeric ids, so `PrincipalId` wraps a `String` rather than
//! an integer.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> PrincipalId {
        PrincipalId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(s: &str) -> Self {
        PrincipalId(s.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(s: String) -> Self {
        PrincipalId(s)
    }
}

/// The client network address recorded by the KDC at ticket-issue time
/// (`ADc`). A plain string rendering of a `SocketAddr`'s IP so it can be
/// compared against the peer address the application server observes.
/// Represents a single host address, not a multi-homed client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn from_ip(ip: std::net::IpAddr) -> Address {
        Address(ip.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A freshly minted opaque session key (`K_c,tgs` or `K_c,v`). Unique per
/// issuance: encodes the requesting principal, the counterpart, and the
/// issuing timestamp into the material hashed into the key, alongside fresh
/// random bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionKeyMaterial(pub String);

impl SessionKeyMaterial {
    /// Mints a session key string unique to this (requester, counterpart,
    /// timestamp) triple plus fresh random bytes.
    pub fn mint(requester: &PrincipalId, counterpart: &PrincipalId, issued_at: u64) -> SessionKeyMaterial {
        use rand::RngCore;
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        SessionKeyMaterial(format!(
            "{}:{}:{}:{}",
            requester,
            counterpart,
            issued_at,
            crate::encoding::base64::encode(&nonce)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
