//! The sealed-object data model: tickets, authenticators, and the reply
//! envelopes that wrap them.

use crate::types::{Address, PrincipalId, SessionKeyMaterial};
use serde::{Deserialize, Serialize};

/// Plaintext contents of a ticket-granting ticket, sealed under `K_tgs`.
/// The client never sees this in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TgtBody {
    #[serde(rename = "K_c,tgs")]
    pub k_c_tgs: SessionKeyMaterial,
    #[serde(rename = "IDc")]
    pub id_c: PrincipalId,
    #[serde(rename = "ADc")]
    pub ad_c: Address,
    #[serde(rename = "IDtgs")]
    pub id_tgs: PrincipalId,
    #[serde(rename = "TS2")]
    pub ts2: u64,
    #[serde(rename = "Lifetime2")]
    pub lifetime2: u64,
}

impl TgtBody {
    pub fn is_fresh(&self, now: u64) -> bool {
        self.ts2 <= now && now <= self.ts2 + self.lifetime2
    }
}

/// Plaintext contents of a service ticket, sealed under `K_v`. Never seen in
/// plaintext by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTicketBody {
    #[serde(rename = "K_c,v")]
    pub k_c_v: SessionKeyMaterial,
    #[serde(rename = "IDc")]
    pub id_c: PrincipalId,
    #[serde(rename = "ADc")]
    pub ad_c: Address,
    #[serde(rename = "IDv")]
    pub id_v: PrincipalId,
    #[serde(rename = "TS4")]
    pub ts4: u64,
    #[serde(rename = "Lifetime4")]
    pub lifetime4: u64,
}

impl ServiceTicketBody {
    pub fn is_fresh(&self, now: u64) -> bool {
        self.ts4 <= now && now <= self.ts4 + self.lifetime4
    }
}

/// `{ IDc, ADc, TSn }` sealed under the relevant session key. Proves
/// possession of the session key without replaying the ticket's plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authenticator {
    #[serde(rename = "IDc")]
    pub id_c: PrincipalId,
    #[serde(rename = "ADc")]
    pub ad_c: Address,
    #[serde(rename = "TSn")]
    pub ts_n: u64,
}

/// AS reply envelope: `{ K_c,tgs, IDtgs, TS2, Lifetime2, TGT }` sealed under
/// `K_c`. `nonce` echoes the client-supplied AS_REQ nonce so a replayed
/// reply for the same principal can't be mistaken for a fresh one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsReplyEnvelope {
    #[serde(rename = "K_c,tgs")]
    pub k_c_tgs: SessionKeyMaterial,
    #[serde(rename = "IDtgs")]
    pub id_tgs: PrincipalId,
    #[serde(rename = "TS2")]
    pub ts2: u64,
    #[serde(rename = "Lifetime2")]
    pub lifetime2: u64,
    #[serde(rename = "TGT")]
    pub tgt: String,
    pub nonce: u16,
}

/// TGS reply envelope: `{ K_c,v, IDv, TS4, Lifetime4, ST }` sealed under
/// `K_c,tgs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgsReplyEnvelope {
    #[serde(rename = "K_c,v")]
    pub k_c_v: SessionKeyMaterial,
    #[serde(rename = "IDv")]
    pub id_v: PrincipalId,
    #[serde(rename = "TS4")]
    pub ts4: u64,
    #[serde(rename = "Lifetime4")]
    pub lifetime4: u64,
    #[serde(rename = "ST")]
    pub st: String,
}

/// Application reply envelope: `{ ack_text, TS5+1 }` sealed under `K_c,v`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppReplyEnvelope {
    pub ack_text: String,
    #[serde(rename = "TS5+1")]
    pub ts5_plus_one: u64,
}

/// The opaque `Message` payload the client seals for the application
/// server: application text plus the timestamp it was composed at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMessage {
    pub msg: String,
    #[serde(rename = "TS5")]
    pub ts5: u64,
}
