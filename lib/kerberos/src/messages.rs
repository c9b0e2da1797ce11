//! Wire message shapes. Every message is a framed structured
//! object with a mandatory `type` field; `serde`'s internally tagged enum
//! representation gives exactly that shape for free.

use crate::types::PrincipalId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "AS_REQ")]
    AsReq {
        #[serde(rename = "IDc")]
        id_c: PrincipalId,
        #[serde(rename = "IDtgs")]
        id_tgs: PrincipalId,
        #[serde(rename = "TS1")]
        ts1: u64,
        nonce: u16,
    },
    #[serde(rename = "AS_REP")]
    AsRep { data: String },
    #[serde(rename = "TGS_REQ")]
    TgsReq {
        #[serde(rename = "IDv")]
        id_v: PrincipalId,
        #[serde(rename = "Tickettgs")]
        ticket_tgs: String,
        #[serde(rename = "Authenticatorc")]
        authenticator_c: String,
    },
    #[serde(rename = "TGS_REP")]
    TgsRep { data: String },
    #[serde(rename = "APP_REQ")]
    AppReq {
        #[serde(rename = "Ticketv")]
        ticket_v: String,
        #[serde(rename = "Authenticatorc")]
        authenticator_c: String,
        #[serde(rename = "Message")]
        message: String,
    },
    #[serde(rename = "APP_REP")]
    AppRep { data: String },
    #[serde(rename = "ERR")]
    Err { reason: String },
}

impl Message {
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::AsReq { .. } => "AS_REQ",
            Message::AsRep { .. } => "AS_REP",
            Message::TgsReq { .. } => "TGS_REQ",
            Message::TgsRep { .. } => "TGS_REP",
            Message::AppReq { .. } => "APP_REQ",
            Message::AppRep { .. } => "APP_REP",
            Message::Err { .. } => "ERR",
        }
    }

    pub fn err(reason: impl Into<String>) -> Message {
        Message::Err {
            reason: reason.into(),
        }
    }
}
