use thiserror::Error;

/// Every failure mode named in the protocol. Variants map 1:1 onto the
/// `reason` string carried by a wire-level `ERR` message.
#[derive(Debug, Error)]
pub enum KerberosError {
    #[error("bad message type: expected {expected}, got {got}")]
    BadType { expected: &'static str, got: String },

    #[error("unknown principal: {0}")]
    UnknownPrincipal(String),

    #[error("ticket expired")]
    TicketExpired,

    #[error("authenticator is stale")]
    AuthenticatorStale,

    #[error("identity mismatch between authenticator and ticket")]
    IdentityMismatch,

    #[error("address mismatch between authenticator, ticket, or peer")]
    AddressMismatch,

    #[error("decryption failure")]
    DecryptFailure,

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("configuration failure: {0}")]
    ConfigurationFailure(String),
}

impl From<std::io::Error> for KerberosError {
    fn from(err: std::io::Error) -> Self {
        KerberosError::TransportFailure(err.to_string())
    }
}

impl From<serde_json::Error> for KerberosError {
    fn from(_err: serde_json::Error) -> Self {
        KerberosError::DecryptFailure
    }
}

pub type KerberosResult<T> = Result<T, KerberosError>;
