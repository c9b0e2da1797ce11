pub mod crypto;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod messages;
pub mod principal;
pub mod ticket;
pub mod time;
pub mod transport;
pub mod types;

pub const DEFAULT_AS_PORT: u16 = 6000;
pub const DEFAULT_TGS_PORT: u16 = 6001;
