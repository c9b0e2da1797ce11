//! Client orchestration: the three-step AS → TGS → V exchange, with
//! transparent ticket-cache reuse.

pub mod cache;

use cache::TicketCache;
use kerberos::crypto::{self, Key};
use kerberos::error::{KerberosError, KerberosResult};
use kerberos::logging::{info, Logger};
use kerberos::messages::Message;
use kerberos::ticket::{AppMessage, AppReplyEnvelope, AsReplyEnvelope, Authenticator, TgsReplyEnvelope};
use kerberos::time::Epoch;
use kerberos::transport;
use kerberos::types::{Address, PrincipalId};
use rand::Rng;
use std::net::{SocketAddr, TcpStream};

pub struct ClientConfig {
    pub id_c: PrincipalId,
    pub password: String,
    pub as_addr: SocketAddr,
    pub tgs_addr: SocketAddr,
    pub id_tgs: PrincipalId,
}

pub struct Client {
    config: ClientConfig,
    cache: TicketCache,
    epoch: Epoch,
    log: Logger,
}

/// A TGT as held by the client: the plaintext AS reply envelope, cached
/// verbatim so the ticket's own freshness window can be checked without a
/// round trip.
type CachedTgt = AsReplyEnvelope;
/// A service ticket as held by the client: the plaintext TGS reply
/// envelope.
type CachedSt = TgsReplyEnvelope;

impl Client {
    pub fn new(config: ClientConfig, cache: TicketCache, epoch: Epoch, log: Logger) -> Client {
        Client {
            config,
            cache,
            epoch,
            log,
        }
    }

    fn k_c(&self) -> Key {
        Key::derive_from_secret(self.config.password.as_bytes())
    }

    /// Step 1: obtain a TGT, reusing the cached one if still within its
    /// lifetime.
    fn obtain_tgt(&self) -> KerberosResult<CachedTgt> {
        let now = self.epoch.now_minutes();
        if let Some(cached) = self.cache.get::<CachedTgt>("tgt") {
            if cached.ts2 + cached.lifetime2 >= now {
                return Ok(cached);
            }
            self.cache.evict("tgt");
        }

        let nonce: u16 = rand::thread_rng().gen();
        let mut stream = TcpStream::connect(self.config.as_addr)?;
        transport::send(
            &mut stream,
            &Message::AsReq {
                id_c: self.config.id_c.clone(),
                id_tgs: self.config.id_tgs.clone(),
                ts1: now,
                nonce,
            },
        )?;
        let reply = transport::recv(&mut stream)?;
        let data = match reply {
            Message::AsRep { data } => data,
            Message::Err { reason } => return Err(KerberosError::ConfigurationFailure(reason)),
            other => {
                return Err(KerberosError::BadType {
                    expected: "AS_REP",
                    got: other.type_name().to_string(),
                })
            }
        };

        let envelope: CachedTgt =
            crypto::open(&data, &self.k_c()).map_err(|_| KerberosError::DecryptFailure)?;
        if envelope.nonce != nonce {
            return Err(KerberosError::IdentityMismatch);
        }

        self.cache.put("tgt", &envelope)?;
        info!(self.log, "obtained TGT"; "id_c" => %self.config.id_c);
        Ok(envelope)
    }

    /// Step 2: obtain a service ticket for `id_v`, reusing the cached one
    /// if still within its lifetime.
    fn obtain_st(&self, id_v: &PrincipalId, tgt: &CachedTgt) -> KerberosResult<CachedSt> {
        let cache_key = format!("sgt:{}", id_v);
        let now = self.epoch.now_minutes();
        if let Some(cached) = self.cache.get::<CachedSt>(&cache_key) {
            if cached.ts4 + cached.lifetime4 >= now {
                return Ok(cached);
            }
            self.cache.evict(&cache_key);
        }

        let k_c_tgs = Key::derive_from_secret(tgt.k_c_tgs.as_str().as_bytes());
        let peer_ip = self.local_ip_towards(self.config.tgs_addr)?;
        let authenticator = Authenticator {
            id_c: self.config.id_c.clone(),
            ad_c: Address::from_ip(peer_ip),
            ts_n: now,
        };
        let authenticator_c = crypto::seal(&authenticator, &k_c_tgs)?;

        let mut stream = TcpStream::connect(self.config.tgs_addr)?;
        transport::send(
            &mut stream,
            &Message::TgsReq {
                id_v: id_v.clone(),
                ticket_tgs: tgt.tgt.clone(),
                authenticator_c,
            },
        )?;
        let reply = transport::recv(&mut stream)?;
        let data = match reply {
            Message::TgsRep { data } => data,
            Message::Err { reason } => return Err(KerberosError::ConfigurationFailure(reason)),
            other => {
                return Err(KerberosError::BadType {
                    expected: "TGS_REP",
                    got: other.type_name().to_string(),
                })
            }
        };

        let envelope: CachedSt =
            crypto::open(&data, &k_c_tgs).map_err(|_| KerberosError::DecryptFailure)?;
        self.cache.put(&cache_key, &envelope)?;
        info!(self.log, "obtained service ticket"; "id_v" => %id_v);
        Ok(envelope)
    }

    /// Step 3 (+ 4 on reuse): call the application server, verifying the
    /// server's `TS5 + 1` echo before trusting the acknowledgement.
    pub fn call_service(&self, id_v: &PrincipalId, app_addr: SocketAddr, msg: &str) -> KerberosResult<String> {
        let tgt = self.obtain_tgt()?;
        let st = self.obtain_st(id_v, &tgt)?;

        let k_c_v = Key::derive_from_secret(st.k_c_v.as_str().as_bytes());
        let now = self.epoch.now_minutes();
        let peer_ip = self.local_ip_towards(app_addr)?;

        let authenticator = Authenticator {
            id_c: self.config.id_c.clone(),
            ad_c: Address::from_ip(peer_ip),
            ts_n: now,
        };
        let authenticator_c = crypto::seal(&authenticator, &k_c_v)?;
        let app_message = AppMessage {
            msg: msg.to_string(),
            ts5: now,
        };
        let message = crypto::seal(&app_message, &k_c_v)?;

        let mut stream = TcpStream::connect(app_addr)?;
        transport::send(
            &mut stream,
            &Message::AppReq {
                ticket_v: st.st.clone(),
                authenticator_c,
                message,
            },
        )?;
        let reply = transport::recv(&mut stream)?;
        let data = match reply {
            Message::AppRep { data } => data,
            Message::Err { reason } => return Err(KerberosError::ConfigurationFailure(reason)),
            other => {
                return Err(KerberosError::BadType {
                    expected: "APP_REP",
                    got: other.type_name().to_string(),
                })
            }
        };

        let envelope: AppReplyEnvelope =
            crypto::open(&data, &k_c_v).map_err(|_| KerberosError::DecryptFailure)?;
        if envelope.ts5_plus_one != now + 1 {
            return Err(KerberosError::IdentityMismatch);
        }

        Ok(envelope.ack_text)
    }

    /// Determines the local address the OS would use to reach `target`,
    /// without sending anything — the same address the KDC/server will see
    /// as the peer address once the real connection is made.
    fn local_ip_towards(&self, target: SocketAddr) -> KerberosResult<std::net::IpAddr> {
        let probe = std::net::UdpSocket::bind(("0.0.0.0", 0))?;
        probe.connect(target)?;
        Ok(probe.local_addr()?.ip())
    }
}
