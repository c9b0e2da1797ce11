//! Authentication Server and Ticket-Granting Server request handling. Both
//! are stateless beyond the shared principal database, so both handlers are
//! plain functions over `KdcState` rather than objects with hidden mutable
//! fields.

use kerberos::crypto::{self, Key};
use kerberos::error::{KerberosError, KerberosResult};
use kerberos::logging::{info, warn, Logger};
use kerberos::messages::Message;
use kerberos::principal::PrincipalDb;
use kerberos::ticket::{Authenticator, AsReplyEnvelope, ServiceTicketBody, TgsReplyEnvelope, TgtBody};
use kerberos::time::Epoch;
use kerberos::transport;
use kerberos::types::{Address, PrincipalId, SessionKeyMaterial};
use std::net::{IpAddr, TcpStream};
use std::sync::Arc;

pub struct KdcState {
    pub db: Arc<PrincipalDb>,
    pub epoch: Epoch,
    pub log: Logger,
}

fn bad_type(expected: &'static str, got: &Message) -> KerberosError {
    KerberosError::BadType {
        expected,
        got: got.type_name().to_string(),
    }
}

/// One AS_REQ → AS_REP exchange over an already-accepted connection.
pub fn handle_as_connection(mut stream: TcpStream, state: Arc<KdcState>) {
    let peer_ip = match stream.peer_addr() {
        Ok(addr) => addr.ip(),
        Err(err) => {
            warn!(state.log, "could not read peer address"; "error" => %err);
            return;
        }
    };

    let outcome = (|| -> KerberosResult<Message> {
        let request = transport::recv(&mut stream)?;
        match &request {
            Message::AsReq {
                id_c,
                id_tgs,
                ts1: _,
                nonce,
            } => handle_as_req(&state, id_c, id_tgs, *nonce, peer_ip),
            other => Err(bad_type("AS_REQ", other)),
        }
    })();

    match outcome {
        Ok(reply) => {
            if let Err(err) = transport::send(&mut stream, &reply) {
                warn!(state.log, "failed to send AS_REP"; "error" => %err);
            }
        }
        Err(err) => {
            info!(state.log, "AS_REQ rejected"; "reason" => %err);
            let _ = transport::send(&mut stream, &Message::err(err.to_string()));
        }
    }
}

fn handle_as_req(
    state: &KdcState,
    id_c: &PrincipalId,
    id_tgs: &PrincipalId,
    nonce: u16,
    peer_ip: IpAddr,
) -> KerberosResult<Message> {
    let client = state.db.get_client(id_c)?;
    let tgs = state.db.get_tgs_by_id(id_tgs)?;

    let now = state.epoch.now_minutes();
    let ad_c = Address::from_ip(peer_ip);
    let k_c_tgs = SessionKeyMaterial::mint(id_c, id_tgs, now);

    let tgt_body = TgtBody {
        k_c_tgs: k_c_tgs.clone(),
        id_c: id_c.clone(),
        ad_c: ad_c.clone(),
        id_tgs: id_tgs.clone(),
        ts2: now,
        lifetime2: tgs.default_lifetime_tgt,
    };
    let k_tgs = Key::derive_from_secret(tgs.k_tgs.as_bytes());
    let tgt = crypto::seal(&tgt_body, &k_tgs)?;

    let envelope = AsReplyEnvelope {
        k_c_tgs,
        id_tgs: id_tgs.clone(),
        ts2: now,
        lifetime2: tgs.default_lifetime_tgt,
        tgt,
        nonce,
    };
    let k_c = Key::derive_from_secret(client.k_c.as_bytes());
    let data = crypto::seal(&envelope, &k_c)?;

    info!(state.log, "issued TGT"; "id_c" => %id_c, "id_tgs" => %id_tgs, "ts2" => now);
    Ok(Message::AsRep { data })
}

/// One TGS_REQ → TGS_REP exchange over an already-accepted connection.
pub fn handle_tgs_connection(mut stream: TcpStream, state: Arc<KdcState>) {
    let outcome = (|| -> KerberosResult<Message> {
        let request = transport::recv(&mut stream)?;
        match &request {
            Message::TgsReq {
                id_v,
                ticket_tgs,
                authenticator_c,
            } => handle_tgs_req(&state, id_v, ticket_tgs, authenticator_c),
            other => Err(bad_type("TGS_REQ", other)),
        }
    })();

    match outcome {
        Ok(reply) => {
            if let Err(err) = transport::send(&mut stream, &reply) {
                warn!(state.log, "failed to send TGS_REP"; "error" => %err);
            }
        }
        Err(err) => {
            info!(state.log, "TGS_REQ rejected"; "reason" => %err);
            let _ = transport::send(&mut stream, &Message::err(err.to_string()));
        }
    }
}

fn handle_tgs_req(
    state: &KdcState,
    id_v: &PrincipalId,
    ticket_tgs: &str,
    authenticator_c: &str,
) -> KerberosResult<Message> {
    let tgs = state.db.get_tgs()?;
    let k_tgs = Key::derive_from_secret(tgs.k_tgs.as_bytes());

    // Step 1: open the TGT.
    let tgt: TgtBody = crypto::open(ticket_tgs, &k_tgs).map_err(|_| KerberosError::DecryptFailure)?;

    // Step 2: TGT freshness.
    let now = state.epoch.now_minutes();
    if !tgt.is_fresh(now) {
        return Err(KerberosError::TicketExpired);
    }

    // Step 3: open the authenticator under the TGT's session key.
    let k_c_tgs = Key::derive_from_secret(tgt.k_c_tgs.as_str().as_bytes());
    let authenticator: Authenticator =
        crypto::open(authenticator_c, &k_c_tgs).map_err(|_| KerberosError::DecryptFailure)?;

    // Step 4: identity and address binding, then authenticator freshness.
    if authenticator.id_c != tgt.id_c {
        return Err(KerberosError::IdentityMismatch);
    }
    if authenticator.ad_c != tgt.ad_c {
        return Err(KerberosError::AddressMismatch);
    }
    if !(tgt.ts2 <= authenticator.ts_n && authenticator.ts_n <= now) {
        return Err(KerberosError::AuthenticatorStale);
    }

    // Step 5: mint and seal the service ticket.
    let service = state.db.get_service(id_v)?;
    let k_c_v = SessionKeyMaterial::mint(&tgt.id_c, id_v, now);

    let st_body = ServiceTicketBody {
        k_c_v: k_c_v.clone(),
        id_c: tgt.id_c.clone(),
        ad_c: tgt.ad_c.clone(),
        id_v: id_v.clone(),
        ts4: now,
        lifetime4: tgs.default_lifetime_st,
    };
    let k_v = Key::derive_from_secret(service.k_v.as_bytes());
    let st = crypto::seal(&st_body, &k_v)?;

    let envelope = TgsReplyEnvelope {
        k_c_v,
        id_v: id_v.clone(),
        ts4: now,
        lifetime4: tgs.default_lifetime_st,
        st,
    };
    let data = crypto::seal(&envelope, &k_c_tgs)?;

    info!(state.log, "issued service ticket"; "id_c" => %tgt.id_c, "id_v" => %id_v, "ts4" => now);
    Ok(Message::TgsRep { data })
}
