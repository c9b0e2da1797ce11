//! Application server request handling: opens a service ticket, validates
//! the accompanying authenticator against it, and replies with proof that
//! this server holds the matching session key.

use kerberos::crypto::{self, Key};
use kerberos::error::{KerberosError, KerberosResult};
use kerberos::logging::{info, warn, Logger};
use kerberos::messages::Message;
use kerberos::ticket::{AppMessage, AppReplyEnvelope, Authenticator, ServiceTicketBody};
use kerberos::time::Epoch;
use kerberos::transport;
use kerberos::types::Address;
use std::net::TcpStream;
use std::sync::Arc;

pub struct AppServerState {
    pub id_v: String,
    pub k_v: String,
    pub epoch: Epoch,
    pub log: Logger,
}

fn bad_type(expected: &'static str, got: &Message) -> KerberosError {
    KerberosError::BadType {
        expected,
        got: got.type_name().to_string(),
    }
}

pub fn handle_connection(mut stream: TcpStream, state: Arc<AppServerState>) {
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
            Message::AppReq {
                ticket_v,
                authenticator_c,
                message,
            } => handle_app_req(&state, ticket_v, authenticator_c, message, peer_ip),
            other => Err(bad_type("APP_REQ", other)),
        }
    })();

    match outcome {
        Ok(reply) => {
            if let Err(err) = transport::send(&mut stream, &reply) {
                warn!(state.log, "failed to send APP_REP"; "error" => %err);
            }
        }
        Err(err) => {
            info!(state.log, "APP_REQ rejected"; "reason" => %err);
            let _ = transport::send(&mut stream, &Message::err(err.to_string()));
        }
    }
}

fn handle_app_req(
    state: &AppServerState,
    ticket_v: &str,
    authenticator_c: &str,
    message: &str,
    peer_ip: std::net::IpAddr,
) -> KerberosResult<Message> {
    let k_v = Key::derive_from_secret(state.k_v.as_bytes());
    let ticket: ServiceTicketBody = crypto::open(ticket_v, &k_v).map_err(|_| KerberosError::DecryptFailure)?;

    let now = state.epoch.now_minutes();
    if !ticket.is_fresh(now) {
        return Err(KerberosError::TicketExpired);
    }

    let k_c_v = Key::derive_from_secret(ticket.k_c_v.as_str().as_bytes());
    let authenticator: Authenticator =
        crypto::open(authenticator_c, &k_c_v).map_err(|_| KerberosError::DecryptFailure)?;

    if authenticator.id_c != ticket.id_c {
        return Err(KerberosError::IdentityMismatch);
    }
    let peer_addr = Address::from_ip(peer_ip);
    if authenticator.ad_c != ticket.ad_c || authenticator.ad_c != peer_addr {
        return Err(KerberosError::AddressMismatch);
    }
    if !(ticket.ts4 <= authenticator.ts_n && authenticator.ts_n <= now) {
        return Err(KerberosError::AuthenticatorStale);
    }

    let app_message: AppMessage = crypto::open(message, &k_c_v).map_err(|_| KerberosError::DecryptFailure)?;
    info!(
        state.log,
        "application message received";
        "id_c" => %ticket.id_c,
        "msg" => %app_message.msg
    );

    let envelope = AppReplyEnvelope {
        ack_text: format!(
            "Hello {}, message received by {}.",
            ticket.id_c, state.id_v
        ),
        ts5_plus_one: app_message.ts5 + 1,
    };
    let data = crypto::seal(&envelope, &k_c_v)?;
    Ok(Message::AppRep { data })
}
