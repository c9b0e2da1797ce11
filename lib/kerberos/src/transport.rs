//! Framed message transport: a message is a 4-byte big-endian length prefix
//! followed by exactly that many bytes of payload. One request, one reply,
//! one connection — no pipelining, no keep-alive.
//!
//! Applies that length-prefixed framing to a single-message-per-TCP-
//! connection model, using `byteorder` for the prefix.

use crate::error::{KerberosError, KerberosResult};
use crate::messages::Message;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Frames larger than this are rejected outright rather than trusted to
/// drive an allocation: a hostile or corrupt length prefix must not be able
/// to exhaust memory.
pub const MAX_FRAME_LEN: u32 = 1 << 20;

pub fn send(stream: &mut (impl Write + ?Sized), message: &Message) -> KerberosResult<()> {
    let payload = serde_json::to_vec(message)?;
    if payload.len() as u64 > MAX_FRAME_LEN as u64 {
        return Err(KerberosError::TransportFailure(
            "outgoing message exceeds maximum frame length".into(),
        ));
    }
    stream.write_u32::<BigEndian>(payload.len() as u32)?;
    stream.write_all(&payload)?;
    stream.flush()?;
    Ok(())
}

pub fn recv(stream: &mut (impl Read + ?Sized)) -> KerberosResult<Message> {
    let len = stream.read_u32::<BigEndian>().map_err(|err| {
        KerberosError::TransportFailure(format!("stream closed while reading frame length: {}", err))
    })?;
    if len > MAX_FRAME_LEN {
        return Err(KerberosError::TransportFailure(
            "incoming frame exceeds maximum length".into(),
        ));
    }
    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).map_err(|err| {
        KerberosError::TransportFailure(format!("stream closed mid-frame: {}", err))
    })?;
    let message: Message = serde_json::from_slice(&payload)
        .map_err(|err| KerberosError::TransportFailure(format!("malformed frame body: {}", err)))?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn send_recv_round_trip() {
        let msg = Message::AsReq {
            id_c: "alice".into(),
            id_tgs: "tgs1".into(),
            ts1: 0,
            nonce: 7,
        };
        let mut buf = Vec::new();
        send(&mut buf, &msg).unwrap();

        let mut cursor = Cursor::new(buf);
        let received = recv(&mut cursor).unwrap();
        assert_eq!(received.type_name(), "AS_REQ");
    }

    #[test]
    fn recv_fails_on_truncated_stream() {
        let msg = Message::err("boom");
        let mut buf = Vec::new();
        send(&mut buf, &msg).unwrap();
        buf.truncate(buf.len() - 1);

        let mut cursor = Cursor::new(buf);
        assert!(recv(&mut cursor).is_err());
    }

    #[test]
    fn recv_rejects_oversized_length_prefix() {
        let mut buf = Vec::new();
        buf.write_u32::<BigEndian>(MAX_FRAME_LEN + 1).unwrap();
        let mut cursor = Cursor::new(buf);
        assert!(recv(&mut cursor).is_err());
    }
}
