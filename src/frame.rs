//! Length-prefixed frame codec.
//!
//! Every frame is `[u16 big-endian length][protobuf body]`, symmetric in
//! both directions. A read that comes up short is a timeout; a body that
//! fails to parse is a decode fault and the stream should be treated as
//! desynchronized.

use prost::Message;
use tracing::trace;

use crate::error::{Error, Result};
use crate::port::Transport;
use crate::proto::{MessageToDsp, MessageToHost};

/// Width of the length prefix on every frame.
pub const LEN_PREFIX: usize = 2;

/// Serialize `msg`, prefix it, write and flush.
pub fn write_frame(conn: &mut dyn Transport, msg: &MessageToDsp) -> Result<()> {
    let body = msg.encode_to_vec();
    let len = u16::try_from(body.len()).map_err(|_| Error::Oversize(body.len()))?;

    let mut buf = Vec::with_capacity(LEN_PREFIX + body.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&body);

    trace!(len = body.len(), "frame out");
    conn.write_all(&buf)?;
    conn.flush()
}

/// Read one host-bound frame. Returns the message and the total number of
/// bytes consumed (prefix included), for rate accounting.
pub fn read_frame(conn: &mut dyn Transport) -> Result<(MessageToHost, usize)> {
    let mut prefix = [0u8; LEN_PREFIX];
    conn.read_exact(&mut prefix)?;
    let len = u16::from_be_bytes(prefix) as usize;

    let mut body = vec![0u8; len];
    conn.read_exact(&mut body)?;
    trace!(len, "frame in");

    let msg = MessageToHost::decode(body.as_slice())?;
    Ok((msg, LEN_PREFIX + len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{EchoReply, EchoRequest, message_to_dsp, message_to_host};
    use crate::testing::MockTransport;

    fn echo_request(id: u32, content: &str) -> MessageToDsp {
        MessageToDsp {
            id: Some(id),
            payload: Some(message_to_dsp::Payload::EchoReq(EchoRequest {
                content: Some(content.into()),
            })),
        }
    }

    #[test]
    fn write_prefixes_and_flushes() {
        let mut conn = MockTransport::new();
        write_frame(&mut conn, &echo_request(3, "hi")).unwrap();

        let declared = u16::from_be_bytes([conn.tx[0], conn.tx[1]]) as usize;
        assert_eq!(declared, conn.tx.len() - LEN_PREFIX);
        assert_eq!(conn.flushes, 1);

        let body = MessageToDsp::decode(&conn.tx[LEN_PREFIX..]).unwrap();
        assert_eq!(body, echo_request(3, "hi"));
    }

    #[test]
    fn read_round_trips_a_reply() {
        let reply = MessageToHost {
            id: Some(3),
            payload: Some(message_to_host::Payload::EchoRep(EchoReply {
                content: Some("hi".into()),
            })),
        };
        let mut conn = MockTransport::new();
        conn.push_reply(&reply);

        let (msg, nbytes) = read_frame(&mut conn).unwrap();
        assert_eq!(msg, reply);
        assert_eq!(nbytes, LEN_PREFIX + reply.encoded_len());
    }

    #[test]
    fn short_prefix_is_a_timeout() {
        let mut conn = MockTransport::new();
        conn.push_raw(&[0x00]);
        assert!(matches!(read_frame(&mut conn), Err(Error::Timeout)));
    }

    #[test]
    fn short_body_is_a_timeout_not_a_partial_message() {
        let mut conn = MockTransport::new();
        // Prefix declares ten body bytes, only three arrive.
        conn.push_raw(&[0x00, 0x0a, 0x08, 0x01, 0x12]);
        assert!(matches!(read_frame(&mut conn), Err(Error::Timeout)));
    }

    #[test]
    fn garbage_body_is_a_decode_fault() {
        let mut conn = MockTransport::new();
        conn.push_raw(&[0x00, 0x02, 0xff, 0xff]);
        assert!(matches!(read_frame(&mut conn), Err(Error::Decode(_))));
    }
}
