//! Request/reply session with the instrument.

use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::frame;
use crate::port::{self, Timeout, Transport};
use crate::proto::{
    ConfigReply, Configure, EchoRequest, ErrorCode, GetWaveGroup, MessageToDsp, MessageToHost,
    Terminate, TriggerMode, TriggerType, WaveGroup, message_to_dsp, message_to_host,
};
use crate::stats::RateMeter;

/// Synchronous protocol session.
///
/// Owns the connection and the correlation counter; nothing else may touch
/// either while the session lives. Strictly one request in flight: every
/// send is followed by the matching blocking receive before the next
/// request goes out. Abandoning a pending reply leaves the byte stream
/// desynchronized — reconnect rather than reuse the session after that.
pub struct Dsp {
    conn: Box<dyn Transport>,
    next_id: u32,
    meter: RateMeter,
}

impl Dsp {
    /// Connect to the instrument at `address` (see [`port::open`] for the
    /// accepted address forms).
    pub fn open(address: &str, bitrate: u32, timeout: Timeout) -> Result<Self> {
        let conn = port::open(address, bitrate, timeout)?;
        Ok(Self::over(conn))
    }

    /// Run a session over an already-open connection.
    pub fn over(conn: Box<dyn Transport>) -> Self {
        Self {
            conn,
            next_id: 0,
            meter: RateMeter::new(),
        }
    }

    /// Transmit one request. With `with_id` the envelope carries the
    /// current counter value (returned, then incremented); without, it
    /// carries id 0 and nothing is tracked.
    fn send(&mut self, payload: message_to_dsp::Payload, with_id: bool) -> Result<Option<u32>> {
        let sent_id = with_id.then(|| {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            id
        });
        let msg = MessageToDsp {
            id: Some(sent_id.unwrap_or(0)),
            payload: Some(payload),
        };
        frame::write_frame(self.conn.as_mut(), &msg)?;
        Ok(sent_id)
    }

    /// Block for one reply frame and vet it.
    ///
    /// A correlation mismatch is logged and the reply returned anyway; the
    /// peer never retransmits, so whatever arrived is the exchange's
    /// answer. A non-NoError `Acknowledge` or `ConfigReply` fails before
    /// any other payload field is trusted.
    fn receive(&mut self, sent_id: Option<u32>) -> Result<MessageToHost> {
        let (reply, nbytes) = frame::read_frame(self.conn.as_mut())?;
        self.meter.add(nbytes);

        if let Some(expected) = sent_id {
            let received = reply.id();
            if received != expected {
                error!(expected, received, "correlation id mismatch");
            }
        }

        match &reply.payload {
            Some(message_to_host::Payload::Ack(ack)) if ack.err() != ErrorCode::NoError => {
                return Err(Error::Protocol(ack.err()));
            }
            Some(message_to_host::Payload::ConfigReply(rep))
                if rep.err() != ErrorCode::NoError =>
            {
                return Err(Error::Protocol(rep.err()));
            }
            _ => {}
        }
        Ok(reply)
    }

    /// Round-trip a short text through the instrument. Link check.
    pub fn echo(&mut self, content: &str) -> Result<String> {
        let request = EchoRequest {
            content: Some(content.to_owned()),
        };
        let id = self.send(message_to_dsp::Payload::EchoReq(request), true)?;
        match self.receive(id)?.payload {
            Some(message_to_host::Payload::EchoRep(rep)) => Ok(rep.content.unwrap_or_default()),
            _ => Err(Error::UnexpectedReply("EchoReply")),
        }
    }

    /// Push acquisition settings and collect the instrument's capabilities.
    ///
    /// `timescale` 0.0 passes through untouched; the instrument substitutes
    /// its own default.
    pub fn configure(
        &mut self,
        resolution: u32,
        trigmode: TriggerMode,
        trigtype: TriggerType,
        ch_trig: u32,
        triglevel: f32,
        timescale: f32,
    ) -> Result<ConfigReply> {
        let config = Configure {
            resolution: Some(resolution),
            trigmode: Some(trigmode as i32),
            trigtype: Some(trigtype as i32),
            ch_trig: Some(ch_trig),
            triglevel: Some(triglevel),
            timescale: Some(timescale),
        };
        let id = self.send(message_to_dsp::Payload::Config(config), true)?;
        match self.receive(id)?.payload {
            Some(message_to_host::Payload::ConfigReply(rep)) => {
                for ch in &rep.chconfig {
                    if ch.max() <= ch.min() {
                        warn!(
                            name = ch.name(),
                            min = ch.min() as f64,
                            max = ch.max() as f64,
                            "channel bounds are not increasing"
                        );
                    }
                }
                Ok(rep)
            }
            _ => Err(Error::UnexpectedReply("ConfigReply")),
        }
    }

    /// Fetch one acquisition snapshot. An empty group means "no new data
    /// yet", not an error.
    pub fn wave_group(&mut self) -> Result<WaveGroup> {
        let id = self.send(message_to_dsp::Payload::GetWave(GetWaveGroup {}), true)?;
        match self.receive(id)?.payload {
            Some(message_to_host::Payload::WaveGroup(group)) => Ok(group),
            _ => Err(Error::UnexpectedReply("WaveGroup")),
        }
    }

    /// Tell the instrument to stop. Fire and forget: no reply is read, so
    /// the next request may follow immediately.
    pub fn terminate(&mut self) -> Result<()> {
        info!("terminating instrument");
        self.send(message_to_dsp::Payload::Terminate(Terminate {}), false)?;
        Ok(())
    }

    /// Drop whatever is sitting in the driver buffers, both directions.
    pub fn discard(&mut self) -> Result<()> {
        loop {
            let (rx, tx) = self.conn.pending_counts()?;
            if rx == 0 && tx == 0 {
                return Ok(());
            }
            self.conn.reset_buffers()?;
        }
    }

    /// Bytes currently pending in the driver, `(rx, tx)`.
    pub fn pending_counts(&self) -> Result<(u32, u32)> {
        self.conn.pending_counts()
    }
}
