//! In-memory transport doubles for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use prost::Message;

use crate::error::{Error, Result};
use crate::frame::LEN_PREFIX;
use crate::port::Transport;
use crate::proto::{MessageToDsp, MessageToHost};

/// Scriptable transport: reads drain `rx`, writes accumulate in `tx`.
#[derive(Default)]
pub struct MockTransport {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub flushes: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a framed reply for the client to read.
    pub fn push_reply(&mut self, msg: &MessageToHost) {
        let body = msg.encode_to_vec();
        self.rx.extend((body.len() as u16).to_be_bytes());
        self.rx.extend(body);
    }

    /// Queue raw bytes, framing left to the caller.
    pub fn push_raw(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Decode every request frame written so far.
    pub fn sent_requests(&self) -> Vec<MessageToDsp> {
        let mut out = Vec::new();
        let mut rest = &self.tx[..];
        while rest.len() >= LEN_PREFIX {
            let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
            let body = &rest[LEN_PREFIX..LEN_PREFIX + len];
            out.push(MessageToDsp::decode(body).expect("request frame"));
            rest = &rest[LEN_PREFIX + len..];
        }
        out
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.tx.extend_from_slice(buf);
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.rx.len() < buf.len() {
            // A real port would hand back whatever trickled in and then
            // time out; either way the caller sees a timeout.
            self.rx.clear();
            return Err(Error::Timeout);
        }
        for b in buf.iter_mut() {
            *b = self.rx.pop_front().unwrap();
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn reset_buffers(&mut self) -> Result<()> {
        self.rx.clear();
        self.tx.clear();
        Ok(())
    }

    fn pending_counts(&self) -> Result<(u32, u32)> {
        Ok((self.rx.len() as u32, 0))
    }
}

/// Clonable handle around a [`MockTransport`] so a test can keep inspecting
/// the mock after the session takes ownership of its clone.
#[derive(Clone, Default)]
pub struct SharedMock(Arc<Mutex<MockTransport>>);

impl SharedMock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> MutexGuard<'_, MockTransport> {
        self.0.lock().unwrap()
    }
}

impl Transport for SharedMock {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.inner().write_all(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner().read_exact(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner().flush()
    }

    fn reset_buffers(&mut self) -> Result<()> {
        self.inner().reset_buffers()
    }

    fn pending_counts(&self) -> Result<(u32, u32)> {
        self.inner().pending_counts()
    }
}
