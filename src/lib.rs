//! Host-side protocol client for DSP-based signal-acquisition instruments.
//!
//! Speaks length-prefixed protobuf frames over a serial or FTDI USB-bridge
//! link, pairs each request with its reply by correlation id, and converts
//! the quantized wave samples the instrument returns back into physical
//! units.
//!
//! ```no_run
//! use scopelink::{Dsp, Timeout, TriggerMode, TriggerType, wave};
//!
//! let mut dsp = Dsp::open("/dev/ttyUSB0", 115_200, Timeout::default())?;
//! dsp.echo("hello")?;
//!
//! let cfg = dsp.configure(16, TriggerMode::Auto, TriggerType::RisingEdge, 0, 0.0, 0.0)?;
//! let group = dsp.wave_group()?;
//! for w in &group.wave {
//!     let channel = &cfg.chconfig[w.ch_id() as usize];
//!     let volts = wave::decode_wave(w, channel, 16);
//!     println!("{}: {} samples", channel.name(), volts.len());
//! }
//! # Ok::<(), scopelink::Error>(())
//! ```

pub mod client;
pub mod error;
pub mod frame;
pub mod port;
pub mod proto;
pub mod sim;
pub mod stats;
pub mod wave;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Dsp;
pub use error::{Error, Result};
pub use port::{Timeout, Transport};
pub use proto::{
    ChannelConfig, ConfigReply, ErrorCode, TriggerMode, TriggerType, Wave, WaveGroup,
};
