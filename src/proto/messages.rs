//! Envelope and payload message definitions.
//!
//! Hand-written prost structs rather than build-time codegen; the schema is
//! small and frozen. All scalar fields carry proto2 presence (`Option`):
//! the peer's decoder treats every field as required, so senders populate
//! all of them, zero-valued or not.

/// Pass/fail code attached to `Acknowledge` and `ConfigReply`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ErrorCode {
    NoError = 0,
    NotConfiguredYet = 1,
    ConfigError = 2,
    ParamError = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TriggerMode {
    Auto = 0,
    Normal = 1,
    Single = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum TriggerType {
    RisingEdge = 0,
    FallingEdge = 1,
}

/// Link-verification request; the instrument echoes `content` back.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EchoRequest {
    #[prost(string, optional, tag = "1")]
    pub content: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EchoReply {
    #[prost(string, optional, tag = "1")]
    pub content: Option<String>,
}

/// Acquisition settings pushed to the instrument.
///
/// `timescale` 0.0 is a sentinel: the instrument substitutes its own
/// default rather than treating it as a zero-width screen.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Configure {
    /// Quantization bit depth of each transmitted sample.
    #[prost(uint32, optional, tag = "1")]
    pub resolution: Option<u32>,
    #[prost(enumeration = "TriggerMode", optional, tag = "2")]
    pub trigmode: Option<i32>,
    #[prost(enumeration = "TriggerType", optional, tag = "3")]
    pub trigtype: Option<i32>,
    /// Channel index the trigger watches.
    #[prost(uint32, optional, tag = "4")]
    pub ch_trig: Option<u32>,
    /// Trigger level in the channel's physical unit.
    #[prost(float, optional, tag = "5")]
    pub triglevel: Option<f32>,
    /// Screen-width time span in seconds.
    #[prost(float, optional, tag = "6")]
    pub timescale: Option<f32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetWaveGroup {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Terminate {}

/// Host-bound pass/fail reply for requests with no other data to return.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Acknowledge {
    #[prost(enumeration = "ErrorCode", optional, tag = "1")]
    pub err: Option<i32>,
}

/// One channel's identity and physical bounds.
///
/// `max` is expected to be strictly greater than `min`; the session warns
/// when a reply violates that.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChannelConfig {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub unit: Option<String>,
    #[prost(float, optional, tag = "3")]
    pub min: Option<f32>,
    #[prost(float, optional, tag = "4")]
    pub max: Option<f32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ConfigReply {
    #[prost(enumeration = "ErrorCode", optional, tag = "1")]
    pub err: Option<i32>,
    #[prost(float, optional, tag = "2")]
    pub samplerate: Option<f32>,
    #[prost(float, optional, tag = "3")]
    pub default_timescale: Option<f32>,
    #[prost(float, optional, tag = "4")]
    pub max_timescale: Option<f32>,
    #[prost(message, repeated, tag = "5")]
    pub chconfig: Vec<ChannelConfig>,
}

/// One channel's quantized samples for a single acquisition.
///
/// `samples` stays unpacked on the wire; the peer's encoder emits one
/// tagged varint per sample and its decoder expects the same shape back.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Wave {
    #[prost(uint32, optional, tag = "1")]
    pub ch_id: Option<u32>,
    #[prost(sint32, repeated, packed = "false", tag = "2")]
    pub samples: Vec<i32>,
}

/// One synchronized snapshot across all active channels. An empty `wave`
/// list is a valid "no new data yet" answer.
#[derive(Clone, PartialEq, prost::Message)]
pub struct WaveGroup {
    #[prost(bool, optional, tag = "1")]
    pub triggered: Option<bool>,
    #[prost(message, repeated, tag = "2")]
    pub wave: Vec<Wave>,
}

/// Host-to-instrument envelope: correlation id plus exactly one payload.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MessageToDsp {
    #[prost(uint32, optional, tag = "1")]
    pub id: Option<u32>,
    #[prost(oneof = "message_to_dsp::Payload", tags = "2, 3, 4, 5")]
    pub payload: Option<message_to_dsp::Payload>,
}

pub mod message_to_dsp {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "2")]
        EchoReq(super::EchoRequest),
        #[prost(message, tag = "3")]
        Config(super::Configure),
        #[prost(message, tag = "4")]
        GetWave(super::GetWaveGroup),
        #[prost(message, tag = "5")]
        Terminate(super::Terminate),
    }
}

/// Instrument-to-host envelope.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MessageToHost {
    #[prost(uint32, optional, tag = "1")]
    pub id: Option<u32>,
    #[prost(oneof = "message_to_host::Payload", tags = "2, 3, 4, 5")]
    pub payload: Option<message_to_host::Payload>,
}

pub mod message_to_host {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "2")]
        Ack(super::Acknowledge),
        #[prost(message, tag = "3")]
        EchoRep(super::EchoReply),
        #[prost(message, tag = "4")]
        WaveGroup(super::WaveGroup),
        #[prost(message, tag = "5")]
        ConfigReply(super::ConfigReply),
    }
}
