//! Wire message schema shared with the instrument firmware.
//!
//! Field tags, enum numeric values and the oneof layout are a fixed
//! external contract: the peer's decoder is generated from the same schema
//! and rejects anything else. Do not renumber.

mod messages;

pub use messages::{
    Acknowledge, ChannelConfig, ConfigReply, Configure, EchoReply, EchoRequest, ErrorCode,
    GetWaveGroup, MessageToDsp, MessageToHost, Terminate, TriggerMode, TriggerType, Wave,
    WaveGroup, message_to_dsp, message_to_host,
};
