//! Quantized-sample to physical-unit conversion.
//!
//! The instrument maps each channel's `[min, max]` span onto a signed
//! `2^q`-level integer range centered on the channel midpoint; these are
//! the inverse mappings. Pure functions, no protocol state.

use crate::proto::{ChannelConfig, Wave};

/// Convert one quantized sample back to physical units.
///
/// Callers must guarantee `max > min`.
pub fn sample_to_physical(sample: i32, quantize_bits: u32, min: f32, max: f32) -> f32 {
    let steps_per_unit = (1u64 << quantize_bits) as f32 / (max - min);
    sample as f32 / steps_per_unit + (min + max) / 2.0
}

/// Decode a whole wave against its channel's bounds.
pub fn decode_wave(wave: &Wave, channel: &ChannelConfig, quantize_bits: u32) -> Vec<f32> {
    wave.samples
        .iter()
        .map(|&s| sample_to_physical(s, quantize_bits, channel.min(), channel.max()))
        .collect()
}

/// Size of one quantization step in physical units.
pub fn quantization_step(quantize_bits: u32, min: f32, max: f32) -> f32 {
    (max - min) / (1u64 << quantize_bits) as f32
}
