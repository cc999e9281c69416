//! Synthetic 16-bit PCM WAV generation.

use std::f64::consts::PI;

/// Size of the RIFF/WAVE header written in front of the samples.
pub const WAV_HEADER_BYTES: usize = 44;

/// Lower bound on the generated sample data.
pub const MIN_DATA_BYTES: usize = 1024;

const SAMPLE_RATE: u32 = 16_000;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const TONE_HZ: f64 = 440.0;
const AMPLITUDE: f64 = 0.3;

/// Build a WAV clip whose data section is `max(input_len, MIN_DATA_BYTES)`
/// bytes long. The output is a pure function of `input_len`.
pub fn synthesize(input_len: usize) -> Vec<u8> {
    let data_len = input_len.max(MIN_DATA_BYTES);
    let mut out = Vec::with_capacity(WAV_HEADER_BYTES + data_len);

    write_header(&mut out, data_len as u32);

    let samples = data_len / 2;
    for i in 0..samples {
        let t = i as f64 / SAMPLE_RATE as f64;
        let value = (2.0 * PI * TONE_HZ * t).sin() * AMPLITUDE * i16::MAX as f64;
        out.extend_from_slice(&(value as i16).to_le_bytes());
    }
    if data_len % 2 == 1 {
        out.push(0);
    }

    out
}

fn write_header(out: &mut Vec<u8>, data_len: u32) {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = SAMPLE_RATE * block_align as u32;

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_size_has_floor() {
        assert_eq!(synthesize(0).len(), MIN_DATA_BYTES + WAV_HEADER_BYTES);
        assert_eq!(synthesize(100).len(), 1068);
        assert_eq!(synthesize(10_240).len(), 10_284);
        assert_eq!(synthesize(2_049).len(), 2_049 + WAV_HEADER_BYTES);
    }

    #[test]
    fn test_header_layout() {
        let wav = synthesize(2_000);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
        let data_len = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_len, 2_000);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(synthesize(4_096), synthesize(4_096));
    }
}
