use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::resample::resample_linear_into;
use crate::error::ClassifyError;

/// Bits per sample of the canonical analysis format.
pub const CANONICAL_BITS_PER_SAMPLE: u16 = 16;

/// Byte order of multi-byte PCM samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

/// How each sample's bits are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// Two's complement integers.
    Signed,
    /// Offset-binary integers (silence at half scale).
    Unsigned,
    /// IEEE-754 floats in [-1.0, 1.0].
    Float,
}

/// Describes an interleaved PCM byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Frames per second.
    pub sample_rate: u32,
    /// Bits used by one sample of one channel.
    pub bits_per_sample: u16,
    /// Interleaved channel count.
    pub channels: u16,
    /// Byte order of each sample.
    pub byte_order: ByteOrder,
    /// Sample encoding.
    pub encoding: SampleEncoding,
}

impl AudioFormat {
    /// Mono 16-bit signed little-endian PCM at `sample_rate`.
    pub fn canonical(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bits_per_sample: CANONICAL_BITS_PER_SAMPLE,
            channels: 1,
            byte_order: ByteOrder::Little,
            encoding: SampleEncoding::Signed,
        }
    }

    /// Bytes occupied by one sample of one channel.
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// Bytes occupied by one interleaved frame.
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * usize::from(self.channels)
    }

    /// Check that the format can be decoded at all.
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.sample_rate == 0 {
            return Err(ClassifyError::unsupported("sample rate is zero"));
        }
        if self.channels == 0 {
            return Err(ClassifyError::unsupported("channel count is zero"));
        }
        let supported = match self.encoding {
            SampleEncoding::Signed | SampleEncoding::Unsigned => {
                matches!(self.bits_per_sample, 8 | 16 | 24 | 32)
            }
            SampleEncoding::Float => matches!(self.bits_per_sample, 32 | 64),
        };
        if !supported {
            return Err(ClassifyError::unsupported(format!(
                "{} bits per sample with {:?} encoding",
                self.bits_per_sample, self.encoding
            )));
        }
        Ok(())
    }
}

/// Convert `bytes` to canonical mono 16-bit signed little-endian PCM.
///
/// Input that already matches the canonical format is returned borrowed and
/// untouched.
pub fn normalize_to_canonical<'a>(
    bytes: &'a [u8],
    source: &AudioFormat,
    target_rate: u32,
) -> Result<Cow<'a, [u8]>, ClassifyError> {
    source.validate()?;
    if target_rate == 0 {
        return Err(ClassifyError::unsupported("target sample rate is zero"));
    }
    let canonical = AudioFormat::canonical(target_rate);
    if *source == canonical {
        return Ok(Cow::Borrowed(bytes));
    }
    let interleaved = decode_interleaved(bytes, source);
    let mut mono = Vec::new();
    downmix_to_mono_into(&mut mono, &interleaved, source.channels);
    let mut resampled = Vec::new();
    resample_linear_into(&mut resampled, &mono, source.sample_rate, target_rate);
    Ok(Cow::Owned(encode_i16_le(&resampled)))
}

fn decode_interleaved(bytes: &[u8], format: &AudioFormat) -> Vec<f32> {
    let width = format.bytes_per_sample();
    let frame = format.frame_size();
    let usable = bytes.len() - bytes.len() % frame;
    bytes[..usable]
        .chunks_exact(width)
        .map(|chunk| decode_sample(chunk, format))
        .collect()
}

fn decode_sample(chunk: &[u8], format: &AudioFormat) -> f32 {
    let mut raw = [0u8; 8];
    let width = chunk.len();
    match format.byte_order {
        ByteOrder::Little => raw[..width].copy_from_slice(chunk),
        ByteOrder::Big => {
            for (slot, byte) in raw[..width].iter_mut().zip(chunk.iter().rev()) {
                *slot = *byte;
            }
        }
    }
    let bits = u32::from(format.bits_per_sample);
    let value = match format.encoding {
        SampleEncoding::Float if width == 4 => {
            f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64
        }
        SampleEncoding::Float => f64::from_le_bytes(raw),
        SampleEncoding::Signed => {
            let unsigned = u64::from_le_bytes(raw);
            let shift = 64 - bits;
            let signed = ((unsigned << shift) as i64) >> shift;
            signed as f64 / (1u64 << (bits - 1)) as f64
        }
        SampleEncoding::Unsigned => {
            let unsigned = u64::from_le_bytes(raw) as f64;
            let half = (1u64 << (bits - 1)) as f64;
            (unsigned - half) / half
        }
    };
    sanitize_sample(value as f32)
}

pub(crate) fn downmix_to_mono_into(out: &mut Vec<f32>, samples: &[f32], channels: u16) {
    let channels = usize::from(channels.max(1));
    out.clear();
    if channels == 1 {
        out.extend(samples.iter().copied().map(sanitize_sample));
        return;
    }
    let frames = samples.len() / channels;
    out.reserve(frames);
    for frame in samples.chunks_exact(channels) {
        let sum: f32 = frame.iter().copied().map(sanitize_sample).sum();
        out.push(sum / channels as f32);
    }
}

fn encode_i16_le(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let scaled = (sanitize_sample(sample) * 32768.0).round().clamp(-32768.0, 32767.0);
        out.extend_from_slice(&(scaled as i16).to_le_bytes());
    }
    out
}

fn sanitize_sample(sample: f32) -> f32 {
    if !sample.is_finite() {
        return 0.0;
    }
    sample.clamp(-1.0, 1.0)
}
