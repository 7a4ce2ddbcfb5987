use tracing::debug;

use super::format::{AudioFormat, normalize_to_canonical};
use super::mfcc::MfccExtractor;
use super::pcm::{pcm16_to_float, rms};
use super::{DEFAULT_MFCC_COEFFICIENTS, DEFAULT_MFCC_FRAMES, DEFAULT_SAMPLE_RATE};
use crate::error::ClassifyError;

/// Fixed-shape features extracted from one audio segment.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Frame-major coefficients, `coefficients * frames` long.
    pub values: Vec<f32>,
    /// Coefficients per frame.
    pub coefficients: usize,
    /// Frame count.
    pub frames: usize,
    /// RMS energy of the decoded signal.
    pub rms: f32,
}

impl FeatureVector {
    /// Number of values in the vector.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the vector holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalizes raw PCM and turns it into a [`FeatureVector`].
///
/// Pure: the same bytes and format always produce the same output.
pub struct FeatureExtractor {
    sample_rate: u32,
    mfcc: MfccExtractor,
    coefficients: usize,
    frames: usize,
}

impl FeatureExtractor {
    /// Extractor targeting `sample_rate` with `coefficients × frames` outputs.
    pub fn new(sample_rate: u32, coefficients: usize, frames: usize) -> Self {
        Self {
            sample_rate,
            mfcc: MfccExtractor::new(sample_rate, coefficients, frames),
            coefficients,
            frames,
        }
    }

    /// Canonical sample rate audio is converted to.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length of every vector this extractor produces.
    pub fn feature_len(&self) -> usize {
        self.mfcc.output_len()
    }

    /// Normalize, decode and compute features for one buffer.
    pub fn extract(
        &self,
        bytes: &[u8],
        format: &AudioFormat,
    ) -> Result<FeatureVector, ClassifyError> {
        let canonical = normalize_to_canonical(bytes, format, self.sample_rate)?;
        let samples = pcm16_to_float(&canonical);
        if samples.is_empty() {
            return Err(ClassifyError::EmptyAudioInput);
        }
        let energy = rms(&samples);
        let values = self.mfcc.compute(&samples);
        debug!(
            "Extracted {} features from {} samples (rms {energy:.4})",
            values.len(),
            samples.len()
        );
        Ok(FeatureVector {
            values,
            coefficients: self.coefficients,
            frames: self.frames,
            rms: energy,
        })
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(
            DEFAULT_SAMPLE_RATE,
            DEFAULT_MFCC_COEFFICIENTS,
            DEFAULT_MFCC_FRAMES,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ByteOrder, SampleEncoding};

    fn pcm16(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn canonical_input_yields_configured_length() {
        let extractor = FeatureExtractor::default();
        let bytes = pcm16(&vec![1_000; 16_000]);
        let features = extractor
            .extract(&bytes, &AudioFormat::canonical(16_000))
            .unwrap();
        assert_eq!(features.len(), 13 * 100);
        assert_eq!(features.coefficients, 13);
        assert_eq!(features.frames, 100);
    }

    #[test]
    fn repeated_extraction_is_deterministic() {
        let extractor = FeatureExtractor::new(16_000, 8, 10);
        let bytes = pcm16(&(0..4_000).map(|i| ((i * 37) % 2_000) as i16).collect::<Vec<_>>());
        let format = AudioFormat::canonical(16_000);
        let a = extractor.extract(&bytes, &format).unwrap();
        let b = extractor.extract(&bytes, &format).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_buffer_is_rejected() {
        let extractor = FeatureExtractor::default();
        let err = extractor
            .extract(&[], &AudioFormat::canonical(16_000))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyAudioInput));
    }

    #[test]
    fn foreign_format_is_converted_before_extraction() {
        let extractor = FeatureExtractor::new(16_000, 13, 5);
        let format = AudioFormat {
            sample_rate: 44_100,
            bits_per_sample: 32,
            channels: 2,
            byte_order: ByteOrder::Little,
            encoding: SampleEncoding::Float,
        };
        let bytes: Vec<u8> = (0..44_100 * 2)
            .flat_map(|i| ((i as f32 * 0.01).sin() * 0.3).to_le_bytes())
            .collect();
        let features = extractor.extract(&bytes, &format).unwrap();
        assert_eq!(features.len(), 65);
        assert!(features.rms > 0.0);
    }
}
