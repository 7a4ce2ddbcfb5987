//! Canonical PCM helpers.

/// Full-scale magnitude of a 16-bit signed sample.
pub const PCM16_SCALE: f32 = 32_768.0;

/// Decode 16-bit signed little-endian PCM into floats in [-1.0, 1.0].
///
/// A trailing odd byte is ignored.
pub fn pcm16_to_float(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / PCM16_SCALE)
        .collect()
}

/// Root-mean-square energy of a signal; zero for empty input.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold(0.0_f64, |acc, &s| acc + f64::from(s) * f64::from(s));
    (sum / samples.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_unit_range() {
        let mut bytes = Vec::new();
        for value in [i16::MIN, 0, i16::MAX] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        let floats = pcm16_to_float(&bytes);
        assert_eq!(floats[0], -1.0);
        assert_eq!(floats[1], 0.0);
        assert!((floats[2] - 32_767.0 / 32_768.0).abs() < 1e-7);
    }

    #[test]
    fn odd_trailing_byte_is_ignored() {
        assert_eq!(pcm16_to_float(&[0, 64, 7]).len(), 1);
    }

    #[test]
    fn rms_of_constant_signal_is_its_magnitude() {
        assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }
}
