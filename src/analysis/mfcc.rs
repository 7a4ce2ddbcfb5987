//! Mel-frequency cepstral coefficients over a fixed number of frames.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

/// FFT length of one analysis frame.
pub const MFCC_FRAME_LEN: usize = 512;
/// Triangular mel filters applied to each power spectrum.
pub const MFCC_MEL_BANDS: usize = 40;
const MFCC_FMIN_HZ: f32 = 20.0;
const LOG_FLOOR: f32 = 1e-10;

/// Computes `coefficients × frames` cepstral features for any signal length.
pub(crate) struct MfccExtractor {
    coefficients: usize,
    frames: usize,
    window: Vec<f32>,
    filters: Vec<Vec<(usize, f32)>>,
    fft: Arc<dyn Fft<f32>>,
}

impl MfccExtractor {
    pub(crate) fn new(sample_rate: u32, coefficients: usize, frames: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            coefficients,
            frames,
            window: hann_window(MFCC_FRAME_LEN),
            filters: mel_filters(sample_rate, MFCC_FRAME_LEN, MFCC_MEL_BANDS, MFCC_FMIN_HZ),
            fft: planner.plan_fft_forward(MFCC_FRAME_LEN),
        }
    }

    pub(crate) fn output_len(&self) -> usize {
        self.coefficients * self.frames
    }

    /// Frame-major feature vector: all coefficients of frame 0, then frame 1, ...
    pub(crate) fn compute(&self, samples: &[f32]) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.output_len());
        let mut buffer = vec![Complex32::default(); MFCC_FRAME_LEN];
        let mut power = vec![0.0_f32; MFCC_FRAME_LEN / 2 + 1];
        for frame in 0..self.frames {
            let start = frame_start(samples.len(), self.frames, frame);
            for (i, cell) in buffer.iter_mut().enumerate() {
                let sample = samples.get(start + i).copied().unwrap_or(0.0);
                *cell = Complex32::new(sample * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);
            for (slot, bin) in power.iter_mut().zip(buffer.iter()) {
                *slot = bin.norm_sqr();
            }
            let log_mel: Vec<f32> = self
                .filters
                .iter()
                .map(|filter| {
                    let energy: f32 = filter.iter().map(|&(bin, w)| power[bin] * w).sum();
                    energy.max(LOG_FLOOR).ln()
                })
                .collect();
            dct_ii_into(&log_mel, self.coefficients, &mut out);
        }
        out
    }
}

/// Evenly spreads `frames` windows across the signal; windows overlap when the
/// signal is short and start at zero when it is shorter than one frame.
fn frame_start(len: usize, frames: usize, index: usize) -> usize {
    if frames <= 1 {
        return 0;
    }
    let span = len.saturating_sub(MFCC_FRAME_LEN) as u64;
    (span * index as u64 / (frames as u64 - 1)) as usize
}

fn hann_window(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0; length];
    }
    let denom = (length - 1) as f32;
    (0..length)
        .map(|n| 0.5 * (1.0 - (2.0 * PI * n as f32 / denom).cos()))
        .collect()
}

fn mel_filters(
    sample_rate: u32,
    fft_len: usize,
    bands: usize,
    f_min: f32,
) -> Vec<Vec<(usize, f32)>> {
    let nyquist = sample_rate.max(1) as f32 * 0.5;
    let mel_min = hz_to_mel(f_min.min(nyquist));
    let mel_max = hz_to_mel(nyquist);
    let edges: Vec<usize> = (0..bands + 2)
        .map(|i| {
            let mel = mel_min + (mel_max - mel_min) * i as f32 / (bands + 1) as f32;
            let hz = mel_to_hz(mel).clamp(0.0, nyquist);
            ((hz * fft_len as f32 / sample_rate.max(1) as f32).floor() as usize).min(fft_len / 2)
        })
        .collect();
    edges
        .windows(3)
        .map(|w| triangle(w[0], w[1], w[2].max(w[1] + 1).min(fft_len / 2)))
        .collect()
}

fn triangle(left: usize, center: usize, right: usize) -> Vec<(usize, f32)> {
    (left..=right)
        .filter_map(|bin| {
            let weight = if bin < center {
                (bin - left) as f32 / (center - left) as f32
            } else if right > center {
                (right - bin) as f32 / (right - center) as f32
            } else {
                1.0
            };
            (weight > 0.0).then_some((bin, weight))
        })
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

fn dct_ii_into(values: &[f32], count: usize, out: &mut Vec<f32>) {
    let n = values.len().max(1) as f64;
    for k in 0..count {
        let sum: f64 = values
            .iter()
            .enumerate()
            .map(|(m, &v)| {
                let angle = std::f64::consts::PI * k as f64 * (m as f64 + 0.5) / n;
                f64::from(v) * angle.cos()
            })
            .sum();
        out.push(sum as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / 16_000.0).sin())
            .collect()
    }

    #[test]
    fn output_has_fixed_shape_for_any_length() {
        let extractor = MfccExtractor::new(16_000, 13, 100);
        for len in [1usize, 100, MFCC_FRAME_LEN, 16_000, 48_123] {
            assert_eq!(extractor.compute(&tone(440.0, len)).len(), 1_300);
        }
    }

    #[test]
    fn identical_input_gives_identical_features() {
        let extractor = MfccExtractor::new(16_000, 13, 20);
        let samples = tone(1_000.0, 8_000);
        assert_eq!(extractor.compute(&samples), extractor.compute(&samples));
    }

    #[test]
    fn frames_cover_first_and_last_window() {
        assert_eq!(frame_start(10_000, 5, 0), 0);
        assert_eq!(frame_start(10_000, 5, 4), 10_000 - MFCC_FRAME_LEN);
        assert_eq!(frame_start(100, 5, 3), 0);
        assert_eq!(frame_start(10_000, 1, 0), 0);
    }

    #[test]
    fn filters_stay_within_nyquist() {
        let filters = mel_filters(16_000, MFCC_FRAME_LEN, MFCC_MEL_BANDS, MFCC_FMIN_HZ);
        assert_eq!(filters.len(), MFCC_MEL_BANDS);
        assert!(filters
            .iter()
            .flatten()
            .all(|&(bin, w)| bin <= MFCC_FRAME_LEN / 2 && w > 0.0 && w <= 1.0));
    }

    #[test]
    fn features_are_finite_for_silence() {
        let extractor = MfccExtractor::new(16_000, 13, 4);
        assert!(extractor.compute(&[0.0; 2_048]).iter().all(|v| v.is_finite()));
    }
}
