//! Audio normalization and feature extraction.

mod extractor;
mod format;
mod mfcc;
mod pcm;
mod resample;
mod wav;

/// Default canonical sample rate for analysis.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
/// Default cepstral coefficients per frame.
pub const DEFAULT_MFCC_COEFFICIENTS: usize = 13;
/// Default number of frames per feature vector.
pub const DEFAULT_MFCC_FRAMES: usize = 100;

pub use extractor::{FeatureExtractor, FeatureVector};
pub use format::{AudioFormat, ByteOrder, SampleEncoding, normalize_to_canonical};
pub use mfcc::{MFCC_FRAME_LEN, MFCC_MEL_BANDS};
pub use pcm::{pcm16_to_float, rms};
pub use wav::{WavError, read_wav};
