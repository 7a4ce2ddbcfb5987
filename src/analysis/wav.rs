use std::path::{Path, PathBuf};

use thiserror::Error;

use super::format::{AudioFormat, ByteOrder, SampleEncoding};

/// Failures while reading a WAV file into PCM bytes.
#[derive(Debug, Error)]
pub enum WavError {
    /// The file could not be opened or its header is invalid.
    #[error("Failed to open {path}: {source}")]
    Open {
        /// WAV path.
        path: PathBuf,
        /// Underlying hound error.
        source: hound::Error,
    },
    /// A sample could not be decoded.
    #[error("Failed to decode {path}: {source}")]
    Decode {
        /// WAV path.
        path: PathBuf,
        /// Underlying hound error.
        source: hound::Error,
    },
}

/// Read a WAV file as interleaved little-endian PCM plus its format.
///
/// Integer samples keep their bit depth and are stored as two's complement,
/// so 8-bit files come back signed. Float samples are stored as 32-bit floats.
pub fn read_wav(path: &Path) -> Result<(Vec<u8>, AudioFormat), WavError> {
    let mut reader = hound::WavReader::open(path).map_err(|source| WavError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();
    let decode_err = |source| WavError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let mut bytes = Vec::new();
    let (bits_per_sample, encoding) = match spec.sample_format {
        hound::SampleFormat::Int => {
            let width = usize::from(spec.bits_per_sample.div_ceil(8));
            for sample in reader.samples::<i32>() {
                bytes.extend_from_slice(&sample.map_err(decode_err)?.to_le_bytes()[..width]);
            }
            (spec.bits_per_sample, SampleEncoding::Signed)
        }
        hound::SampleFormat::Float => {
            for sample in reader.samples::<f32>() {
                bytes.extend_from_slice(&sample.map_err(decode_err)?.to_le_bytes());
            }
            (32, SampleEncoding::Float)
        }
    };
    let format = AudioFormat {
        sample_rate: spec.sample_rate,
        bits_per_sample,
        channels: spec.channels,
        byte_order: ByteOrder::Little,
        encoding,
    };
    Ok((bytes, format))
}
