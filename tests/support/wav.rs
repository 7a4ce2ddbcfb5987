use std::f32::consts::PI;
use std::path::Path;

/// Mono sine tone as 16-bit signed little-endian PCM.
pub fn pcm16_tone(freq: f32, sample_rate: u32, samples: usize) -> Vec<u8> {
    (0..samples)
        .map(|i| (0.4 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 32767.0) as i16)
        .flat_map(i16::to_le_bytes)
        .collect()
}

/// Interleaved stereo sine tone as 32-bit float little-endian PCM.
pub fn f32_stereo_tone(freq: f32, sample_rate: u32, frames: usize) -> Vec<u8> {
    (0..frames)
        .flat_map(|i| {
            let value = 0.4 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin();
            [value, value * 0.5]
        })
        .flat_map(f32::to_le_bytes)
        .collect()
}

pub fn write_test_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    write_wav(path, spec, |writer| {
        for &sample in samples {
            writer.write_sample(sample).expect("write wav sample");
        }
    });
}

pub fn write_int_wav(path: &Path, sample_rate: u32, channels: u16, bits: u16, samples: &[i32]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bits,
        sample_format: hound::SampleFormat::Int,
    };
    write_wav(path, spec, |writer| {
        for &sample in samples {
            writer.write_sample(sample).expect("write wav sample");
        }
    });
}

pub fn write_float_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    write_wav(path, spec, |writer| {
        for &sample in samples {
            writer.write_sample(sample).expect("write wav sample");
        }
    });
}

fn write_wav(
    path: &Path,
    spec: hound::WavSpec,
    write: impl FnOnce(&mut hound::WavWriter<std::io::BufWriter<std::fs::File>>),
) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create wav parent dirs");
    }
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    write(&mut writer);
    writer.finalize().expect("finalize wav");
}
