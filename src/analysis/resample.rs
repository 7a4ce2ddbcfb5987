/// Linear-interpolation resampler into a reusable buffer.
pub(crate) fn resample_linear_into(
    out: &mut Vec<f32>,
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
) {
    let input_rate = input_rate.max(1);
    let output_rate = output_rate.max(1);
    out.clear();
    if samples.is_empty() || input_rate == output_rate {
        out.extend_from_slice(samples);
        return;
    }
    let ratio = f64::from(input_rate) / f64::from(output_rate);
    let duration_seconds = samples.len() as f64 / f64::from(input_rate);
    let out_len = (duration_seconds * f64::from(output_rate)).round().max(1.0) as usize;
    out.reserve(out_len);
    for i in 0..out_len {
        out.push(lerp_sample(samples, i as f64 * ratio));
    }
}

fn lerp_sample(samples: &[f32], pos: f64) -> f32 {
    let idx0 = (pos.floor().max(0.0) as usize).min(samples.len() - 1);
    let idx1 = (idx0 + 1).min(samples.len() - 1);
    let frac = (pos - idx0 as f64).clamp(0.0, 1.0) as f32;
    let a = samples[idx0];
    let b = samples[idx1];
    a + (b - a) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsampling_interpolates_between_neighbours() {
        let mut out = Vec::new();
        resample_linear_into(&mut out, &[0.0, 1.0], 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert!((out[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn equal_rates_copy_input() {
        let mut out = vec![9.0];
        resample_linear_into(&mut out, &[0.25, -0.25], 16_000, 16_000);
        assert_eq!(out, vec![0.25, -0.25]);
    }
}
