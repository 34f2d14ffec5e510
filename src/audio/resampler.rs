use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::{Error, Result};

const CHUNK_SIZE: usize = 1024;

/// Resamples mono audio from `from_sr` to `to_sr`.
///
/// The output holds `ceil(len * to_sr / from_sr)` samples with the filter
/// delay removed.
pub fn resample(samples: &[f32], from_sr: u32, to_sr: u32) -> Result<Vec<f32>> {
    if from_sr == 0 || to_sr == 0 {
        return Err(Error::AudioDecode(format!(
            "invalid sample rate conversion {from_sr} -> {to_sr}"
        )));
    }
    if from_sr == to_sr || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = to_sr as f64 / from_sr as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
        .map_err(resample_err)?;
    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    // Zero padding past the end pushes the delayed samples out of the filter.
    let padded_len = samples.len() + (delay as f64 / ratio).ceil() as usize + 2 * CHUNK_SIZE;

    let mut input = vec![vec![0f32; CHUNK_SIZE]];
    let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    for pos in (0..padded_len).step_by(CHUNK_SIZE) {
        let block = &mut input[0];
        block.fill(0.0);
        if pos < samples.len() {
            let end = (pos + CHUNK_SIZE).min(samples.len());
            block[..end - pos].copy_from_slice(&samples[pos..end]);
        }
        let out = resampler.process(&input, None).map_err(resample_err)?;
        output.extend_from_slice(&out[0]);
        if output.len() >= expected + delay {
            break;
        }
    }
    if output.len() < expected + delay {
        return Err(resample_err(format!(
            "produced {} samples, expected {}",
            output.len().saturating_sub(delay),
            expected
        )));
    }

    Ok(output.into_iter().skip(delay).take(expected).collect())
}

fn resample_err(e: impl std::fmt::Display) -> Error {
    Error::AudioDecode(format!("resampling: {e}"))
}
