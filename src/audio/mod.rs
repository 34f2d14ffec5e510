//! Audio loading for the tagger
//!
//! - WAV through hound, every other format through symphonia
//! - Downmix to mono
//! - Resampling to 16 kHz with rubato

mod loader;
mod resampler;

pub use loader::{decode_file, decode_wav, load_audio, DecodedAudio};
pub use resampler::resample;

/// Sample rate expected by the audio tagging model.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Averages interleaved channels into one.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
