use std::fs::File;
use std::io::Read;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{downmix, resample, TARGET_SAMPLE_RATE};
use crate::{Error, Result};

/// Mono samples at their source rate.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decodes `path` and returns a mono waveform at 16 kHz.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let decoded = decode_file(path)?;
    if decoded.samples.is_empty() {
        return Err(Error::AudioDecode(format!(
            "{}: no audio samples decoded",
            path.display()
        )));
    }
    tracing::debug!(
        "decoded {} samples at {} Hz from {}",
        decoded.samples.len(),
        decoded.sample_rate,
        path.display()
    );
    resample(&decoded.samples, decoded.sample_rate, TARGET_SAMPLE_RATE)
}

pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav {
        let file = File::open(path)
            .map_err(|e| Error::AudioDecode(format!("{}: {e}", path.display())))?;
        return decode_wav(std::io::BufReader::new(file));
    }
    decode_with_symphonia(path)
}

pub fn decode_wav<R: Read>(reader: R) -> Result<DecodedAudio> {
    let reader = hound::WavReader::new(reader).map_err(|e| Error::AudioDecode(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::AudioDecode(e.to_string()))?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::AudioDecode(e.to_string()))?
        }
    };

    Ok(DecodedAudio {
        samples: downmix(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

fn decode_with_symphonia(path: &Path) -> Result<DecodedAudio> {
    let decode_err = |e: SymphoniaError| Error::AudioDecode(format!("{}: {e}", path.display()));

    let src =
        File::open(path).map_err(|e| Error::AudioDecode(format!("{}: {e}", path.display())))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_err)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::AudioDecode(format!("{}: no audio track", path.display())))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_err)?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_err(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!("skipping corrupt packet: {}", e);
                continue;
            }
            Err(e) => return Err(decode_err(e)),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend(downmix(buf.samples(), spec.channels.count()));
    }

    let sample_rate = sample_rate
        .ok_or_else(|| Error::AudioDecode(format!("{}: unknown sample rate", path.display())))?;
    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(spec: hound::WavSpec, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_decode_stereo_wav_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[16384, 0, -16384, -16384, 0, 16384]);
        let audio = decode_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.samples.len(), 3);
        assert!((audio.samples[0] - 0.25).abs() < 1e-6);
        assert!((audio.samples[1] + 0.5).abs() < 1e-6);
        assert!((audio.samples[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_decode_float_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for s in [0.25f32, -0.75] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let audio = decode_wav(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(audio.samples, vec![0.25, -0.75]);
    }

    #[test]
    fn test_decode_other_extension_with_symphonia() {
        let path =
            std::env::temp_dir().join(format!("soundleaf-{}-stereo.wave", std::process::id()));
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..4000 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let audio = decode_file(&path);
        std::fs::remove_file(&path).unwrap();
        let audio = audio.unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.samples.len(), 4000);
        assert!(audio.samples.iter().all(|s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = decode_wav(Cursor::new(b"not a wav file".to_vec())).unwrap_err();
        assert!(matches!(err, Error::AudioDecode(_)));
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = load_audio("does/not/exist.mp3").unwrap_err();
        assert!(matches!(err, Error::AudioDecode(_)));
        let err = load_audio("does/not/exist.wav").unwrap_err();
        assert!(matches!(err, Error::AudioDecode(_)));
    }
}
