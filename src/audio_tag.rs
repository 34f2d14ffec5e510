use crate::{
    classifier::EventTagger,
    get_default_provider,
    utils::{cstr_to_string, cstring_from_str},
    Error, Result,
};

#[derive(Debug, Default, Clone)]
pub struct AudioTagConfig {
    pub model: String,
    pub labels: String,
    /// Number of events returned per call, usually the size of the label set
    pub top_k: i32,
    pub ced: Option<String>,
    pub debug: bool,
    pub num_threads: Option<i32>,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioEvent {
    pub name: String,
    pub index: usize,
    pub prob: f32,
}

pub struct AudioTag {
    audio_tag: *const sherpa_rs_sys::SherpaOnnxAudioTagging,
    config: AudioTagConfig,
    sample_rate: u32,
}

impl AudioTag {
    pub fn new(config: AudioTagConfig, sample_rate: u32) -> Result<Self> {
        let model = cstring_from_str(&config.model)?;
        let ced = cstring_from_str(config.ced.as_deref().unwrap_or_default())?;
        let labels = cstring_from_str(&config.labels)?;
        let provider = cstring_from_str(
            &config
                .provider
                .clone()
                .unwrap_or_else(get_default_provider),
        )?;

        let sherpa_config = sherpa_rs_sys::SherpaOnnxAudioTaggingConfig {
            model: sherpa_rs_sys::SherpaOnnxAudioTaggingModelConfig {
                zipformer: sherpa_rs_sys::SherpaOnnxOfflineZipformerAudioTaggingModelConfig {
                    model: model.as_ptr(),
                },
                ced: ced.as_ptr(),
                num_threads: config.num_threads.unwrap_or(1),
                debug: config.debug.into(),
                provider: provider.as_ptr(),
            },
            labels: labels.as_ptr(),
            top_k: config.top_k,
        };
        let audio_tag = unsafe { sherpa_rs_sys::SherpaOnnxCreateAudioTagging(&sherpa_config) };

        if audio_tag.is_null() {
            return Err(Error::ModelLoad(format!(
                "failed to create audio tagging from {}",
                config.model
            )));
        }
        tracing::debug!("created audio tagging with top_k {}", config.top_k);
        Ok(Self {
            audio_tag,
            config,
            sample_rate,
        })
    }

    pub fn compute(&mut self, samples: &[f32]) -> Result<Vec<AudioEvent>> {
        let num_samples: i32 = samples
            .len()
            .try_into()
            .map_err(|_| Error::Inference(format!("{} samples is too many", samples.len())))?;

        let mut events = Vec::new();
        unsafe {
            let stream = sherpa_rs_sys::SherpaOnnxAudioTaggingCreateOfflineStream(self.audio_tag);
            if stream.is_null() {
                return Err(Error::Inference("failed to create offline stream".into()));
            }
            sherpa_rs_sys::SherpaOnnxAcceptWaveformOffline(
                stream,
                self.sample_rate as i32,
                samples.as_ptr(),
                num_samples,
            );

            let results = sherpa_rs_sys::SherpaOnnxAudioTaggingCompute(
                self.audio_tag,
                stream,
                self.config.top_k,
            );
            if results.is_null() {
                sherpa_rs_sys::SherpaOnnxDestroyOfflineStream(stream);
                return Err(Error::Inference("audio tagging returned no results".into()));
            }

            // The result array is null terminated
            for i in 0..self.config.top_k.max(0) as usize {
                let event = *results.add(i);
                if event.is_null() {
                    break;
                }
                events.push(AudioEvent {
                    name: cstr_to_string((*event).name as _),
                    index: (*event).index as usize,
                    prob: (*event).prob,
                });
            }

            sherpa_rs_sys::SherpaOnnxAudioTaggingFreeResults(results);
            sherpa_rs_sys::SherpaOnnxDestroyOfflineStream(stream);
        }
        Ok(events)
    }
}

impl EventTagger for AudioTag {
    fn tag(&mut self, samples: &[f32]) -> Result<Vec<AudioEvent>> {
        self.compute(samples)
    }
}

unsafe impl Send for AudioTag {}
unsafe impl Sync for AudioTag {}

impl Drop for AudioTag {
    fn drop(&mut self) {
        unsafe {
            sherpa_rs_sys::SherpaOnnxDestroyAudioTagging(self.audio_tag);
        }
    }
}
