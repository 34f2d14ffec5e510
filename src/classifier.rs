//! Turns a waveform into a per-frame score matrix.

use crate::audio::TARGET_SAMPLE_RATE;
use crate::audio_tag::AudioEvent;
use crate::scores::ScoreMatrix;
use crate::{Error, Result};

pub trait Classifier {
    /// Scores every frame of a 16 kHz mono waveform against the label taxonomy.
    fn classify(&mut self, samples: &[f32]) -> Result<ScoreMatrix>;
}

/// Clip level tagger, one probability per returned event.
pub trait EventTagger {
    fn tag(&mut self, samples: &[f32]) -> Result<Vec<AudioEvent>>;
}

/// Analysis window layout, in seconds.
///
/// `hop_secs` may not exceed `frame_secs`, so every sample lands in a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub frame_secs: f32,
    pub hop_secs: f32,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            frame_secs: 0.96,
            hop_secs: 0.48,
        }
    }
}

impl Framing {
    /// Sample ranges of every frame for a waveform of `len` samples.
    ///
    /// A waveform shorter than one frame yields a single frame. The last
    /// window is kept only when it reaches samples no earlier window covered.
    pub fn windows(&self, len: usize, sample_rate: u32) -> Result<Vec<std::ops::Range<usize>>> {
        let valid = |secs: f32| secs.is_finite() && secs > 0.0;
        if !(valid(self.frame_secs) && valid(self.hop_secs)) {
            return Err(Error::InvalidParameter(format!(
                "frame ({}) and hop ({}) must be positive and finite",
                self.frame_secs, self.hop_secs
            )));
        }
        if self.hop_secs > self.frame_secs {
            return Err(Error::InvalidParameter(format!(
                "hop ({}) is longer than the frame ({})",
                self.hop_secs, self.frame_secs
            )));
        }
        let frame = ((self.frame_secs * sample_rate as f32).round() as usize).max(1);
        let hop = ((self.hop_secs * sample_rate as f32).round() as usize).max(1);

        let mut windows = Vec::new();
        let mut start: usize = 0;
        loop {
            let end = start.saturating_add(frame).min(len);
            windows.push(start..end);
            if end >= len {
                break;
            }
            start = start.saturating_add(hop);
        }
        Ok(windows)
    }
}

/// Classifier that runs an [`EventTagger`] over sliding windows.
pub struct FramedClassifier<T> {
    tagger: T,
    num_labels: usize,
    framing: Framing,
}

impl<T: EventTagger> FramedClassifier<T> {
    pub fn new(tagger: T, num_labels: usize, framing: Framing) -> Self {
        Self {
            tagger,
            num_labels,
            framing,
        }
    }
}

impl<T: EventTagger> Classifier for FramedClassifier<T> {
    fn classify(&mut self, samples: &[f32]) -> Result<ScoreMatrix> {
        if samples.is_empty() {
            return Err(Error::Inference("waveform is empty".into()));
        }
        let windows = self.framing.windows(samples.len(), TARGET_SAMPLE_RATE)?;
        tracing::debug!("classifying {} frames", windows.len());

        let mut scores = ScoreMatrix::new(self.num_labels);
        let mut row = vec![0f32; self.num_labels];
        for window in windows {
            row.fill(0.0);
            for event in self.tagger.tag(&samples[window])? {
                let slot = row.get_mut(event.index).ok_or_else(|| {
                    Error::Inference(format!(
                        "event {:?} has index {} outside {} labels",
                        event.name, event.index, self.num_labels
                    ))
                })?;
                *slot = event.prob;
            }
            scores.push_row(&row)?;
        }
        Ok(scores)
    }
}
