use crate::classifier::Classifier;
use crate::scores::aggregate_scores;
use crate::selector::{select_most_specific, select_top_labels, RankedLabel};
use crate::taxonomy::{GeneralLabels, Taxonomy};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct RecognizeConfig {
    pub top_n: usize,
    pub general_labels: GeneralLabels,
}

impl Default for RecognizeConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            general_labels: GeneralLabels::default(),
        }
    }
}

/// Outcome of a complete run, only built when every stage succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub top_labels: Vec<RankedLabel>,
    pub most_specific: String,
}

/// Classifies `samples` and picks the most specific detected sound.
pub fn recognize<C: Classifier + ?Sized>(
    classifier: &mut C,
    taxonomy: &Taxonomy,
    samples: &[f32],
    config: &RecognizeConfig,
) -> Result<Recognition> {
    let scores = classifier.classify(samples)?;
    if scores.num_labels() != taxonomy.len() {
        return Err(Error::Inference(format!(
            "classifier produced {} columns for {} labels",
            scores.num_labels(),
            taxonomy.len()
        )));
    }
    tracing::debug!(
        "scored {} frames x {} labels",
        scores.num_frames(),
        scores.num_labels()
    );

    let mean_scores = aggregate_scores(&scores)?;
    let top_labels = select_top_labels(&mean_scores, taxonomy, config.top_n)?;
    let most_specific = select_most_specific(&top_labels, &config.general_labels)?;

    Ok(Recognition {
        top_labels,
        most_specific,
    })
}
