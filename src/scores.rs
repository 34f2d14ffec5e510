use crate::{Error, Result};

/// Per-frame class confidences, `frames x num_labels`, row major.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    data: Vec<f32>,
    num_labels: usize,
    num_frames: usize,
}

impl ScoreMatrix {
    pub fn new(num_labels: usize) -> Self {
        Self {
            data: Vec::new(),
            num_labels,
            num_frames: 0,
        }
    }

    pub fn from_rows(rows: Vec<Vec<f32>>, num_labels: usize) -> Result<Self> {
        let mut matrix = Self::new(num_labels);
        for row in rows {
            matrix.push_row(&row)?;
        }
        Ok(matrix)
    }

    pub fn push_row(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.num_labels {
            return Err(Error::Inference(format!(
                "score row has {} columns, expected {}",
                row.len(),
                self.num_labels
            )));
        }
        self.data.extend_from_slice(row);
        self.num_frames += 1;
        Ok(())
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Scores of one frame, `None` past the last frame.
    pub fn get(&self, frame: usize) -> Option<&[f32]> {
        if frame >= self.num_frames {
            return None;
        }
        let start = frame * self.num_labels;
        self.data.get(start..start + self.num_labels)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // every pushed row holds exactly num_labels scores
        (0..self.num_frames).map(move |frame| {
            let start = frame * self.num_labels;
            &self.data[start..start + self.num_labels]
        })
    }
}

/// Arithmetic mean of every label column over all frames.
pub fn aggregate_scores(scores: &ScoreMatrix) -> Result<Vec<f32>> {
    let frames = scores.num_frames();
    if frames == 0 {
        return Err(Error::EmptyInput("score matrix has no frames".into()));
    }
    let mut sums = vec![0f64; scores.num_labels()];
    for row in scores.rows() {
        for (sum, &score) in sums.iter_mut().zip(row) {
            *sum += score as f64;
        }
    }
    Ok(sums
        .into_iter()
        .map(|sum| (sum / frames as f64) as f32)
        .collect())
}
