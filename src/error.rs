use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is terminal; callers abort the run on the first one.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode audio: {0}")]
    AudioDecode(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("failed to load label taxonomy: {0}")]
    TaxonomyLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("no candidate labels to choose from")]
    NoCandidates,
}
