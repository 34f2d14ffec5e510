pub mod audio;
pub mod audio_tag;
pub mod classifier;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scores;
pub mod selector;
pub mod taxonomy;

mod error;
mod utils;

pub use error::{Error, Result};
pub use pipeline::{recognize, Recognition, RecognizeConfig};

pub fn get_default_provider() -> String {
    "cpu".into()
    // Other providers has many issues with different models!!
}
