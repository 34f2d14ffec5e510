/*
Prints the most specific sound event detected in an audio file.

cargo run -- dog.mp3
cargo run                      # prompts for the path
cargo run -- --model-dir ./sherpa-onnx-zipformer-audio-tagging-2024-04-09 dog.wav
*/

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use eyre::{bail, eyre, Result, WrapErr};
use soundleaf::{
    audio::{load_audio, TARGET_SAMPLE_RATE},
    audio_tag::{AudioTag, AudioTagConfig},
    classifier::{FramedClassifier, Framing},
    model::{ensure_model, get_cache_dir, ModelFiles, ModelSource},
    recognize,
    report::render_report,
    taxonomy::Taxonomy,
    RecognizeConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Audio file to analyze. Asked for interactively when omitted
    audio: Option<PathBuf>,

    /// Number of ranked labels to print and choose from
    #[arg(long, default_value = "10")]
    top_n: usize,

    /// Directory holding model.int8.onnx and class_labels_indices.csv.
    /// The model is downloaded when this is not set
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Where downloaded models are kept
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// onnxruntime execution provider
    #[arg(long)]
    provider: Option<String>,

    #[arg(long, default_value = "1")]
    num_threads: i32,

    /// Analysis window in seconds
    #[arg(long, default_value = "0.96")]
    frame_secs: f32,

    /// Hop between analysis windows in seconds
    #[arg(long, default_value = "0.48")]
    hop_secs: f32,

    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let audio_path = match args.audio.clone() {
        Some(path) => path,
        None => prompt_path()?,
    };

    let files = match &args.model_dir {
        Some(dir) => ModelFiles::in_dir(dir),
        None => {
            let cache_dir = match args.cache_dir.clone().or_else(get_cache_dir) {
                Some(dir) => dir,
                None => bail!("no cache directory available, pass --cache-dir or --model-dir"),
            };
            ensure_model(&ModelSource::default(), &cache_dir)
                .wrap_err("Failed to fetch the audio tagging model")?
        }
    };

    let taxonomy = Taxonomy::load(&files.labels)
        .wrap_err_with(|| format!("Failed to load labels {}", files.labels.display()))?;
    let num_labels: i32 = taxonomy
        .len()
        .try_into()
        .wrap_err("Too many labels for the tagger")?;

    tracing::info!("Loading audio tagging model...");
    let tagger = AudioTag::new(
        AudioTagConfig {
            model: path_to_string(&files.model)?,
            labels: path_to_string(&files.labels)?,
            top_k: num_labels,
            debug: args.debug,
            num_threads: Some(args.num_threads),
            provider: args.provider.clone(),
            ..Default::default()
        },
        TARGET_SAMPLE_RATE,
    )
    .wrap_err_with(|| format!("Failed to load model {}", files.model.display()))?;
    tracing::info!("Model loaded.");
    let framing = Framing {
        frame_secs: args.frame_secs,
        hop_secs: args.hop_secs,
    };
    let mut classifier = FramedClassifier::new(tagger, taxonomy.len(), framing);

    let samples = load_audio(&audio_path)
        .wrap_err_with(|| format!("Failed to load {}", audio_path.display()))?;

    let config = RecognizeConfig {
        top_n: args.top_n,
        ..Default::default()
    };
    let recognition = recognize(&mut classifier, &taxonomy, &samples, &config)
        .wrap_err_with(|| format!("Failed to classify {}", audio_path.display()))?;

    print!("{}", render_report(&recognition));
    Ok(())
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt_path() -> Result<PathBuf> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Enter path to audio file: ")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let path = line.trim();
    if path.is_empty() {
        bail!("No audio file given");
    }
    Ok(PathBuf::from(path))
}

fn path_to_string(path: &std::path::Path) -> Result<String> {
    path.to_str()
        .map(String::from)
        .ok_or_else(|| eyre!("Path is not valid UTF-8: {}", path.display()))
}
