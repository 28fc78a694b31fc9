use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use landmark_fp::audio_pipeline::{AudioMetadata, AudioPipeline, AudioProcessor, ProcessedAudio};
use landmark_fp::config::ConfigSet;
use landmark_fp::fingerprint::{Fingerprint, FingerprintGenerator, LandmarkFingerprinter};

/// Fingerprint a WAV file and print the result as JSON
#[derive(Debug, Parser)]
#[command(name = "landmark-fp", version)]
struct Args {
    /// WAV file to analyse
    input: PathBuf,

    /// Directory holding the YAML configuration (defaults to $LANDMARK_FP_CONFIG_DIR or ./config)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Include every fingerprint in the output
    #[arg(long)]
    full: bool,

    /// Write the mono, resampled and normalized signal to this WAV file
    #[arg(long)]
    processed_out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SpectrogramShape {
    frames: usize,
    bins: usize,
}

#[derive(Debug, Serialize)]
struct Report {
    metadata: AudioMetadata,
    processed: ProcessedAudio,
    spectrogram: SpectrogramShape,
    fingerprint_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprints: Option<Vec<Fingerprint>>,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(err) = run(&args) {
        error!(error = %err, "fingerprinting failed");
        let mut source = err.source();
        while let Some(cause) = source {
            error!(cause = %cause, "caused by");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config_dir {
        Some(dir) => ConfigSet::load_from_dir(dir)?,
        None => ConfigSet::load_from_env()?,
    };
    info!(root = ?config.root(), "configuration loaded");

    let pipeline = AudioPipeline::new(&config.audio)?;
    let fingerprinter = LandmarkFingerprinter::new(&config.fingerprint);

    let raw = std::fs::read(&args.input)?;
    let audio = pipeline.process(&raw)?;
    let fingerprints = fingerprinter.generate(&audio.spectrogram);
    info!(
        input = %args.input.display(),
        fingerprints = fingerprints.len(),
        "fingerprints generated"
    );

    if let Some(path) = &args.processed_out {
        std::fs::write(path, audio.buffer.to_wav_bytes()?)?;
        info!(path = %path.display(), "processed audio written");
    }

    let report = Report {
        metadata: audio.metadata,
        processed: audio.audio,
        spectrogram: SpectrogramShape {
            frames: audio.spectrogram.frame_count(),
            bins: audio.spectrogram.bin_count(),
        },
        fingerprint_count: fingerprints.len(),
        fingerprints: args.full.then_some(fingerprints),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}
