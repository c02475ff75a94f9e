use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use pitch_contour::detector::{FrameFeatures, Similarity, Window};
use pitch_contour::pipeline::{PipelineConfig, PitchPipeline, SmoothingMode};
use pitch_contour::Signal;

#[derive(Debug, Parser)]
#[command(name = "get_pitch", version)]
#[command(about = "Pitch detector: writes one f0 value per frame, 0 for unvoiced frames")]
struct Args {
    /// Wave file with the audio signal (mono).
    input_wav: PathBuf,

    /// Output text file, one estimated f0 per line.
    output_txt: PathBuf,

    /// JSON file with the analysis configuration. Options below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analysis window (hamming, rectangular).
    #[arg(long)]
    window: Option<Window>,

    /// Similarity function used for the lag search (autocorrelation, amdf, cepstrum).
    #[arg(long)]
    similarity: Option<Similarity>,

    /// Minimum pitch, in Hz.
    #[arg(long)]
    min_f0: Option<f64>,

    /// Maximum pitch, in Hz.
    #[arg(long)]
    max_f0: Option<f64>,

    /// Odd width of the median filter over the contour (1 disables it).
    #[arg(long)]
    median_width: Option<usize>,

    /// Skip the moving average before framing.
    #[arg(long, default_value_t = false)]
    no_smoothing: bool,

    /// Skip center clipping before framing.
    #[arg(long, default_value_t = false)]
    no_clipping: bool,

    /// Smooth with the in-place running sum instead of a moving average.
    #[arg(long, default_value_t = false)]
    legacy_smoothing: bool,

    /// Also write the features of every frame to this tab-separated file.
    #[arg(long)]
    features: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str(&json).with_context(|| format!("parse config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    if let Some(window) = args.window {
        config.window = window;
    }
    if let Some(similarity) = args.similarity {
        config.similarity = similarity;
    }
    if let Some(min_f0) = args.min_f0 {
        config.min_f0 = min_f0;
    }
    if let Some(max_f0) = args.max_f0 {
        config.max_f0 = max_f0;
    }
    if let Some(median_width) = args.median_width {
        config.median_width = median_width;
    }
    if args.no_smoothing {
        config.preprocessing.smoothing = None;
    }
    if args.no_clipping {
        config.preprocessing.clipping = None;
    }
    if args.legacy_smoothing {
        if let Some(smoothing) = config.preprocessing.smoothing.as_mut() {
            smoothing.mode = SmoothingMode::InPlace;
        }
    }

    Ok(config)
}

fn write_features(path: &Path, features: &[FrameFeatures<f32>], frame_period: f64) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "time\tzcr\tr1norm\trmaxnorm\tpower_db\tlag\tf0")?;
    for (i, f) in features.iter().enumerate() {
        writeln!(
            out,
            "{:.3}\t{:.2}\t{:.2}\t{:.2}\t{:.1}\t{}\t{}",
            i as f64 * frame_period,
            f.zcr,
            f.r1norm,
            f.rmaxnorm,
            f.power_db,
            f.lag,
            f.f0()
        )?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let signal: Signal<f32> = Signal::from_wav(&args.input_wav)
        .with_context(|| format!("read input file {}", args.input_wav.display()))?;
    log::info!(
        "{}: {:.2} s at {} Hz",
        args.input_wav.display(),
        signal.duration(),
        signal.sample_rate
    );

    let config = load_config(&args)?;
    let pipeline = PitchPipeline::new(signal.sample_rate, &config)?;
    let contour = pipeline.run(&signal.data);

    if let Some(path) = &args.features {
        let prepared = pipeline.preprocess(&signal.data);
        write_features(path, &pipeline.frame_features(&prepared), contour.frame_period())?;
    }

    let file = File::create(&args.output_txt)
        .with_context(|| format!("create output file {}", args.output_txt.display()))?;
    contour
        .write_to(BufWriter::new(file))
        .with_context(|| format!("write {}", args.output_txt.display()))?;

    log::info!(
        "{} frames, {} voiced",
        contour.len(),
        contour.voiced_count()
    );
    Ok(())
}
