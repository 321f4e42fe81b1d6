//! Scan command - capture one frame, recognize it, and extract card fields.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use cardscan_core::{
    CaptureSession, CardscanError, ExtractionProfile, MatchPolicy, PureOcrEngine, Scanner,
    StillImageSource,
};

use super::{OutputFormat, apply_extraction_overrides, emit, format_record, load_config};

#[derive(Args)]
pub struct ScanArgs {
    /// Video source: an image file, or a directory of frames replayed as a feed
    pub source: PathBuf,

    /// Extraction profile (contact-card, code-pair)
    #[arg(short, long)]
    pub profile: Option<ExtractionProfile>,

    /// Which match to keep when a field appears more than once (first, last)
    #[arg(long)]
    pub policy: Option<MatchPolicy>,

    /// Directory containing the OCR model files
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Recognition language code
    #[arg(short, long)]
    pub language: Option<String>,

    /// Recognition timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Binarize the frame before recognition
    #[arg(long)]
    pub binarize: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    apply_extraction_overrides(&mut config, args.profile, args.policy);
    if let Some(model_dir) = args.model_dir {
        config.models.model_dir = model_dir;
    }
    if let Some(language) = args.language {
        config.ocr.language = language;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.ocr.timeout_ms = timeout_ms;
    }
    if args.binarize {
        config.ocr.binarize = true;
    }

    debug!("Scan configuration: {:?}", config);

    let engine = PureOcrEngine::from_config(&config).map_err(|e| {
        anyhow::anyhow!(
            "{}\nPlace the detection model, recognition model, and dictionary in {}",
            e,
            config.models.model_dir.display()
        )
    })?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);

    let progress_bar = pb.clone();
    let options = config.recognize_options().with_progress(move |event| {
        progress_bar.set_message(format!("{} ({:.0}%)", event.status, event.progress * 100.0));
    });

    let session = CaptureSession::new(StillImageSource::new(&args.source))
        .with_constraints(config.stream_constraints());
    let mut scanner = Scanner::from_config(session, Arc::new(engine), &config).with_options(options);

    let stream = scanner.start()?;
    info!("Opened {} ({}x{})", stream.label, stream.width, stream.height);

    pb.set_message("Capturing frame...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let task = scanner.capture()?;
    let result = tokio::select! {
        result = task.wait() => result,
        _ = tokio::signal::ctrl_c() => {
            scanner.cancel();
            Err(CardscanError::Cancelled)
        }
    };
    scanner.stop();
    pb.finish_and_clear();

    let outcome = result?;
    info!(
        "Scan {} finished in {}ms, {} of {} fields filled",
        outcome.generation,
        outcome.processing_time_ms,
        outcome.record.filled(),
        outcome.record.profile.fields().len()
    );

    if outcome.text.is_blank() {
        eprintln!("{} No text recognized", style("ℹ").blue());
    }

    let output = format_record(&outcome.record, &outcome.text, &outcome, args.format)?;
    emit(&output, args.output.as_deref())
}
