//! Extract command - run field extraction over text that was recognized elsewhere.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use cardscan_core::{ExtractionProfile, MatchPolicy, RecognizedText};

use super::{OutputFormat, apply_extraction_overrides, emit, format_record, load_config};

#[derive(Args)]
pub struct ExtractArgs {
    /// Text file to read (default: stdin)
    pub input: Option<PathBuf>,

    /// Extraction profile (contact-card, code-pair)
    #[arg(short, long)]
    pub profile: Option<ExtractionProfile>,

    /// Which match to keep when a field appears more than once (first, last)
    #[arg(long)]
    pub policy: Option<MatchPolicy>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    apply_extraction_overrides(&mut config, args.profile, args.policy);

    let text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let text = RecognizedText::new(text);

    let extractor = config.extractor();
    debug!("Extracting with {} ({})", extractor.profile(), extractor.policy());

    let record = extractor.extract(text.as_str());
    let output = format_record(&record, &text, &record, args.format)?;
    emit(&output, args.output.as_deref())
}
