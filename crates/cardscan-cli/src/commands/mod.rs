//! Subcommands and the helpers they share.

pub mod config;
pub mod extract;
pub mod scan;

use std::fs;
use std::path::{Path, PathBuf};

use console::style;
use serde::Serialize;

use cardscan_core::models::config::CardscanConfig;
use cardscan_core::{DetailsTable, ExtractedRecord, ExtractionProfile, MatchPolicy, RecognizedText};

/// Output format for scan results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Key/value table
    Table,
    /// JSON output
    Json,
    /// CSV with a header row of field names
    Csv,
    /// Recognized text, one non-empty line per row
    Raw,
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardscan")
        .join("config.json")
}

/// Load the configuration from an explicit path, the default path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CardscanConfig> {
    if let Some(path) = config_path {
        return Ok(CardscanConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        Ok(CardscanConfig::from_file(&path)?)
    } else {
        Ok(CardscanConfig::default())
    }
}

/// Apply profile and policy flags on top of the configuration.
pub fn apply_extraction_overrides(
    config: &mut CardscanConfig,
    profile: Option<ExtractionProfile>,
    policy: Option<MatchPolicy>,
) {
    if let Some(profile) = profile {
        config.extraction.profile = profile;
    }
    if policy.is_some() {
        config.extraction.policy = policy;
    }
}

/// Render a record (and the text it came from) in the requested format.
pub fn format_record<T: Serialize>(
    record: &ExtractedRecord,
    text: &RecognizedText,
    json_value: &T,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => {
            let table = DetailsTable::from_record(record);
            if table.is_empty() {
                Ok(format!("{}", style("No details found.").yellow()))
            } else {
                Ok(format!(
                    "{}\n{}",
                    style("Scanned Details").bold(),
                    table.to_string().trim_end()
                ))
            }
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(json_value)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(record.iter().map(|(field, _)| field.key()))?;
            writer.write_record(record.iter().map(|(_, value)| value))?;
            let bytes = writer
                .into_inner()
                .map_err(|e| anyhow::anyhow!("csv output: {}", e))?;
            Ok(String::from_utf8(bytes)?.trim_end().to_string())
        }
        OutputFormat::Raw => Ok(DetailsTable::from_text(text).to_string().trim_end().to_string()),
    }
}

/// Write output to a file or stdout.
pub fn emit(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        fs::write(path, output)?;
        eprintln!("{} Output written to {}", style("✓").green(), path.display());
    } else {
        println!("{}", output);
    }
    Ok(())
}
