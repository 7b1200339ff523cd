use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

/// Write `value` as one document in `format`.
pub fn render<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let document = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string(value).context("Failed to serialize JSON")?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to serialize YAML")?,
    };

    out.write_all(document.as_bytes())
        .context("Failed to write output")?;
    out.flush().context("Failed to write output")
}
