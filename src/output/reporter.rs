use super::*;
use crate::config::OutputConfig;
use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use super::html::HtmlGenerator;

pub struct Reporter {
    format: OutputFormat,
    output_path: String,
}

impl Reporter {
    pub fn new(config: &OutputConfig) -> Self {
        let format = OutputFormat::from(config.format.as_str());
        let output_path = super::add_file_extension(&config.path, &format);

        Self {
            format,
            output_path,
        }
    }

    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub async fn generate_report(&mut self, report: &Report) -> Result<()> {
        let content = match self.format {
            OutputFormat::Html => {
                let mut generator = HtmlGenerator::new()?;
                generator.generate(report).await?
            }
            OutputFormat::Json => serde_json::to_string_pretty(report)?,
        };

        fs::write(&self.output_path, content)
            .with_context(|| format!("Failed to write report to {}", self.output_path))?;
        info!("Report saved to {}", self.output_path);
        Ok(())
    }
}
