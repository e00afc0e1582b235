//! Output formatting for CLI commands

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,
    /// One JSON document per line
    Json,
}

/// Output helper
pub struct Outputter {
    format: OutputFormat,
}

impl Outputter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print `text` in text mode, or `value` as a JSON line
    pub fn emit<T: Serialize>(&self, text: &str, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Text => println!("{}", text),
            OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        }
        Ok(())
    }
}
