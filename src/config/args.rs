use crate::core::ConfigProvider;
use crate::core::pipeline::OUTPUT_FORMATS;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "vacancy-stats")]
#[command(about = "Salary and vacancy statistics from a CSV export of job vacancies")]
pub struct CliConfig {
    /// CSV file with vacancies
    #[arg(short, long, default_value = "vacancies.csv")]
    pub file: String,

    /// Profession substring (case-sensitive) for the profession-scoped statistics
    #[arg(short, long, default_value = "Программист")]
    pub profession: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json,txt,csv")]
    pub formats: Vec<String>,

    /// Number of cities in each ranking
    #[arg(long, default_value = "10")]
    pub top: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        &self.file
    }

    fn profession(&self) -> &str {
        &self.profession
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn top_n(&self) -> usize {
        self.top
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("file", &self.file)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_formats("formats", &self.formats, &OUTPUT_FORMATS)?;
        validation::validate_positive_number("top", self.top, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["vacancy-stats"]);
        assert_eq!(config.file, "vacancies.csv");
        assert_eq!(config.top, 10);
        assert_eq!(config.formats, vec!["json", "txt", "csv"]);
        assert!(!config.json_logs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let config =
            CliConfig::parse_from(["vacancy-stats", "--file", "data.csv", "--formats", "json,xlsx"]);
        assert_eq!(config.input_file(), "data.csv");
        assert!(config.validate().is_err());
    }
}
