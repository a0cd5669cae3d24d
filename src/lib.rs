pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{
    catalog::VacancyCatalog, currency::CurrencyTable, etl::EtlEngine, pipeline::ReportPipeline,
};
pub use utils::error::{Result, StatsError};
