use crate::core::pipeline::OUTPUT_FORMATS;
use crate::core::ranking::DEFAULT_TOP_N;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, StatsError};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_ARCHIVE_NAME: &str = "statistics.zip";
const MAX_TOP_N: usize = 100;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportSection,
    pub input: InputSection,
    pub output: OutputSection,
    pub ranking: Option<RankingSection>,
    pub catalog: Option<CatalogSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSection {
    pub file: String,
    pub profession: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
    pub formats: Vec<String>,
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSection {
    pub top: Option<usize>,
}

/// 職缺表格的預設篩選與排序
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub descending: Option<bool>,
    pub rows: Option<String>,
}

impl CatalogSection {
    /// 篩選條件格式為 "名稱: 值"
    pub fn filter_parts(&self) -> Option<(&str, &str)> {
        let filter = self.filter.as_deref()?;
        let (name, value) = filter.split_once(':')?;
        Some((name.trim(), value.trim()))
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| StatsError::ConfigError {
                message: format!("Cannot read '{}': {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StatsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("report.name", &self.report.name)?;
        validation::validate_path("input.file", &self.input.file)?;
        validation::validate_non_empty_string("input.profession", &self.input.profession)?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_formats("output.formats", &self.output.formats, &OUTPUT_FORMATS)?;

        if let Some(archive_name) = &self.output.archive_name {
            if !archive_name.ends_with(".zip") {
                return Err(StatsError::InvalidConfigValueError {
                    field: "output.archive_name".to_string(),
                    value: archive_name.clone(),
                    reason: "Archive name must end with .zip".to_string(),
                });
            }
        }

        if let Some(top) = self.ranking.as_ref().and_then(|r| r.top) {
            validation::validate_range("ranking.top", top, 1, MAX_TOP_N)?;
        }

        if let Some(catalog) = &self.catalog {
            if catalog.filter.is_some() && catalog.filter_parts().is_none() {
                return Err(StatsError::InvalidConfigValueError {
                    field: "catalog.filter".to_string(),
                    value: catalog.filter.clone().unwrap_or_default(),
                    reason: "Expected \"<criterion>: <value>\"".to_string(),
                });
            }

            // 只給排序方向而沒有排序欄位
            if catalog.descending.is_some() {
                validation::validate_required_field("catalog.sort", &catalog.sort)?;
            }
        }

        Ok(())
    }

    pub fn catalog(&self) -> CatalogSection {
        self.catalog.clone().unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn input_file(&self) -> &str {
        &self.input.file
    }

    fn profession(&self) -> &str {
        &self.input.profession
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn top_n(&self) -> usize {
        self.ranking
            .as_ref()
            .and_then(|r| r.top)
            .unwrap_or(DEFAULT_TOP_N)
    }

    fn archive_name(&self) -> &str {
        self.output
            .archive_name
            .as_deref()
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
