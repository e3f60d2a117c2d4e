use crate::core::browser::BrowserSettings;
use crate::core::pdf::PdfLayoutOptions;
use crate::domain::model::{Markups, OutputFormat};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EstimateError, Result};
use crate::utils::validation::{
    validate_catalog_source, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const VALID_FORMATS: [&str; 3] = ["csv", "pdf", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub markups: Markups,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 本機 CSV 路徑或 http(s) 網址
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
    pub file_stem: String,
    pub zip: bool,
    pub watermark: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            formats: vec!["csv".to_string(), "pdf".to_string()],
            file_stem: "estimate".to_string(),
            zip: false,
            watermark: None,
        }
    }
}

impl EstimateConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EstimateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EstimateError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_URL})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EstimateError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(source) = &self.catalog.source {
            validate_catalog_source("catalog.source", source)?;
        }

        validate_positive_number("browser.page_size", self.browser.page_size, 1)?;
        validate_positive_number("browser.window_size", self.browser.window_size, 1)?;

        validate_range("markups.gst_rate", self.markups.gst_rate, 0.0, 1.0)?;
        validate_range(
            "markups.contingency_rate",
            self.markups.contingency_rate,
            0.0,
            1.0,
        )?;

        validate_path("output.path", &self.output.path)?;
        validate_non_empty_string("output.file_stem", &self.output.file_stem)?;

        if self.output.formats.is_empty() {
            return Err(EstimateError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: String::new(),
                reason: "At least one output format is required".to_string(),
            });
        }
        for format in &self.output.formats {
            if OutputFormat::from_name(format).is_none() {
                return Err(EstimateError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        VALID_FORMATS.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn catalog_source(&self) -> Option<&str> {
        self.catalog.source.as_deref()
    }
}

impl ConfigProvider for EstimateConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        let mut formats = Vec::new();
        for format in self.output.formats.iter().filter_map(|f| OutputFormat::from_name(f)) {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    fn file_stem(&self) -> &str {
        &self.output.file_stem
    }

    fn zip_output(&self) -> bool {
        self.output.zip
    }

    fn markups(&self) -> Markups {
        self.markups
    }

    fn pdf_options(&self) -> PdfLayoutOptions {
        PdfLayoutOptions {
            watermark: self.output.watermark.clone(),
            ..PdfLayoutOptions::default()
        }
    }
}

impl Validate for EstimateConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
