use crate::core::export::ExportFormat;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, StudyError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DATA_FILE: &str = "./study-data/experiment_data.json";
pub const DEFAULT_EXPORT_DIR: &str = "./exports";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    pub remote_endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub output_dir: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

fn default_export_dir() -> String {
    DEFAULT_EXPORT_DIR.to_string()
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string(), "csv".to_string(), "summary".to_string()]
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            remote_endpoint: None,
            timeout_seconds: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_export_dir(),
            formats: default_formats(),
        }
    }
}

impl StudyConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StudyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StudyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STUDY_REMOTE_URL})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StudyError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::{
            validate_file_extensions, validate_path, validate_positive_number, validate_url,
        };

        validate_path("storage.data_file", &self.storage.data_file)?;
        validate_file_extensions("storage.data_file", &[self.storage.data_file.as_str()], &["json"])?;

        if let Some(endpoint) = &self.storage.remote_endpoint {
            validate_url("storage.remote_endpoint", endpoint)?;
        }

        if let Some(timeout) = self.storage.timeout_seconds {
            validate_positive_number("storage.timeout_seconds", timeout, 1)?;
        }

        validate_path("export.output_dir", &self.export.output_dir)?;

        for format in &self.export.formats {
            format.parse::<ExportFormat>()?;
        }

        Ok(())
    }
}

impl ConfigProvider for StudyConfig {
    fn data_file(&self) -> &str {
        &self.storage.data_file
    }

    fn remote_endpoint(&self) -> Option<&str> {
        self.storage.remote_endpoint.as_deref()
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.storage.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn export_dir(&self) -> &str {
        &self.export.output_dir
    }

    fn export_formats(&self) -> Vec<ExportFormat> {
        self.export
            .formats
            .iter()
            .filter_map(|format| format.parse().ok())
            .collect()
    }
}

impl Validate for StudyConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[storage]
data_file = "./data/study.json"
remote_endpoint = "https://store.example.com/studies/compressibility"
timeout_seconds = 3

[export]
output_dir = "./out"
formats = ["csv", "bundle"]
"#;

        let config = StudyConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_file(), "./data/study.json");
        assert_eq!(
            config.remote_endpoint(),
            Some("https://store.example.com/studies/compressibility")
        );
        assert_eq!(config.request_timeout_seconds(), 3);
        assert_eq!(config.export_dir(), "./out");
        assert_eq!(config.export_formats(), vec![ExportFormat::Csv, ExportFormat::Bundle]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StudyConfig::from_toml_str("").unwrap();
        assert_eq!(config, StudyConfig::default());
        assert_eq!(config.data_file(), DEFAULT_DATA_FILE);
        assert_eq!(config.remote_endpoint(), None);
        assert_eq!(config.request_timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(
            config.export_formats(),
            vec![ExportFormat::Json, ExportFormat::Csv, ExportFormat::Summary]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STUDY_TEST_REMOTE_URL", "https://remote.test/doc");

        let toml_content = r#"
[storage]
remote_endpoint = "${STUDY_TEST_REMOTE_URL}"
"#;

        let config = StudyConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.remote_endpoint(), Some("https://remote.test/doc"));

        std::env::remove_var("STUDY_TEST_REMOTE_URL");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = StudyConfig::from_toml_str("[storage]\nremote_endpoint = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_format = StudyConfig::from_toml_str("[export]\nformats = [\"xlsx\"]\n").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_file = StudyConfig::from_toml_str("[storage]\ndata_file = \"study.csv\"\n").unwrap();
        assert!(bad_file.validate().is_err());

        let zero_timeout = StudyConfig::from_toml_str("[storage]\ntimeout_seconds = 0\n").unwrap();
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[export]\noutput_dir = \"./reports\"").unwrap();

        let config = StudyConfig::from_file(file.path()).unwrap();
        assert_eq!(config.export_dir(), "./reports");
        assert_eq!(config.data_file(), DEFAULT_DATA_FILE);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            StudyConfig::from_toml_str("[storage"),
            Err(StudyError::ConfigValidationError { .. })
        ));
    }
}
