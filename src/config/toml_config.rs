use crate::core::invoker::{DEFAULT_BACKOFF_BASE_MS, DEFAULT_MAX_RETRIES};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, WeaverError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image-preview:generateContent";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeaverConfig {
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetrySection {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

impl WeaverConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WeaverError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WeaverError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 配置裡沒給 api key 時，改用環境變數
    pub fn fill_api_key_from_env(&mut self) {
        if self.generation.api_key.is_none() {
            if let Ok(key) = std::env::var(API_KEY_ENV_VAR) {
                self.generation.api_key = Some(key);
            }
        }
    }

    /// 載入 + 套用 CLI 覆寫 + 環境變數補位 + 驗證，一次完成
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &crate::config::CliConfig) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(endpoint) = &cli.endpoint {
            config.generation.endpoint = endpoint.clone();
        }
        if let Some(api_key) = &cli.api_key {
            config.generation.api_key = Some(api_key.clone());
        }
        if let Some(output_path) = &cli.output_path {
            config.output.path = output_path.clone();
        }
        if let Some(max_retries) = cli.max_retries {
            config.retry.max_retries = Some(max_retries);
        }

        config.fill_api_key_from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("generation.endpoint", &self.generation.endpoint)?;

        let api_key = validate_required_field("generation.api_key", &self.generation.api_key)?;
        validate_non_empty_string("generation.api_key", api_key)?;
        // 環境變數沒設定時，替換會留下原樣的 ${...} 佔位字
        if api_key.starts_with("${") {
            return Err(WeaverError::InvalidConfigValueError {
                field: "generation.api_key".to_string(),
                value: api_key.clone(),
                reason: "environment variable was not substituted".to_string(),
            });
        }

        validate_path("output.path", &self.output.path)?;
        validate_range("retry.max_retries", self.max_retries(), 0u32, 10)?;
        validate_range("retry.base_delay_ms", self.backoff_base_ms(), 1u64, 60_000)?;

        Ok(())
    }
}

impl ConfigProvider for WeaverConfig {
    fn api_endpoint(&self) -> &str {
        &self.generation.endpoint
    }

    fn api_key(&self) -> &str {
        self.generation.api_key.as_deref().unwrap_or("")
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn max_retries(&self) -> u32 {
        self.retry.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    fn backoff_base_ms(&self) -> u64 {
        self.retry.base_delay_ms.unwrap_or(DEFAULT_BACKOFF_BASE_MS)
    }

    fn request_timeout_secs(&self) -> Option<u64> {
        self.generation.timeout_seconds
    }
}

impl Validate for WeaverConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
