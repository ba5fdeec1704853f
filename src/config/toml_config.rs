use crate::core::ConfigProvider;
use crate::domain::model::WEBHOOKS_ADDON_SLUG;
use crate::utils::error::{MigratorError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigratorConfig {
    pub store: StoreConfig,
    pub import: ImportConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    File,
    Rest,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(rename = "type")]
    pub kind: StoreKind,
    pub path: String,
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
    pub headers: HashMap<String, String>,
}

// headers 常帶憑證，只印出名稱
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .keys()
            .map(|name| (name.as_str(), "***"))
            .collect();

        f.debug_struct("StoreConfig")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("headers", &headers)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::File,
            path: "feeds.json".to_string(),
            endpoint: None,
            timeout_seconds: 30,
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// 匯入的 feed 一律啟用；關閉時保留文件內原本的 is_active
    pub activate_on_import: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            activate_on_import: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
    pub pretty: bool,
    pub kind_filter: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            pretty: false,
            kind_filter: WEBHOOKS_ADDON_SLUG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl MigratorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MigratorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MigratorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GF_API_KEY})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MigratorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for MigratorConfig {
    fn validate(&self) -> Result<()> {
        match self.store.kind {
            StoreKind::File => {
                validation::validate_path("store.path", &self.store.path)?;
                validation::validate_file_extension("store.path", &self.store.path, &["json"])?;
            }
            StoreKind::Rest => {
                let endpoint = validation::validate_required_field("store.endpoint", &self.store.endpoint)?;
                validation::validate_url("store.endpoint", endpoint)?;
            }
        }

        validation::validate_range("store.timeout_seconds", self.store.timeout_seconds, 1, 300)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;
        validation::validate_non_empty_string("export.kind_filter", &self.export.kind_filter)?;

        Ok(())
    }
}

impl ConfigProvider for MigratorConfig {
    fn activate_on_import(&self) -> bool {
        self.import.activate_on_import
    }

    fn kind_filter(&self) -> &str {
        &self.export.kind_filter
    }

    fn pretty_export(&self) -> bool {
        self.export.pretty
    }
}
