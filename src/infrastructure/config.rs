//! 配置加载与校验

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 服务配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 接口行为配置
    pub api: ApiConfig,
    /// 认证配置
    pub auth: AuthConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
    /// 日志目录，不设置则只输出到控制台
    pub log_dir: Option<PathBuf>,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 是否启用控制台输出
    pub console_output: bool,
}

/// 数据库配置，`url` 为空时使用内存存储
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 列表分页大小，不设置则返回全部记录
    pub page_size: Option<usize>,
    /// 自链接使用的外部地址，例如 `https://api.example.com`
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 为 true 时 `/users/` 需要 `Authorization: Token <key>`
    pub require_token: bool,
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
    /// 允许登录管理后台
    #[serde(default)]
    pub is_staff: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "users-api".to_string(),
            console_output: true,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 20,
            min_connections: 1,
            acquire_timeout_seconds: 8,
        }
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation("HTTP port must be greater than 0".to_string()));
        }
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("bind address must not be empty".to_string()));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid log level: {}, expected one of {:?}",
                self.logging.level, valid_levels
            )));
        }

        if self.api.page_size == Some(0) {
            return Err(ConfigError::Validation("page_size must be greater than 0".to_string()));
        }

        let mut seen = HashSet::new();
        for account in &self.auth.accounts {
            if account.username.is_empty() {
                return Err(ConfigError::Validation("account username must not be empty".to_string()));
            }
            if !seen.insert(account.username.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate account: {}",
                    account.username
                )));
            }
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.database.url.is_none());
        assert!(config.api.page_size.is_none());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[http]
port = 9090

[api]
page_size = 10

[[auth.accounts]]
username = "admin"
password = "secret"
is_staff = true
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.bind_address, "127.0.0.1");
        assert_eq!(config.api.page_size, Some(10));
        assert_eq!(config.auth.accounts.len(), 1);
        assert!(config.auth.accounts[0].is_staff);
        assert!(!config.auth.require_token);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.api.page_size = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        let account = AccountConfig {
            username: "admin".to_string(),
            password: "x".to_string(),
            is_staff: false,
        };
        config.auth.accounts = vec![account.clone(), account];
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load_from_file("/nonexistent/users-api.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }
}
