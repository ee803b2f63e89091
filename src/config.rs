//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::coin_profile::{BitcoinNetwork, CoinProfile};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 钱包配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// 44 / 49 / 84
    pub purpose: u32,
    pub coin_type: u32,
    pub account: u32,
    /// 不设置时由 coin_type 推导
    pub network: Option<BitcoinNetwork>,
    /// 地址搜索上限
    pub gap_limit: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "json" 或 "text"
    pub format: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            purpose: env_parse("WALLET_PURPOSE").unwrap_or(84),
            coin_type: env_parse("WALLET_COIN_TYPE").unwrap_or(0),
            account: env_parse("WALLET_ACCOUNT").unwrap_or(0),
            network: env_parse("WALLET_NETWORK"),
            gap_limit: env_parse("WALLET_GAP_LIMIT").unwrap_or(1000),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl WalletConfig {
    /// 构建经过校验的币种配置
    pub fn coin_profile(&self) -> Result<CoinProfile> {
        let profile = CoinProfile::new(self.purpose, self.coin_type, self.account)
            .context("Invalid wallet purpose in configuration")?;
        Ok(match self.network {
            Some(network) => profile.with_network(network),
            None => profile,
        })
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            wallet: WalletConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                // 文件中缺失的段落回落到环境变量默认值
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.wallet.coin_profile()?;

        if self.wallet.gap_limit == 0 {
            anyhow::bail!("WALLET_GAP_LIMIT must be greater than 0");
        }

        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::domain::coin_profile::Purpose;

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[wallet]
purpose = 49
coin_type = 1
account = 2
network = "regtest"
gap_limit = 50

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.wallet.gap_limit, 50);
        assert_eq!(config.logging.format, "json");
        config.validate().unwrap();

        let profile = config.wallet.coin_profile().unwrap();
        assert_eq!(profile.purpose(), Purpose::NestedSegwit);
        assert_eq!(profile.account(), 2);
        assert_eq!(profile.network(), BitcoinNetwork::Regtest);
    }

    #[test]
    fn test_missing_file_falls_back_to_env() {
        let config =
            Config::from_env_and_file(Some("/nonexistent/hdwallet-config.toml")).unwrap();
        assert!(!config.logging.level.is_empty());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[wallet\npurpose = ").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config {
            wallet: WalletConfig {
                purpose: 84,
                coin_type: 0,
                account: 0,
                network: None,
                gap_limit: 1000,
            },
            logging: LoggingConfig {
                level: "info".into(),
                format: "text".into(),
            },
        };
        assert!(config.validate().is_ok());

        config.wallet.purpose = 86;
        assert!(config.validate().is_err());

        config.wallet.purpose = 84;
        config.wallet.gap_limit = 0;
        assert!(config.validate().is_err());

        config.wallet.gap_limit = 20;
        config.logging.format = "yaml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_network_derived_from_coin_type() {
        let wallet = WalletConfig {
            purpose: 84,
            coin_type: 1,
            account: 0,
            network: None,
            gap_limit: 20,
        };
        assert_eq!(
            wallet.coin_profile().unwrap().network(),
            BitcoinNetwork::Testnet
        );
    }
}
