//! 日志系统配置模块
//! 支持结构化日志与日志级别配置

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// 初始化日志系统
///
/// `RUST_LOG` 优先于配置中的级别。重复初始化返回错误。
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_filter(config);

    if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(false).with_ansi(true))
            .try_init()?;
    }

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_error_not_panic() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };

        // 第一次可能因其他测试已安装订阅者而失败，第二次一定失败
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn test_filter_from_config_level() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: "text".to_string(),
        };
        let filter = build_filter(&config);
        assert!(!filter.to_string().is_empty());
    }
}
