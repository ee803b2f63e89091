//! hdwallet-core 主入口
//! 从助记词派生地址并以 JSON 输出

use anyhow::{Context, Result};
use hdwallet_core::{config::Config, infrastructure::logging, HdWallet, MetaAddress};
use serde::Serialize;

const DEFAULT_ADDRESS_COUNT: u32 = 5;

#[derive(Serialize)]
struct WalletReport {
    coin_profile: hdwallet_core::CoinProfile,
    verification_key: String,
    receive: Vec<MetaAddress>,
    change: Vec<MetaAddress>,
}

fn main() -> Result<()> {
    // 1. 加载环境变量
    dotenvy::dotenv().ok();

    // 2. 加载配置（CONFIG_PATH 指向的 TOML 文件优先）
    let config = Config::from_env_and_file(std::env::var("CONFIG_PATH").ok())?;
    config.validate()?;

    // 3. 初始化日志
    logging::init_logging(&config.logging)?;

    let count = address_count()?;
    let words = std::env::var("WALLET_WORDS").context("WALLET_WORDS must be set")?;
    let profile = config.wallet.coin_profile()?;

    let wallet = HdWallet::from_seed_phrase(&words, profile).context("Failed to open wallet")?;

    let report = WalletReport {
        coin_profile: wallet.coin_profile(),
        verification_key: wallet.verification_key_hex()?,
        receive: (0..count)
            .map(|index| wallet.receive_address(index))
            .collect::<Result<_, _>>()?,
        change: (0..count)
            .map(|index| wallet.change_address(index))
            .collect::<Result<_, _>>()?,
    };

    tracing::info!(count, "Derived wallet addresses");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// `--count N` 优先，其次 ADDRESS_COUNT 环境变量
fn address_count() -> Result<u32> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--count" {
            let value = args.next().context("--count requires a value")?;
            return value
                .parse()
                .with_context(|| format!("Invalid --count value: {}", value));
        }
    }

    match std::env::var("ADDRESS_COUNT") {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Invalid ADDRESS_COUNT: {}", value)),
        Err(_) => Ok(DEFAULT_ADDRESS_COUNT),
    }
}
