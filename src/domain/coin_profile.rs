//! 币种配置模块
//!
//! purpose / coin type / account 三元组决定了每一次派生和每一种地址格式

use std::fmt;

use bech32::Hrp;
use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};

/// 派生用途（BIP44 / BIP49 / BIP84）
///
/// 三种用途各自对应一种脚本族；字节开销、版本字节等差异全部集中在
/// [`PurposeTraits`] 表中，新增用途只需要在这里加一行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Purpose {
    /// BIP44: P2PKH (1...)
    Legacy,
    /// BIP49: P2SH-P2WPKH (3...)
    NestedSegwit,
    /// BIP84: 原生隔离见证 P2WPKH (bc1q...)
    NativeSegwit,
}

/// 每种用途的脚本开销（虚拟字节，见证数据按 1/4 计）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurposeTraits {
    /// 花费一个该类型 UTXO 的输入大小
    pub input_vbytes: usize,
    /// 向该类型脚本支付的输出大小
    pub output_vbytes: usize,
    /// 该用途的钱包是否产生找零输出
    pub originates_change: bool,
}

const LEGACY_TRAITS: PurposeTraits = PurposeTraits {
    input_vbytes: 148,
    output_vbytes: 34,
    originates_change: false,
};

const NESTED_SEGWIT_TRAITS: PurposeTraits = PurposeTraits {
    input_vbytes: 91,
    output_vbytes: 32,
    originates_change: true,
};

const NATIVE_SEGWIT_TRAITS: PurposeTraits = PurposeTraits {
    input_vbytes: 68,
    output_vbytes: 31,
    originates_change: true,
};

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::Legacy, Purpose::NestedSegwit, Purpose::NativeSegwit];

    pub fn value(self) -> u32 {
        match self {
            Purpose::Legacy => 44,
            Purpose::NestedSegwit => 49,
            Purpose::NativeSegwit => 84,
        }
    }

    pub fn traits(self) -> PurposeTraits {
        match self {
            Purpose::Legacy => LEGACY_TRAITS,
            Purpose::NestedSegwit => NESTED_SEGWIT_TRAITS,
            Purpose::NativeSegwit => NATIVE_SEGWIT_TRAITS,
        }
    }
}

impl TryFrom<u32> for Purpose {
    type Error = WalletError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            44 => Ok(Purpose::Legacy),
            49 => Ok(Purpose::NestedSegwit),
            84 => Ok(Purpose::NativeSegwit),
            other => Err(WalletError::InvalidPurpose(other)),
        }
    }
}

impl From<Purpose> for u32 {
    fn from(purpose: Purpose) -> Self {
        purpose.value()
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// 比特币网络
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    Mainnet,
    Testnet,
    Regtest,
}

/// 网络参数：地址版本字节与 bech32 前缀
#[derive(Debug, Clone, Copy)]
pub struct NetworkParams {
    pub p2pkh_version: u8,
    pub p2sh_version: u8,
    pub hrp: Hrp,
}

impl BitcoinNetwork {
    pub fn params(self) -> NetworkParams {
        match self {
            BitcoinNetwork::Mainnet => NetworkParams {
                p2pkh_version: 0x00,
                p2sh_version: 0x05,
                hrp: bech32::hrp::BC,
            },
            BitcoinNetwork::Testnet => NetworkParams {
                p2pkh_version: 0x6f,
                p2sh_version: 0xc4,
                hrp: bech32::hrp::TB,
            },
            BitcoinNetwork::Regtest => NetworkParams {
                p2pkh_version: 0x6f,
                p2sh_version: 0xc4,
                hrp: bech32::hrp::BCRT,
            },
        }
    }

    /// 对应 `bitcoin` crate 的网络（用于主密钥派生）
    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            BitcoinNetwork::Mainnet => bitcoin::Network::Bitcoin,
            BitcoinNetwork::Testnet => bitcoin::Network::Testnet,
            BitcoinNetwork::Regtest => bitcoin::Network::Regtest,
        }
    }

    /// 由 SLIP-44 coin type 推导网络：0 为主网，其余为测试网
    pub fn from_coin_type(coin_type: u32) -> Self {
        if coin_type == 0 {
            BitcoinNetwork::Mainnet
        } else {
            BitcoinNetwork::Testnet
        }
    }
}

impl std::str::FromStr for BitcoinNetwork {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "bitcoin" | "main" => Ok(BitcoinNetwork::Mainnet),
            "testnet" | "test" | "testnet3" => Ok(BitcoinNetwork::Testnet),
            "regtest" => Ok(BitcoinNetwork::Regtest),
            other => Err(WalletError::InvalidEncoding(format!(
                "unknown network: {}",
                other
            ))),
        }
    }
}

/// 币种配置
///
/// 构造后不可变。钱包切换配置时整体替换，不做字段级修改，
/// 因此进行中的派生总是看到一份完整的配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoinProfile {
    purpose: Purpose,
    coin_type: u32,
    account: u32,
    network: BitcoinNetwork,
}

impl CoinProfile {
    /// 私钥导入时固定使用的配置：BIP84 / 主网 / account 0
    ///
    /// 导入地址的计算与调用方当前激活的配置无关。
    pub const IMPORT_DEFAULT: CoinProfile = CoinProfile {
        purpose: Purpose::NativeSegwit,
        coin_type: 0,
        account: 0,
        network: BitcoinNetwork::Mainnet,
    };

    /// 创建配置，purpose 必须是 44 / 49 / 84
    pub fn new(purpose: u32, coin_type: u32, account: u32) -> WalletResult<Self> {
        let purpose = Purpose::try_from(purpose)?;
        Ok(Self::from_purpose(purpose, coin_type, account))
    }

    pub fn from_purpose(purpose: Purpose, coin_type: u32, account: u32) -> Self {
        Self {
            purpose,
            coin_type,
            account,
            network: BitcoinNetwork::from_coin_type(coin_type),
        }
    }

    /// 覆盖由 coin type 推导出的网络（例如 regtest）
    pub fn with_network(mut self, network: BitcoinNetwork) -> Self {
        self.network = network;
        self
    }

    pub fn purpose(&self) -> Purpose {
        self.purpose
    }

    pub fn coin_type(&self) -> u32 {
        self.coin_type
    }

    pub fn account(&self) -> u32 {
        self.account
    }

    pub fn network(&self) -> BitcoinNetwork {
        self.network
    }

    pub fn network_params(&self) -> NetworkParams {
        self.network.params()
    }
}

impl Default for CoinProfile {
    fn default() -> Self {
        Self::IMPORT_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_purposes() {
        for value in [44, 49, 84] {
            let profile = CoinProfile::new(value, 0, 0).unwrap();
            assert_eq!(profile.purpose().value(), value);
        }
    }

    #[test]
    fn test_invalid_purpose_rejected() {
        for value in [0, 45, 48, 86, 1852] {
            assert_eq!(
                CoinProfile::new(value, 0, 0),
                Err(WalletError::InvalidPurpose(value))
            );
        }
    }

    #[test]
    fn test_network_from_coin_type() {
        assert_eq!(
            CoinProfile::new(84, 0, 0).unwrap().network(),
            BitcoinNetwork::Mainnet
        );
        assert_eq!(
            CoinProfile::new(84, 1, 0).unwrap().network(),
            BitcoinNetwork::Testnet
        );

        let regtest = CoinProfile::new(84, 1, 0)
            .unwrap()
            .with_network(BitcoinNetwork::Regtest);
        assert_eq!(regtest.network_params().hrp.to_lowercase(), "bcrt");
    }

    #[test]
    fn test_purpose_table() {
        // 原生隔离见证的输入输出都比旧格式小
        let legacy = Purpose::Legacy.traits();
        let nested = Purpose::NestedSegwit.traits();
        let native = Purpose::NativeSegwit.traits();

        assert!(native.input_vbytes < nested.input_vbytes);
        assert!(nested.input_vbytes < legacy.input_vbytes);
        assert!(native.output_vbytes < legacy.output_vbytes);
        assert!(!legacy.originates_change);
    }

    #[test]
    fn test_profile_serde_uses_numeric_purpose() {
        let profile = CoinProfile::new(49, 0, 2).unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"purpose\":49"));

        let back: CoinProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);

        let bad = json.replace("\"purpose\":49", "\"purpose\":50");
        assert!(serde_json::from_str::<CoinProfile>(&bad).is_err());
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("mainnet".parse::<BitcoinNetwork>().unwrap(), BitcoinNetwork::Mainnet);
        assert_eq!("REGTEST".parse::<BitcoinNetwork>().unwrap(), BitcoinNetwork::Regtest);
        assert!("litecoin".parse::<BitcoinNetwork>().is_err());
    }
}
