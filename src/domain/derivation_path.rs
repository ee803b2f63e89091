//! BIP44 派生路径
//!
//! `purpose' / coin' / account' / change / index` 结构化路径值。
//! 字符串形式（`m/84'/0'/0'/0/0`）仅用于展示与解析。

use std::fmt;
use std::str::FromStr;

use bitcoin::bip32::{self, ChildNumber};
use serde::{Deserialize, Serialize};

use crate::domain::coin_profile::{CoinProfile, Purpose};
use crate::error::{WalletError, WalletResult};

/// 硬化派生偏移量 (2^31)
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// 地址链：0 = 收款（外部），1 = 找零（内部）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AddressChain {
    Receive,
    Change,
}

impl AddressChain {
    pub fn value(self) -> u32 {
        match self {
            AddressChain::Receive => 0,
            AddressChain::Change => 1,
        }
    }
}

impl TryFrom<u32> for AddressChain {
    type Error = WalletError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AddressChain::Receive),
            1 => Ok(AddressChain::Change),
            other => Err(WalletError::InvalidChangeChain(other)),
        }
    }
}

impl From<AddressChain> for u32 {
    fn from(chain: AddressChain) -> Self {
        chain.value()
    }
}

/// 派生路径（纯值类型，字段相等即相等）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath {
    pub purpose: Purpose,
    pub coin: u32,
    pub account: u32,
    pub change: AddressChain,
    pub index: u32,
}

impl DerivationPath {
    /// 构建派生路径
    ///
    /// # Arguments
    /// * `purpose` - 44 / 49 / 84
    /// * `coin` - SLIP-44 coin type
    /// * `account` - 账户索引
    /// * `change` - 找零索引（0=外部地址，1=找零地址）
    /// * `index` - 地址索引
    pub fn new(purpose: u32, coin: u32, account: u32, change: u32, index: u32) -> WalletResult<Self> {
        Ok(Self {
            purpose: Purpose::try_from(purpose)?,
            coin,
            account,
            change: AddressChain::try_from(change)?,
            index,
        })
    }

    /// 按当前币种配置构建某条链上的路径
    pub fn for_profile(profile: &CoinProfile, change: AddressChain, index: u32) -> Self {
        Self {
            purpose: profile.purpose(),
            coin: profile.coin_type(),
            account: profile.account(),
            change,
            index,
        }
    }

    pub fn is_change(&self) -> bool {
        self.change == AddressChain::Change
    }

    /// 转换为 BIP32 子索引序列
    ///
    /// 前三级硬化，change / index 为普通派生；任何一级 ≥ 2^31 都无法表示。
    pub fn to_bip32(&self) -> WalletResult<bip32::DerivationPath> {
        let hardened = |value: u32| {
            ChildNumber::from_hardened_idx(value).map_err(|_| self.out_of_range(value))
        };
        let normal = |value: u32| {
            ChildNumber::from_normal_idx(value).map_err(|_| self.out_of_range(value))
        };

        let children = vec![
            hardened(self.purpose.value())?,
            hardened(self.coin)?,
            hardened(self.account)?,
            normal(self.change.value())?,
            normal(self.index)?,
        ];
        Ok(bip32::DerivationPath::from(children))
    }

    fn out_of_range(&self, value: u32) -> WalletError {
        WalletError::InvalidDerivationPath(format!(
            "component {} of {} exceeds 2^31 - 1",
            value, self
        ))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}/{}",
            self.purpose.value(),
            self.coin,
            self.account,
            self.change.value(),
            self.index
        )
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| WalletError::InvalidDerivationPath(format!("{}: {}", reason, path));

        // 1. 基本格式验证
        let body = path
            .strip_prefix("m/")
            .ok_or_else(|| invalid("path must start with 'm/'"))?;

        // 2. 解析路径组件
        let components: Vec<&str> = body.split('/').collect();
        if components.len() != 5 {
            return Err(invalid("expected 5 components"));
        }

        let mut values = [0u32; 5];
        for (position, component) in components.iter().enumerate() {
            let (digits, is_hardened) = match component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (*component, false),
            };

            // 3. 前三级必须硬化，后两级不得硬化
            if is_hardened != (position < 3) {
                return Err(invalid("only purpose, coin and account are hardened"));
            }

            values[position] = digits
                .parse::<u32>()
                .map_err(|_| invalid("component is not a number"))?;
        }

        Self::new(values[0], values[1], values[2], values[3], values[4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = DerivationPath::new(84, 0, 0, 0, 0).unwrap();
        assert_eq!(path.to_string(), "m/84'/0'/0'/0/0");

        let change = DerivationPath::new(49, 1, 3, 1, 17).unwrap();
        assert_eq!(change.to_string(), "m/49'/1'/3'/1/17");
        assert!(change.is_change());
    }

    #[test]
    fn test_path_parse() {
        let path: DerivationPath = "m/84'/0'/0'/1/5".parse().unwrap();
        assert_eq!(path, DerivationPath::new(84, 0, 0, 1, 5).unwrap());

        let alt: DerivationPath = "m/44h/0h/2h/0/9".parse().unwrap();
        assert_eq!(alt.account, 2);
        assert_eq!(alt.purpose, Purpose::Legacy);

        // 格式错误
        assert!("84'/0'/0'/0/0".parse::<DerivationPath>().is_err());
        assert!("m/84'/0'/0'/0".parse::<DerivationPath>().is_err());
        assert!("m/84/0'/0'/0/0".parse::<DerivationPath>().is_err());
        assert!("m/84'/0'/0'/0'/0".parse::<DerivationPath>().is_err());
        assert!("m/84'/0'/0'/2/0".parse::<DerivationPath>().is_err());
        assert!("m/86'/0'/0'/0/0".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn test_invalid_components() {
        assert_eq!(
            DerivationPath::new(45, 0, 0, 0, 0),
            Err(WalletError::InvalidPurpose(45))
        );
        assert_eq!(
            DerivationPath::new(84, 0, 0, 2, 0),
            Err(WalletError::InvalidChangeChain(2))
        );
    }

    #[test]
    fn test_equal_fields_equal_paths() {
        let profile = CoinProfile::new(84, 0, 0).unwrap();
        let a = DerivationPath::for_profile(&profile, AddressChain::Receive, 7);
        let b = DerivationPath::new(84, 0, 0, 0, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_to_bip32_hardens_first_three() {
        let path = DerivationPath::new(84, 0, 1, 1, 3).unwrap();
        let bip32_path = path.to_bip32().unwrap();
        let children: Vec<ChildNumber> = bip32_path.as_ref().to_vec();

        assert_eq!(children.len(), 5);
        assert!(children[0].is_hardened());
        assert!(children[1].is_hardened());
        assert!(children[2].is_hardened());
        assert!(children[3].is_normal());
        assert!(children[4].is_normal());
        assert_eq!(u32::from(children[0]), 84 + HARDENED_OFFSET);
        assert_eq!(u32::from(children[4]), 3);
    }

    #[test]
    fn test_to_bip32_rejects_out_of_range_index() {
        let path = DerivationPath::new(84, 0, 0, 0, HARDENED_OFFSET).unwrap();
        assert!(matches!(
            path.to_bip32(),
            Err(WalletError::InvalidDerivationPath(_))
        ));
    }
}
