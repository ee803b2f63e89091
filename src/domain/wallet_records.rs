//! 钱包值记录
//!
//! 这些记录不持有钱包的引用，创建后除 `ImportedPrivateKey::select_address` 外不可修改

use bitcoin::secp256k1::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::coin_profile::{CoinProfile, Purpose};
use crate::domain::derivation_path::DerivationPath;
use crate::domain::key_factory::{hash160_of, SECP};
use crate::error::{WalletError, WalletResult};
use crate::utils::address_codec::AddressCodec;

/// 派生地址记录
///
/// 保存派生时的币种配置快照；配置切换后旧记录依然有效。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaAddress {
    address: String,
    derivation_path: DerivationPath,
    coin_profile: CoinProfile,
    /// 压缩公钥 (hex)
    public_key: String,
}

impl MetaAddress {
    pub(crate) fn new(
        address: String,
        derivation_path: DerivationPath,
        coin_profile: CoinProfile,
        public_key: &PublicKey,
    ) -> Self {
        Self {
            address,
            derivation_path,
            coin_profile,
            public_key: hex::encode(public_key.serialize()),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        &self.derivation_path
    }

    pub fn coin_profile(&self) -> &CoinProfile {
        &self.coin_profile
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }
}

/// 可花费输出（由调用方发现并提供）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub previous_tx_id: String,
    pub output_index: u32,
    /// 金额（聪）
    pub value: u64,
    /// 产生该输出的派生路径，决定输入的字节开销
    pub derivation_path: DerivationPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness_script: Option<Vec<u8>>,
    pub confirmed: bool,
}

impl Utxo {
    pub fn new(
        previous_tx_id: impl Into<String>,
        output_index: u32,
        value: u64,
        derivation_path: DerivationPath,
    ) -> Self {
        Self {
            previous_tx_id: previous_tx_id.into(),
            output_index,
            value,
            derivation_path,
            witness_script: None,
            confirmed: true,
        }
    }

    pub fn purpose(&self) -> Purpose {
        self.derivation_path.purpose
    }
}

/// 导入的独立私钥
///
/// 三个候选地址依次为：旧格式、P2SH 隔离见证、原生隔离见证。
/// 由调用方确认哪个地址有资金后调用一次 `select_address`，
/// 钱包本身从不替调用方做选择。
pub struct ImportedPrivateKey {
    raw_key: SecretKey,
    encoded_key: Zeroizing<String>,
    possible_addresses: [String; 3],
    selected_address: Option<String>,
}

impl ImportedPrivateKey {
    /// 解析 WIF 私钥并按给定配置的币种 / 网络计算候选地址
    pub fn from_wif(encoded_key: &str, profile: &CoinProfile) -> WalletResult<Self> {
        let key = bitcoin::PrivateKey::from_wif(encoded_key)
            .map_err(|e| WalletError::InvalidEncoding(e.to_string()))?;

        // 旧格式地址跟随 WIF 的压缩标记，隔离见证地址只能使用压缩公钥
        let legacy_hash = hash160_of(&key.public_key(&SECP).to_bytes());
        let compressed_hash =
            hash160_of(&PublicKey::from_secret_key(&SECP, &key.inner).serialize());

        let profile_for = |purpose: Purpose| {
            CoinProfile::from_purpose(purpose, profile.coin_type(), profile.account())
                .with_network(profile.network())
        };

        let possible_addresses = [
            AddressCodec::build_address(&legacy_hash, &profile_for(Purpose::Legacy))?,
            AddressCodec::build_address(&compressed_hash, &profile_for(Purpose::NestedSegwit))?,
            AddressCodec::build_address(&compressed_hash, &profile_for(Purpose::NativeSegwit))?,
        ];

        Ok(Self {
            raw_key: key.inner,
            encoded_key: Zeroizing::new(encoded_key.to_string()),
            possible_addresses,
            selected_address: None,
        })
    }

    pub fn possible_addresses(&self) -> &[String; 3] {
        &self.possible_addresses
    }

    pub fn selected_address(&self) -> Option<&str> {
        self.selected_address.as_deref()
    }

    pub fn encoded_key(&self) -> &str {
        &self.encoded_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.raw_key
    }

    /// 确认有资金的候选地址，只能设置一次
    pub fn select_address(&mut self, address: &str) -> WalletResult<()> {
        if self.selected_address.is_some() {
            return Err(WalletError::AddressAlreadySelected);
        }
        if !self.possible_addresses.iter().any(|candidate| candidate == address) {
            return Err(WalletError::AddressNotCandidate(address.to_string()));
        }
        self.selected_address = Some(address.to_string());
        Ok(())
    }
}

impl Drop for ImportedPrivateKey {
    fn drop(&mut self) {
        self.raw_key.non_secure_erase();
    }
}

impl std::fmt::Debug for ImportedPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportedPrivateKey")
            .field("possible_addresses", &self.possible_addresses)
            .field("selected_address", &self.selected_address)
            .finish_non_exhaustive()
    }
}
