//! HD 钱包
//!
//! 持有主扩展私钥与当前币种配置，组合 KeyFactory / AddressCodec / FeeEstimator
//! 提供地址生成、地址搜索、签名与加解密。

use bitcoin::secp256k1::PublicKey;
use parking_lot::RwLock;
use zeroize::Zeroizing;

use crate::domain::coin_profile::CoinProfile;
use crate::domain::derivation_path::{AddressChain, DerivationPath};
use crate::domain::key_factory::{ExtendedKey, KeyFactory};
use crate::domain::mnemonic;
use crate::domain::wallet_records::{ImportedPrivateKey, MetaAddress};
use crate::error::{WalletError, WalletResult};
use crate::infrastructure::cipher;
use crate::service::fee_estimator::FeeEstimator;
use crate::utils::address_codec::AddressCodec;

/// HD 钱包
///
/// 币种配置通过读写锁整体替换：并发派生看到的要么是旧配置，要么是新配置，
/// 不会看到半更新的字段。每个操作开始时取一份配置快照。
pub struct HdWallet {
    profile: RwLock<CoinProfile>,
    words: Zeroizing<String>,
    master: ExtendedKey,
}

impl HdWallet {
    /// 从助记词创建钱包（种子 = PBKDF2(助记词, 空口令)）
    pub fn from_seed_phrase(words: &str, profile: CoinProfile) -> WalletResult<Self> {
        let seed = mnemonic::seed_from_words(words).map_err(|e| {
            tracing::warn!(error_code = e.code(), "Rejected seed phrase");
            e
        })?;
        let master = ExtendedKey::from_seed(&seed[..], profile.network())?;

        tracing::info!(
            purpose = profile.purpose().value(),
            coin_type = profile.coin_type(),
            account = profile.account(),
            network = ?profile.network(),
            "HD wallet initialized"
        );

        Ok(Self {
            profile: RwLock::new(profile),
            words: Zeroizing::new(words.to_string()),
            master,
        })
    }

    /// 助记词原文（调用方负责安全存储）
    pub fn words(&self) -> &str {
        &self.words
    }

    /// 当前币种配置快照
    pub fn coin_profile(&self) -> CoinProfile {
        *self.profile.read()
    }

    /// 整体替换币种配置
    ///
    /// 之后的派生使用新配置；已返回的 `MetaAddress` 不受影响。
    pub fn update_coin_profile(&self, profile: CoinProfile) {
        let mut guard = self.profile.write();
        let previous = *guard;
        *guard = profile;
        drop(guard);

        tracing::info!(
            from_purpose = previous.purpose().value(),
            to_purpose = profile.purpose().value(),
            coin_type = profile.coin_type(),
            account = profile.account(),
            "Coin profile updated"
        );
    }

    pub fn receive_address(&self, index: u32) -> WalletResult<MetaAddress> {
        let profile = self.coin_profile();
        self.meta_address(&profile, AddressChain::Receive, index)
    }

    pub fn change_address(&self, index: u32) -> WalletResult<MetaAddress> {
        let profile = self.coin_profile();
        self.meta_address(&profile, AddressChain::Change, index)
    }

    /// 在 `0..search_limit` 范围内查找地址
    ///
    /// 每个索引先查收款链再查找零链；开销为 O(search_limit) 次派生，
    /// 调用方应把上限控制在合理的 gap limit 内。
    pub fn find_address(&self, target: &str, search_limit: u32) -> WalletResult<MetaAddress> {
        let profile = self.coin_profile();

        for index in 0..search_limit {
            for chain in [AddressChain::Receive, AddressChain::Change] {
                let candidate = self.meta_address(&profile, chain, index)?;
                if candidate.address() == target {
                    tracing::debug!(
                        index,
                        change = chain.value(),
                        "Address found in wallet"
                    );
                    return Ok(candidate);
                }
            }
        }

        tracing::debug!(search_limit, "Address not found in wallet");
        Err(WalletError::NotFound(target.to_string()))
    }

    /// 用签名密钥 (m/42) 对消息签名，DER 编码
    pub fn sign(&self, message: &[u8]) -> WalletResult<Vec<u8>> {
        KeyFactory::new(&self.master).sign(message)
    }

    pub fn sign_hex(&self, message: &[u8]) -> WalletResult<String> {
        self.sign(message).map(hex::encode)
    }

    /// 签名私钥（32 字节）
    pub fn signing_key_bytes(&self) -> WalletResult<Zeroizing<[u8; 32]>> {
        let key = KeyFactory::new(&self.master).signing_key()?;
        Ok(key.secret_bytes())
    }

    /// 签名公钥（压缩）
    pub fn signing_public_key(&self) -> WalletResult<PublicKey> {
        Ok(KeyFactory::new(&self.master).signing_key()?.public_key())
    }

    /// 供对方验证签名的公钥 (hex, 33 字节压缩)
    pub fn verification_key_hex(&self) -> WalletResult<String> {
        Ok(hex::encode(self.signing_public_key()?.serialize()))
    }

    /// 使用一次性钱包加密
    ///
    /// 以 `entropy` 生成临时助记词并派生临时主私钥作为 ECDH 本地密钥，
    /// 与本钱包任何地址都无关联。
    pub fn encrypt_ephemeral(
        body: &[u8],
        entropy: &[u8],
        recipient_public_key_hex: &str,
    ) -> WalletResult<Vec<u8>> {
        let recipient = cipher::parse_public_key_hex(recipient_public_key_hex)?;
        let words = mnemonic::words_from_entropy(entropy)?;
        let seed = mnemonic::seed_from_words(&words)?;
        let ephemeral = ExtendedKey::from_seed(&seed[..], CoinProfile::IMPORT_DEFAULT.network())?;

        cipher::encrypt(body, ephemeral.secret_key(), &recipient).map_err(|e| {
            tracing::warn!(error_code = e.code(), "Ephemeral encryption failed");
            e
        })
    }

    /// 使用签名密钥加密给接收方
    pub fn encrypt_default(&self, body: &[u8], recipient_public_key_hex: &str) -> WalletResult<Vec<u8>> {
        let recipient = cipher::parse_public_key_hex(recipient_public_key_hex)?;
        let key = KeyFactory::new(&self.master).signing_key()?;
        cipher::encrypt(body, key.secret_key(), &recipient)
    }

    /// 使用签名密钥解密，发送方公钥取自载荷后缀
    pub fn decrypt_default(&self, payload: &[u8]) -> WalletResult<Vec<u8>> {
        let key = KeyFactory::new(&self.master).signing_key()?;
        cipher::decrypt(payload, key.secret_key()).map_err(|e| {
            tracing::warn!(error_code = e.code(), "Default-key decryption failed");
            e
        })
    }

    /// 使用指定派生路径的私钥解密
    pub fn decrypt_with_path(&self, payload: &[u8], path: &DerivationPath) -> WalletResult<Vec<u8>> {
        let key = KeyFactory::new(&self.master).derive(path)?;
        cipher::decrypt(payload, key.secret_key()).map_err(|e| {
            tracing::warn!(error_code = e.code(), path = %path, "Path-key decryption failed");
            e
        })
    }

    /// 导入独立私钥 (WIF)
    ///
    /// 候选地址总是按 [`CoinProfile::IMPORT_DEFAULT`] 计算，
    /// 与调用方当前激活的配置无关。
    pub fn import_private_key(encoded_key: &str) -> WalletResult<ImportedPrivateKey> {
        Self::import_private_key_with_profile(encoded_key, &CoinProfile::IMPORT_DEFAULT)
    }

    /// 按显式配置导入私钥（例如测试网 WIF）
    pub fn import_private_key_with_profile(
        encoded_key: &str,
        profile: &CoinProfile,
    ) -> WalletResult<ImportedPrivateKey> {
        let imported = ImportedPrivateKey::from_wif(encoded_key, profile).map_err(|e| {
            tracing::warn!(error_code = e.code(), "Private key import rejected");
            e
        })?;
        tracing::info!(
            candidates = imported.possible_addresses().len(),
            "Private key imported"
        );
        Ok(imported)
    }

    /// 绑定当前配置快照的手续费估算器
    pub fn fee_estimator(&self) -> FeeEstimator {
        FeeEstimator::new(self.coin_profile())
    }

    fn meta_address(
        &self,
        profile: &CoinProfile,
        chain: AddressChain,
        index: u32,
    ) -> WalletResult<MetaAddress> {
        let path = DerivationPath::for_profile(profile, chain, index);
        let key = KeyFactory::new(&self.master).derive(&path)?;
        let address = AddressCodec::build_address(&key.pubkey_hash(), profile)?;
        Ok(MetaAddress::new(address, path, *profile, &key.public_key()))
    }
}

impl std::fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdWallet")
            .field("profile", &self.coin_profile())
            .finish_non_exhaustive()
    }
}
