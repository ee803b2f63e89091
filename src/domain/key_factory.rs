//! 密钥派生
//!
//! 从主扩展私钥沿派生路径得到子密钥，以及固定的消息签名密钥 `m/42`

use bitcoin::bip32::{ChainCode, ChildNumber, Xpriv};
use bitcoin::hashes::{hash160, Hash};
use bitcoin::secp256k1::{ecdsa::Signature, All, Message, PublicKey, Secp256k1, SecretKey};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::coin_profile::BitcoinNetwork;
use crate::domain::derivation_path::DerivationPath;
use crate::error::{WalletError, WalletResult};

/// 签名密钥所在的固定子索引（非标准路径，与地址派生树隔离）
pub const SIGNING_KEY_INDEX: u32 = 42;

/// 全局 secp256k1 上下文（创建成本高，只初始化一次）
pub(crate) static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// 扩展私钥
///
/// 不实现 `Clone`：每次派生都显式产生一个新的子密钥对象。
/// 释放时擦除私钥标量。
pub struct ExtendedKey {
    xpriv: Xpriv,
}

impl ExtendedKey {
    /// 由 BIP39 种子生成主扩展私钥
    pub fn from_seed(seed: &[u8], network: BitcoinNetwork) -> WalletResult<Self> {
        let xpriv = Xpriv::new_master(network.to_bitcoin(), seed)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        Ok(Self { xpriv })
    }

    /// 私钥只以借用形式借出，生命周期不超过本对象
    pub fn secret_key(&self) -> &SecretKey {
        &self.xpriv.private_key
    }

    /// 32 字节私钥（调用方持有期间受 Zeroizing 保护）
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.xpriv.private_key.secret_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&SECP, &self.xpriv.private_key)
    }

    /// 压缩公钥的 HASH160
    pub fn pubkey_hash(&self) -> [u8; 20] {
        hash160_of(&self.public_key().serialize())
    }

    fn child(&self, children: &[ChildNumber]) -> WalletResult<Self> {
        let xpriv = self
            .xpriv
            .derive_priv(&SECP, &children)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        Ok(Self { xpriv })
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.xpriv.private_key.non_secure_erase();
        self.xpriv.chain_code = ChainCode::from([0u8; 32]);
    }
}

impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.xpriv.depth)
            .field("child_number", &self.xpriv.child_number)
            .finish_non_exhaustive()
    }
}

/// 密钥工厂：对主密钥的所有派生都经过这里
pub struct KeyFactory<'a> {
    master: &'a ExtendedKey,
}

impl<'a> KeyFactory<'a> {
    pub fn new(master: &'a ExtendedKey) -> Self {
        Self { master }
    }

    /// 沿 `purpose'/coin'/account'/change/index` 派生子密钥
    ///
    /// 确定性：相同输入总是得到相同的密钥。失败不重试。
    pub fn derive(&self, path: &DerivationPath) -> WalletResult<ExtendedKey> {
        let bip32_path = path.to_bip32()?;
        self.master.child(bip32_path.as_ref())
    }

    /// 消息签名 / 加密专用密钥 `m/42`
    pub fn signing_key(&self) -> WalletResult<ExtendedKey> {
        let child = ChildNumber::from_normal_idx(SIGNING_KEY_INDEX)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        self.master.child(&[child])
    }

    /// 用签名密钥对 SHA-256(message) 做 ECDSA 签名，返回 DER 编码
    ///
    /// RFC6979 确定性随机数：相同消息重复签名得到相同结果。
    pub fn sign(&self, message: &[u8]) -> WalletResult<Vec<u8>> {
        let key = self.signing_key()?;
        let digest = message_digest(message);
        let signature = SECP.sign_ecdsa(&digest, &key.xpriv.private_key);
        Ok(signature.serialize_der().to_vec())
    }
}

/// 验证 `KeyFactory::sign` 产生的签名
pub fn verify_signature(message: &[u8], der_signature: &[u8], public_key: &PublicKey) -> bool {
    let signature = match Signature::from_der(der_signature) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    SECP.verify_ecdsa(&message_digest(message), &signature, public_key)
        .is_ok()
}

/// HASH160 = RIPEMD160(SHA256(data))
pub fn hash160_of(data: &[u8]) -> [u8; 20] {
    hash160::Hash::hash(data).to_byte_array()
}

fn message_digest(message: &[u8]) -> Message {
    let hash: [u8; 32] = Sha256::digest(message).into();
    Message::from_digest(hash)
}
