//! ECDH + AES-256-GCM 加密/解密模块
//!
//! 载荷格式：`nonce(12) || ciphertext+tag || 发送方公钥(65, 非压缩)`

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use bitcoin::secp256k1::{ecdh::SharedSecret, PublicKey, SecretKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::key_factory::SECP;
use crate::error::{WalletError, WalletResult};

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
pub const SENDER_KEY_LEN: usize = 65;

/// 加密数据
///
/// # Arguments
/// * `body` - 明文
/// * `local_key` - 发送方私钥（ECDH 本地密钥）
/// * `recipient` - 接收方公钥
pub fn encrypt(body: &[u8], local_key: &SecretKey, recipient: &PublicKey) -> WalletResult<Vec<u8>> {
    let cipher = cipher_for(local_key, recipient);

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, body)
        .map_err(|e| WalletError::EncryptionFailed(e.to_string()))?;

    let sender = PublicKey::from_secret_key(&SECP, local_key);

    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len() + SENDER_KEY_LEN);
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(&sender.serialize_uncompressed());
    Ok(payload)
}

/// 解密数据，发送方公钥取自载荷末尾 65 字节
pub fn decrypt(payload: &[u8], local_key: &SecretKey) -> WalletResult<Vec<u8>> {
    if payload.len() < NONCE_LEN + TAG_LEN + SENDER_KEY_LEN {
        return Err(WalletError::DecryptionFailed(format!(
            "payload too short: {} bytes",
            payload.len()
        )));
    }

    let (body, sender_bytes) = payload.split_at(payload.len() - SENDER_KEY_LEN);
    let sender = PublicKey::from_slice(sender_bytes)
        .map_err(|e| WalletError::InvalidPublicKey(e.to_string()))?;

    let cipher = cipher_for(local_key, &sender);

    // 提取 nonce（前12字节）
    let nonce = Nonce::from_slice(&body[..NONCE_LEN]);
    cipher
        .decrypt(nonce, &body[NONCE_LEN..])
        .map_err(|e| WalletError::DecryptionFailed(e.to_string()))
}

/// 解析 hex 编码的公钥（压缩 33 字节或非压缩 65 字节）
pub fn parse_public_key_hex(public_key_hex: &str) -> WalletResult<PublicKey> {
    let bytes =
        hex::decode(public_key_hex).map_err(|e| WalletError::InvalidPublicKey(e.to_string()))?;
    PublicKey::from_slice(&bytes).map_err(|e| WalletError::InvalidPublicKey(e.to_string()))
}

/// ECDH 派生的对称密钥（使用Zeroize保护）
#[derive(Zeroize, ZeroizeOnDrop)]
struct SharedKey {
    key: [u8; 32],
}

impl SharedKey {
    /// ECDH 共享密钥（SHA-256 压缩点）直接作为 AES-256 密钥
    fn derive(local_key: &SecretKey, remote: &PublicKey) -> Self {
        Self {
            key: SharedSecret::new(remote, local_key).secret_bytes(),
        }
    }

    fn as_slice(&self) -> &[u8] {
        &self.key
    }
}

fn cipher_for(local_key: &SecretKey, remote: &PublicKey) -> Aes256Gcm {
    let shared = SharedKey::derive(local_key, remote);
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(shared.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SecretKey {
        SecretKey::from_slice(&[byte; 32]).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let alice = key(0x11);
        let bob = key(0x22);
        let bob_public = PublicKey::from_secret_key(&SECP, &bob);

        let payload = encrypt(b"Hello, World!", &alice, &bob_public).unwrap();
        assert_eq!(payload.len(), NONCE_LEN + 13 + TAG_LEN + SENDER_KEY_LEN);

        let decrypted = decrypt(&payload, &bob).unwrap();
        assert_eq!(decrypted, b"Hello, World!");
    }

    #[test]
    fn test_payload_carries_sender_key() {
        let alice = key(0x11);
        let bob_public = PublicKey::from_secret_key(&SECP, &key(0x22));
        let payload = encrypt(b"x", &alice, &bob_public).unwrap();

        let suffix = &payload[payload.len() - SENDER_KEY_LEN..];
        assert_eq!(
            suffix,
            &PublicKey::from_secret_key(&SECP, &alice).serialize_uncompressed()[..]
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let bob_public = PublicKey::from_secret_key(&SECP, &key(0x22));
        let payload = encrypt(b"secret", &key(0x11), &bob_public).unwrap();
        assert!(matches!(
            decrypt(&payload, &key(0x33)),
            Err(WalletError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let bob_public = PublicKey::from_secret_key(&SECP, &key(0x22));
        let mut payload = encrypt(b"secret", &key(0x11), &bob_public).unwrap();
        payload[NONCE_LEN] ^= 0x01;
        assert!(decrypt(&payload, &key(0x22)).is_err());
    }

    #[test]
    fn test_shared_key_symmetric_and_zeroizable() {
        let alice = key(0x11);
        let bob = key(0x22);
        let from_alice = SharedKey::derive(&alice, &PublicKey::from_secret_key(&SECP, &bob));
        let mut from_bob = SharedKey::derive(&bob, &PublicKey::from_secret_key(&SECP, &alice));
        assert_eq!(from_alice.as_slice(), from_bob.as_slice());

        from_bob.zeroize();
        assert!(from_bob.as_slice().iter().all(|byte| *byte == 0));
    }

    #[test]
    fn test_short_payload_rejected() {
        assert!(matches!(
            decrypt(&[0u8; 40], &key(0x22)),
            Err(WalletError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_parse_public_key_hex() {
        let public = PublicKey::from_secret_key(&SECP, &key(0x44));
        let compressed = hex::encode(public.serialize());
        let uncompressed = hex::encode(public.serialize_uncompressed());
        assert_eq!(parse_public_key_hex(&compressed).unwrap(), public);
        assert_eq!(parse_public_key_hex(&uncompressed).unwrap(), public);
        assert!(matches!(
            parse_public_key_hex("zz"),
            Err(WalletError::InvalidPublicKey(_))
        ));
    }
}
