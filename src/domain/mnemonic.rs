//! BIP39 助记词工具
//!
//! 助记词的生成与校验交给 `bip39` crate，这里只做参数约束和错误映射

use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{WalletError, WalletResult};

/// 解析并校验助记词（英文词表，校验和必须正确）
pub fn parse_words(words: &str) -> WalletResult<Mnemonic> {
    Mnemonic::parse_in(Language::English, words)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}

/// 助记词 -> 64 字节种子（空口令）
pub fn seed_from_words(words: &str) -> WalletResult<Zeroizing<[u8; 64]>> {
    let mnemonic = parse_words(words)?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}

/// 完整的英文词表，空格分隔
pub fn full_word_list() -> String {
    Language::English.word_list().join(" ")
}

/// 由调用方提供的熵生成助记词
///
/// 熵长度必须是 16..=32 字节且为 4 的倍数。
pub fn words_from_entropy(entropy: &[u8]) -> WalletResult<Zeroizing<String>> {
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// 随机生成新助记词
pub fn generate_words(word_count: usize) -> WalletResult<Zeroizing<String>> {
    let entropy_bytes = match word_count {
        12 => 16, // 128 bits
        15 => 20,
        18 => 24,
        21 => 28,
        24 => 32, // 256 bits
        other => {
            return Err(WalletError::InvalidMnemonic(format!(
                "invalid word count {}, must be 12, 15, 18, 21 or 24",
                other
            )))
        }
    };

    let mut entropy = vec![0u8; entropy_bytes];
    rand::thread_rng().fill_bytes(&mut entropy);
    let words = words_from_entropy(&entropy);
    entropy.zeroize();
    words
}
