//! Domain 模块
//!
//! 币种配置、派生路径、密钥派生与钱包门面

pub mod coin_profile;
pub mod derivation_path;
pub mod hd_wallet;
pub mod key_factory;
pub mod mnemonic;
pub mod wallet_records;

// 重新导出常用类型
pub use coin_profile::{BitcoinNetwork, CoinProfile, NetworkParams, Purpose, PurposeTraits};
pub use derivation_path::{AddressChain, DerivationPath, HARDENED_OFFSET};
pub use hd_wallet::HdWallet;
pub use key_factory::{verify_signature, ExtendedKey, KeyFactory, SIGNING_KEY_INDEX};
pub use mnemonic::{full_word_list, generate_words, words_from_entropy};
pub use wallet_records::{ImportedPrivateKey, MetaAddress, Utxo};
