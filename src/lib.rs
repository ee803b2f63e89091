//! hdwallet-core - 比特币 HD 钱包核心
//!
//! 助记词派生、地址编解码、交易大小预估、签名与加解密。
//! 纯计算，无 I/O；种子与配置由调用方持久化。

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use domain::{CoinProfile, HdWallet, MetaAddress};
pub use error::{WalletError, WalletResult};

pub mod prelude {
    pub use crate::{
        domain::{
            AddressChain, BitcoinNetwork, CoinProfile, DerivationPath, HdWallet,
            ImportedPrivateKey, MetaAddress, Purpose, Utxo,
        },
        error::{WalletError, WalletResult},
        service::FeeEstimator,
        utils::{AddressCodec, AddressKind},
    };
}
