//! 钱包核心错误类型
//!
//! 所有对外失败都是带类型的结果，UI 层通过 `code()` 选择合适的提示文案

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    // 配置 / 派生
    #[error("Invalid purpose: {0} (must be 44, 49 or 84)")]
    InvalidPurpose(u32),
    #[error("Invalid change chain: {0} (must be 0 or 1)")]
    InvalidChangeChain(u32),
    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),
    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    // 地址校验
    #[error("Address checksum mismatch")]
    InvalidChecksum,
    #[error("Invalid address length: {0}")]
    InvalidLength(usize),
    #[error("Address contains characters outside its encoding alphabet")]
    InvalidCharset,
    #[error("Unknown address version byte: {0:#04x}")]
    InvalidVersionByte(u8),
    #[error("Invalid human-readable prefix: {0}")]
    InvalidHrp(String),
    #[error("Unsupported witness version: {0}")]
    InvalidWitnessVersion(u8),
    #[error("Invalid witness program length: {0}")]
    InvalidProgramLength(usize),
    #[error("Address is not a native segwit address")]
    UnrecognizedFormat,
    #[error("Unsupported address format: {0}")]
    UnsupportedAddressFormat(String),

    // 费用估算
    #[error("Purpose {0} does not originate change outputs")]
    UnsupportedChangeOutput(u32),

    // 钱包操作
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("Address {0} is not one of the imported key's candidates")]
    AddressNotCandidate(String),
    #[error("An address has already been selected for this key")]
    AddressAlreadySelected,
}

impl WalletError {
    /// 稳定的错误码，供调用方做本地化映射
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::InvalidPurpose(_) => "invalid_purpose",
            WalletError::InvalidChangeChain(_) => "invalid_change_chain",
            WalletError::InvalidDerivationPath(_) => "invalid_derivation_path",
            WalletError::DerivationFailed(_) => "derivation_failed",
            WalletError::InvalidMnemonic(_) => "invalid_mnemonic",
            WalletError::InvalidChecksum => "invalid_checksum",
            WalletError::InvalidLength(_) => "invalid_length",
            WalletError::InvalidCharset => "invalid_charset",
            WalletError::InvalidVersionByte(_) => "invalid_version_byte",
            WalletError::InvalidHrp(_) => "invalid_hrp",
            WalletError::InvalidWitnessVersion(_) => "invalid_witness_version",
            WalletError::InvalidProgramLength(_) => "invalid_program_length",
            WalletError::UnrecognizedFormat => "unrecognized_format",
            WalletError::UnsupportedAddressFormat(_) => "unsupported_address_format",
            WalletError::UnsupportedChangeOutput(_) => "unsupported_change_output",
            WalletError::NotFound(_) => "not_found",
            WalletError::InvalidEncoding(_) => "invalid_encoding",
            WalletError::InvalidPublicKey(_) => "invalid_public_key",
            WalletError::EncryptionFailed(_) => "encryption_failed",
            WalletError::DecryptionFailed(_) => "decryption_failed",
            WalletError::AddressNotCandidate(_) => "address_not_candidate",
            WalletError::AddressAlreadySelected => "address_already_selected",
        }
    }

    /// 是否属于地址格式校验失败（调用方可统一提示"地址无效"）
    pub fn is_address_validation(&self) -> bool {
        matches!(
            self,
            WalletError::InvalidChecksum
                | WalletError::InvalidLength(_)
                | WalletError::InvalidCharset
                | WalletError::InvalidVersionByte(_)
                | WalletError::InvalidHrp(_)
                | WalletError::InvalidWitnessVersion(_)
                | WalletError::InvalidProgramLength(_)
        )
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
