//! 地址编解码模块
//!
//! 统一处理三种比特币地址：
//! - base58check 旧格式 P2PKH (1... / m... / n...)
//! - base58check P2SH，含 P2SH-P2WPKH (3... / 2...)
//! - bech32 原生隔离见证 v0 (bc1q... / tb1q... / bcrt1q...)
//!
//! 校验函数对畸形输入不 panic，总是返回带类型的错误。

use bech32::primitives::decode::{
    SegwitHrpstring, SegwitHrpstringError, UncheckedHrpstringError,
};
use bech32::Hrp;
use serde::{Deserialize, Serialize};

use crate::domain::coin_profile::{CoinProfile, Purpose};
use crate::domain::key_factory::hash160_of;
use crate::error::{WalletError, WalletResult};

/// base58check 载荷长度：1 字节版本 + 20 字节哈希
const BASE58_PAYLOAD_LEN: usize = 21;

/// 已知的 base58 版本字节（主网 / 测试网）
const P2PKH_VERSIONS: [u8; 2] = [0x00, 0x6f];
const P2SH_VERSIONS: [u8; 2] = [0x05, 0xc4];

/// 接受的 bech32 前缀
const KNOWN_HRPS: [&str; 3] = ["bc", "tb", "bcrt"];

/// 地址脚本类型（决定输出字节开销）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
}

/// 解码后的隔离见证地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegwitAddress {
    pub hrp: String,
    pub witness_version: u8,
    pub program: Vec<u8>,
}

/// 地址编解码器
pub struct AddressCodec;

impl AddressCodec {
    /// 验证 base58check 地址
    ///
    /// 校验字符集、校验和、载荷长度（21 字节）以及版本字节。
    pub fn validate_base58_check(address: &str) -> WalletResult<()> {
        Self::decode_base58_check(address).map(|_| ())
    }

    /// 解码 base58check 地址，返回 (版本字节, 20 字节哈希)
    pub fn decode_base58_check(address: &str) -> WalletResult<(u8, [u8; 20])> {
        let payload = bs58::decode(address)
            .with_check(None)
            .into_vec()
            .map_err(|e| match e {
                bs58::decode::Error::InvalidChecksum { .. } => WalletError::InvalidChecksum,
                bs58::decode::Error::NoChecksum => WalletError::InvalidLength(address.len()),
                _ => WalletError::InvalidCharset,
            })?;

        if payload.len() != BASE58_PAYLOAD_LEN {
            return Err(WalletError::InvalidLength(payload.len()));
        }

        let version = payload[0];
        if !P2PKH_VERSIONS.contains(&version) && !P2SH_VERSIONS.contains(&version) {
            return Err(WalletError::InvalidVersionByte(version));
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok((version, hash))
    }

    /// 验证原生隔离见证地址
    ///
    /// 只接受 witness v0，程序长度 20 (P2WPKH) 或 32 (P2WSH)。
    /// 大小写混合的字符串直接拒绝，不做归一化。
    pub fn validate_segwit_address(address: &str) -> WalletResult<()> {
        Self::decode_segwit(address).map(|_| ())
    }

    pub fn decode_segwit(address: &str) -> WalletResult<SegwitAddress> {
        let decoded = SegwitHrpstring::new(address).map_err(|e| match e {
            SegwitHrpstringError::Checksum(_) => WalletError::InvalidChecksum,
            SegwitHrpstringError::InvalidWitnessVersion(version) => {
                WalletError::InvalidWitnessVersion(version.to_u8())
            }
            SegwitHrpstringError::WitnessLength(_) => {
                WalletError::InvalidProgramLength(program_len_hint(address))
            }
            SegwitHrpstringError::Unchecked(UncheckedHrpstringError::Hrp(_)) => {
                WalletError::InvalidHrp(hrp_part(address))
            }
            SegwitHrpstringError::Unchecked(_) => WalletError::InvalidCharset,
            _ => WalletError::InvalidLength(address.len()),
        })?;

        let hrp = decoded.hrp().to_lowercase();
        if !KNOWN_HRPS.contains(&hrp.as_str()) {
            return Err(WalletError::InvalidHrp(hrp));
        }

        let witness_version = decoded.witness_version().to_u8();
        if witness_version != 0 {
            return Err(WalletError::InvalidWitnessVersion(witness_version));
        }

        let program: Vec<u8> = decoded.byte_iter().collect();
        if program.len() != 20 && program.len() != 32 {
            return Err(WalletError::InvalidProgramLength(program.len()));
        }

        Ok(SegwitAddress {
            hrp,
            witness_version,
            program,
        })
    }

    /// 提取隔离见证地址的前缀
    ///
    /// 只要求 bech32 解码成功，不限制前缀与见证版本；
    /// 非隔离见证地址返回 `UnrecognizedFormat`，不做猜测。
    pub fn hrp_from_address(address: &str) -> WalletResult<String> {
        SegwitHrpstring::new(address)
            .map(|decoded| decoded.hrp().to_lowercase())
            .map_err(|_| WalletError::UnrecognizedFormat)
    }

    /// 由公钥哈希按币种配置构建地址
    pub fn build_address(pubkey_hash: &[u8; 20], profile: &CoinProfile) -> WalletResult<String> {
        let params = profile.network_params();
        match profile.purpose() {
            Purpose::Legacy => Ok(base58_check(params.p2pkh_version, pubkey_hash)),
            Purpose::NestedSegwit => {
                // redeem script: OP_0 PUSH20 <hash>
                let mut redeem_script = Vec::with_capacity(22);
                redeem_script.extend_from_slice(&[0x00, 0x14]);
                redeem_script.extend_from_slice(pubkey_hash);
                let script_hash = hash160_of(&redeem_script);
                Ok(base58_check(params.p2sh_version, &script_hash))
            }
            Purpose::NativeSegwit => segwit_v0(params.hrp, pubkey_hash),
        }
    }

    /// 识别地址的脚本类型
    pub fn classify(address: &str) -> WalletResult<AddressKind> {
        if let Ok(segwit) = Self::decode_segwit(address) {
            return Ok(if segwit.program.len() == 20 {
                AddressKind::P2wpkh
            } else {
                AddressKind::P2wsh
            });
        }

        match Self::decode_base58_check(address) {
            Ok((version, _)) if P2PKH_VERSIONS.contains(&version) => Ok(AddressKind::P2pkh),
            Ok((version, _)) if P2SH_VERSIONS.contains(&version) => Ok(AddressKind::P2sh),
            _ => Err(WalletError::UnsupportedAddressFormat(address.to_string())),
        }
    }
}

fn base58_check(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(BASE58_PAYLOAD_LEN);
    payload.push(version);
    payload.extend_from_slice(hash);
    bs58::encode(payload).with_check().into_string()
}

/// 最后一个分隔符 `1` 之前的部分
fn hrp_part(address: &str) -> String {
    address
        .rfind('1')
        .map(|separator| address[..separator].to_lowercase())
        .unwrap_or_default()
}

/// 由字符串长度推算见证程序字节数（分隔符之后去掉版本字符与 6 位校验和）
fn program_len_hint(address: &str) -> usize {
    address
        .rfind('1')
        .map(|separator| address.len().saturating_sub(separator + 8) * 5 / 8)
        .unwrap_or(0)
}

fn segwit_v0(hrp: Hrp, program: &[u8]) -> WalletResult<String> {
    bech32::segwit::encode_v0(hrp, program)
        .map_err(|_| WalletError::InvalidProgramLength(program.len()))
}
