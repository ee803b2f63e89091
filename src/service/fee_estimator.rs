// 交易大小预估服务
// 按输入 / 输出脚本类型累加虚拟字节，结果乘以费率即为手续费
// 字节表是与下游费率约定兼容的固定常量，不按实际序列化重新推导

use crate::domain::coin_profile::CoinProfile;
use crate::domain::wallet_records::Utxo;
use crate::error::{WalletError, WalletResult};
use crate::utils::address_codec::{AddressCodec, AddressKind};

/// 固定开销：version + locktime + 输入/输出计数 + segwit 标记
pub const TX_OVERHEAD_VBYTES: usize = 11;

/// 各目标地址类型的输出大小（虚拟字节）
pub const P2PKH_OUTPUT_VBYTES: usize = 34;
pub const P2SH_OUTPUT_VBYTES: usize = 32;
pub const P2WPKH_OUTPUT_VBYTES: usize = 31;
pub const P2WSH_OUTPUT_VBYTES: usize = 43;

/// 交易大小预估器
///
/// 绑定一份币种配置快照，找零输出的大小由钱包自身的用途决定。
#[derive(Debug, Clone, Copy)]
pub struct FeeEstimator {
    profile: CoinProfile,
}

impl FeeEstimator {
    pub fn new(profile: CoinProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &CoinProfile {
        &self.profile
    }

    /// 花费该 UTXO 的输入大小，由产生它的派生路径用途决定
    pub fn bytes_per_input(&self, utxo: &Utxo) -> usize {
        utxo.purpose().traits().input_vbytes
    }

    /// 找零输出大小；BIP44 钱包不产生找零
    pub fn bytes_per_change_output(&self) -> WalletResult<usize> {
        let traits = self.profile.purpose().traits();
        if !traits.originates_change {
            return Err(WalletError::UnsupportedChangeOutput(
                self.profile.purpose().value(),
            ));
        }
        Ok(traits.output_vbytes)
    }

    /// 目标地址的输出大小
    pub fn bytes_per_destination(&self, destination: &str) -> WalletResult<usize> {
        let kind = AddressCodec::classify(destination)?;
        Ok(output_vbytes(kind))
    }

    /// 估算交易总虚拟字节
    ///
    /// 总计 = 固定开销 + Σ 输入 + 目标输出 + (可选) 找零输出
    pub fn total_bytes(
        &self,
        utxos: &[Utxo],
        destination: &str,
        include_change_output: bool,
    ) -> WalletResult<usize> {
        let destination_bytes = self.bytes_per_destination(destination)?;
        let change_bytes = if include_change_output {
            self.bytes_per_change_output()?
        } else {
            0
        };

        let input_bytes: usize = utxos.iter().map(|utxo| self.bytes_per_input(utxo)).sum();

        Ok(TX_OVERHEAD_VBYTES + input_bytes + destination_bytes + change_bytes)
    }

    /// 手续费（聪）= 总虚拟字节 × 费率，溢出时饱和
    pub fn estimate_fee(
        &self,
        utxos: &[Utxo],
        destination: &str,
        include_change_output: bool,
        sat_per_vbyte: u64,
    ) -> WalletResult<u64> {
        let total = self.total_bytes(utxos, destination, include_change_output)?;
        Ok((total as u64).saturating_mul(sat_per_vbyte))
    }
}

pub fn output_vbytes(kind: AddressKind) -> usize {
    match kind {
        AddressKind::P2pkh => P2PKH_OUTPUT_VBYTES,
        AddressKind::P2sh => P2SH_OUTPUT_VBYTES,
        AddressKind::P2wpkh => P2WPKH_OUTPUT_VBYTES,
        AddressKind::P2wsh => P2WSH_OUTPUT_VBYTES,
    }
}
