//! 性能基准测试 - 地址派生与地址搜索
//!
//! 测试场景:
//! 1. 单个收款地址派生（三种用途）
//! 2. 不同搜索上限下的地址查找（最坏情况：地址不存在）
//! 3. 消息签名

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hdwallet_core::prelude::*;

const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn wallet(purpose: u32) -> HdWallet {
    HdWallet::from_seed_phrase(TEST_MNEMONIC, CoinProfile::new(purpose, 0, 0).unwrap()).unwrap()
}

fn bench_receive_address(c: &mut Criterion) {
    let mut group = c.benchmark_group("receive_address");

    for purpose in [44, 49, 84] {
        let wallet = wallet(purpose);
        group.bench_with_input(BenchmarkId::from_parameter(purpose), &wallet, |b, wallet| {
            b.iter(|| wallet.receive_address(black_box(7)).unwrap())
        });
    }

    group.finish();
}

fn bench_find_address(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_address_miss");
    group.sample_size(10);
    let wallet = wallet(84);

    for limit in [10u32, 50, 100] {
        group.throughput(Throughput::Elements(u64::from(limit) * 2));
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| {
                wallet
                    .find_address(black_box("1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA"), limit)
                    .unwrap_err()
            })
        });
    }

    group.finish();
}

fn bench_sign(c: &mut Criterion) {
    let wallet = wallet(84);
    c.bench_function("sign_message", |b| {
        b.iter(|| wallet.sign(black_box(b"benchmark message")).unwrap())
    });
}

criterion_group!(benches, bench_receive_address, bench_find_address, bench_sign);
criterion_main!(benches);
