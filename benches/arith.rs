// -*- mode: rust; -*-
//
// This file is part of ctnum.
// See LICENSE for licensing information.

//! Benchmarks at protocol-typical sizes.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ctnum::{Modulus, Nat};

/// The 1024-bit MODP prime of RFC 2409 (Oakley group 2).
const P_1024: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E08\
                      8A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B\
                      302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9\
                      A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE6\
                      49286651ECE65381FFFFFFFFFFFFFFFF";

fn operand(seed: u8, bytes: usize) -> Nat {
    let buf: Vec<u8> = (0..bytes)
        .map(|i| seed.wrapping_mul(i as u8).wrapping_add(0x5B) | 1)
        .collect();
    Nat::from_bytes(&buf)
}

fn bench_reduce(c: &mut Criterion) {
    let m = Modulus::from_hex(P_1024).unwrap();
    let x = operand(3, 256);
    c.bench_function("reduce 2048-bit by 1024-bit", |b| {
        b.iter(|| black_box(&x).reduce(black_box(&m)))
    });
}

fn bench_mod_mul(c: &mut Criterion) {
    let m = Modulus::from_hex(P_1024).unwrap();
    let x = operand(5, 128).reduce(&m);
    let y = operand(7, 128).reduce(&m);
    c.bench_function("mod_mul 1024-bit", |b| {
        b.iter(|| black_box(&x).mod_mul(black_box(&y), black_box(&m)))
    });
}

fn bench_exp(c: &mut Criterion) {
    let m = Modulus::from_hex(P_1024).unwrap();
    let x = operand(9, 128).reduce(&m);
    let e = operand(11, 32);
    c.bench_function("exp 1024-bit base, 256-bit exponent", |b| {
        b.iter(|| black_box(&x).exp(black_box(&e), black_box(&m)))
    });
}

fn bench_mod_inverse(c: &mut Criterion) {
    let m = Modulus::from_hex(P_1024).unwrap();
    let x = operand(13, 128).reduce(&m);
    c.bench_function("mod_inverse 1024-bit", |b| {
        b.iter(|| black_box(&x).mod_inverse(black_box(&m)))
    });
}

fn bench_mod_sqrt(c: &mut Criterion) {
    let m = Modulus::from_hex(P_1024).unwrap();
    let x = operand(17, 128).mod_mul(&operand(17, 128), &m);
    c.bench_function("mod_sqrt 1024-bit (3 mod 4)", |b| {
        b.iter(|| black_box(&x).mod_sqrt(black_box(&m)))
    });
}

criterion_group!(
    benches,
    bench_reduce,
    bench_mod_mul,
    bench_exp,
    bench_mod_inverse,
    bench_mod_sqrt
);
criterion_main!(benches);
