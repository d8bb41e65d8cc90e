use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cryptendpoint::bigint;
use cryptendpoint::pke::rsa::RsaKeyPair;
use num_bigint::BigUint;

fn bench_power_mod(c: &mut Criterion) {
    let base = BigUint::from(123456789u64);
    let exp = BigUint::from(987654321u64);
    let modulus = BigUint::parse_bytes(b"170141183460469231731687303715884105727", 10).unwrap();
    c.bench_function("power_mod_128_bit_modulus", |b| {
        b.iter(|| bigint::power_mod(black_box(&base), black_box(&exp), black_box(&modulus)))
    });
}

fn bench_rsa_round_trip(c: &mut Criterion) {
    let keypair = RsaKeyPair::generate(256);
    let public = keypair.public();
    let message = BigUint::from(42u32);

    c.bench_function("rsa_encrypt_256_bit_modulus", |b| {
        b.iter(|| public.encrypt_int(black_box(&message)).unwrap())
    });

    let ciphertext = public.encrypt_int(&message).unwrap();
    c.bench_function("rsa_decrypt_256_bit_modulus", |b| {
        b.iter(|| keypair.decrypt_int(black_box(&ciphertext)))
    });
}

criterion_group!(benches, bench_power_mod, bench_rsa_round_trip);
criterion_main!(benches);
