//! Quote throughput benchmarks
//!
//! Measures the cost of a full quote per curve family, including the Newton
//! loops, so regressions in iteration counts show up as latency.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use curve_amm::{
    BigUint, CryptoCurveParams, CryptoMath, FeeBand, FixedPoint, PoolReserves,
    PrecisionMultiplier, QuoteEngine, QuoteRequest, StableCurveParams, StableMath,
};

fn stable_request(amount_in: u128) -> QuoteRequest<StableCurveParams> {
    QuoteRequest::new(
        amount_in,
        PoolReserves::new(8_079_308_863_505_801_735_196u128, 1_771_167_531u128),
        StableCurveParams::with_amplification(80u32),
    )
    .with_multipliers(PrecisionMultiplier::ONE, PrecisionMultiplier::from_decimals(6).unwrap())
    .with_fee_band(FeeBand::flat(100).unwrap())
}

fn crypto_request(amount_in: u128) -> QuoteRequest<CryptoCurveParams> {
    QuoteRequest::new(
        amount_in,
        PoolReserves::new(8_466_391_136_317_679_557u128, 193_408_158_540u128),
        CryptoCurveParams {
            amplification: Some(BigUint::from(4_000_000u32)),
            gamma: Some(BigUint::from(1_450_000_000_000_000u64)),
            invariant_last: Some(BigUint::from(18_973_521_177_677_971_086u128)),
            price_scale: Some(BigUint::from(54_451_990_779_514_461u64)),
            future_params_time: Some(1_709_616_182),
            total_supply: Some(BigUint::from(37_758_794_556_622_160_853u128)),
            virtual_price: Some(BigUint::from(1_076_695_600_534_779_561u64)),
        },
    )
    .with_multipliers(PrecisionMultiplier::ONE, PrecisionMultiplier::from_decimals(9).unwrap())
    .with_fee_band(FeeBand::new(230_000_000_000_000u64, 800, 1000).unwrap())
}

fn bench_stable_quotes(c: &mut Criterion) {
    let engine = QuoteEngine::default();
    let mut group = c.benchmark_group("stable_quote");

    for amount in [1_000_000_000_000_000u128, 100_000_000_000_000_000_000] {
        let request = stable_request(amount);
        group.bench_with_input(BenchmarkId::from_parameter(amount), &request, |b, request| {
            b.iter(|| criterion::black_box(engine.quote_stable(request)))
        });
    }
    group.finish();

    c.bench_function("stable_invariant", |b| {
        let math = StableMath::default();
        let a = BigUint::from(80u32);
        let x0 = BigUint::from(8_079_308_863_505_801_735_196u128);
        let x1 = BigUint::from(1_771_167_531_000_000_000_000u128);
        b.iter(|| criterion::black_box(math.compute_invariant(&a, &x0, &x1, FixedPoint::checked())))
    });
}

fn bench_crypto_quotes(c: &mut Criterion) {
    let engine = QuoteEngine::default();
    let request = crypto_request(1_000_000_000_000_000_000);

    c.bench_function("crypto_quote_cached_invariant", |b| {
        b.iter(|| criterion::black_box(engine.quote_crypto(&request, 1_800_000_000)))
    });

    c.bench_function("crypto_quote_during_ramp", |b| {
        b.iter(|| criterion::black_box(engine.quote_crypto(&request, 1_700_000_000)))
    });

    c.bench_function("crypto_newton_d", |b| {
        let math = CryptoMath::default();
        let ann = BigUint::from(4_000_000u32);
        let gamma = BigUint::from(1_450_000_000_000_000u64);
        let xp0 = BigUint::from(8_466_391_136_317_679_557u128);
        let xp1 = BigUint::from(10_531_459_265_502_951_057u128);
        b.iter(|| {
            criterion::black_box(math.compute_generic_invariant(
                &ann,
                &gamma,
                &xp0,
                &xp1,
                FixedPoint::checked(),
            ))
        })
    });
}

criterion_group!(benches, bench_stable_quotes, bench_crypto_quotes);
criterion_main!(benches);
