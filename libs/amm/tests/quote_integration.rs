//! End-to-end quote tests against values produced by the pool contracts

use curve_amm::{
    BigUint, Ceiling, CryptoCurveParams, CryptoPool, CurvePool, FeeBand, InvariantSource,
    PoolReserves, PrecisionMultiplier, PriceOracleState, QuoteEngine, QuoteError, QuoteOutcome,
    QuoteRequest, StableCurveParams, StablePool, SwapDirection, Unpriceable,
};
use curve_config::SolverConfig;

const AFTER_RAMP: u64 = 1_800_000_000;

fn big(v: u128) -> BigUint {
    BigUint::from(v)
}

fn aqua_params() -> CryptoCurveParams {
    CryptoCurveParams {
        amplification: Some(big(4_000_000)),
        gamma: Some(big(1_450_000_000_000_000)),
        invariant_last: Some(big(18_973_521_177_677_971_086)),
        price_scale: Some(big(54_451_990_779_514_461)),
        future_params_time: Some(1_709_616_182),
        total_supply: Some(big(37_758_794_556_622_160_853)),
        virtual_price: Some(big(1_076_695_600_534_779_561)),
    }
}

fn aqua_pool() -> CryptoPool {
    CryptoPool {
        reserve0: big(8_466_391_136_317_679_557),
        reserve1: big(193_408_158_540),
        multiplier0: PrecisionMultiplier::ONE,
        multiplier1: PrecisionMultiplier::from_value(&big(1_000_000_000)).unwrap(),
        params: aqua_params(),
        fee_band: FeeBand::new(230_000_000_000_000u64, 800, 1000).unwrap(),
        check_overflow: true,
    }
}

#[test]
fn test_stable_swap_golden() {
    let engine = QuoteEngine::default();
    let request = QuoteRequest::new(
        big(100_000_000_000_000_000_000),
        PoolReserves::new(big(8_079_308_863_505_801_735_196), big(1_771_167_531)),
        StableCurveParams::with_amplification(80u32),
    )
    .with_multipliers(
        PrecisionMultiplier::ONE,
        PrecisionMultiplier::from_value(&big(1_000_000_000_000)).unwrap(),
    )
    .with_fee_band(FeeBand::flat(100).unwrap());

    assert_eq!(engine.amount_out_stable(&request).unwrap(), big(95_366_156));
}

#[test]
fn test_aqua_golden_cached_and_ramping() {
    let engine = QuoteEngine::default();
    let pool = aqua_pool();
    let amount = big(1_000_000_000_000_000_000);

    let cached = pool.quote(&engine, &amount, SwapDirection::ZeroForOne, AFTER_RAMP).unwrap();
    let ramping = pool.quote(&engine, &amount, SwapDirection::ZeroForOne, 1_709_616_181).unwrap();

    assert_eq!(cached.amount_out(), big(18_660_541_676));
    assert_eq!(ramping.amount_out(), big(18_660_541_676));
    assert_eq!(
        cached.diagnostics().unwrap().invariant_source,
        Some(InvariantSource::Cached)
    );
    assert_eq!(
        ramping.diagnostics().unwrap().invariant_source,
        Some(InvariantSource::Recomputed)
    );
}

#[test]
fn test_ramp_boundary_uses_cached_invariant() {
    let engine = QuoteEngine::default();
    let outcome = aqua_pool()
        .quote(&engine, &big(1_000_000_000_000_000_000), SwapDirection::ZeroForOne, 1_709_616_182)
        .unwrap();
    assert_eq!(
        outcome.diagnostics().unwrap().invariant,
        big(18_973_521_177_677_971_086)
    );
}

#[test]
fn test_unpriceable_pools_return_zero() {
    let engine = QuoteEngine::default();

    let mut pool = aqua_pool();
    pool.params.virtual_price = Some(BigUint::from(0u32));
    let outcome = pool
        .quote(&engine, &big(1_000_000_000_000_000_000), SwapDirection::ZeroForOne, AFTER_RAMP)
        .unwrap();
    assert_eq!(outcome, QuoteOutcome::Unpriceable(Unpriceable::IncompleteParameters));

    let mut pool = aqua_pool();
    pool.reserve0 = BigUint::from(0u32);
    let outcome = pool
        .quote(&engine, &big(1_000_000_000_000_000_000), SwapDirection::ZeroForOne, AFTER_RAMP)
        .unwrap();
    assert!(outcome.amount_out() == BigUint::from(0u32));
    assert_eq!(outcome.unpriceable_reason(), Some(Unpriceable::EmptyReserve));
}

#[test]
fn test_crypto_loop_limit_from_config() {
    let config = SolverConfig::from_toml_str("crypto_loop_limit = 1").unwrap();
    let engine = QuoteEngine::new(config);

    let outcome = aqua_pool()
        .quote(&engine, &big(1_000_000_000_000_000_000), SwapDirection::ZeroForOne, AFTER_RAMP)
        .unwrap();
    assert_eq!(outcome, QuoteOutcome::Unpriceable(Unpriceable::NotConverged));
}

#[test]
fn test_default_amplification_from_config() {
    let config = SolverConfig::from_toml_str("default_stable_amplification = 1000").unwrap();
    let engine = QuoteEngine::new(config);
    let pool = StablePool {
        reserve0: big(1_000_000_000_000_000_000_000),
        reserve1: big(1_000_000_000_000_000_000_000),
        multiplier0: PrecisionMultiplier::ONE,
        multiplier1: PrecisionMultiplier::ONE,
        params: StableCurveParams::default(),
        fee_band: FeeBand::flat(0).unwrap(),
        check_overflow: true,
    };

    let out = pool
        .quote(&engine, &big(1_000_000_000_000_000_000), SwapDirection::OneForZero, 0)
        .unwrap();
    assert_eq!(out.amount_out(), big(999_999_000_999_001_997));
}

#[test]
fn test_overflow_gate_is_the_only_error() {
    let engine = QuoteEngine::default();
    let huge = BigUint::from(u128::MAX) + 1u32;
    let request = QuoteRequest::new(
        big(1_000),
        PoolReserves::new(huge.clone(), huge),
        StableCurveParams::with_amplification(100u32),
    );

    match engine.quote_stable(&request) {
        Err(QuoteError::Overflow { ceiling, .. }) => assert_eq!(ceiling, Ceiling::U128),
        other => panic!("expected overflow, got {other:?}"),
    }
    assert!(engine
        .quote_stable(&request.with_check_overflow(false))
        .is_ok());
}

#[test]
fn test_post_trade_estimate_after_golden_swap() {
    let engine = QuoteEngine::default();
    let pool = aqua_pool();
    let amount_in = big(1_000_000_000_000_000_000);
    let amount_out = pool
        .quote(&engine, &amount_in, SwapDirection::ZeroForOne, AFTER_RAMP)
        .unwrap()
        .amount_out();

    let oracle = PriceOracleState {
        price_oracle: big(54_451_990_779_514_461),
        last_prices: big(54_451_990_779_514_461),
        last_prices_timestamp: AFTER_RAMP - 600,
        ma_half_time: big(600),
        xcp_profit: big(1_100_000_000_000_000_000),
        allowed_extra_profit: big(2_000_000_000_000_000),
        adjustment_step: big(146_000_000_000_000),
        not_adjusted: false,
    };
    let input = pool
        .post_trade_input(oracle, &amount_in, &amount_out, SwapDirection::ZeroForOne)
        .unwrap();

    let estimate = engine
        .estimate_post_trade_state(&input, AFTER_RAMP)
        .unwrap()
        .unwrap();
    assert_eq!(estimate.invariant, big(18_981_746_441_479_238_513));
    assert_eq!(estimate.last_prices, big(53_589_012_439_340_723));
    assert_eq!(estimate.price_scale, big(54_451_990_779_514_461));
    assert!(!estimate.price_scale_adjusted);

    let mut input = input;
    input.params.virtual_price = Some(big(1_100_000_000_000_000_000));
    input.oracle.xcp_profit = big(1_000_000_000_000_000_000);
    assert!(engine
        .estimate_post_trade_state(&input, AFTER_RAMP)
        .unwrap()
        .is_none());
}
