//! Behavior-driven tests for cross-provider aggregation
//!
//! These tests verify HOW quotes and candles from several providers fold into
//! a single consensus answer, including the degenerate cases.

use cryptodesk_core::{
    aggregate_candles, aggregate_multi_assets, aggregate_single_asset, format_unified,
    unified_timestamp, HistoricalCandle, ProductQuote, ProviderResults, Ticker, ValidationError,
};
use proptest::prelude::*;
use time::UtcOffset;

fn quote(symbol: &str, price: f64, volume: f64, provider: &str) -> ProductQuote {
    ProductQuote::new(
        format!("{symbol}-USD"),
        Ticker::parse(symbol).expect("valid ticker"),
        price,
        volume,
        "USD",
        provider,
    )
    .expect("valid quote")
}

fn candle(timestamp: &str, high: f64, low: f64) -> HistoricalCandle {
    let mid = (high + low) / 2.0;
    HistoricalCandle::new(timestamp, mid, high, low, mid, 10.0).expect("valid candle")
}

fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-6
}

// =============================================================================
// Single asset
// =============================================================================

#[test]
fn when_volumes_are_present_price_is_volume_weighted() {
    // Given: Three BTC quotes with positive volumes
    let quotes = [
        quote("BTC", 50_000.0, 1_000.0, "BinanceWrapper"),
        quote("BTC", 50_100.0, 1_100.0, "CoinBaseWrapper"),
        quote("BTC", 49_900.0, 900.0, "YFinanceWrapper"),
    ];

    // When: They are aggregated
    let aggregated = aggregate_single_asset(&quotes).expect("same asset");

    // Then: Price is Σ(p·v)/Σv, volume is the per-input mean of volumes
    let expected = (50_000.0 * 1_000.0 + 50_100.0 * 1_100.0 + 49_900.0 * 900.0) / 3_000.0;
    assert!(approx(aggregated.price, expected), "price {}", aggregated.price);
    assert!((aggregated.price - 50_006.67).abs() < 0.01);
    assert!(approx(aggregated.volume_24h, 1_000.0));
    assert_eq!(aggregated.symbol.as_str(), "BTC");
    assert_eq!(aggregated.id, "BTC_AGGREGATED");
    assert_eq!(aggregated.currency, "USD");
    assert_eq!(
        aggregated.provider,
        "BinanceWrapper,CoinBaseWrapper,YFinanceWrapper"
    );
}

#[test]
fn when_no_volume_is_reported_price_is_the_simple_mean() {
    // Given: Three SOL quotes without volume
    let quotes = [
        quote("SOL", 100.0, 0.0, "A"),
        quote("SOL", 110.0, 0.0, "B"),
        quote("SOL", 90.0, 0.0, "C"),
    ];

    // When: They are aggregated
    let aggregated = aggregate_single_asset(&quotes).expect("same asset");

    // Then: The mean of prices is used and volume stays zero
    assert!(approx(aggregated.price, 100.0));
    assert_eq!(aggregated.volume_24h, 0.0);
}

#[test]
fn when_prices_and_volumes_are_all_zero_result_is_zero() {
    let quotes = [quote("DOGE", 0.0, 0.0, "A"), quote("DOGE", 0.0, 0.0, "B")];

    let aggregated = aggregate_single_asset(&quotes).expect("same asset");

    assert_eq!(aggregated.price, 0.0);
    assert_eq!(aggregated.volume_24h, 0.0);
}

#[test]
fn zero_volume_inputs_do_not_drag_the_vwap() {
    let quotes = [
        quote("ETH", 3_000.0, 10.0, "A"),
        quote("ETH", 1.0, 0.0, "B"),
    ];

    let aggregated = aggregate_single_asset(&quotes).expect("same asset");

    assert!(approx(aggregated.price, 3_000.0));
    // Volume is divided by every input, zero-volume ones included.
    assert!(approx(aggregated.volume_24h, 5.0));
}

#[test]
fn when_quotes_name_different_assets_aggregation_is_rejected() {
    let quotes = [quote("BTC", 1.0, 1.0, "A"), quote("ETH", 1.0, 1.0, "B")];

    let error = aggregate_single_asset(&quotes).expect_err("mixed assets");

    assert_eq!(
        error,
        ValidationError::MixedSymbols {
            expected: String::from("BTC"),
            found: String::from("ETH"),
        }
    );
}

#[test]
fn empty_input_is_rejected() {
    let quotes: [ProductQuote; 0] = [];
    assert_eq!(
        aggregate_single_asset(&quotes),
        Err(ValidationError::EmptyAggregation)
    );
}

// =============================================================================
// Many assets
// =============================================================================

#[test]
fn when_providers_return_several_assets_each_asset_is_folded_separately() {
    // Given: Two providers answering for BTC and ETH, one missing ETH
    let mut results = ProviderResults::new();
    results.push(
        "BinanceWrapper",
        vec![
            quote("BTC", 100.0, 1.0, "BinanceWrapper"),
            quote("ETH", 10.0, 1.0, "BinanceWrapper"),
        ],
    );
    results.push(
        "YFinanceWrapper",
        vec![quote("BTC", 200.0, 3.0, "YFinanceWrapper")],
    );

    // When: The results are aggregated
    let aggregated = aggregate_multi_assets(&results).expect("valid groups");

    // Then: One quote per asset, in first-seen order
    let symbols = aggregated
        .iter()
        .map(|quote| quote.symbol.as_str())
        .collect::<Vec<_>>();
    assert_eq!(symbols, vec!["BTC", "ETH"]);
    assert!(approx(aggregated[0].price, 175.0));
    assert_eq!(aggregated[0].provider, "BinanceWrapper,YFinanceWrapper");
    assert!(approx(aggregated[1].price, 10.0));
    assert_eq!(aggregated[1].provider, "BinanceWrapper");
}

#[test]
fn empty_provider_results_aggregate_to_nothing() {
    let results: ProviderResults<Vec<ProductQuote>> = ProviderResults::new();
    assert!(aggregate_multi_assets(&results).expect("nothing to fold").is_empty());
}

// =============================================================================
// Candles
// =============================================================================

#[test]
fn when_candles_share_a_timestamp_fields_are_averaged() {
    // Given: Two providers, two aligned hours each
    let mut results = ProviderResults::new();
    results.push(
        "BinanceWrapper",
        vec![
            candle("2024-01-01 10:00", 50_000.0, 49_500.0),
            candle("2024-01-01 11:00", 51_000.0, 50_500.0),
        ],
    );
    results.push(
        "CoinBaseWrapper",
        vec![
            candle("2024-01-01 10:00", 50_100.0, 49_600.0),
            candle("2024-01-01 11:00", 51_100.0, 50_600.0),
        ],
    );

    // When: The candles are aggregated
    let aggregated = aggregate_candles(&results);

    // Then: Each hour averages its contributors
    assert_eq!(aggregated.len(), 2);
    assert_eq!(aggregated[0].timestamp, "2024-01-01 10:00");
    assert!(approx(aggregated[0].high, 50_050.0));
    assert!(approx(aggregated[0].low, 49_550.0));
    assert!(approx(aggregated[1].high, 51_050.0));
    assert!(approx(aggregated[1].volume, 10.0));
}

#[test]
fn misaligned_candles_stay_in_their_own_buckets() {
    let mut results = ProviderResults::new();
    results.push("A", vec![candle("2024-01-01 12:00", 10.0, 8.0)]);
    results.push("B", vec![candle("2024-01-01 10:00", 20.0, 16.0)]);

    let aggregated = HistoricalCandle::aggregate(&results);

    let timestamps = aggregated
        .iter()
        .map(|candle| candle.timestamp.as_str())
        .collect::<Vec<_>>();
    assert_eq!(timestamps, vec!["2024-01-01 10:00", "2024-01-01 12:00"]);
    assert!(approx(aggregated[0].high, 20.0));
    assert!(approx(aggregated[1].high, 10.0));
}

// =============================================================================
// Unified timestamps
// =============================================================================

#[test]
fn seconds_and_milliseconds_agree() {
    let from_seconds = unified_timestamp(None, Some(1_700_000_000)).expect("seconds");
    let from_millis = unified_timestamp(Some(1_700_000_000_999), None).expect("millis");
    assert_eq!(from_seconds, from_millis);
}

#[test]
fn unified_format_is_minute_precision() {
    assert_eq!(
        format_unified(1_700_000_000, UtcOffset::UTC).expect("valid"),
        "2023-11-14 22:13"
    );
}

#[test]
fn both_or_neither_unit_is_ambiguous() {
    assert_eq!(
        unified_timestamp(Some(1), Some(1)),
        Err(ValidationError::TimestampUnitAmbiguous)
    );
    assert_eq!(
        unified_timestamp(None, None),
        Err(ValidationError::TimestampUnitAmbiguous)
    );
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn vwap_lies_between_the_extreme_prices(
        inputs in proptest::collection::vec((1.0f64..100_000.0, 0.0f64..10_000.0), 1..8),
    ) {
        let quotes = inputs
            .iter()
            .map(|(price, volume)| quote("BTC", *price, *volume, "P"))
            .collect::<Vec<_>>();

        let aggregated = aggregate_single_asset(&quotes).expect("same asset");

        let min = inputs.iter().map(|(price, _)| *price).fold(f64::INFINITY, f64::min);
        let max = inputs.iter().map(|(price, _)| *price).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(aggregated.price >= min - 1e-6 && aggregated.price <= max + 1e-6);
        prop_assert!(aggregated.volume_24h >= 0.0);
        prop_assert_eq!(aggregated.provider.as_str(), "P");
    }

    #[test]
    fn identical_quotes_aggregate_to_themselves(
        price in 0.01f64..1e6,
        volume in 0.0f64..1e6,
        copies in 1usize..6,
    ) {
        let quotes = vec![quote("ETH", price, volume, "P"); copies];

        let aggregated = aggregate_single_asset(&quotes).expect("same asset");

        prop_assert!((aggregated.price - price).abs() <= price * 1e-9);
        prop_assert!((aggregated.volume_24h - volume).abs() <= volume.max(1.0) * 1e-9);
    }

    #[test]
    fn millisecond_truncation_matches_seconds(
        seconds in 1i64..4_000_000_000,
        extra in 0i64..1_000,
    ) {
        prop_assert_eq!(
            unified_timestamp(Some(seconds * 1_000 + extra), None),
            unified_timestamp(None, Some(seconds))
        );
    }
}
