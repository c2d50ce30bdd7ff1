//! Behavior-driven tests for series sources.
//!
//! Covers the Yahoo chart adapter behind a scripted transport, the seeded
//! synthetic generator and the fallback that joins them.

use std::sync::Arc;

use tickcast_core::{
    FallbackSource, OfflineHttpClient, SyntheticConfig, SyntheticSource, YahooSource,
};
use tickcast_tests::{
    date, request, HttpError, HttpResponse, Interval, ScriptedHttpClient, SeriesSource,
    SourceErrorKind, SourceId,
};

const CHART_BODY: &str = r#"{
    "chart": {
        "result": [{
            "timestamp": [1404186300, 1404272700, 1404359100, 1404445500],
            "indicators": { "quote": [{ "close": [1678.5, null, 1690.25, 1702.0] }] }
        }],
        "error": null
    }
}"#;

// =============================================================================
// Yahoo Chart Source
// =============================================================================

#[test]
fn yahoo_source_requests_the_range_and_drops_incomplete_rows() {
    // Given: A transport returning four rows, one without a close
    let transport = Arc::new(ScriptedHttpClient::new(Ok(HttpResponse::ok_json(CHART_BODY))));
    let source = YahooSource::with_http_client(transport.clone());
    let req = request("INFY.NS", date(2014, 7, 1), date(2014, 7, 4), Interval::Daily);

    // When: The series is fetched
    let series = source.fetch(&req).expect("chart parses");

    // Then: Only complete rows survive, in order
    assert_eq!(series.values(), vec![1678.5, 1690.25, 1702.0]);
    assert!(!series.is_synthetic());

    // And: The request carried the symbol, range start and interval
    let urls = transport.urls();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].contains("/INFY.NS?"));
    assert!(urls[0].contains("period1=1404172800"));
    assert!(urls[0].contains("interval=1d"));
}

#[test]
fn yahoo_timeout_surfaces_as_unavailable() {
    // Given: A transport that times out
    let transport = Arc::new(ScriptedHttpClient::new(Err(HttpError::timeout(
        "deadline elapsed",
    ))));
    let source = YahooSource::with_http_client(transport).with_timeout_ms(250);
    let req = request("TCS.NS", date(2014, 10, 16), date(2014, 11, 28), Interval::Daily);

    // When: The series is fetched
    let err = source.fetch(&req).expect_err("timed out");

    // Then: The failure is an upstream outage naming the timeout
    assert_eq!(err.kind(), SourceErrorKind::Unavailable);
    assert!(err.message().contains("250 ms"));

    // And: The lenient path returns an empty series instead
    assert!(source.fetch_or_empty(&req).is_empty());
}

#[test]
fn yahoo_error_payload_and_bad_status_are_unavailable() {
    let req = request("CIPLA.NS", date(2014, 10, 16), date(2014, 11, 28), Interval::Daily);

    let error_body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
    let source = YahooSource::with_http_client(Arc::new(ScriptedHttpClient::new(Ok(
        HttpResponse::ok_json(error_body),
    ))));
    let err = source.fetch(&req).expect_err("error payload");
    assert_eq!(err.kind(), SourceErrorKind::Unavailable);
    assert!(err.message().contains("No data found"));

    let source = YahooSource::with_http_client(Arc::new(ScriptedHttpClient::new(Ok(
        HttpResponse {
            status: 429,
            body: String::new(),
        },
    ))));
    let err = source.fetch(&req).expect_err("rate limited");
    assert_eq!(err.kind(), SourceErrorKind::Unavailable);
    assert!(err.message().contains("429"));
}

// =============================================================================
// Synthetic Source
// =============================================================================

#[test]
fn synthetic_series_is_reproducible_for_a_seed() {
    // Given: Two sources built from the same seed
    let config = SyntheticConfig::default()
        .with_seed(7)
        .with_granularity(Some(Interval::Daily));
    let first = SyntheticSource::new(config.clone());
    let second = SyntheticSource::new(config);
    let req = request("INFY.NS", date(2014, 10, 16), date(2014, 11, 28), Interval::Daily);

    // When: Both generate the same request
    let a = first.fetch(&req).expect("business days in range");
    let b = second.fetch(&req).expect("business days in range");

    // Then: The series are identical, flagged synthetic, one point per business day
    assert_eq!(a.values(), b.values());
    assert_eq!(a.len(), 32);
    assert!(a.is_synthetic());
    assert_eq!(a.first().expect("non-empty").value, 1200.0);

    // And: Another seed gives another walk
    let other = SyntheticSource::new(
        SyntheticConfig::default()
            .with_seed(8)
            .with_granularity(Some(Interval::Daily)),
    );
    assert_ne!(other.fetch(&req).expect("generated").values(), a.values());
}

#[test]
fn synthetic_source_has_nothing_for_a_weekend() {
    // Given: A range covering only Saturday and Sunday
    let req = request("TCS.NS", date(2014, 11, 1), date(2014, 11, 2), Interval::Daily);

    // When / Then: No business day means no data
    let err = SyntheticSource::default().fetch(&req).expect_err("weekend");
    assert_eq!(err.kind(), SourceErrorKind::Unavailable);
}

// =============================================================================
// Fallback
// =============================================================================

#[test]
fn offline_upstream_falls_back_to_synthetic_minutes() {
    // Given: A Yahoo source that cannot reach the network
    let source = FallbackSource::new(
        YahooSource::with_http_client(Arc::new(OfflineHttpClient)),
        SyntheticSource::default(),
    );
    let req = request("CIPLA.NS", date(2014, 10, 16), date(2014, 10, 17), Interval::Daily);

    // When: The series is fetched
    let series = source.fetch(&req).expect("fallback never propagates outages");

    // Then: The synthetic minute walk is returned in place of upstream data
    assert_eq!(source.id(), SourceId::Fallback);
    assert!(series.is_synthetic());
    assert_eq!(series.interval(), Interval::Minute);
    assert_eq!(series.len(), 2 * 376);
}

#[test]
fn live_upstream_data_is_passed_through_untouched() {
    // Given: A Yahoo source with a healthy transport
    let source = FallbackSource::new(
        YahooSource::with_http_client(Arc::new(ScriptedHttpClient::new(Ok(
            HttpResponse::ok_json(CHART_BODY),
        )))),
        SyntheticSource::default(),
    );
    let req = request("INFY.NS", date(2014, 7, 1), date(2014, 7, 4), Interval::Daily);

    // When: The series is fetched
    let series = source.fetch(&req).expect("upstream rows");

    // Then: No substitution happens
    assert!(!series.is_synthetic());
    assert_eq!(series.len(), 3);
}
