use std::sync::Arc;

use serde::Deserialize;
use time::Duration;
use tracing::{debug, info};

use crate::data_source::{SeriesSource, SourceError, SourceId};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{Interval, PricePoint, SeriesRequest, TimeSeries, UtcDateTime};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart source for historical closing prices.
#[derive(Clone)]
pub struct YahooSource {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()))
    }
}

impl YahooSource {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(req: &SeriesRequest) -> String {
        let period1 = UtcDateTime::at(req.start, time::Time::MIDNIGHT).unix_timestamp();
        // period2 is exclusive upstream; extend by a day so `end` is included.
        let period2 = UtcDateTime::at(req.end, time::Time::MIDNIGHT).unix_timestamp()
            + Duration::days(1).whole_seconds();

        format!(
            "{}/{}?period1={}&period2={}&interval={}&includePrePost=false",
            CHART_ENDPOINT,
            urlencoding::encode(req.symbol.as_str()),
            period1,
            period2,
            yahoo_interval(req.interval),
        )
    }

    fn parse_chart(&self, req: &SeriesRequest, body: &str) -> Result<TimeSeries, SourceError> {
        let chart_response: YahooChartResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

        if let Some(error) = &chart_response.chart.error {
            return Err(SourceError::unavailable(format!(
                "yahoo chart API error: {}: {}",
                error.code, error.description
            )));
        }

        let Some(result) = chart_response
            .chart
            .result
            .as_ref()
            .and_then(|results| results.first())
        else {
            return Err(SourceError::unavailable("no chart data in response"));
        };

        let timestamps = result.timestamp.as_deref().unwrap_or_default();
        let closes = result
            .indicators
            .quote
            .first()
            .map(|quote| quote.close.as_slice())
            .unwrap_or_default();

        let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());
        let mut dropped = 0_usize;
        for (&ts_value, &close) in timestamps.iter().zip(closes) {
            let Some(close) = close.filter(|value| value.is_finite()) else {
                dropped += 1;
                continue;
            };
            let ts = UtcDateTime::from_unix_timestamp(ts_value)
                .map_err(|e| SourceError::internal(e.to_string()))?;
            // Yahoo occasionally repeats the live bar; keep the first occurrence.
            if points.last().is_some_and(|last| last.ts >= ts) {
                dropped += 1;
                continue;
            }
            let point = PricePoint::new(ts, close).map_err(|e| SourceError::internal(e.to_string()))?;
            points.push(point);
        }

        if dropped > 0 {
            debug!(symbol = %req.symbol, dropped, "dropped incomplete or duplicate yahoo rows");
        }

        if points.is_empty() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned no rows for {} in {}",
                req.symbol,
                req.range_label()
            )));
        }

        TimeSeries::new(req.symbol.clone(), req.interval, points)
            .map_err(|e| SourceError::internal(e.to_string()))
    }
}

impl SeriesSource for YahooSource {
    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }

    fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        info!(
            symbol = %req.symbol,
            range = %req.range_label(),
            interval = %req.interval,
            "fetching yahoo chart"
        );

        let request = HttpRequest::get(Self::chart_url(req))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).map_err(|e| {
            if e.timed_out() {
                SourceError::unavailable(format!("yahoo timed out after {} ms", self.timeout_ms))
            } else {
                SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
            }
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        let series = self.parse_chart(req, &response.body)?;
        info!(symbol = %req.symbol, points = series.len(), "fetched yahoo chart");
        Ok(series)
    }
}

const fn yahoo_interval(interval: Interval) -> &'static str {
    match interval {
        Interval::Minute => "1m",
        Interval::Daily => "1d",
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
