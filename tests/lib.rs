// Shared fixtures for the behaviour tests.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub use tickcast_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, Interval, PricePoint, SeriesRequest,
    SeriesSource, SourceError, SourceErrorKind, SourceId, Symbol, TimeSeries, UtcDateTime,
};
use time::{Date, Duration, Month, Time};

pub fn date(year: i32, month: u8, day: u8) -> Date {
    let month = Month::try_from(month).expect("valid month");
    Date::from_calendar_date(year, month, day).expect("valid date")
}

pub fn request(symbol: &str, start: Date, end: Date, interval: Interval) -> SeriesRequest {
    SeriesRequest::new(
        Symbol::parse(symbol).expect("valid symbol"),
        start,
        end,
        interval,
    )
    .expect("valid request")
}

/// `len` consecutive integers starting at `first`.
pub fn ramp(first: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| first + i as f64).collect()
}

/// In-memory source: one daily point per calendar day from the request start.
#[derive(Debug, Default)]
pub struct StaticSource {
    series: BTreeMap<String, Vec<f64>>,
    requests: RefCell<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, values: Vec<f64>) -> Self {
        self.series.insert(symbol.to_ascii_uppercase(), values);
        self
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl SeriesSource for StaticSource {
    fn id(&self) -> SourceId {
        SourceId::Synthetic
    }

    fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        self.requests.borrow_mut().push(req.symbol.to_string());
        let Some(values) = self.series.get(req.symbol.as_str()) else {
            return Err(SourceError::unavailable(format!("{} not scripted", req.symbol)));
        };
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let day = req.start + Duration::days(i as i64);
                PricePoint::new(UtcDateTime::at(day, Time::MIDNIGHT), value)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SourceError::internal(e.to_string()))?;
        TimeSeries::new(req.symbol.clone(), req.interval, points)
            .map_err(|e| SourceError::internal(e.to_string()))
    }
}

/// Transport returning one canned response and recording every URL.
#[derive(Debug)]
pub struct ScriptedHttpClient {
    response: Result<HttpResponse, HttpError>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new(response: Result<HttpResponse, HttpError>) -> Self {
        Self {
            response,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("lock").clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.urls.lock().expect("lock").push(request.url);
        self.response.clone()
    }
}
