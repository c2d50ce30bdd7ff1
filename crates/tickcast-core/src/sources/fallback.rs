use tracing::warn;

use crate::data_source::{SeriesSource, SourceError, SourceId};
use crate::sources::SyntheticSource;
use crate::{SeriesRequest, TimeSeries};

/// Primary source with a deterministic synthetic substitute.
///
/// When the primary fails or returns no rows, the failure is logged and the
/// synthetic series for the same request is returned instead. Upstream
/// unavailability never propagates past this type.
#[derive(Debug, Clone)]
pub struct FallbackSource<P> {
    primary: P,
    synthetic: SyntheticSource,
}

impl<P: SeriesSource> FallbackSource<P> {
    pub fn new(primary: P, synthetic: SyntheticSource) -> Self {
        Self { primary, synthetic }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }
}

impl<P: SeriesSource> SeriesSource for FallbackSource<P> {
    fn id(&self) -> SourceId {
        SourceId::Fallback
    }

    fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        let series = self.primary.fetch_or_empty(req);
        if !series.is_empty() {
            return Ok(series);
        }

        warn!(
            primary = %self.primary.id(),
            symbol = %req.symbol,
            range = %req.range_label(),
            "no upstream data, substituting synthetic series"
        );
        self.synthetic.fetch(req)
    }
}
