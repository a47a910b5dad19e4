use crate::{
    error::CollectorError,
    fetch::Fetch,
    sample::SampleSink,
};
use jellyfin_exporter_config::ResolveConnection;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};

/// A unit that fetches one report from the Jellyfin API and turns it into samples.
///
/// Instances are built once at startup and reused for every scrape, so `update` must not rely
/// on state from a previous call.
pub trait Collector: Send + Sync {
    /// Registry name, e.g. `"playing"`.
    fn name(&self) -> &'static str;

    /// Runs one scrape for this collector, emitting onto `sink`.
    fn update<'a>(
        &'a self,
        sink: &'a SampleSink,
    ) -> Pin<Box<dyn Future<Output = Result<(), CollectorError>> + Send + 'a>>;
}

/// What a collector constructor gets handed at startup.
#[derive(Clone)]
pub struct CollectorContext {
    pub fetcher: Arc<dyn Fetch>,
    pub resolver: Arc<dyn ResolveConnection>,
    /// Search window of the Playback Reporting activity report.
    pub activity_days: u32,
}

impl CollectorContext {
    pub fn new(fetcher: Arc<dyn Fetch>, resolver: Arc<dyn ResolveConnection>, activity_days: u32) -> Self {
        Self {
            fetcher,
            resolver,
            activity_days,
        }
    }
}

impl std::fmt::Debug for CollectorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorContext")
            .field("activity_days", &self.activity_days)
            .finish_non_exhaustive()
    }
}
