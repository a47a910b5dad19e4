//! # Jellyfin Exporter Collectors
//!
//! Polls the Jellyfin HTTP API and turns selected fields into Prometheus samples.
//!
//! ## Architecture
//!
//! - **`registry`**: name → constructor table with per-collector enabled defaults
//! - **`collector`**: the [`Collector`] contract every report implements
//! - **`pipeline`**: shared fetch → coerce → decode → transform → emit path
//! - **`coerce`**: normalizes loosely-typed fetch results into JSON bytes
//! - **`collectors`**: the `activity`, `media`, `playing` and `users` reports
//! - **`scrape`**: runs the enabled collectors once per scrape, isolating failures
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run(settings: jellyfin_exporter_config::JellyfinSettings) -> Result<(), Box<dyn std::error::Error>> {
//! use jellyfin_exporter_collector::{CollectorContext, CollectorRegistry, HttpFetcher, Scraper};
//! use std::{collections::BTreeMap, sync::Arc};
//!
//! let fetcher = Arc::new(HttpFetcher::new(settings.timeout)?);
//! let context = CollectorContext::new(fetcher, Arc::new(settings), 30);
//! let collectors = CollectorRegistry::with_builtin()?.build(&BTreeMap::new(), &context)?;
//! let samples = Scraper::new(collectors).scrape().await;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod coerce;
pub mod collector;
pub mod collectors;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod registry;
pub mod sample;
pub mod scrape;

#[cfg(test)]
mod test_support;

pub use coerce::{
    coerce_to_json_bytes,
    CoercionError,
    RawResponse,
};
pub use collector::{
    Collector,
    CollectorContext,
};
pub use error::{
    CollectorError,
    SampleError,
    UpstreamError,
};
pub use fetch::{
    Fetch,
    HttpFetcher,
};
pub use pipeline::{
    Report,
    ReportCollector,
};
pub use registry::{
    CollectorRegistry,
    Constructor,
    Registration,
    RegistryError,
};
pub use sample::{
    Descriptor,
    Sample,
    SampleSink,
    ValueKind,
};
pub use scrape::Scraper;
