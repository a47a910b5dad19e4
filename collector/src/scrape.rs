use crate::{
    collector::Collector,
    sample::{
        Descriptor,
        Sample,
        SampleSink,
    },
};
use futures::future::join_all;
use std::{
    sync::Arc,
    time::Instant,
};

/// Runs every enabled collector once per scrape.
///
/// Collectors run concurrently and independently: a failing collector is logged and reported
/// through `jellyfin_scrape_collector_success`, the others are unaffected.
pub struct Scraper {
    collectors: Vec<Arc<dyn Collector>>,
    duration: Arc<Descriptor>,
    success: Arc<Descriptor>,
}

impl Scraper {
    pub fn new(collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self {
            collectors,
            duration: Descriptor::new(
                "scrape",
                "collector_duration_seconds",
                "jellyfin_exporter: Duration of a collector scrape.",
                &["collector"],
            ),
            success: Descriptor::new(
                "scrape",
                "collector_success",
                "jellyfin_exporter: Whether a collector succeeded.",
                &["collector"],
            ),
        }
    }

    pub fn collector_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.collectors.iter().map(|c| c.name())
    }

    pub async fn scrape(&self) -> Vec<Sample> {
        let (sink, mut rx) = SampleSink::channel();
        join_all(self.collectors.iter().map(|collector| self.run(collector.as_ref(), &sink))).await;
        drop(sink);

        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }
        samples
    }

    async fn run(&self, collector: &dyn Collector, sink: &SampleSink) {
        let name = collector.name();
        let start = Instant::now();
        let result = collector.update(sink).await;
        let elapsed = start.elapsed().as_secs_f64();

        let success = match result {
            Ok(()) => {
                debug!(collector = name, duration_seconds = elapsed, "collector succeeded");
                1.0
            }
            Err(err) => {
                error!(collector = name, duration_seconds = elapsed, error = %err, "collector failed");
                0.0
            }
        };

        let meta = [
            Sample::gauge(&self.duration, elapsed, vec![name.to_string()]),
            Sample::gauge(&self.success, success, vec![name.to_string()]),
        ];
        for sample in meta {
            if let Err(err) = sample.and_then(|sample| sink.emit(sample)) {
                warn!(collector = name, error = %err, "dropping scrape metadata");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coerce::RawResponse,
        collectors,
        error::CollectorError,
        test_support::{
            context,
            FakeFetch,
        },
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::{
        future::Future,
        pin::Pin,
    };

    struct Broken;

    impl Collector for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn update<'a>(
            &'a self,
            _sink: &'a SampleSink,
        ) -> Pin<Box<dyn Future<Output = Result<(), CollectorError>> + Send + 'a>> {
            Box::pin(async { Err(CollectorError::Config(jellyfin_exporter_config::ConfigError::MissingToken)) })
        }
    }

    fn success_of(samples: &[Sample], collector: &str) -> Option<f64> {
        samples
            .iter()
            .find(|s| {
                s.descriptor().fq_name() == "jellyfin_scrape_collector_success" && s.label("collector") == Some(collector)
            })
            .map(|s| s.value())
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_others() {
        let fetch = FakeFetch::default().route("Items/Counts", RawResponse::Json(json!({ "MovieCount": 5 })));
        let ctx = context(fetch, true);
        let scraper = Scraper::new(vec![Arc::new(Broken) as Arc<dyn Collector>, collectors::media::new(&ctx)]);

        let samples = scraper.scrape().await;

        assert_eq!(success_of(&samples, "broken"), Some(0.0));
        assert_eq!(success_of(&samples, "media"), Some(1.0));
        let media: Vec<_> = samples
            .iter()
            .filter(|s| s.descriptor().fq_name() == "jellyfin_media_count")
            .map(|s| (s.label("type").unwrap().to_string(), s.value()))
            .collect();
        assert_eq!(media, vec![("Movie".to_string(), 5.0)]);
    }

    #[tokio::test]
    async fn upstream_failure_is_isolated_too() {
        let fetch = FakeFetch::default().route("Items/Counts", RawResponse::Json(json!({ "MovieCount": 1 })));
        let ctx = context(fetch, true);
        let scraper = Scraper::new(vec![collectors::playing::new(&ctx), collectors::media::new(&ctx)]);

        let samples = scraper.scrape().await;

        assert_eq!(success_of(&samples, "playing"), Some(0.0));
        assert_eq!(success_of(&samples, "media"), Some(1.0));
        assert_eq!(scraper.collector_names().collect::<Vec<_>>(), vec!["playing", "media"]);
    }

    #[tokio::test]
    async fn every_collector_reports_a_duration() {
        let scraper = Scraper::new(vec![Arc::new(Broken) as Arc<dyn Collector>]);
        let samples = scraper.scrape().await;
        let durations: Vec<_> = samples
            .iter()
            .filter(|s| s.descriptor().fq_name() == "jellyfin_scrape_collector_duration_seconds")
            .collect();
        assert_eq!(durations.len(), 1);
        assert!(durations[0].value() >= 0.0);
    }
}
