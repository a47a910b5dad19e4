//! The fetch → coerce → decode → transform → emit path shared by all reports.

use crate::{
    coerce::decode,
    collector::{
        Collector,
        CollectorContext,
    },
    error::{
        CollectorError,
        SampleError,
    },
    fetch::Fetch,
    sample::{
        Sample,
        SampleSink,
    },
};
use jellyfin_exporter_config::Connection;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Deserializer,
};
use std::{
    future::Future,
    pin::Pin,
};
use tracing::{
    Instrument as _,
    Span,
};

/// A report backed by a single API endpoint.
pub trait Report: Send + Sync + 'static {
    /// Shape the endpoint's body is decoded into.
    type Payload: DeserializeOwned + Send;

    const NAME: &'static str;

    /// Path relative to the server base URL, including any query string.
    fn endpoint(&self) -> String;

    /// Derives samples from a decoded payload, in record order.
    fn samples(&self, payload: Self::Payload) -> Result<Vec<Sample>, SampleError>;
}

/// Runs a [`Report`] as a [`Collector`].
pub struct ReportCollector<R> {
    report: R,
    context: CollectorContext,
    span: Span,
}

impl<R: Report> ReportCollector<R> {
    pub fn new(report: R, context: &CollectorContext) -> Self {
        Self {
            report,
            context: context.clone(),
            span: info_span!("collector", name = R::NAME),
        }
    }

    pub fn report(&self) -> &R {
        &self.report
    }
}

impl<R: Report> Collector for ReportCollector<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    fn update<'a>(
        &'a self,
        sink: &'a SampleSink,
    ) -> Pin<Box<dyn Future<Output = Result<(), CollectorError>> + Send + 'a>> {
        Box::pin(
            async move {
                let connection = self.context.resolver.resolve()?;
                let endpoint = self.report.endpoint();
                let payload = fetch_json(self.context.fetcher.as_ref(), &connection, &endpoint).await?;
                for sample in self.report.samples(payload)? {
                    sink.emit(sample)?;
                }
                Ok(())
            }
            .instrument(self.span.clone()),
        )
    }
}

/// Fetches `endpoint` and decodes the body into `T`, tagging failures with the endpoint.
pub async fn fetch_json<T: DeserializeOwned>(
    fetcher: &dyn Fetch,
    connection: &Connection,
    endpoint: &str,
) -> Result<T, CollectorError> {
    let url = connection.endpoint(endpoint);
    let raw = fetcher.fetch(&url, &connection.token).await;
    decode(raw).map_err(|err| CollectorError::upstream(endpoint, err))
}

/// Deserializes `null` the same way as a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coerce::RawResponse,
        sample::Descriptor,
        test_support::{
            context,
            drain,
            FakeFetch,
        },
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    struct Names {
        desc: Arc<Descriptor>,
    }

    impl Report for Names {
        type Payload = Vec<String>;

        const NAME: &'static str = "names";

        fn endpoint(&self) -> String {
            "Names?limit=2".to_string()
        }

        fn samples(&self, payload: Self::Payload) -> Result<Vec<Sample>, SampleError> {
            payload
                .into_iter()
                .map(|name| Sample::gauge(&self.desc, 1.0, vec![name]))
                .collect()
        }
    }

    fn names(context: &CollectorContext) -> ReportCollector<Names> {
        let desc = Descriptor::new("test", "name", "Names.", &["name"]);
        ReportCollector::new(Names { desc }, context)
    }

    #[tokio::test]
    async fn emits_samples_in_record_order() {
        let fetch = FakeFetch::default().route("Names?limit=2", RawResponse::Json(json!(["b", "a"])));
        let collector = names(&context(fetch, true));
        let (sink, mut rx) = SampleSink::channel();

        collector.update(&sink).await.unwrap();
        drop(sink);

        let labels: Vec<_> = drain(&mut rx).iter().map(|s| s.label_values()[0].clone()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn config_error_skips_fetch() {
        let fetch = FakeFetch::default();
        let calls = fetch.calls();
        let collector = names(&context(fetch, false));
        let (sink, _rx) = SampleSink::channel();

        let err = collector.update(&sink).await.unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_error_names_the_endpoint() {
        let fetch = FakeFetch::default().route("Names?limit=2", RawResponse::Failed("503".to_string()));
        let collector = names(&context(fetch, true));
        let (sink, _rx) = SampleSink::channel();

        let err = collector.update(&sink).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected response from Names?limit=2: request failed: 503"
        );
    }

    #[test]
    fn nullable_treats_null_as_default() {
        #[derive(Deserialize)]
        struct Item {
            #[serde(default, deserialize_with = "nullable")]
            name: String,
        }
        let item: Item = serde_json::from_value(json!({ "name": null })).unwrap();
        assert_eq!(item.name, "");
        let item: Item = serde_json::from_value(json!({})).unwrap();
        assert_eq!(item.name, "");
    }
}
