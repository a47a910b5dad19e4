use crate::{
    coerce::RawResponse,
    collector::CollectorContext,
    fetch::Fetch,
    sample::Sample,
};
use jellyfin_exporter_config::{
    ConfigError,
    Connection,
    ResolveConnection,
};
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        Mutex,
    },
};
use tokio::sync::mpsc::UnboundedReceiver;

pub(crate) const BASE_URL: &str = "http://jellyfin.test:8096";
pub(crate) const TOKEN: &str = "test-token";

/// Serves canned responses keyed by endpoint path and records every requested URL.
#[derive(Default)]
pub(crate) struct FakeFetch {
    routes: HashMap<String, RawResponse>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetch {
    pub(crate) fn route(mut self, endpoint: &str, response: RawResponse) -> Self {
        self.routes.insert(format!("{BASE_URL}/{endpoint}"), response);
        self
    }

    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

impl Fetch for FakeFetch {
    fn fetch<'a>(&'a self, url: &'a str, token: &'a str) -> Pin<Box<dyn Future<Output = RawResponse> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(url.to_string());
            if token != TOKEN {
                return RawResponse::Failed("401 Unauthorized".to_string());
            }
            self.routes
                .get(url)
                .cloned()
                .unwrap_or_else(|| RawResponse::Failed(format!("404 Not Found: {url}")))
        })
    }
}

pub(crate) struct StaticResolver(Option<Connection>);

impl ResolveConnection for StaticResolver {
    fn resolve(&self) -> Result<Connection, ConfigError> {
        self.0.clone().ok_or(ConfigError::MissingUrl)
    }
}

pub(crate) fn context(fetch: FakeFetch, resolvable: bool) -> CollectorContext {
    let connection = resolvable.then(|| Connection::new(url::Url::parse(BASE_URL).unwrap(), TOKEN));
    CollectorContext::new(Arc::new(fetch), Arc::new(StaticResolver(connection)), 7)
}

pub(crate) fn drain(rx: &mut UnboundedReceiver<Sample>) -> Vec<Sample> {
    let mut samples = Vec::new();
    while let Ok(sample) = rx.try_recv() {
        samples.push(sample);
    }
    samples
}
