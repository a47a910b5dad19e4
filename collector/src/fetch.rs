use crate::coerce::RawResponse;
use reqwest::{
    header::AUTHORIZATION,
    Client,
};
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};

/// Performs a GET against the Jellyfin API.
///
/// Implementations do not fail; transport errors and non-success statuses are returned as
/// [`RawResponse::Failed`].
pub trait Fetch: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str, token: &'a str) -> Pin<Box<dyn Future<Output = RawResponse> + Send + 'a>>;
}

/// [`Fetch`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str, token: &'a str) -> Pin<Box<dyn Future<Output = RawResponse> + Send + 'a>> {
        Box::pin(async move {
            let response = match self
                .client
                .get(url)
                .header(AUTHORIZATION, format!("MediaBrowser Token=\"{token}\""))
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => return RawResponse::Failed(err.to_string()),
            };

            let status = response.status();
            if !status.is_success() {
                return RawResponse::Failed(format!("server returned {status}"));
            }

            match response.bytes().await {
                Ok(body) => {
                    trace!(url, bytes = body.len(), "fetched");
                    RawResponse::Bytes(body.to_vec())
                }
                Err(err) => RawResponse::Failed(err.to_string()),
            }
        })
    }
}
