use crate::scrapers::traits::PageSource;
use crate::scrapers::types::FetchParams;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::{debug, warn};

/// A fetched listing page, parsed and ready for the signal extractors
pub struct ParsedPage {
    document: Html,
}

impl ParsedPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }
}

/// Plain HTTP GET fetcher. No retries, no caching, client-default headers.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn with_params(params: FetchParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch_page(&self, url: &str) -> Option<String> {
        debug!("Fetching URL: {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "Fetch failed");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            warn!(url, status = %response.status(), "Unexpected status");
            return None;
        }

        match response.text().await {
            Ok(body) => {
                debug!("Downloaded {} bytes of HTML from {}", body.len(), url);
                Some(body)
            }
            Err(e) => {
                warn!(url, error = %e, "Failed to read response body");
                None
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "HTTP"
    }
}

/// Fetch and parse a page in one go
pub async fn fetch<S: PageSource + ?Sized>(source: &S, url: &str) -> Option<ParsedPage> {
    source.fetch_page(url).await.map(|body| ParsedPage::parse(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn returns_body_on_200() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/listing")
            .with_status(200)
            .with_body("<html><body><h1>Villa</h1></body></html>")
            .create_async()
            .await;

        let fetcher = HttpPageFetcher::with_params(FetchParams::default()).unwrap();
        let url = format!("{}/listing", server.url());

        let page = fetch(&fetcher, &url).await;
        assert!(page.is_some(), "200 response should produce a page");
    }

    #[tokio::test]
    async fn non_200_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _missing = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("<h1>gone</h1>")
            .create_async()
            .await;
        let _created = server
            .mock("GET", "/created")
            .with_status(201)
            .with_body("<h1>made</h1>")
            .create_async()
            .await;

        let fetcher = HttpPageFetcher::with_params(FetchParams::default()).unwrap();

        assert!(fetcher
            .fetch_page(&format!("{}/missing", server.url()))
            .await
            .is_none());
        assert!(
            fetcher
                .fetch_page(&format!("{}/created", server.url()))
                .await
                .is_none(),
            "only status 200 counts as success"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_none() {
        let fetcher = HttpPageFetcher::with_params(FetchParams {
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        assert!(fetcher.fetch_page("http://127.0.0.1:1/").await.is_none());
        assert!(fetcher.fetch_page("httpnotaurl").await.is_none());
    }
}
