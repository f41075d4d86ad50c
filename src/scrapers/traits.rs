use async_trait::async_trait;

/// Common trait for anything that can hand back the HTML of a listing page.
/// The HTTP fetcher is the production source; tests plug in canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page body. `None` for any network error, timeout or a
    /// status other than 200.
    async fn fetch_page(&self, url: &str) -> Option<String>;

    /// Get the name of the page source
    fn source_name(&self) -> &'static str;
}
