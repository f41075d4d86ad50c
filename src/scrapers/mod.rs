pub mod dispatch;
pub mod fetcher;
pub mod signals;
pub mod traits;
pub mod types;

pub use fetcher::HttpPageFetcher;
pub use types::FetchParams;
