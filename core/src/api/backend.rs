//! Transport seam implemented by the embedder (browser `fetch`, an HTTP client, a test double).

use crate::error::FetchError;

pub type FetchResult = std::result::Result<Vec<u8>, FetchError>;

/// Blocking view of the gallery backend.
///
/// Implementations return the raw response body for 2xx responses and a [`FetchError`] for
/// everything else. The viewer never retries; failed requests degrade to placeholders.
pub trait Backend {
    /// `GET url`.
    fn get(&self, url: &str) -> FetchResult;

    /// `POST url` with a JSON body.
    fn post_json(&self, url: &str, body: &[u8]) -> FetchResult;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn get(&self, url: &str) -> FetchResult {
        (**self).get(url)
    }

    fn post_json(&self, url: &str, body: &[u8]) -> FetchResult {
        (**self).post_json(url, body)
    }
}
