//! URL construction for every backend endpoint the viewer talks to.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::types::{ImageKey, Variant};

/// Characters `encodeURIComponent` leaves untouched.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Picks the URL variant for a photo and decides when a cache-busting token is needed.
///
/// The resolver remembers the last path/variant it handed to the lightbox. Re-requesting that
/// same path under a different variant (the original toggle) appends `?t=<ms>` so the browser does
/// not serve the previously displayed resolution from its cache.
#[derive(Debug, Clone, Default)]
pub struct ImageSourceResolver {
    base: String,
    last_viewer: Option<ImageKey>,
}

impl ImageSourceResolver {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base, last_viewer: None }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Grid thumbnail. Never cache-busted.
    pub fn thumbnail_url(&self, path: &str) -> String {
        self.url(&ImageKey::new(path, Variant::Thumbnail))
    }

    /// Plain URL for a variant, as used by preloading.
    pub fn url(&self, key: &ImageKey) -> String {
        let endpoint = match key.variant {
            Variant::Thumbnail => "thumbnail",
            Variant::Preview => "viewer_image",
            Variant::Original => "photo",
        };
        format!("{}/api/{endpoint}/{}", self.base, encode_component(&key.path))
    }

    /// URL for the lightbox image, recording it as the currently displayed source.
    pub fn viewer_url(&mut self, path: &str, original_mode: bool, now_ms: u64) -> String {
        let key = ImageKey::new(path, Variant::for_viewer(original_mode));
        let toggled = self
            .last_viewer
            .as_ref()
            .is_some_and(|last| last.path == key.path && last.variant != key.variant);

        let mut url = self.url(&key);
        if toggled {
            url.push_str(&format!("?t={now_ms}"));
        }
        self.last_viewer = Some(key);
        url
    }

    /// Forget the displayed source, e.g. when the lightbox closes.
    pub fn reset(&mut self) {
        self.last_viewer = None;
    }

    pub fn download_url(&self, path: &str) -> String {
        self.url(&ImageKey::new(path, Variant::Original))
    }

    pub fn listing_url(&self, directory: &str) -> String {
        format!("{}/api/photos?dir={}", self.base, encode_component(directory))
    }

    pub fn metadata_url(&self, path: &str) -> String {
        format!("{}/api/photo_metadata/{}", self.base, encode_component(path))
    }

    pub fn rating_url(&self) -> String {
        format!("{}/api/photo_rating", self.base)
    }

    pub fn search_url(&self, query: &str) -> String {
        format!("{}/api/search?query={}", self.base, encode_component(query.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(encode_component("夏天/IMG 01(1).jpg"), "%E5%A4%8F%E5%A4%A9%2FIMG%2001(1).jpg");
    }

    #[test]
    fn variants_map_to_endpoints() {
        let resolver = ImageSourceResolver::new("http://nas:5000/");
        assert_eq!(resolver.thumbnail_url("a.jpg"), "http://nas:5000/api/thumbnail/a.jpg");
        assert_eq!(
            resolver.url(&ImageKey::new("a.jpg", Variant::Preview)),
            "http://nas:5000/api/viewer_image/a.jpg"
        );
        assert_eq!(resolver.download_url("a.jpg"), "http://nas:5000/api/photo/a.jpg");
    }

    #[test]
    fn cache_bust_only_after_toggle_on_same_path() {
        let mut resolver = ImageSourceResolver::default();
        assert_eq!(resolver.viewer_url("a.jpg", false, 1), "/api/viewer_image/a.jpg");
        assert_eq!(resolver.viewer_url("b.jpg", false, 2), "/api/viewer_image/b.jpg");
        assert_eq!(resolver.viewer_url("b.jpg", true, 3), "/api/photo/b.jpg?t=3");
        assert_eq!(resolver.viewer_url("b.jpg", false, 4), "/api/viewer_image/b.jpg?t=4");
        assert_eq!(resolver.viewer_url("c.jpg", false, 5), "/api/viewer_image/c.jpg");
    }

    #[test]
    fn query_urls_are_encoded() {
        let resolver = ImageSourceResolver::default();
        assert_eq!(resolver.search_url("  beach & sun "), "/api/search?query=beach%20%26%20sun");
        assert_eq!(resolver.listing_url("/mnt/photos"), "/api/photos?dir=%2Fmnt%2Fphotos");
    }
}
