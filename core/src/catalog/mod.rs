//! Directory listings turned into the photo sequence the viewer navigates.

mod photo;
mod sort;

pub use photo::{
    MAX_RATING, Photo, PhotoMetadata, RATING_KEY, format_file_size, normalize_path,
    normalize_photo,
};
pub use sort::{SortMode, Token, natural_cmp, sort_photos, tokenize};

use tracing::debug;

use crate::api::{ListingResponse, Subdirectory};

/// Outcome of ingesting one `/api/photos` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub directory: String,
    pub photos: Vec<Photo>,
    pub subdirectories: Vec<Subdirectory>,
    /// Error reported by the server, if any. The photo list is empty in that case.
    pub error: Option<String>,
}

impl Catalog {
    /// Normalise and sort a listing. This is the only place raw entries become [`Photo`]s.
    pub fn ingest(directory: impl Into<String>, listing: ListingResponse, sort: SortMode) -> Self {
        let directory = directory.into();
        if let Some(error) = listing.error {
            return Self { directory, error: Some(error), ..Self::default() };
        }

        let received = listing.photos.len();
        let mut photos: Vec<Photo> = listing.photos.into_iter().filter_map(normalize_photo).collect();
        sort_photos(&mut photos, sort);

        debug!(
            target: "catalog",
            directory = %directory,
            received,
            kept = photos.len(),
            "ingested listing"
        );

        Self { directory, photos, subdirectories: listing.subdirectories, error: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::parse_listing;

    #[test]
    fn ingest_filters_and_sorts() {
        let listing = parse_listing(
            br#"{
                "photos": [
                    {"path": "trip\\b.jpg", "name": "b.jpg", "modified": "2023-01-02 00:00:00"},
                    {"name": "broken"},
                    {"path": "trip/a.jpg", "name": "a.jpg", "modified": "2023-01-03 00:00:00"}
                ],
                "subdirectories": [{"name": "raw", "path": "trip/raw", "has_images": true}]
            }"#,
        );
        let catalog = Catalog::ingest("trip", listing, SortMode::Newest);

        let paths: Vec<&str> = catalog.photos.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["trip/a.jpg", "trip/b.jpg"]);
        assert_eq!(catalog.subdirectories.len(), 1);
    }

    #[test]
    fn server_error_yields_empty_catalog() {
        let listing = parse_listing(br#"{"error": "access denied", "photos": [{"path": "x"}]}"#);
        let catalog = Catalog::ingest("secret", listing, SortMode::Newest);
        assert!(catalog.photos.is_empty());
        assert_eq!(catalog.error.as_deref(), Some("access denied"));
    }
}
