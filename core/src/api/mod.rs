//! Wire formats of the gallery backend and the transport seam used to reach it.
//!
//! Every `parse_*` function is total: a body that does not have the expected shape degrades to an
//! empty result instead of an error, so a misbehaving server can never take the viewer down.

mod backend;
mod wire;

pub use backend::{Backend, FetchResult};
pub use wire::{
    ListingResponse, MetadataResponse, RatingRequest, RatingResponse, RawPhoto, SearchHit,
    SearchResponse, Subdirectory,
};

use tracing::warn;

use crate::catalog::PhotoMetadata;

/// Decode a `/api/photos` body. Malformed bodies become an empty listing.
pub fn parse_listing(body: &[u8]) -> ListingResponse {
    match serde_json::from_slice::<ListingResponse>(body) {
        Ok(listing) => listing,
        Err(err) => {
            warn!(target: "api", "malformed photo listing: {err}");
            ListingResponse::default()
        }
    }
}

/// Decode a `/api/search` body. Both `results` and `photos` arrays are accepted.
pub fn parse_search(body: &[u8]) -> SearchResponse {
    match serde_json::from_slice::<SearchResponse>(body) {
        Ok(response) => response,
        Err(err) => {
            warn!(target: "api", "malformed search response: {err}");
            SearchResponse::default()
        }
    }
}

/// Decode a `/api/photo_metadata` body into the display model.
pub fn parse_metadata(body: &[u8]) -> PhotoMetadata {
    match serde_json::from_slice::<MetadataResponse>(body) {
        Ok(response) => PhotoMetadata::from(response),
        Err(err) => {
            warn!(target: "api", "malformed metadata response: {err}");
            PhotoMetadata::default()
        }
    }
}

/// Decode a `/api/photo_rating` reply. Anything unreadable counts as a failed update.
pub fn parse_rating(body: &[u8]) -> RatingResponse {
    serde_json::from_slice::<RatingResponse>(body).unwrap_or_else(|err| RatingResponse {
        success: false,
        error: Some(format!("malformed rating response: {err}")),
    })
}
