//! JSON records exchanged with the backend endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of `GET /api/photos`. Fields are kept loose; [`crate::catalog::normalize_photo`]
/// is the only place that interprets them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawPhoto {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modified: Option<Value>,
    #[serde(default, alias = "capture_date", rename = "captureDate")]
    pub capture_date: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Subdirectory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub has_images: bool,
}

/// `GET /api/photos?dir=<path>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub photos: Vec<RawPhoto>,
    #[serde(default)]
    pub subdirectories: Vec<Subdirectory>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/photo_metadata/<path>`.
///
/// Accepts both the flat shape (`name`, `modified`, `size`, `星级`) and the nested one the
/// server emits (`basic.*`, `custom.star_rating`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MetadataResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub exif: BTreeMap<String, Value>,
    #[serde(default, rename = "星级")]
    pub star_rating: Option<Value>,
    #[serde(default)]
    pub basic: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub custom: Option<BTreeMap<String, Value>>,
}

/// `POST /api/photo_rating` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRequest {
    pub file_path: String,
    pub rating: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RatingResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchHit {
    pub path: String,
    #[serde(default)]
    pub name: String,
}

/// `GET /api/search?query=<text>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default, alias = "photos")]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub error: Option<String>,
}
