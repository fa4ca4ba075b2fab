//! Normalised photo records and the metadata display model.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::api::{MetadataResponse, RawPhoto};

/// Metadata key the backend uses for star ratings.
pub const RATING_KEY: &str = "星级";

pub const MAX_RATING: u8 = 5;

/// A photo as the viewer sees it. Produced once per directory load by [`normalize_photo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    /// Server-side identifier with `/` separators. Doubles as the cache key.
    pub path: String,
    pub name: String,
    /// `YYYY-MM-DD HH:MM:SS` as sent by the server; compares chronologically as a string.
    pub modified: String,
    pub capture_date: Option<String>,
    pub rating: Option<u8>,
    pub metadata: BTreeMap<String, Value>,
}

impl Photo {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            modified: String::new(),
            capture_date: None,
            rating: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Copy of this photo carrying a confirmed rating.
    pub fn with_rating(&self, rating: u8) -> Self {
        let rating = rating.min(MAX_RATING);
        let mut updated = self.clone();
        updated.rating = Some(rating);
        updated.metadata.insert(RATING_KEY.to_string(), Value::from(rating));
        updated
    }
}

/// Turn a loosely typed listing entry into a [`Photo`]. Entries without a path are dropped.
pub fn normalize_photo(raw: RawPhoto) -> Option<Photo> {
    let path = normalize_path(raw.path.as_deref()?);
    if path.is_empty() {
        return None;
    }

    let name = raw
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| file_name(&path).to_string());

    let metadata = raw.metadata.unwrap_or_default();
    let rating = raw
        .rating
        .as_ref()
        .and_then(rating_from_value)
        .or_else(|| metadata.get(RATING_KEY).and_then(rating_from_value));

    Some(Photo {
        path,
        name,
        modified: raw.modified.as_ref().and_then(text_from_value).unwrap_or_default(),
        capture_date: raw.capture_date.as_ref().and_then(text_from_value),
        rating,
        metadata,
    })
}

/// Unify separators and strip redundant slashes so the same file always maps to one key.
pub fn normalize_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let mut out = String::with_capacity(unified.len());
    let mut previous_slash = false;
    for (idx, ch) in unified.char_indices() {
        if ch == '/' {
            // Keep a leading `//` so UNC style roots survive.
            if previous_slash && idx > 1 {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn rating_from_value(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, MAX_RATING as f64) as u8)
}

/// Lightbox metadata panel contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhotoMetadata {
    pub name: String,
    pub modified: Option<String>,
    pub size: Option<u64>,
    pub capture_date: Option<String>,
    pub camera: Option<String>,
    pub aperture: Option<String>,
    pub exposure: Option<String>,
    pub iso: Option<String>,
    pub focal_length: Option<String>,
    pub rating: u8,
    /// Flattened EXIF tags (`section.tag` for nested sections).
    pub exif: BTreeMap<String, String>,
}

impl PhotoMetadata {
    /// Capture date when known, else the modification time.
    pub fn display_date(&self) -> Option<&str> {
        self.capture_date.as_deref().or(self.modified.as_deref())
    }

    pub fn size_label(&self) -> Option<String> {
        self.size.map(format_file_size)
    }
}

impl From<MetadataResponse> for PhotoMetadata {
    fn from(response: MetadataResponse) -> Self {
        let basic = response.basic.unwrap_or_default();
        let custom = response.custom.unwrap_or_default();
        let exif = flatten_exif(&response.exif);

        let lookup = |keys: &[&str]| keys.iter().find_map(|key| exif.get(*key).cloned());

        let make = lookup(&["相机厂商", "image.Make", "Make"]);
        let model = lookup(&["相机型号", "image.Model", "Model"]);
        let camera = match (make, model) {
            (Some(make), Some(model)) => Some(format!("{make} {model}")),
            (make, model) => make.or(model),
        };

        let rating = response
            .star_rating
            .as_ref()
            .and_then(rating_from_value)
            .or_else(|| custom.get("star_rating").and_then(rating_from_value))
            .unwrap_or(0);

        Self {
            name: response
                .name
                .or_else(|| basic.get("name").and_then(text_from_value))
                .unwrap_or_default(),
            modified: response.modified.or_else(|| basic.get("modified").and_then(text_from_value)),
            size: response.size.or_else(|| basic.get("size").and_then(Value::as_u64)),
            capture_date: lookup(&["拍摄日期", "exif.DateTimeOriginal", "DateTimeOriginal"]),
            camera,
            aperture: lookup(&["光圈", "exif.FNumber", "FNumber"]),
            exposure: lookup(&["曝光时间", "exif.ExposureTime", "ExposureTime"]),
            iso: lookup(&["ISO", "exif.ISOSpeedRatings", "ISOSpeedRatings"]),
            focal_length: lookup(&["焦距", "exif.FocalLength", "FocalLength"]),
            rating,
            exif,
        }
    }
}

fn flatten_exif(exif: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (key, value) in exif {
        match value {
            Value::Object(section) => {
                for (tag, inner) in section {
                    flat.insert(format!("{key}.{tag}"), render_value(inner));
                }
            }
            other => {
                flat.insert(key.clone(), render_value(other));
            }
        }
    }
    flat
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        // Rationals arrive as `[numerator, denominator]`.
        Value::Array(parts) if parts.len() == 2 => match (parts[0].as_f64(), parts[1].as_f64()) {
            (Some(num), Some(den)) if den != 0.0 => {
                let ratio = num / den;
                if ratio < 1.0 && num != 0.0 { format!("{num}/{den}") } else { format!("{ratio}") }
            }
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

/// Human readable byte count (`1.50 MB`).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawPhoto {
        serde_json::from_value(value).expect("raw photo")
    }

    #[test]
    fn normalizes_windows_separators() {
        let photo = normalize_photo(raw(json!({ "path": "D:\\Photos\\\\2023\\a.jpg" }))).unwrap();
        assert_eq!(photo.path, "D:/Photos/2023/a.jpg");
        assert_eq!(photo.name, "a.jpg");
    }

    #[test]
    fn drops_entries_without_path() {
        assert!(normalize_photo(raw(json!({ "name": "orphan.jpg" }))).is_none());
        assert!(normalize_photo(raw(json!({ "path": "  " }))).is_none());
    }

    #[test]
    fn reads_rating_from_metadata_and_clamps() {
        let photo =
            normalize_photo(raw(json!({ "path": "a.jpg", "metadata": { "星级": 9 } }))).unwrap();
        assert_eq!(photo.rating, Some(5));

        let photo = normalize_photo(raw(json!({ "path": "b.jpg", "rating": "3" }))).unwrap();
        assert_eq!(photo.rating, Some(3));
    }

    #[test]
    fn with_rating_updates_metadata() {
        let photo = Photo::new("a.jpg", "a.jpg").with_rating(4);
        assert_eq!(photo.rating, Some(4));
        assert_eq!(photo.metadata.get(RATING_KEY), Some(&Value::from(4u8)));
    }

    #[test]
    fn metadata_from_nested_response() {
        let response: MetadataResponse = serde_json::from_value(json!({
            "basic": { "name": "a.jpg", "size": 2_621_440, "modified": "2023-05-01 10:00:00" },
            "exif": {
                "image": { "Make": "FUJIFILM", "Model": "X-T4" },
                "exif": { "FNumber": [28, 10], "ExposureTime": [1, 250] }
            },
            "custom": { "star_rating": 2 }
        }))
        .unwrap();

        let meta = PhotoMetadata::from(response);
        assert_eq!(meta.name, "a.jpg");
        assert_eq!(meta.camera.as_deref(), Some("FUJIFILM X-T4"));
        assert_eq!(meta.aperture.as_deref(), Some("2.8"));
        assert_eq!(meta.exposure.as_deref(), Some("1/250"));
        assert_eq!(meta.rating, 2);
        assert_eq!(meta.size_label().as_deref(), Some("2.50 MB"));
        assert_eq!(meta.display_date(), Some("2023-05-01 10:00:00"));
    }

    #[test]
    fn metadata_from_flat_response() {
        let response: MetadataResponse = serde_json::from_value(json!({
            "name": "b.jpg",
            "exif": { "拍摄日期": "2022:12:24 18:00:00", "相机型号": "X100V" },
            "星级": 5
        }))
        .unwrap();

        let meta = PhotoMetadata::from(response);
        assert_eq!(meta.display_date(), Some("2022:12:24 18:00:00"));
        assert_eq!(meta.camera.as_deref(), Some("X100V"));
        assert_eq!(meta.rating, 5);
    }

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
    }
}
