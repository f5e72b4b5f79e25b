//! USGS GeoJSON summary feed schema and decoder
//!
//! These types mirror the feed document field for field so nothing is lost
//! when a payload is decoded. Optional fields tolerate being absent or
//! `null` and fall back to their zero value. The few fields the domain
//! projection requires (`mag`, `title`, `time`) stay as `Option` so that a
//! missing value is detected instead of turning into a zero.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{QuakeError, Result};

/// Deserializes `null` the same way as an absent field
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A complete feed document (`FeatureCollection`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedDocument {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub metadata: Metadata,
    #[serde(default, deserialize_with = "nullable")]
    pub features: Vec<Feature>,
    /// Bounding box: min lon, min lat, min depth, max lon, max lat, max depth
    #[serde(default, deserialize_with = "nullable")]
    pub bbox: Vec<f64>,
}

/// Feed-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Generation time in epoch milliseconds
    #[serde(default, deserialize_with = "nullable")]
    pub generated: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub api: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: u16,
    #[serde(default, deserialize_with = "nullable")]
    pub count: u32,
}

/// One earthquake record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub properties: Properties,
    #[serde(default, deserialize_with = "nullable")]
    pub geometry: Geometry,
}

/// Per-event properties as published by the feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// Magnitude (required for projection)
    #[serde(default)]
    pub mag: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub place: String,
    /// Origin time in epoch milliseconds (required for projection)
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub updated: i64,
    /// Timezone offset from UTC in minutes
    #[serde(default, deserialize_with = "nullable")]
    pub tz: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub detail: String,
    /// Number of "Did You Feel It?" reports
    #[serde(default, deserialize_with = "nullable")]
    pub felt: i32,
    /// Community decimal intensity
    #[serde(default, deserialize_with = "nullable")]
    pub cdi: f64,
    /// Modified Mercalli intensity
    #[serde(default, deserialize_with = "nullable")]
    pub mmi: f64,
    /// PAGER alert level (green, yellow, orange, red)
    #[serde(default, deserialize_with = "nullable")]
    pub alert: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable")]
    pub tsunami: i32,
    /// Significance score
    #[serde(default, deserialize_with = "nullable")]
    pub sig: i32,
    /// Network code of the preferred contributor
    #[serde(default, deserialize_with = "nullable")]
    pub net: String,
    #[serde(default, deserialize_with = "nullable")]
    pub code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ids: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sources: String,
    #[serde(default, deserialize_with = "nullable")]
    pub types: String,
    /// Number of seismic stations used
    #[serde(default, deserialize_with = "nullable")]
    pub nst: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub dmin: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub rms: f64,
    /// Largest azimuthal gap between stations, in degrees
    #[serde(default, deserialize_with = "nullable")]
    pub gap: f64,
    #[serde(rename = "magType", default, deserialize_with = "nullable")]
    pub mag_type: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    /// Human-readable summary (required for projection)
    #[serde(default)]
    pub title: Option<String>,
}

/// Point geometry
///
/// `coordinates` is positional: index 0 is longitude, 1 is latitude and 2 is
/// depth in kilometers. Never reorder it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub coordinates: Vec<f64>,
}

/// Decodes raw feed payloads into [`FeedDocument`]s
///
/// Stateless; passed into the pipeline explicitly rather than shared globally.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedDecoder;

impl FeedDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decodes a payload held in memory
    ///
    /// # Returns
    /// * `Ok(FeedDocument)` for a well-formed document
    /// * `Err(QuakeError::Decode)` if the payload is empty or malformed
    pub fn decode(&self, bytes: &[u8]) -> Result<FeedDocument> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(QuakeError::Decode("payload is empty".to_string()));
        }

        let document: FeedDocument = serde_json::from_slice(bytes)?;
        debug!(
            features = document.features.len(),
            count = document.metadata.count,
            "decoded feed document"
        );
        Ok(document)
    }

    /// Reads a whole file and decodes it
    ///
    /// A file that cannot be read is reported as a decode failure, since the
    /// caller asked for a document and none could be produced.
    pub fn decode_file(&self, path: &Path) -> Result<FeedDocument> {
        let bytes = fs::read(path).map_err(|e| {
            QuakeError::Decode(format!("cannot read {}: {}", path.display(), e))
        })?;
        self.decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {
            "generated": 1461400000000,
            "url": "http://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson",
            "title": "USGS All Earthquakes, Past Hour",
            "status": 200,
            "api": "1.5.2",
            "count": 1
        },
        "features": [{
            "type": "Feature",
            "properties": {
                "mag": 0.93,
                "place": "5km SSE of Hemet, CA",
                "time": 1461399067480,
                "updated": 1461399291110,
                "tz": -420,
                "felt": null,
                "cdi": null,
                "alert": null,
                "status": "automatic",
                "tsunami": 0,
                "sig": 13,
                "net": "ci",
                "magType": "ml",
                "type": "earthquake",
                "title": "M 0.9 - 5km SSE of Hemet, CA"
            },
            "geometry": {"type": "Point", "coordinates": [-116.9568333, 33.7033333, 15.06]},
            "id": "ci37335775"
        }],
        "bbox": [-116.9568333, 33.7033333, 15.06, -116.9568333, 33.7033333, 15.06]
    }"#;

    #[test]
    fn test_decode_full_document() {
        let doc = FeedDecoder::new().decode(SAMPLE.as_bytes()).unwrap();

        assert_eq!(doc.kind, "FeatureCollection");
        assert_eq!(doc.metadata.count, 1);
        assert_eq!(doc.metadata.status, 200);
        assert_eq!(doc.metadata.api, "1.5.2");
        assert_eq!(doc.bbox.len(), 6);

        let feature = &doc.features[0];
        assert_eq!(feature.id, "ci37335775");
        assert_eq!(feature.properties.mag, Some(0.93));
        assert_eq!(feature.properties.mag_type, "ml");
        assert_eq!(feature.properties.sig, 13);
        assert_eq!(feature.geometry.coordinates, vec![-116.9568333, 33.7033333, 15.06]);
    }

    #[test]
    fn test_null_optional_fields_become_zero_values() {
        let doc = FeedDecoder::new().decode(SAMPLE.as_bytes()).unwrap();
        let props = &doc.features[0].properties;

        assert_eq!(props.felt, 0);
        assert_eq!(props.cdi, 0.0);
        assert_eq!(props.alert, "");
        // absent entirely
        assert_eq!(props.mmi, 0.0);
        assert_eq!(props.detail, "");
    }

    #[test]
    fn test_missing_required_fields_stay_none() {
        let doc = FeedDecoder::new()
            .decode(br#"{"features": [{"id": "x", "properties": {"place": "nowhere"}}]}"#)
            .unwrap();
        let props = &doc.features[0].properties;

        assert!(props.mag.is_none());
        assert!(props.time.is_none());
        assert!(props.title.is_none());
        assert!(doc.features[0].geometry.coordinates.is_empty());
    }

    #[test]
    fn test_empty_payload_fails() {
        let err = FeedDecoder::new().decode(b"").unwrap_err();
        assert!(matches!(err, QuakeError::Decode(_)));

        let err = FeedDecoder::new().decode(b"  \n").unwrap_err();
        assert!(matches!(err, QuakeError::Decode(_)));
    }

    #[test]
    fn test_malformed_payload_fails() {
        let err = FeedDecoder::new().decode(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, QuakeError::Decode(_)));

        let err = FeedDecoder::new()
            .decode(br#"{"features": "not a list"}"#)
            .unwrap_err();
        assert!(matches!(err, QuakeError::Decode(_)));
    }

    #[test]
    fn test_decode_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let doc = FeedDecoder::new().decode_file(file.path()).unwrap();
        assert_eq!(doc.features.len(), 1);
    }

    #[test]
    fn test_decode_missing_file_fails() {
        let err = FeedDecoder::new()
            .decode_file(Path::new("/nonexistent/quakefeed/all_week.json"))
            .unwrap_err();
        assert!(matches!(err, QuakeError::Decode(_)));
    }
}
