//! Projection from full feed records to domain events
//!
//! Only the geometry, `mag`, `title`, `time` and the feature id are
//! consulted. Every other property is intentionally dropped.

use super::feed::{Feature, FeedDocument};
use super::{Coordinate, Event};
use crate::error::{QuakeError, Result};

/// Index of longitude in `geometry.coordinates`
pub const LONGITUDE: usize = 0;
/// Index of latitude in `geometry.coordinates`
pub const LATITUDE: usize = 1;
/// Index of depth (km) in `geometry.coordinates`
pub const DEPTH: usize = 2;

/// Maps one feature to an [`Event`]
///
/// # Returns
/// * `Ok(Event)` when every required field is present
/// * `Err(QuakeError::MissingField)` naming the first missing field
pub fn project(feature: &Feature) -> Result<Event> {
    let missing = |field: &'static str| QuakeError::MissingField {
        id: feature.id.clone(),
        field,
    };

    let coords = &feature.geometry.coordinates;
    if coords.len() <= DEPTH {
        return Err(missing("geometry.coordinates"));
    }
    let coordinate = Coordinate::new(coords[LONGITUDE], coords[LATITUDE], coords[DEPTH]);

    let props = &feature.properties;
    let magnitude = props.mag.ok_or_else(|| missing("mag"))?;
    let description = props.title.clone().ok_or_else(|| missing("title"))?;
    let time = props.time.ok_or_else(|| missing("time"))?;

    Ok(Event::new(
        coordinate,
        magnitude,
        description,
        feature.id.clone(),
        time,
    ))
}

/// Maps every feature of a document, preserving feed order
///
/// Fails on the first feature that cannot be projected.
pub fn project_all(document: &FeedDocument) -> Result<Vec<Event>> {
    document.features.iter().map(project).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feed::{Geometry, Properties};

    fn feature(coords: Vec<f64>) -> Feature {
        Feature {
            kind: "Feature".to_string(),
            id: "ci37335775".to_string(),
            properties: Properties {
                mag: Some(0.93),
                title: Some("M 0.9 - 5km SSE of Hemet, CA".to_string()),
                time: Some(1461399067480),
                place: "5km SSE of Hemet, CA".to_string(),
                sig: 13,
                ..Properties::default()
            },
            geometry: Geometry {
                kind: "Point".to_string(),
                coordinates: coords,
            },
        }
    }

    #[test]
    fn test_project_maps_positional_coordinates() {
        let event = project(&feature(vec![-116.9568333, 33.7033333, 15.06])).unwrap();

        assert_eq!(event.coordinate, Coordinate::new(-116.9568333, 33.7033333, 15.06));
        assert_eq!(event.coordinate.longitude, -116.9568333);
        assert_eq!(event.coordinate.latitude, 33.7033333);
        assert_eq!(event.coordinate.depth, 15.06);
        assert_eq!(event.magnitude, 0.93);
        assert_eq!(event.description, "M 0.9 - 5km SSE of Hemet, CA");
        assert_eq!(event.time, 1461399067480);
        assert_eq!(event.id, "ci37335775");
    }

    #[test]
    fn test_project_rejects_short_geometry() {
        let err = project(&feature(vec![-116.9, 33.7])).unwrap_err();
        assert!(matches!(
            err,
            QuakeError::MissingField {
                field: "geometry.coordinates",
                ..
            }
        ));
    }

    #[test]
    fn test_project_rejects_missing_magnitude() {
        let mut f = feature(vec![1.0, 2.0, 3.0]);
        f.properties.mag = None;
        let err = project(&f).unwrap_err();
        assert!(err.to_string().contains("mag"));
        assert!(err.to_string().contains("ci37335775"));
    }

    #[test]
    fn test_project_rejects_missing_title_and_time() {
        let mut f = feature(vec![1.0, 2.0, 3.0]);
        f.properties.title = None;
        assert!(matches!(
            project(&f).unwrap_err(),
            QuakeError::MissingField { field: "title", .. }
        ));

        let mut f = feature(vec![1.0, 2.0, 3.0]);
        f.properties.time = None;
        assert!(matches!(
            project(&f).unwrap_err(),
            QuakeError::MissingField { field: "time", .. }
        ));
    }

    #[test]
    fn test_project_all_preserves_order() {
        let mut second = feature(vec![10.0, 20.0, 5.0]);
        second.id = "us10005".to_string();
        let document = FeedDocument {
            features: vec![feature(vec![1.0, 2.0, 3.0]), second],
            ..FeedDocument::default()
        };

        let events = project_all(&document).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "ci37335775");
        assert_eq!(events[1].id, "us10005");
    }

    #[test]
    fn test_project_all_empty_document() {
        let events = project_all(&FeedDocument::default()).unwrap();
        assert!(events.is_empty());
    }
}
