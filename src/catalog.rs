use std::collections::HashMap;

use geojson::{GeoJson, Value};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::error::LoadError;

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Position of a feature inside its catalog, doubling as the marker reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub usize);

/// Display attributes of one venue, as carried in the dataset's feature properties
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeatureProperties {
    pub slug: String,
    #[serde(deserialize_with = "number_or_string")]
    pub event_id: u32,
    pub venue_name: String,
    pub event_title: String,
    pub event_tags: String,
    pub venue_street: String,
    pub venue_housenumber: String,
    pub venue_postal_code: String,
    pub venue_city: String,
    pub venue_url: String,
    pub venue_open: String,
    pub venue_close: String,
    pub activity_title: String,
    pub activity_time: String,
    #[serde(rename = "event_description_de")]
    pub description_de: String,
    #[serde(rename = "event_description_dk")]
    pub description_dk: String,
    pub event_image: String,
}

/// One venue/event record
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub coordinate: LatLng,
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn slug(&self) -> &str {
        &self.properties.slug
    }

    pub fn event_id(&self) -> u32 {
        self.properties.event_id
    }
}

/// Loaded set of venue features, keyed by slug
#[derive(Debug, Default)]
pub struct FeatureCatalog {
    features: Vec<Feature>,
    by_slug: HashMap<String, FeatureId>,
}

impl FeatureCatalog {
    /// Build a catalog from features in dataset order.
    /// Duplicate slugs keep the first feature as the lookup target.
    pub fn new(features: Vec<Feature>) -> Self {
        let mut by_slug = HashMap::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            if by_slug.contains_key(feature.slug()) {
                warn!(slug = feature.slug(), "duplicate slug in dataset, first feature wins");
                continue;
            }
            by_slug.insert(feature.slug().to_string(), FeatureId(idx));
        }
        Self { features, by_slug }
    }

    /// Parse a GeoJSON document (raw bytes, parsed in place by simd-json)
    pub fn from_geojson_bytes(bytes: &mut [u8]) -> Result<Self, LoadError> {
        let value: serde_json::Value = simd_json::serde::from_slice(bytes)?;
        let geojson = GeoJson::from_json_value(value)?;
        Ok(Self::from_geojson(geojson))
    }

    pub fn from_geojson(geojson: GeoJson) -> Self {
        let raw = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(_) => {
                warn!("dataset is a bare geometry, no features loaded");
                Vec::new()
            }
        };

        let features = raw
            .into_iter()
            .filter_map(|feature| {
                let coordinate = match feature.geometry.as_ref().map(|g| &g.value) {
                    Some(Value::Point(coords)) if coords.len() >= 2 => {
                        LatLng::new(coords[1], coords[0])
                    }
                    _ => {
                        warn!("skipping feature without point geometry");
                        return None;
                    }
                };

                let mut props = feature.properties.unwrap_or_default();
                props.retain(|_, v| !v.is_null());
                let properties: FeatureProperties =
                    match serde_json::from_value(serde_json::Value::Object(props)) {
                        Ok(p) => p,
                        Err(e) => {
                            warn!("skipping feature with malformed properties: {}", e);
                            return None;
                        }
                    };

                if properties.slug.is_empty() {
                    warn!(event_id = properties.event_id, "skipping feature without slug");
                    return None;
                }

                Some(Feature { coordinate, properties })
            })
            .collect::<Vec<_>>();

        debug!(count = features.len(), "parsed dataset features");
        Self::new(features)
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id.0)
    }

    /// First feature carrying `slug`
    pub fn find_by_slug(&self, slug: &str) -> Option<FeatureId> {
        self.by_slug.get(slug).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Feature)> {
        self.features
            .iter()
            .enumerate()
            .map(|(idx, f)| (FeatureId(idx), f))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
pub(crate) fn test_feature(slug: &str, event_id: u32, lat: f64, lon: f64) -> Feature {
    Feature {
        coordinate: LatLng::new(lat, lon),
        properties: FeatureProperties {
            slug: slug.to_string(),
            event_id,
            venue_name: format!("Venue {}", event_id),
            event_title: format!("Event {}", event_id),
            event_image: format!("https://example.org/{}.webp", slug),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [9.4369, 54.7834] },
                "properties": {
                    "slug": "altes-gymnasium",
                    "event_id": 7,
                    "venue_name": "Altes Gymnasium",
                    "event_title": "Chorkonzert",
                    "event_description_de": "Ein Abend voller Musik"
                }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [9.4401, 54.7901] },
                "properties": { "slug": "phaenomenta", "event_id": "12" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [9.45, 54.80] },
                "properties": { "slug": "altes-gymnasium", "event_id": 99 }
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": { "slug": "nowhere", "event_id": 1 }
            }
        ]
    }"#;

    #[test]
    fn test_parse_dataset() {
        let mut bytes = DATASET.as_bytes().to_vec();
        let catalog = FeatureCatalog::from_geojson_bytes(&mut bytes).unwrap();

        assert_eq!(catalog.len(), 3);
        let first = catalog.get(FeatureId(0)).unwrap();
        assert_eq!(first.slug(), "altes-gymnasium");
        assert_eq!(first.event_id(), 7);
        assert_eq!(first.coordinate, LatLng::new(54.7834, 9.4369));
        assert_eq!(first.properties.description_de, "Ein Abend voller Musik");
        assert!(first.properties.description_dk.is_empty());
    }

    #[test]
    fn test_event_id_from_string() {
        let mut bytes = DATASET.as_bytes().to_vec();
        let catalog = FeatureCatalog::from_geojson_bytes(&mut bytes).unwrap();
        let id = catalog.find_by_slug("phaenomenta").unwrap();
        assert_eq!(catalog.get(id).unwrap().event_id(), 12);
    }

    #[test]
    fn test_duplicate_slug_first_wins() {
        let mut bytes = DATASET.as_bytes().to_vec();
        let catalog = FeatureCatalog::from_geojson_bytes(&mut bytes).unwrap();
        assert_eq!(catalog.find_by_slug("altes-gymnasium"), Some(FeatureId(0)));
        assert_eq!(catalog.get(FeatureId(2)).unwrap().event_id(), 99);
    }

    #[test]
    fn test_null_properties_default_to_empty() {
        let mut bytes = br#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[9.43,54.78]},"properties":{"slug":"museumsberg","event_id":3,"activity_title":null,"event_image":null}}]}"#.to_vec();
        let catalog = FeatureCatalog::from_geojson_bytes(&mut bytes).unwrap();
        let feature = catalog.get(FeatureId(0)).unwrap();
        assert_eq!(feature.properties.activity_title, "");
        assert_eq!(feature.properties.event_image, "");
    }

    #[test]
    fn test_invalid_json() {
        let mut bytes = b"{ not json".to_vec();
        assert!(matches!(
            FeatureCatalog::from_geojson_bytes(&mut bytes),
            Err(LoadError::Json(_))
        ));
    }
}
