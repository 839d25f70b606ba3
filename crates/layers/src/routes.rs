//! Airline route layer: great-circle polylines between airport pairs.

use std::collections::{BTreeSet, HashMap};

use foundation::math::{GeoPoint, RouteDensity, RouteError, great_circle_route};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layer::{Layer, LayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA code.
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub region: u32,
    pub lat: f64,
    pub lon: f64,
}

impl Airport {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }
}

/// Airports keyed by code. Later entries with the same code win.
#[derive(Debug, Default, Clone)]
pub struct AirportIndex {
    by_code: HashMap<String, Airport>,
}

impl AirportIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, airport: Airport) {
        self.by_code.insert(airport.code.clone(), airport);
    }

    pub fn get(&self, code: &str) -> Option<&Airport> {
        self.by_code.get(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl FromIterator<Airport> for AirportIndex {
    fn from_iter<I: IntoIterator<Item = Airport>>(iter: I) -> Self {
        let mut index = Self::new();
        for airport in iter {
            index.insert(airport);
        }
        index
    }
}

/// A scheduled airport pair flown by one airline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityPair {
    #[serde(rename = "al")]
    pub airline: String,
    pub base: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl CityPair {
    pub fn new(
        airline: impl Into<String>,
        base: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            airline: airline.into(),
            base: base.into(),
            reference: reference.into(),
        }
    }

    pub fn id(&self) -> String {
        format!("{}-{}-{}", self.base, self.reference, self.airline)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteProperties {
    pub id: String,
    #[serde(rename = "Airline")]
    pub airline: String,
    #[serde(rename = "Base")]
    pub base: String,
    #[serde(rename = "Ref")]
    pub reference: String,
    #[serde(rename = "City 1")]
    pub base_city: String,
    #[serde(rename = "City 2")]
    pub ref_city: String,
    /// `(lat, lon)` of the base airport.
    #[serde(rename = "base")]
    pub base_position: String,
    #[serde(rename = "ref")]
    pub ref_position: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RouteGeometryJson {
    LineString { coordinates: Vec<[f64; 2]> },
}

/// GeoJSON-shaped route feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct RouteFeature {
    pub id: String,
    pub properties: RouteProperties,
    pub geometry: RouteGeometryJson,
    #[serde(skip)]
    pub distance_rad: f64,
}

impl RouteFeature {
    pub fn between(
        pair: &CityPair,
        base: &Airport,
        reference: &Airport,
        density: &RouteDensity,
    ) -> Result<Self, RouteError> {
        let route = great_circle_route(base.position(), reference.position(), density)?;
        let id = pair.id();

        Ok(Self {
            id: id.clone(),
            properties: RouteProperties {
                id,
                airline: pair.airline.clone(),
                base: base.code.clone(),
                reference: reference.code.clone(),
                base_city: base.city.clone(),
                ref_city: reference.city.clone(),
                base_position: format!("({}, {})", base.lat, base.lon),
                ref_position: format!("({}, {})", reference.lat, reference.lon),
            },
            geometry: RouteGeometryJson::LineString {
                coordinates: route.points.iter().map(|p| p.as_array()).collect(),
            },
            distance_rad: route.distance_rad,
        })
    }

    pub fn coordinates(&self) -> &[[f64; 2]] {
        match &self.geometry {
            RouteGeometryJson::LineString { coordinates } => coordinates,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteLayer {
    id: LayerId,
    pub features: Vec<RouteFeature>,
    /// Airport codes referenced by a pair but missing from the index.
    pub unmappable_codes: BTreeSet<String>,
    /// Ids of pairs dropped because their endpoints are antipodal.
    pub skipped: Vec<String>,
}

impl Layer for RouteLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn feature_count(&self) -> usize {
        self.features.len()
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
struct FeatureCollection<'a> {
    features: &'a [RouteFeature],
}

impl RouteLayer {
    pub fn to_geojson(&self) -> serde_json::Result<String> {
        serde_json::to_string(&FeatureCollection {
            features: &self.features,
        })
    }
}

/// Builds a [`RouteLayer`] from city pairs against an explicit airport index.
#[derive(Debug, Clone, Default)]
pub struct RouteLayerBuilder {
    density: RouteDensity,
    airline: Option<String>,
}

impl RouteLayerBuilder {
    pub fn new(density: RouteDensity) -> Self {
        Self {
            density,
            airline: None,
        }
    }

    /// Keep only pairs flown by `airline`.
    pub fn airline(mut self, airline: impl Into<String>) -> Self {
        self.airline = Some(airline.into());
        self
    }

    pub fn build(&self, id: u64, airports: &AirportIndex, pairs: &[CityPair]) -> RouteLayer {
        let mut layer = RouteLayer {
            id: LayerId(id),
            features: Vec::new(),
            unmappable_codes: BTreeSet::new(),
            skipped: Vec::new(),
        };

        let selected = pairs.iter().filter(|pair| match &self.airline {
            Some(al) => pair.airline == *al,
            None => true,
        });

        for pair in selected {
            let base = airports.get(&pair.base);
            let reference = airports.get(&pair.reference);
            let (Some(base), Some(reference)) = (base, reference) else {
                if base.is_none() {
                    layer.unmappable_codes.insert(pair.base.clone());
                }
                if reference.is_none() {
                    layer.unmappable_codes.insert(pair.reference.clone());
                }
                continue;
            };

            match RouteFeature::between(pair, base, reference, &self.density) {
                Ok(feature) => layer.features.push(feature),
                Err(err) => {
                    warn!("skipping route {}: {err}", pair.id());
                    layer.skipped.push(pair.id());
                }
            }
        }

        if !layer.unmappable_codes.is_empty() {
            let codes: Vec<&str> = layer.unmappable_codes.iter().map(String::as_str).collect();
            warn!("unmappable airport codes: {}", codes.join(", "));
        }
        debug!(
            "{}: {} features from {} pairs",
            layer.id,
            layer.feature_count(),
            pairs.len()
        );

        layer
    }
}

#[cfg(test)]
mod tests {
    use foundation::math::RouteDensity;
    use pretty_assertions::assert_eq;

    use super::{Airport, AirportIndex, CityPair, RouteLayerBuilder};
    use crate::layer::{Layer, LayerId};

    fn airport(code: &str, city: &str, lat: f64, lon: f64) -> Airport {
        Airport {
            code: code.to_string(),
            name: format!("{city} Intl"),
            city: city.to_string(),
            country: "XX".to_string(),
            region: 0,
            lat,
            lon,
        }
    }

    fn index() -> AirportIndex {
        [
            airport("DEN", "Denver", 39.862, -104.673),
            airport("ATL", "Atlanta", 33.637, -84.428),
            airport("NAS", "Nassau", 25.039, -77.466),
            airport("AAA", "Here", 0.0, 0.0),
            airport("BBB", "Antipode", 0.0, 180.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn builds_features_with_properties() {
        let pairs = vec![CityPair::new("3M", "DEN", "ATL")];
        let layer = RouteLayerBuilder::new(RouteDensity::default()).build(7, &index(), &pairs);

        assert_eq!(layer.id(), LayerId(7));
        assert_eq!(layer.feature_count(), 1);
        let f = &layer.features[0];
        assert_eq!(f.id, "DEN-ATL-3M");
        assert_eq!(f.properties.base_city, "Denver");
        assert_eq!(f.properties.ref_city, "Atlanta");
        assert_eq!(f.properties.base_position, "(39.862, -104.673)");

        let coords = f.coordinates();
        assert_eq!(coords.first(), Some(&[-104.673, 39.862]));
        assert_eq!(coords.last(), Some(&[-84.428, 33.637]));
        // ~17 degrees of arc at 0.2 points per degree stays at the floor.
        assert_eq!(coords.len(), 10);
    }

    #[test]
    fn filters_by_airline_and_collects_unknown_codes() {
        let pairs = vec![
            CityPair::new("3M", "DEN", "XXX"),
            CityPair::new("3M", "YYY", "ATL"),
            CityPair::new("3M", "ATL", "NAS"),
            CityPair::new("DL", "ATL", "DEN"),
            CityPair::new("DL", "ZZZ", "DEN"),
        ];
        let layer = RouteLayerBuilder::default()
            .airline("3M")
            .build(1, &index(), &pairs);

        let ids: Vec<&str> = layer.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["ATL-NAS-3M"]);
        let unknown: Vec<&str> = layer.unmappable_codes.iter().map(String::as_str).collect();
        assert_eq!(unknown, vec!["XXX", "YYY"]);
    }

    #[test]
    fn antipodal_pairs_are_skipped() {
        let pairs = vec![
            CityPair::new("XX", "AAA", "BBB"),
            CityPair::new("XX", "DEN", "ATL"),
        ];
        let layer = RouteLayerBuilder::default().build(1, &index(), &pairs);
        assert_eq!(layer.features.len(), 1);
        assert_eq!(layer.skipped, vec!["AAA-BBB-XX".to_string()]);
    }

    #[test]
    fn serializes_as_geojson() {
        let pairs = vec![CityPair::new("3M", "ATL", "NAS")];
        let layer = RouteLayerBuilder::default().build(1, &index(), &pairs);
        let json: serde_json::Value = serde_json::from_str(&layer.to_geojson().unwrap()).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["id"], "ATL-NAS-3M");
        assert_eq!(feature["properties"]["City 1"], "Atlanta");
        assert_eq!(feature["properties"]["Ref"], "NAS");
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["geometry"]["coordinates"][0][0], -84.428);
        assert!(feature.get("distance_rad").is_none());
    }

    #[test]
    fn city_pairs_use_short_field_names() {
        let pair: CityPair =
            serde_json::from_str(r#"{"al":"UA","base":"DEN","ref":"SFO"}"#).unwrap();
        assert_eq!(pair, CityPair::new("UA", "DEN", "SFO"));
    }
}
